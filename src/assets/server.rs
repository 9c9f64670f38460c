use std::sync::Arc;

use flume::Sender;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::animation::AnimationClip;
use crate::assets::io::{AssetPaths, read_with_progress};
use crate::assets::loaders::load_fbx;
use crate::errors::Result;
use crate::scene::Model;

/// A decoded model file: the node tree and every clip it carries.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub model: Model,
    pub animations: Vec<Arc<AnimationClip>>,
}

/// Progress and completion notifications of a background load.
#[derive(Debug)]
pub enum LoadEvent {
    Progress {
        name: String,
        loaded: u64,
        total: Option<u64>,
    },
    Loaded {
        name: String,
        asset: Box<ModelAsset>,
    },
    Failed {
        name: String,
        error: String,
    },
}

impl LoadEvent {
    /// Animation name the event belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            LoadEvent::Progress { name, .. }
            | LoadEvent::Loaded { name, .. }
            | LoadEvent::Failed { name, .. } => name,
        }
    }
}

/// Resolves animation names to files and decodes them.
///
/// The server holds no asset state; caching is the job of
/// [`ModelLibrary`](crate::assets::ModelLibrary). It is cheap to clone into
/// loader tasks.
#[derive(Debug, Clone)]
pub struct AssetServer {
    paths: AssetPaths,
}

impl AssetServer {
    #[must_use]
    pub fn new(paths: AssetPaths) -> Self {
        Self { paths }
    }

    #[inline]
    #[must_use]
    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    /// Blocking load on a private current-thread runtime.
    pub fn load_model(&self, name: &str) -> Result<ModelAsset> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.load_model_async(name, |_, _| {}))
    }

    /// Reads the file for `name` and decodes it off the async worker.
    pub async fn load_model_async<F>(&self, name: &str, progress: F) -> Result<ModelAsset>
    where
        F: FnMut(u64, Option<u64>) + Send,
    {
        let path = self.paths.model_path(name)?;
        log::info!("Loading model `{name}` from {}", path.display());

        let bytes = read_with_progress(&path, progress).await?;
        let label = name.to_string();
        tokio::task::spawn_blocking(move || Self::decode_fbx(&bytes, &label)).await?
    }

    /// CPU side of a load: parse and convert an FBX payload.
    pub fn decode_fbx(bytes: &[u8], name: &str) -> Result<ModelAsset> {
        Ok(load_fbx(bytes, name)?)
    }

    /// Starts a background load on `runtime` that reports through `events`.
    ///
    /// Send failures are ignored: a dropped receiver means nobody waits for
    /// the result any more.
    pub fn spawn_load(&self, runtime: &Handle, name: String, events: Sender<LoadEvent>) -> JoinHandle<()> {
        let server = self.clone();
        runtime.spawn(async move {
            let progress_events = events.clone();
            let progress_name = name.clone();
            let result = server
                .load_model_async(&name, move |loaded, total| {
                    let _ = progress_events.send(LoadEvent::Progress {
                        name: progress_name.clone(),
                        loaded,
                        total,
                    });
                })
                .await;

            let event = match result {
                Ok(asset) => LoadEvent::Loaded {
                    name,
                    asset: Box::new(asset),
                },
                Err(e) => {
                    log::error!("Failed to load model `{name}`: {e}");
                    LoadEvent::Failed {
                        name,
                        error: e.to_string(),
                    }
                }
            };
            let _ = events.send(event);
        })
    }
}
