use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;

use crate::errors::{AssetError, Result};

/// Size of one read when streaming a model file.
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Extension appended to animation names to find their model files.
pub const MODEL_EXTENSION: &str = "fbx";

/// Maps animation names onto files below a models directory.
///
/// `"Taunt (1)"` resolves to `<models_dir>/Taunt (1).fbx`; names are used
/// verbatim, spaces and parentheses included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    models_dir: PathBuf,
}

impl AssetPaths {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// File path for `name`.
    ///
    /// Empty names and names that could escape the models directory are
    /// rejected with [`AssetError::InvalidName`].
    pub fn model_path(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.models_dir.join(format!("{name}.{MODEL_EXTENSION}")))
    }
}

fn validate_name(name: &str) -> Result<()> {
    let escapes = name.contains('/') || name.contains('\\') || name == ".." || name.contains('\0');
    if name.trim().is_empty() || escapes {
        return Err(AssetError::InvalidName(name.to_string()).into());
    }
    Ok(())
}

/// Reads a whole file in [`READ_CHUNK_SIZE`] chunks.
///
/// `progress` is called after every chunk with the bytes read so far and the
/// file size when the filesystem reports one.
pub async fn read_with_progress<F>(path: &Path, mut progress: F) -> Result<Vec<u8>>
where
    F: FnMut(u64, Option<u64>) + Send,
{
    let mut file = tokio::fs::File::open(path).await?;
    let total = file.metadata().await.ok().map(|m| m.len()).filter(|&len| len > 0);

    let mut data = Vec::with_capacity(total.map_or(READ_CHUNK_SIZE, |len| len as usize));
    let mut chunk = vec![0_u8; READ_CHUNK_SIZE];
    loop {
        let read = file.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..read]);
        progress(data.len() as u64, total);
    }

    Ok(data)
}
