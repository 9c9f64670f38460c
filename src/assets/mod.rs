//! Model loading and caching.
//!
//! - [`AssetServer`]: name to file resolution, async reads and FBX decoding
//! - [`ModelLibrary`]: per-name cache of models, mixers and actions
//! - [`loaders::fbx`]: the binary FBX reader and scene converter

pub mod io;
pub mod library;
pub mod loaders;
pub mod server;

pub use io::AssetPaths;
pub use library::{LoadedModel, ModelLibrary};
pub use server::{AssetServer, LoadEvent, ModelAsset};
