pub mod fbx;

pub use fbx::{FbxDocument, load_fbx};
