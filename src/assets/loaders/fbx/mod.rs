//! Binary FBX loader.
//!
//! [`reader`] decodes the record tree, [`convert`] maps it onto the scene
//! and animation types.

pub mod convert;
pub mod document;
pub mod reader;

pub use document::{FbxDocument, FbxNode, Property};

use crate::assets::server::ModelAsset;
use crate::errors::FbxError;

/// Decodes `bytes` and builds the model asset called `name`.
pub fn load_fbx(bytes: &[u8], name: &str) -> Result<ModelAsset, FbxError> {
    let document = reader::parse(bytes)?;
    convert::convert(&document, name)
}
