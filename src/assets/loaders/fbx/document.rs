//! In-memory FBX node tree.

/// One typed property value of an FBX node record.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    BoolArray(Vec<bool>),
    I32Array(Vec<i32>),
    I64Array(Vec<i64>),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
    String(String),
    Raw(Vec<u8>),
}

impl Property {
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Property::I16(v) => Some(i64::from(v)),
            Property::I32(v) => Some(i64::from(v)),
            Property::I64(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Property::F32(v) => Some(f64::from(v)),
            Property::F64(v) => Some(v),
            Property::I16(v) => Some(f64::from(v)),
            Property::I32(v) => Some(f64::from(v)),
            Property::I64(v) => Some(v as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric array contents widened to `f64`.
    #[must_use]
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            Property::F32Array(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            Property::F64Array(v) => Some(v.clone()),
            Property::I32Array(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            Property::I64Array(v) => Some(v.iter().map(|&x| x as f64).collect()),
            _ => None,
        }
    }

    /// Integer array contents widened to `i64`.
    #[must_use]
    pub fn to_i64_vec(&self) -> Option<Vec<i64>> {
        match self {
            Property::I32Array(v) => Some(v.iter().map(|&x| i64::from(x)).collect()),
            Property::I64Array(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// A node record: name, properties and nested records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FbxNode {
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<FbxNode>,
}

impl FbxNode {
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&FbxNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FbxNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    #[must_use]
    pub fn prop(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }
}

/// A decoded FBX file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FbxDocument {
    pub version: u32,
    pub nodes: Vec<FbxNode>,
}

impl FbxDocument {
    /// First top-level node named `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&FbxNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}
