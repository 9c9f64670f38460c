//! Test support: a binary FBX writer and a small rigged character.
//!
//! The character has a `Hips -> Spine` joint chain, a `Body` mesh with one
//! blend-shape channel (`Smile`, 25% by default) and one animation stack
//! (`mixamo.com`, 1 s) that moves the hips along X, turns the spine around Y
//! and drives the smile from 0 to 100%.

#![allow(dead_code)]

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use motion_showcase::assets::loaders::fbx::convert::TICKS_PER_SECOND;
use motion_showcase::assets::loaders::fbx::reader::MAGIC;
use motion_showcase::assets::loaders::fbx::{FbxNode, Property};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Writer
// ============================================================================

pub fn encode(version: u32, nodes: &[FbxNode], compress_arrays: bool) -> Vec<u8> {
    let wide = version >= 7500;
    let mut out = MAGIC.to_vec();
    out.extend_from_slice(&[0x1A, 0x00]);
    out.extend_from_slice(&version.to_le_bytes());
    for node in nodes {
        write_node(&mut out, node, wide, compress_arrays);
    }
    write_null_record(&mut out, wide);
    out
}

fn header_width(wide: bool) -> usize {
    if wide { 8 } else { 4 }
}

fn put_header_int(out: &mut [u8], at: usize, value: usize, wide: bool) {
    if wide {
        out[at..at + 8].copy_from_slice(&(value as u64).to_le_bytes());
    } else {
        out[at..at + 4].copy_from_slice(&(value as u32).to_le_bytes());
    }
}

fn write_null_record(out: &mut Vec<u8>, wide: bool) {
    out.extend(std::iter::repeat_n(0_u8, header_width(wide) * 3 + 1));
}

fn write_node(out: &mut Vec<u8>, node: &FbxNode, wide: bool, compress: bool) {
    let start = out.len();
    let width = header_width(wide);
    out.extend(std::iter::repeat_n(0_u8, width * 3));
    out.push(node.name.len() as u8);
    out.extend_from_slice(node.name.as_bytes());

    let properties_start = out.len();
    for property in &node.properties {
        write_property(out, property, compress);
    }
    let property_len = out.len() - properties_start;

    if !node.children.is_empty() {
        for child in &node.children {
            write_node(out, child, wide, compress);
        }
        write_null_record(out, wide);
    }

    let end = out.len();
    put_header_int(out, start, end, wide);
    put_header_int(out, start + width, node.properties.len(), wide);
    put_header_int(out, start + 2 * width, property_len, wide);
}

fn write_array(out: &mut Vec<u8>, code: u8, count: usize, raw: &[u8], compress: bool) {
    out.push(code);
    out.extend_from_slice(&(count as u32).to_le_bytes());
    if compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw).unwrap();
        let packed = encoder.finish().unwrap();
        out.extend_from_slice(&1_u32.to_le_bytes());
        out.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        out.extend_from_slice(&packed);
    } else {
        out.extend_from_slice(&0_u32.to_le_bytes());
        out.extend_from_slice(&(raw.len() as u32).to_le_bytes());
        out.extend_from_slice(raw);
    }
}

fn write_property(out: &mut Vec<u8>, property: &Property, compress: bool) {
    match property {
        Property::Bool(v) => {
            out.push(b'C');
            out.push(u8::from(*v));
        }
        Property::I16(v) => {
            out.push(b'Y');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Property::I32(v) => {
            out.push(b'I');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Property::I64(v) => {
            out.push(b'L');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Property::F32(v) => {
            out.push(b'F');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Property::F64(v) => {
            out.push(b'D');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Property::BoolArray(v) => {
            let raw: Vec<u8> = v.iter().map(|&b| u8::from(b)).collect();
            write_array(out, b'b', v.len(), &raw, compress);
        }
        Property::I32Array(v) => {
            let raw: Vec<u8> = v.iter().flat_map(|x| x.to_le_bytes()).collect();
            write_array(out, b'i', v.len(), &raw, compress);
        }
        Property::I64Array(v) => {
            let raw: Vec<u8> = v.iter().flat_map(|x| x.to_le_bytes()).collect();
            write_array(out, b'l', v.len(), &raw, compress);
        }
        Property::F32Array(v) => {
            let raw: Vec<u8> = v.iter().flat_map(|x| x.to_le_bytes()).collect();
            write_array(out, b'f', v.len(), &raw, compress);
        }
        Property::F64Array(v) => {
            let raw: Vec<u8> = v.iter().flat_map(|x| x.to_le_bytes()).collect();
            write_array(out, b'd', v.len(), &raw, compress);
        }
        Property::String(s) => {
            out.push(b'S');
            out.extend_from_slice(&(s.len() as u32).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        Property::Raw(bytes) => {
            out.push(b'R');
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(bytes);
        }
    }
}

// ============================================================================
// Document helpers
// ============================================================================

pub fn node(name: &str, properties: Vec<Property>, children: Vec<FbxNode>) -> FbxNode {
    FbxNode {
        name: name.to_string(),
        properties,
        children,
    }
}

pub fn s(text: &str) -> Property {
    Property::String(text.to_string())
}

/// A `Properties70` entry.
pub fn p70(name: &str, kind: &str, values: &[f64]) -> FbxNode {
    let mut properties = vec![s(name), s(kind), s(""), s("A")];
    properties.extend(values.iter().map(|&v| Property::F64(v)));
    node("P", properties, Vec::new())
}

pub fn properties70(entries: Vec<FbxNode>) -> FbxNode {
    node("Properties70", Vec::new(), entries)
}

pub fn object(kind: &str, id: i64, name: &str, class_tag: &str, subclass: &str, children: Vec<FbxNode>) -> FbxNode {
    node(
        kind,
        vec![
            Property::I64(id),
            s(&format!("{name}\u{0}\u{1}{class_tag}")),
            s(subclass),
        ],
        children,
    )
}

pub fn oo(child: i64, parent: i64) -> FbxNode {
    node(
        "C",
        vec![s("OO"), Property::I64(child), Property::I64(parent)],
        Vec::new(),
    )
}

pub fn op(child: i64, parent: i64, property: &str) -> FbxNode {
    node(
        "C",
        vec![s("OP"), Property::I64(child), Property::I64(parent), s(property)],
        Vec::new(),
    )
}

pub fn curve(id: i64, times_seconds: &[f64], values: &[f32]) -> FbxNode {
    let ticks: Vec<i64> = times_seconds
        .iter()
        .map(|t| (t * TICKS_PER_SECOND).round() as i64)
        .collect();
    object(
        "AnimationCurve",
        id,
        "",
        "AnimCurve",
        "",
        vec![
            node("Default", vec![Property::F64(0.0)], Vec::new()),
            node("KeyTime", vec![Property::I64Array(ticks)], Vec::new()),
            node("KeyValueFloat", vec![Property::F32Array(values.to_vec())], Vec::new()),
        ],
    )
}

/// Knobs for [`character_document`].
#[derive(Debug, Clone, Copy)]
pub struct CharacterOptions {
    /// Hips X translation at the end of the clip.
    pub hips_end_x: f32,
    /// Time of the last key in every curve.
    pub clip_seconds: f64,
    pub with_animation: bool,
    /// `RotationOrder` enum value of the spine.
    pub spine_rotation_order: Option<f64>,
    pub spine_pre_rotation: Option<[f64; 3]>,
}

impl Default for CharacterOptions {
    fn default() -> Self {
        Self {
            hips_end_x: 10.0,
            clip_seconds: 1.0,
            with_animation: true,
            spine_rotation_order: None,
            spine_pre_rotation: None,
        }
    }
}

pub fn character_document(options: CharacterOptions) -> Vec<FbxNode> {
    let mut spine_props = vec![p70("Lcl Translation", "Lcl Translation", &[0.0, 10.0, 0.0])];
    if let Some(order) = options.spine_rotation_order {
        spine_props.push(p70("RotationOrder", "enum", &[order]));
    }
    if let Some(pre) = options.spine_pre_rotation {
        spine_props.push(p70("PreRotation", "Vector3D", &pre));
    }

    let mut objects = vec![
        object(
            "Model",
            10,
            "Hips",
            "Model",
            "LimbNode",
            vec![properties70(vec![p70("Lcl Translation", "Lcl Translation", &[0.0, 100.0, 0.0])])],
        ),
        object("Model", 11, "Spine", "Model", "LimbNode", vec![properties70(spine_props)]),
        object("Model", 12, "Body", "Model", "Mesh", vec![properties70(Vec::new())]),
        object("Geometry", 20, "Body", "Geometry", "Mesh", Vec::new()),
        object("Deformer", 30, "Morpher", "Deformer", "BlendShape", Vec::new()),
        object(
            "Deformer",
            31,
            "Smile",
            "SubDeformer",
            "BlendShapeChannel",
            vec![
                node("DeformPercent", vec![Property::F64(25.0)], Vec::new()),
                properties70(vec![p70("DeformPercent", "Number", &[25.0])]),
            ],
        ),
        object("Geometry", 32, "Smile", "Geometry", "Shape", Vec::new()),
    ];

    let mut connections = vec![
        oo(10, 0),
        oo(11, 10),
        oo(12, 0),
        oo(20, 12),
        oo(30, 20),
        oo(31, 30),
        oo(32, 31),
    ];

    if options.with_animation {
        objects.extend([
            object("AnimationStack", 40, "mixamo.com", "AnimStack", "", Vec::new()),
            object("AnimationLayer", 41, "BaseLayer", "AnimLayer", "", Vec::new()),
            object(
                "AnimationCurveNode",
                50,
                "T",
                "AnimCurveNode",
                "",
                vec![properties70(vec![
                    p70("d|X", "Number", &[0.0]),
                    p70("d|Y", "Number", &[100.0]),
                    p70("d|Z", "Number", &[0.0]),
                ])],
            ),
            curve(51, &[0.0, options.clip_seconds], &[0.0, options.hips_end_x]),
            object(
                "AnimationCurveNode",
                52,
                "R",
                "AnimCurveNode",
                "",
                vec![properties70(vec![
                    p70("d|X", "Number", &[0.0]),
                    p70("d|Y", "Number", &[0.0]),
                    p70("d|Z", "Number", &[0.0]),
                ])],
            ),
            curve(53, &[0.0, options.clip_seconds], &[0.0, 90.0]),
            object(
                "AnimationCurveNode",
                54,
                "DeformPercent",
                "AnimCurveNode",
                "",
                vec![properties70(vec![p70("d|DeformPercent", "Number", &[25.0])])],
            ),
            curve(55, &[0.0, options.clip_seconds], &[0.0, 100.0]),
        ]);
        connections.extend([
            oo(41, 40),
            oo(50, 41),
            op(50, 10, "Lcl Translation"),
            op(51, 50, "d|X"),
            oo(52, 41),
            op(52, 11, "Lcl Rotation"),
            op(53, 52, "d|Y"),
            oo(54, 41),
            op(54, 31, "DeformPercent"),
            op(55, 54, "d|DeformPercent"),
        ]);
    }

    vec![
        node(
            "FBXHeaderExtension",
            Vec::new(),
            vec![node("FBXVersion", vec![Property::I32(7400)], Vec::new())],
        ),
        node("Objects", Vec::new(), objects),
        node("Connections", Vec::new(), connections),
    ]
}

pub fn character_fbx(version: u32, compress: bool) -> Vec<u8> {
    encode(version, &character_document(CharacterOptions::default()), compress)
}

pub fn character_fbx_with(options: CharacterOptions) -> Vec<u8> {
    encode(7400, &character_document(options), false)
}
