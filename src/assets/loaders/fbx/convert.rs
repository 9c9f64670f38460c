//! Turns an [`FbxDocument`] into a [`Model`] and its animation clips.
//!
//! Only what the showcase poses is extracted: the `Model` hierarchy with
//! local transforms, blend-shape channels on meshes, and every animation
//! stack. Curves are resampled linearly onto the union of their key times.

use std::sync::Arc;

use glam::{Quat, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

use super::document::{FbxDocument, FbxNode, Property};
use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, Track, TrackData, TrackTarget,
};
use crate::assets::server::ModelAsset;
use crate::errors::FbxError;
use crate::scene::{Model, MorphTargets, Node, NodeHandle, Transform};

/// FBX time units per second.
pub const TICKS_PER_SECOND: f64 = 46_186_158_000.0;

/// Separator between an object name and its class in binary files.
const NAME_CLASS_SEPARATOR: &str = "\u{0}\u{1}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn rotation(self, degrees: Vec3) -> Quat {
        match self {
            Axis::X => Quat::from_rotation_x(degrees.x.to_radians()),
            Axis::Y => Quat::from_rotation_y(degrees.y.to_radians()),
            Axis::Z => Quat::from_rotation_z(degrees.z.to_radians()),
        }
    }
}

/// Matrix factor order for each `RotationOrder` enum value. `eXYZ` applies
/// X first, so its quaternion is `Rz * Ry * Rx`.
const ROTATION_ORDERS: [[Axis; 3]; 6] = [
    [Axis::Z, Axis::Y, Axis::X],
    [Axis::Y, Axis::Z, Axis::X],
    [Axis::X, Axis::Z, Axis::Y],
    [Axis::Z, Axis::X, Axis::Y],
    [Axis::Y, Axis::X, Axis::Z],
    [Axis::X, Axis::Y, Axis::Z],
];

fn euler_degrees_to_quat(degrees: Vec3, order: [Axis; 3]) -> Quat {
    order
        .iter()
        .fold(Quat::IDENTITY, |q, axis| q * axis.rotation(degrees))
        .normalize()
}

/// Rotation setup of one model: order plus pre and post rotations.
#[derive(Debug, Clone, Copy)]
struct RotationFrame {
    order: [Axis; 3],
    pre: Quat,
    post_inverse: Quat,
}

impl RotationFrame {
    fn compose(&self, lcl_degrees: Vec3) -> Quat {
        (self.pre * euler_degrees_to_quat(lcl_degrees, self.order) * self.post_inverse).normalize()
    }
}

struct Object<'a> {
    node: &'a FbxNode,
    name: String,
    class: String,
}

impl Object<'_> {
    fn kind(&self) -> &str {
        &self.node.name
    }
}

#[derive(Debug, Clone)]
struct Connection {
    child: i64,
    parent: i64,
    property: Option<String>,
}

/// Object table plus connection lookups.
struct Graph<'a> {
    objects: FxHashMap<i64, Object<'a>>,
    order: Vec<i64>,
    connections: Vec<Connection>,
}

impl<'a> Graph<'a> {
    fn build(doc: &'a FbxDocument) -> Result<Self, FbxError> {
        let objects_node = doc.node("Objects").ok_or_else(|| FbxError::MalformedNode {
            node: "Objects".into(),
            reason: "missing".into(),
        })?;

        let mut objects = FxHashMap::default();
        let mut order = Vec::new();
        for node in &objects_node.children {
            let id = node.prop(0).and_then(Property::as_i64).ok_or_else(|| {
                FbxError::MalformedNode {
                    node: node.name.clone(),
                    reason: "object without id".into(),
                }
            })?;
            let name = node
                .prop(1)
                .and_then(Property::as_str)
                .map(object_name)
                .unwrap_or_default();
            let class = node
                .prop(2)
                .and_then(Property::as_str)
                .unwrap_or_default()
                .to_string();
            order.push(id);
            objects.insert(id, Object { node, name, class });
        }

        let mut connections = Vec::new();
        if let Some(node) = doc.node("Connections") {
            for c in node.children_named("C") {
                let (Some(child), Some(parent)) = (
                    c.prop(1).and_then(Property::as_i64),
                    c.prop(2).and_then(Property::as_i64),
                ) else {
                    log::warn!("Skipping FBX connection without endpoints");
                    continue;
                };
                let property = c.prop(3).and_then(Property::as_str).map(str::to_string);
                connections.push(Connection {
                    child,
                    parent,
                    property,
                });
            }
        }

        Ok(Self {
            objects,
            order,
            connections,
        })
    }

    fn get(&self, id: i64) -> Option<&Object<'a>> {
        self.objects.get(&id)
    }

    fn of_kind<'s>(&'s self, kind: &'s str) -> impl Iterator<Item = (i64, &'s Object<'a>)> + 's {
        self.order
            .iter()
            .filter_map(move |id| self.objects.get(id).map(|o| (*id, o)))
            .filter(move |(_, o)| o.kind() == kind)
    }

    /// Connections whose parent is `id`, in file order.
    fn children_of(&self, id: i64) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.parent == id)
    }

    /// Connections whose child is `id`, in file order.
    fn parents_of(&self, id: i64) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.child == id)
    }
}

/// Strips the `\0\x01Class` suffix of binary object names.
fn object_name(raw: &str) -> String {
    raw.split(NAME_CLASS_SEPARATOR)
        .next()
        .unwrap_or_default()
        .to_string()
}

/// `Properties70` entries keyed by name; values start after name, type, label and flags.
fn properties70(node: &FbxNode) -> FxHashMap<&str, &[Property]> {
    let mut out = FxHashMap::default();
    if let Some(props) = node.child("Properties70") {
        for p in props.children_named("P") {
            if let Some(name) = p.prop(0).and_then(Property::as_str) {
                let values = p.properties.get(4..).unwrap_or(&[]);
                out.insert(name, values);
            }
        }
    }
    out
}

fn vec3_property(props: &FxHashMap<&str, &[Property]>, name: &str, default: Vec3) -> Vec3 {
    match props.get(name) {
        Some(values) if values.len() >= 3 => {
            let c = |i: usize| values[i].as_f64().map_or(0.0, |v| v as f32);
            Vec3::new(c(0), c(1), c(2))
        }
        _ => default,
    }
}

fn scalar_property(props: &FxHashMap<&str, &[Property]>, name: &str) -> Option<f64> {
    props.get(name).and_then(|v| v.first()).and_then(Property::as_f64)
}

fn rotation_frame(props: &FxHashMap<&str, &[Property]>) -> RotationFrame {
    let order_index = scalar_property(props, "RotationOrder").map_or(0, |v| v as usize);
    let order = ROTATION_ORDERS.get(order_index).copied().unwrap_or_else(|| {
        log::warn!("Unknown FBX rotation order {order_index}, using XYZ");
        ROTATION_ORDERS[0]
    });

    let pre = euler_degrees_to_quat(vec3_property(props, "PreRotation", Vec3::ZERO), order);
    let post = euler_degrees_to_quat(vec3_property(props, "PostRotation", Vec3::ZERO), order);

    RotationFrame {
        order,
        pre,
        post_inverse: post.inverse(),
    }
}

/// One `AnimationCurve`: key times in seconds and values.
#[derive(Debug, Clone)]
struct Curve {
    times: Vec<f32>,
    values: Vec<f32>,
}

impl Curve {
    fn from_node(node: &FbxNode) -> Option<Self> {
        let times = node.child("KeyTime")?.prop(0)?.to_i64_vec()?;
        let values = node.child("KeyValueFloat")?.prop(0)?.to_f64_vec()?;
        if times.is_empty() || times.len() != values.len() {
            log::warn!(
                "Skipping animation curve with {} times and {} values",
                times.len(),
                values.len()
            );
            return None;
        }
        Some(Self {
            times: times
                .iter()
                .map(|&t| (t as f64 / TICKS_PER_SECOND) as f32)
                .collect(),
            values: values.iter().map(|&v| v as f32).collect(),
        })
    }

    /// Linear sample, clamped to the first and last keys.
    fn sample(&self, time: f32) -> f32 {
        let next = self.times.partition_point(|&t| t <= time);
        if next == 0 {
            return self.values[0];
        }
        if next >= self.times.len() {
            return self.values[self.values.len() - 1];
        }
        let (t0, t1) = (self.times[next - 1], self.times[next]);
        let (v0, v1) = (self.values[next - 1], self.values[next]);
        let span = t1 - t0;
        if span <= f32::EPSILON {
            return v1;
        }
        v0 + (v1 - v0) * ((time - t0) / span)
    }
}

/// Sorted union of key times across curves.
fn merged_times<'c>(curves: impl Iterator<Item = &'c Curve>) -> Vec<f32> {
    let mut times: Vec<f32> = curves.flat_map(|c| c.times.iter().copied()).collect();
    times.sort_by(f32::total_cmp);
    times.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
    times
}

/// Curve node contents: per-channel curves plus `d|*` defaults.
struct CurveChannels {
    curves: FxHashMap<String, Curve>,
    defaults: FxHashMap<String, f32>,
}

impl CurveChannels {
    fn vector(&self, fallback: Vec3) -> Option<(Vec<f32>, Vec<Vec3>)> {
        let axes = ["d|X", "d|Y", "d|Z"];
        let times = merged_times(axes.iter().filter_map(|a| self.curves.get(*a)));
        if times.is_empty() {
            return None;
        }
        let channel = |axis: &str, time: f32, default: f32| {
            self.curves.get(axis).map_or_else(
                || self.defaults.get(axis).copied().unwrap_or(default),
                |c| c.sample(time),
            )
        };
        let values = times
            .iter()
            .map(|&t| {
                Vec3::new(
                    channel("d|X", t, fallback.x),
                    channel("d|Y", t, fallback.y),
                    channel("d|Z", t, fallback.z),
                )
            })
            .collect();
        Some((times, values))
    }
}

struct MorphChannel {
    mesh_name: String,
    index: usize,
}

struct ModelEntry {
    handle: NodeHandle,
    name: String,
    frame: RotationFrame,
    rest: Transform,
}

/// Builds the model and clips for an asset called `asset_name`.
pub fn convert(doc: &FbxDocument, asset_name: &str) -> Result<ModelAsset, FbxError> {
    let graph = Graph::build(doc)?;
    let mut model = Model::new(asset_name);

    let morph_channels = collect_morph_targets(&graph);

    let mut entries: FxHashMap<i64, ModelEntry> = FxHashMap::default();
    for (id, object) in graph.of_kind("Model") {
        let props = properties70(object.node);
        let frame = rotation_frame(&props);
        let rest = Transform::from_trs(
            vec3_property(&props, "Lcl Translation", Vec3::ZERO),
            frame.compose(vec3_property(&props, "Lcl Rotation", Vec3::ZERO)),
            vec3_property(&props, "Lcl Scaling", Vec3::ONE),
        );

        let mut node = Node::new(object.name.clone()).with_transform(rest);
        node.is_mesh = object.class == "Mesh";
        if let Some(targets) = morph_channels.targets.get(&id) {
            node = node.with_morph_targets(MorphTargets::new(targets.iter().cloned()));
        }

        let handle = model.add_node(node);
        entries.insert(
            id,
            ModelEntry {
                handle,
                name: object.name.clone(),
                frame,
                rest,
            },
        );
    }

    for connection in &graph.connections {
        if connection.property.is_some() {
            continue;
        }
        if let (Some(child), Some(parent)) =
            (entries.get(&connection.child), entries.get(&connection.parent))
        {
            model.attach(child.handle, parent.handle);
        }
    }

    let mut animations = Vec::new();
    for (stack_id, stack) in graph.of_kind("AnimationStack") {
        let clip = convert_stack(&graph, stack_id, &stack.name, &entries, &morph_channels.channels);
        if clip.tracks.is_empty() {
            log::debug!("Animation stack `{}` drives nothing, skipped", stack.name);
            continue;
        }
        animations.push(Arc::new(clip));
    }

    log::info!(
        "Converted `{asset_name}`: {} nodes, {} clips",
        model.len(),
        animations.len()
    );

    Ok(ModelAsset { model, animations })
}

struct MorphLookup {
    /// Model id to `(channel name, default influence)` pairs.
    targets: FxHashMap<i64, Vec<(String, f32)>>,
    /// Channel id to the mesh node and target index it drives.
    channels: FxHashMap<i64, MorphChannel>,
}

/// Walks mesh model <- geometry <- BlendShape <- BlendShapeChannel links.
fn collect_morph_targets(graph: &Graph<'_>) -> MorphLookup {
    let mut lookup = MorphLookup {
        targets: FxHashMap::default(),
        channels: FxHashMap::default(),
    };

    for (model_id, model) in graph.of_kind("Model") {
        if model.class != "Mesh" {
            continue;
        }
        let mut targets: Vec<(String, f32)> = Vec::new();

        let geometries = graph
            .children_of(model_id)
            .filter(|c| graph.get(c.child).is_some_and(|o| o.kind() == "Geometry"));
        for geometry in geometries {
            let blend_shapes = graph.children_of(geometry.child).filter(|c| {
                graph
                    .get(c.child)
                    .is_some_and(|o| o.kind() == "Deformer" && o.class == "BlendShape")
            });
            for blend_shape in blend_shapes {
                for link in graph.children_of(blend_shape.child) {
                    let Some(channel) = graph
                        .get(link.child)
                        .filter(|o| o.kind() == "Deformer" && o.class == "BlendShapeChannel")
                    else {
                        continue;
                    };
                    let percent = scalar_property(&properties70(channel.node), "DeformPercent")
                        .or_else(|| {
                            channel
                                .node
                                .child("DeformPercent")
                                .and_then(|n| n.prop(0))
                                .and_then(Property::as_f64)
                        })
                        .unwrap_or(0.0);

                    lookup.channels.insert(
                        link.child,
                        MorphChannel {
                            mesh_name: model.name.clone(),
                            index: targets.len(),
                        },
                    );
                    targets.push((channel.name.clone(), (percent / 100.0) as f32));
                }
            }
        }

        if !targets.is_empty() {
            lookup.targets.insert(model_id, targets);
        }
    }

    lookup
}

fn curve_channels(graph: &Graph<'_>, curve_node_id: i64, curve_node: &FbxNode) -> CurveChannels {
    let defaults = properties70(curve_node)
        .into_iter()
        .filter(|(name, _)| name.starts_with("d|"))
        .filter_map(|(name, values)| {
            let v = values.first().and_then(Property::as_f64)?;
            Some((name.to_string(), v as f32))
        })
        .collect();

    let mut curves = FxHashMap::default();
    for link in graph.children_of(curve_node_id) {
        let (Some(property), Some(curve)) = (&link.property, graph.get(link.child)) else {
            continue;
        };
        if curve.kind() != "AnimationCurve" {
            continue;
        }
        if let Some(parsed) = Curve::from_node(curve.node) {
            curves.insert(property.clone(), parsed);
        }
    }

    CurveChannels { curves, defaults }
}

fn convert_stack(
    graph: &Graph<'_>,
    stack_id: i64,
    stack_name: &str,
    models: &FxHashMap<i64, ModelEntry>,
    morph_channels: &FxHashMap<i64, MorphChannel>,
) -> AnimationClip {
    let mut tracks = Vec::new();
    let mut seen: FxHashSet<(String, TrackTarget)> = FxHashSet::default();

    let layers = graph
        .children_of(stack_id)
        .filter(|c| graph.get(c.child).is_some_and(|o| o.kind() == "AnimationLayer"));

    for layer in layers {
        for link in graph.children_of(layer.child) {
            let Some(curve_node) = graph
                .get(link.child)
                .filter(|o| o.kind() == "AnimationCurveNode")
            else {
                continue;
            };
            let channels = curve_channels(graph, link.child, curve_node.node);

            for target_link in graph.parents_of(link.child) {
                let Some(property) = target_link.property.as_deref() else {
                    continue;
                };
                let track = if let Some(entry) = models.get(&target_link.parent) {
                    model_track(entry, property, &channels)
                } else if let Some(channel) = morph_channels.get(&target_link.parent) {
                    morph_track(channel, property, &channels)
                } else {
                    None
                };

                let Some(track) = track else {
                    continue;
                };
                if seen.insert((track.node_name.clone(), track.target)) {
                    tracks.push(track);
                } else {
                    log::debug!(
                        "Duplicate {:?} track for `{}` in `{stack_name}` ignored",
                        track.target,
                        track.node_name
                    );
                }
            }
        }
    }

    AnimationClip::new(stack_name, tracks)
}

fn model_track(entry: &ModelEntry, property: &str, channels: &CurveChannels) -> Option<Track> {
    let (target, data) = match property {
        "Lcl Translation" => {
            let (times, values) = channels.vector(entry.rest.position)?;
            (
                TrackTarget::Translation,
                TrackData::Vector3(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
            )
        }
        "Lcl Scaling" => {
            let (times, values) = channels.vector(entry.rest.scale)?;
            (
                TrackTarget::Scale,
                TrackData::Vector3(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
            )
        }
        "Lcl Rotation" => {
            let (times, eulers) = channels.vector(Vec3::ZERO)?;
            let mut values: Vec<Quat> = Vec::with_capacity(eulers.len());
            for euler in eulers {
                let mut q = entry.frame.compose(euler);
                // Keep consecutive keys in the same hemisphere so slerp takes the short way.
                if values.last().is_some_and(|prev| prev.dot(q) < 0.0) {
                    q = -q;
                }
                values.push(q);
            }
            (
                TrackTarget::Rotation,
                TrackData::Quaternion(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
            )
        }
        other => {
            log::debug!("Unsupported animated property `{other}` on `{}`", entry.name);
            return None;
        }
    };

    Some(Track {
        node_name: entry.name.clone(),
        target,
        data,
    })
}

fn morph_track(channel: &MorphChannel, property: &str, channels: &CurveChannels) -> Option<Track> {
    if property != "DeformPercent" {
        return None;
    }
    let curve = channels.curves.get("d|DeformPercent")?;
    let values = curve.values.iter().map(|v| v / 100.0).collect();

    Some(Track {
        node_name: channel.mesh_name.clone(),
        target: TrackTarget::MorphInfluence(channel.index),
        data: TrackData::Scalar(KeyframeTrack::new(
            curve.times.clone(),
            values,
            InterpolationMode::Linear,
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_quat(a: Quat, b: Quat) -> bool {
        a.dot(b).abs() > 1.0 - 1e-5
    }

    #[test]
    fn xyz_order_applies_x_first() {
        let degrees = Vec3::new(90.0, 90.0, 0.0);
        let expected = Quat::from_rotation_y(90_f32.to_radians()) * Quat::from_rotation_x(90_f32.to_radians());
        assert!(approx_quat(euler_degrees_to_quat(degrees, ROTATION_ORDERS[0]), expected));
    }

    #[test]
    fn object_names_drop_class_suffix() {
        assert_eq!(object_name("Hips\u{0}\u{1}Model"), "Hips");
        assert_eq!(object_name("Plain"), "Plain");
    }

    #[test]
    fn curve_sampling_clamps_and_interpolates() {
        let curve = Curve {
            times: vec![0.0, 1.0],
            values: vec![0.0, 10.0],
        };
        assert_eq!(curve.sample(-1.0), 0.0);
        assert!((curve.sample(0.25) - 2.5).abs() < 1e-5);
        assert_eq!(curve.sample(2.0), 10.0);
    }
}
