use glam::{Quat, Vec3};
use uuid::Uuid;

use crate::animation::binding::TrackTarget;
use crate::animation::tracks::KeyframeTrack;

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
    Scalar(KeyframeTrack<f32>),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(track) => track.end_time(),
            TrackData::Quaternion(track) => track.end_time(),
            TrackData::Scalar(track) => track.end_time(),
        }
    }
}

/// A keyframe track plus the node property it drives.
#[derive(Debug, Clone)]
pub struct Track {
    pub node_name: String,
    pub target: TrackTarget,
    pub data: TrackData,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Identity used by mixers to deduplicate actions.
    pub id: Uuid,
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip whose duration is the latest keyframe time of any track.
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration,
            tracks,
        }
    }
}
