//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step/cubic interpolation and the sequential cursor
//! - AnimationAction loop modes (Once, Loop, PingPong) and chained setters
//! - AnimationClip duration auto-computation
//! - AnimationMixer weighted blending, rest-pose fill and restore
//! - Binder name resolution

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec3};

use motion_showcase::animation::{
    AnimationAction, AnimationClip, AnimationMixer, Binder, InterpolationMode, KeyframeCursor,
    KeyframeTrack, LoopMode, Track, TrackData, TrackTarget,
};
use motion_showcase::scene::{Model, MorphTargets, Node, Transform};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_loose(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn vec_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

fn translation_clip(name: &str, node: &str, from: Vec3, to: Vec3, duration: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name,
        vec![Track {
            node_name: node.to_string(),
            target: TrackTarget::Translation,
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, duration],
                vec![from, to],
                InterpolationMode::Linear,
            )),
        }],
    ))
}

fn rig() -> Model {
    let mut model = Model::new("rig");
    let hips = model.add_node(Node::new("Hips").with_transform(Transform::from_trs(
        Vec3::new(0.0, 100.0, 0.0),
        Quat::IDENTITY,
        Vec3::ONE,
    )));
    let spine = model.add_node(Node::new("Spine"));
    model.attach(spine, hips);
    model.add_node(
        Node::new("Body").with_morph_targets(MorphTargets::new([("Smile".to_string(), 0.2)])),
    );
    model
}

fn hips_position(model: &Model) -> Vec3 {
    let hips = model.find_by_name("Hips").unwrap();
    model.node(hips).unwrap().transform.position
}

// ============================================================================
// KeyframeTrack
// ============================================================================

#[test]
fn track_linear_f32_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 10.0], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(0.5, &mut cursor).unwrap();
    assert!(approx(val, 5.0), "Expected 5.0, got {val}");
}

#[test]
fn track_linear_clamps_beyond_range() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![3.0_f32, 7.0], InterpolationMode::Linear);
    assert!(approx(track.sample(0.0).unwrap(), 3.0));
    assert!(approx(track.sample(5.0).unwrap(), 7.0));
}

#[test]
fn track_step_holds_previous_key() {
    let track = KeyframeTrack::new(vec![0.0, 1.0, 2.0], vec![1.0_f32, 2.0, 3.0], InterpolationMode::Step);
    assert!(approx(track.sample(0.99).unwrap(), 1.0));
    assert!(approx(track.sample(1.5).unwrap(), 2.0));
}

#[test]
fn track_cubic_hits_keyframes() {
    // [in_tangent, value, out_tangent] per key
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 0.0, 1.0, 1.0, 10.0, 0.0],
        InterpolationMode::CubicSpline,
    );
    assert!(approx(track.sample(0.0).unwrap(), 0.0));
    assert!(approx(track.sample(1.0).unwrap(), 10.0));
}

#[test]
fn cursor_matches_stateless_sampling() {
    let times: Vec<f32> = (0..100).map(|i| i as f32 * 0.1).collect();
    let values: Vec<f32> = (0..100).map(|i| (i * i) as f32).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    for t in [0.05, 0.33, 0.34, 7.2, 1.1, 9.85, 0.0, 4.44] {
        let a = track.sample_with_cursor(t, &mut cursor).unwrap();
        let b = track.sample(t).unwrap();
        assert!((a - b).abs() < 1e-3, "t={t}: cursor {a} vs stateless {b}");
    }
}

#[test]
fn empty_track_samples_nothing() {
    let track: KeyframeTrack<f32> = KeyframeTrack::new(Vec::new(), Vec::new(), InterpolationMode::Linear);
    assert!(track.sample(0.5).is_none());
    assert!(track.is_empty());
}

#[test]
fn quaternion_track_slerps() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Quat::IDENTITY, Quat::from_rotation_y(FRAC_PI_2)],
        InterpolationMode::Linear,
    );
    let mid = track.sample(0.5).unwrap();
    assert!(mid.dot(Quat::from_rotation_y(FRAC_PI_2 / 2.0)).abs() > 1.0 - 1e-5);
}

// ============================================================================
// AnimationClip / AnimationAction
// ============================================================================

#[test]
fn clip_duration_is_last_key() {
    let clip = translation_clip("walk", "Hips", Vec3::ZERO, Vec3::X, 2.5);
    assert!(approx(clip.duration, 2.5));
    assert_eq!(AnimationClip::new("empty", Vec::new()).duration, 0.0);
}

#[test]
fn action_loop_wraps() {
    let clip = translation_clip("walk", "Hips", Vec3::ZERO, Vec3::X, 2.0);
    let mut action = AnimationAction::new(clip);
    action.play();
    action.update(2.5);
    assert!(approx(action.time, 0.5), "time = {}", action.time);
}

#[test]
fn action_once_clamps_and_pauses() {
    let clip = translation_clip("fall", "Hips", Vec3::ZERO, Vec3::X, 1.0);
    let mut action = AnimationAction::new(clip);
    action.loop_mode = LoopMode::Once;
    action.play();
    action.update(1.5);
    assert!(approx(action.time, 1.0));
    assert!(action.paused);
    assert!(!action.is_running());
}

#[test]
fn action_ping_pong_plays_back_and_forth_frame_by_frame() {
    let clip = translation_clip("sway", "Hips", Vec3::ZERO, Vec3::X, 1.0);
    let mut action = AnimationAction::new(clip);
    action.loop_mode = LoopMode::PingPong;
    action.play();

    let mut times = Vec::new();
    for _ in 0..15 {
        action.update(0.1);
        times.push(action.time);
    }

    // Forward to the end, then back down.
    assert!(approx_loose(times[9], 1.0), "{times:?}");
    assert!(approx_loose(times[11], 0.8), "{times:?}");
    assert!(approx_loose(times[14], 0.5), "{times:?}");
    assert!(action.is_reversed());
    assert!(times[10..].windows(2).all(|w| w[1] < w[0]), "{times:?}");

    for _ in 0..7 {
        action.update(0.1);
    }
    // Bounced off zero and heading forward again.
    assert!(approx_loose(action.time, 0.2), "time = {}", action.time);
    assert!(!action.is_reversed());
}

#[test]
fn action_ping_pong_large_step_reflects() {
    let clip = translation_clip("sway", "Hips", Vec3::ZERO, Vec3::X, 1.0);
    let mut action = AnimationAction::new(clip);
    action.loop_mode = LoopMode::PingPong;
    action.play();
    action.update(1.25);
    assert!(approx(action.time, 0.75), "time = {}", action.time);
    assert!(action.is_reversed());

    action.reset();
    assert_eq!(action.time, 0.0);
    assert!(!action.is_reversed());
}

#[test]
fn chained_setters_configure_action() {
    let clip = translation_clip("walk", "Hips", Vec3::ZERO, Vec3::X, 1.0);
    let mut action = AnimationAction::new(clip);
    action.time = 0.7;
    action
        .reset()
        .set_effective_time_scale(2.0)
        .set_effective_weight(1.5)
        .play();
    assert_eq!(action.time, 0.0);
    assert_eq!(action.time_scale, 2.0);
    assert_eq!(action.weight, 1.0, "weight is clamped to [0, 1]");
    assert!(action.is_running());

    action.stop();
    assert!(!action.is_running());
}

#[test]
fn stopped_action_does_not_advance() {
    let clip = translation_clip("walk", "Hips", Vec3::ZERO, Vec3::X, 1.0);
    let mut action = AnimationAction::new(clip);
    action.update(0.5);
    assert_eq!(action.time, 0.0);
}

// ============================================================================
// Binder
// ============================================================================

#[test]
fn binder_skips_missing_nodes_and_morph_indices() {
    let model = rig();
    let clip = AnimationClip::new(
        "mixed",
        vec![
            Track {
                node_name: "Hips".into(),
                target: TrackTarget::Translation,
                data: TrackData::Vector3(KeyframeTrack::new(vec![0.0], vec![Vec3::ZERO], InterpolationMode::Linear)),
            },
            Track {
                node_name: "Tail".into(),
                target: TrackTarget::Translation,
                data: TrackData::Vector3(KeyframeTrack::new(vec![0.0], vec![Vec3::ZERO], InterpolationMode::Linear)),
            },
            Track {
                node_name: "Body".into(),
                target: TrackTarget::MorphInfluence(3),
                data: TrackData::Scalar(KeyframeTrack::new(vec![0.0], vec![1.0], InterpolationMode::Linear)),
            },
        ],
    );
    let bindings = Binder::bind(&model, &clip);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].track_index, 0);
    assert_eq!(bindings[0].node, model.find_by_name("Hips").unwrap());
}

// ============================================================================
// AnimationMixer
// ============================================================================

#[test]
fn mixer_reuses_action_per_clip() {
    let model = rig();
    let clip = translation_clip("walk", "Hips", Vec3::ZERO, Vec3::X, 1.0);
    let mut mixer = AnimationMixer::new();
    let a = mixer.clip_action(&clip, &model);
    let b = mixer.clip_action(&clip, &model);
    assert_eq!(a, b);
    assert_eq!(mixer.existing_action(&clip), Some(a));
    assert_eq!(mixer.actions().count(), 1);
}

#[test]
fn mixer_applies_single_action() {
    let mut model = rig();
    let clip = translation_clip("walk", "Hips", Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 1.0);
    let mut mixer = AnimationMixer::new();
    let handle = mixer.clip_action(&clip, &model);
    mixer.action_mut(handle).unwrap().play();

    mixer.update(0.5, &mut model);
    assert!(vec_approx(hips_position(&model), Vec3::new(5.0, 0.0, 0.0)));
}

#[test]
fn mixer_blends_by_weight() {
    let mut model = rig();
    let left = translation_clip("left", "Hips", Vec3::ZERO, Vec3::ZERO, 1.0);
    let right = translation_clip("right", "Hips", Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0), 1.0);

    let mut mixer = AnimationMixer::new();
    let a = mixer.clip_action(&left, &model);
    let b = mixer.clip_action(&right, &model);
    mixer.action_mut(a).unwrap().set_effective_weight(0.75).play();
    mixer.action_mut(b).unwrap().set_effective_weight(0.25).play();

    mixer.update(0.1, &mut model);
    assert!(vec_approx(hips_position(&model), Vec3::new(2.5, 0.0, 0.0)), "{}", hips_position(&model));
}

#[test]
fn partial_weight_mixes_with_rest_pose() {
    let mut model = rig();
    let clip = translation_clip("up", "Hips", Vec3::new(0.0, 200.0, 0.0), Vec3::new(0.0, 200.0, 0.0), 1.0);
    let mut mixer = AnimationMixer::new();
    let handle = mixer.clip_action(&clip, &model);
    mixer.action_mut(handle).unwrap().set_effective_weight(0.5).play();

    mixer.update(0.1, &mut model);
    // rest y = 100, clip y = 200
    assert!(vec_approx(hips_position(&model), Vec3::new(0.0, 150.0, 0.0)));
}

#[test]
fn undriven_properties_return_to_rest() {
    let mut model = rig();
    let clip = translation_clip("walk", "Hips", Vec3::ZERO, Vec3::X, 1.0);
    let mut mixer = AnimationMixer::new();
    let handle = mixer.clip_action(&clip, &model);
    mixer.action_mut(handle).unwrap().play();
    mixer.update(0.5, &mut model);
    assert!(approx(hips_position(&model).y, 0.0));

    mixer.action_mut(handle).unwrap().stop();
    mixer.update(0.1, &mut model);
    assert!(vec_approx(hips_position(&model), Vec3::new(0.0, 100.0, 0.0)));
}

#[test]
fn stop_all_except_keeps_listed_actions() {
    let model = rig();
    let a_clip = translation_clip("a", "Hips", Vec3::ZERO, Vec3::X, 1.0);
    let b_clip = translation_clip("b", "Hips", Vec3::ZERO, Vec3::Y, 1.0);
    let mut mixer = AnimationMixer::new();
    let a = mixer.clip_action(&a_clip, &model);
    let b = mixer.clip_action(&b_clip, &model);
    mixer.action_mut(a).unwrap().play();
    mixer.action_mut(b).unwrap().play();

    mixer.stop_all_except(&[b]);
    assert!(!mixer.action(a).unwrap().is_running());
    assert!(mixer.action(b).unwrap().is_running());
}

#[test]
fn morph_influence_blends_from_default() {
    let mut model = rig();
    let clip = Arc::new(AnimationClip::new(
        "smile",
        vec![Track {
            node_name: "Body".into(),
            target: TrackTarget::MorphInfluence(0),
            data: TrackData::Scalar(KeyframeTrack::new(vec![0.0, 1.0], vec![1.0, 1.0], InterpolationMode::Linear)),
        }],
    ));
    let mut mixer = AnimationMixer::new();
    let handle = mixer.clip_action(&clip, &model);
    mixer.action_mut(handle).unwrap().set_effective_weight(0.5).play();
    mixer.update(0.1, &mut model);

    let body = model.find_by_name("Body").unwrap();
    let influence = model.node(body).unwrap().morph.as_ref().unwrap().influence(0).unwrap();
    // default 0.2, clip 1.0, weight 0.5
    assert!(approx(influence, 0.6), "influence = {influence}");
}
