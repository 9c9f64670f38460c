//! Stage setup shared by every showcase variant.
//!
//! The showcase does not render; it describes the stage (camera, lights,
//! ground, grid, fog) as data so the host renderer can build it. Colors are
//! `0xRRGGBB` values.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSetup {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Orbit target the camera looks at.
    pub target: Vec3,
    #[serde(skip, default = "default_aspect")]
    pub aspect: f32,
}

fn default_aspect() -> f32 {
    1.0
}

impl CameraSetup {
    /// Updates the aspect ratio after a viewport resize. Zero-sized viewports are ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HemisphereLightSetup {
    pub sky_color: u32,
    pub ground_color: u32,
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowBounds {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLightSetup {
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
    pub cast_shadow: bool,
    pub shadow_bounds: ShadowBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FogSetup {
    pub color: u32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSetup {
    pub size: f32,
    pub color: u32,
    pub receive_shadow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSetup {
    pub size: f32,
    pub divisions: u32,
    pub color: u32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub background: u32,
    pub fog: Option<FogSetup>,
    pub camera: CameraSetup,
    pub hemisphere_light: HemisphereLightSetup,
    pub directional_light: DirectionalLightSetup,
    pub ground: GroundSetup,
    pub grid: GridSetup,
    pub shadows_enabled: bool,
}

impl StageConfig {
    /// The fog-less stage.
    #[must_use]
    pub fn studio() -> Self {
        Self {
            background: 0x00a0_a0a0,
            fog: None,
            camera: CameraSetup {
                fov_degrees: 45.0,
                near: 1.0,
                far: 2000.0,
                position: Vec3::new(100.0, 200.0, 300.0),
                target: Vec3::new(0.0, 100.0, 0.0),
                aspect: 1.0,
            },
            hemisphere_light: HemisphereLightSetup {
                sky_color: 0x00ff_ffff,
                ground_color: 0x0044_4444,
                intensity: 5.0,
                position: Vec3::new(0.0, 200.0, 0.0),
            },
            directional_light: DirectionalLightSetup {
                color: 0x00ff_ffff,
                intensity: 5.0,
                position: Vec3::new(0.0, 200.0, 100.0),
                cast_shadow: true,
                shadow_bounds: ShadowBounds {
                    top: 180.0,
                    bottom: -100.0,
                    left: -120.0,
                    right: 120.0,
                },
            },
            ground: GroundSetup {
                size: 2000.0,
                color: 0x0099_9999,
                receive_shadow: true,
            },
            grid: GridSetup {
                size: 2000.0,
                divisions: 20,
                color: 0x0000_0000,
                opacity: 0.2,
            },
            shadows_enabled: true,
        }
    }

    /// The studio stage with distance fog matching the background.
    #[must_use]
    pub fn studio_with_fog() -> Self {
        let mut stage = Self::studio();
        stage.fog = Some(FogSetup {
            color: stage.background,
            near: 200.0,
            far: 1000.0,
        });
        stage
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self::studio()
    }
}
