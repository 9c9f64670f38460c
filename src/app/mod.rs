//! Application layer: the showcase controller and its UI state.
//!
//! - [`Showcase`]: selection, loading, switching and per-frame update
//! - [`ShowcaseConfig`]: presets and JSON settings
//! - [`ControlPanel`] / [`Overlay`]: widget and on-screen text state for a host GUI
//! - [`input`]: digit-key shortcuts (plus a winit adapter behind the `winit` feature)

pub mod input;
#[cfg(feature = "winit")]
pub mod input_adapter;
pub mod overlay;
pub mod panel;
pub mod settings;
pub mod showcase;

pub use input::{Key, animation_index_for_key};
pub use overlay::{LoadingNotice, Notice, NoticeKind, Overlay};
pub use panel::{ControlPanel, Dropdown, MorphFolder, Slider, TransitionFolder};
pub use settings::{ShowcaseConfig, SwitchMode, TransitionSettings};
pub use showcase::{CurrentAction, Displayed, Showcase};
