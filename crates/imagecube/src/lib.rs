//! Image Cube
//!
//! Rotates between the child panels of a container as if they were the
//! faces of a turning cube.
//!
//! # Features
//!
//! - **Settings**: direction, timing, easing, shading and 3D tuning, loadable
//!   from TOML or JSON and patchable at runtime
//! - **Planner**: start/end/delta for every animated property, keeping the
//!   edges of the two moving panels coincident
//! - **Renderer**: linear 2D interpolation, or perspective strips in 3D mode
//! - **Manager**: attach/detach with exact style restoration, pause timers,
//!   forward/backward/random panel selection
//!
//! The widget never draws anything itself. It reads and writes styles
//! through a [`StyleSystem`](imagecube_surface::StyleSystem) and is driven
//! by [`ImageCube::tick`].
//!
//! # Example
//!
//! ```rust
//! use imagecube::{Direction, ImageCube, SettingsPatch};
//! use imagecube_surface::{Style, StyleSystem, SurfaceTree};
//!
//! let mut stage = SurfaceTree::new();
//! let container = stage.insert(Style::parse("width: 200px; height: 100px"));
//! let first = stage.insert_child(container, Style::new()).unwrap();
//! let second = stage.insert_child(container, Style::new()).unwrap();
//!
//! let mut cube = ImageCube::with_seed(7);
//! cube.attach(
//!     &mut stage,
//!     container,
//!     SettingsPatch::new().direction(Direction::Left).speed(400).pause(1000),
//! );
//! assert_eq!(cube.current(container), Some(first));
//!
//! // Pause, then the full rotation
//! cube.tick(&mut stage, 1000.0);
//! cube.tick(&mut stage, 400.0);
//! assert_eq!(cube.current(container), Some(second));
//! assert!(!stage.is_visible(first));
//! ```

pub mod command;
pub mod error;
pub mod full3d;
pub mod manager;
pub mod plan;
pub mod render;
pub mod selection;
pub mod settings;

pub use command::Command;
pub use error::{CubeError, Result};
pub use manager::{ImageCube, Phase, RotateCallback, MARKER_CLASS};
pub use plan::{AnimatedValue, SurfacePlan, SurfaceRole, TransitionPlan};
pub use settings::{
    Cardinal, Direction, Patch, RotateEvent, RotateHook, Selection, Settings, SettingsPatch,
};
