//! Robot Viewer Component
//!
//! A reusable viewer that maintains a live 3D scene of an articulated robot
//! and reacts to changing inputs without rebuilding the scene on every
//! change:
//!
//! - [`RobotViewer`]: the component surface — load a model source, set the
//!   up axis, mutate joint angles, start/stop rendering
//! - request versioning: overlapping loads are superseded by generation
//!   token; stale results are disposed and never touch the scene
//! - [`aggregator::MeshLoadAggregator`]: aggregates independently-completing
//!   mesh loads into a single geometry-loaded notification per generation
//! - [`render_loop::RenderLoop`]: redraws only when the scene is dirty,
//!   with a guarded start and idempotent stop
//!
//! Rendering itself lives behind [`render_loop::RenderSurface`]; description
//! parsing and mesh decoding behind the `rv-model` boundary traits.

pub mod aggregator;
pub mod config;
pub mod events;
pub mod render_loop;
pub mod robot;
pub mod viewer;

pub use aggregator::MeshLoadAggregator;
pub use config::ViewerConfig;
pub use events::ViewerEvent;
pub use render_loop::{RenderLoop, RenderSurface};
pub use robot::{JointState, RobotModel};
pub use viewer::{LoadOutcome, RobotViewer, ViewerError};
