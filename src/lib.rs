//! # rapid-path
//!
//! Turns a planned robot path into a ready-to-run ABB RAPID program module.
//!
//! The planner hands over joint-space [`TrajectoryPt`]s grouped into typed
//! [`TrajectorySegment`]s (approach, process, traverse) together with a
//! [`ProcessParams`] bundle. [`emit_rapid_file`] writes the program into any
//! [`std::io::Write`] sink, numbering joint targets across the whole path and
//! switching the process output around each run of working segments.
//! [`emit_joint_trajectory_file`] covers the simpler case of a flat point list.
//!
//! Output is deterministic: the same inputs always produce the same bytes.

pub mod emitter;
pub mod error;
pub mod params;
pub mod trajectory;

pub use emitter::*;
pub use error::*;
pub use params::*;
pub use trajectory::*;
