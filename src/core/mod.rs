//! Core types for regularization paths.

mod link;
mod options;
mod result;
mod shape;

pub use link::Link;
pub use options::{
    NonConvergencePolicy, OptionsError, PathOptions, PathOptionsBuilder, SolveOptions,
};
pub use result::{PathResult, PathStep, StepStatus};
pub use shape::Shape;
