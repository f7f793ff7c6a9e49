//! Error type and the inner convex solver used by the path.

mod proximal;
mod traits;

pub use proximal::SimpleProblem;
pub use traits::PathError;
