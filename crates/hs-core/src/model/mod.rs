//! In-memory HMM specification model.
//!
//! The tree is the single source of truth: serialization and rendering are
//! projections of it.
//!
//! ```text
//! Specification
//! ├── StateRegistry ── State ── ComponentBuilder ── Component ── DistributionSpec
//! ├── InitialVectorBuilder        (one slot per state)
//! └── TransitionMatrixBuilder     (one row per state)
//! ```

pub mod component;
pub mod distribution;
pub mod initial;
pub mod probability;
pub mod specification;
pub mod state;
pub mod transition;

pub use component::{Component, ComponentBuilder, EmissionMode};
pub use distribution::{Axis, DistributionKind, DistributionSpec, NormalParams, ParamField, UniformParams};
pub use initial::InitialVectorBuilder;
pub use probability::{ProbabilityVector, VectorStatus};
pub use specification::{Rules, Specification};
pub use state::{State, StateRegistry};
pub use transition::TransitionMatrixBuilder;
