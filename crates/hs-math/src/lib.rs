//! hmmspec math utilities.

pub mod math;

pub use math::entry::*;
pub use math::probability::*;
