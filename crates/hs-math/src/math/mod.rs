//! Core math modules.

pub mod entry;
pub mod probability;
