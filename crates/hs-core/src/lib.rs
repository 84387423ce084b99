//! hmmspec core library
//!
//! This library provides the HMM specification builder:
//! - The in-memory model (states, emissions, probability vectors)
//! - Editing sessions and the command script language
//! - Wire-format serialization and decoding
//! - Configuration loading, logging and exit codes for the CLI
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod model;
pub mod render;
pub mod serialize;
pub mod session;
pub mod wire;

pub use model::Specification;
pub use serialize::{serialize, SpecSerializer, WireMap};
pub use session::{Command, EditSession};
pub use wire::{decode, HmmForm};
