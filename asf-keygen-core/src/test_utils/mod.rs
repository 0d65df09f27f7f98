//! Test utilities for the provisioning pipeline
//!
//! Deterministic key bytes, a scripted entropy source and a config builder
//! pointed at temporary directories.

pub mod deterministic_rng;
pub mod fixtures;

pub use deterministic_rng::*;
pub use fixtures::*;
