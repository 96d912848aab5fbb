//! Shared types and error definitions for the local register allocator.
//!
//! This crate has no allocation logic of its own; it exists so the
//! `lra-isa` and `lra-core` crates can share identifiers and a single
//! error enum without depending on each other.

pub mod error;
pub mod ids;

pub use error::AllocError;
pub use ids::{HReg, RegisterFile, VReg};
