//! Validator functions and utilities
//!
//! Small single-purpose checks used by the request validator.

pub mod string;

pub use string::*;
