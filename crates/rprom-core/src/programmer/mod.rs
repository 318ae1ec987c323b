//! Programmer traits and abstractions
//!
//! This module defines the transport seam that every programmer backend
//! implements so the protocol layers can drive it.

mod traits;

pub use traits::*;
