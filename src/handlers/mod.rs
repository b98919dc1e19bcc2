//! HTTP handlers for mintwatch

mod health;

pub use health::*;
