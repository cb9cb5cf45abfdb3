//! Test runner integration
//!
//! This module parses the runner's event stream and drives the reporters
//! from it, either from any line source or from a spawned runner process.

pub mod event;
pub mod session;
