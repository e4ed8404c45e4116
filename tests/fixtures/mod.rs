//! Test fixtures for hos-planner.
//!
//! Provides:
//! - Named freight locations and synthetic route corridors
//! - Helpers that walk duty periods shift by shift

pub mod corridors;

pub use corridors::*;
