//! Frame-to-frame change analysis.
//!
//! This module compares consecutive luminance grids and decides whether
//! the change amounts to motion. All functions here are pure.

mod diff;
mod motion;

pub use diff::{count_exceeding, diff, DiffGrid};
pub use motion::{MotionDecision, MotionRule};
