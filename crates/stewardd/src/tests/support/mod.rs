//! Test harness utilities for the life-cycle suites.

mod listener;
mod rig;

pub use listener::{ListenerEvent, RecordingListener};
pub use rig::{RigOptions, TestRig, join, wait_until};
