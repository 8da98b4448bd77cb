//! Test suites for the daemon life-cycle core.

pub(crate) mod support;
