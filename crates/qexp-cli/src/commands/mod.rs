//! CLI command implementations.

pub mod clifford;
pub mod common;
pub mod mitigate;
pub mod qv;
pub mod rb;
pub mod sample;
pub mod simulate;
pub mod version;
pub mod zne;
