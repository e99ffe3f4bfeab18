//! Per-kind units of work the coordinator fans out.
//!
//! Kernels know nothing about fan-out or metrics.
pub mod cpu;
pub mod io;
pub mod memory;
