//! Concrete implementations of the outbound ports, the stores and clocks
//! the domain reaches out to.

pub mod memory;

#[cfg(feature = "mock")]
pub mod mock;

pub mod snapshot_file;

pub mod time;
