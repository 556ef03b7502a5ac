//! Host memory for the adder run.

pub mod host_buffers;

pub use host_buffers::HostBuffers;
