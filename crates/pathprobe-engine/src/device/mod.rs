//! GPU device management.
//!
//! This module is responsible for:
//! - creating (or adopting) the wgpu Adapter/Device/Queue
//! - bounded, blocking buffer readback

mod context;
mod init;

pub use context::Gpu;
pub use init::GpuInit;
