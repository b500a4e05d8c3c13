//! Spatial-mean kernel generation for GPU tensor backends.
//!
//! Goals:
//! - Emit a race-free, barrier-synchronized WGSL reduction that collapses
//!   the W x H spatial extent of a 4D tensor to one vec4 per
//!   (channel-group, batch) pair.
//! - Pick the workgroup shape per GPU vendor/family, with a safe default
//!   for unrecognized hardware.
//! - Keep per-dispatch work (coefficient binding, launch geometry) pure
//!   functions of the live tensor shapes; only the source string and the
//!   workgroup shape are fixed at construction.
//!
//! Pipeline creation, buffer management, and queue submission stay with the
//! enclosing framework; see `meanop-api` for the seam.

pub mod device;
pub mod dispatch;
pub mod op;
pub mod shaders;
pub mod workgroup;


pub use device::{AdrenoSeries, DeviceInfo, GpuVendor, MaliSeries};
pub use dispatch::LaunchGeometry;
pub use op::{create_mean, MeanOp};
pub use workgroup::{select_workgroup_size, GroupShape};
