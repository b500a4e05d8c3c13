use crate::device::{AdrenoSeries, DeviceInfo, GpuVendor, MaliSeries};

/// Workgroup shape of the reduction kernel. The x/y extent is the spatial
/// lane grid; z stays 1 because the third dispatch axis indexes
/// (slice, batch) pairs rather than local work. `x * y` must be divisible
/// by 4 for the vectorized fan-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupShape {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GroupShape {
    pub fn new(x: u32, y: u32) -> Self {
        debug_assert!(x > 0 && y > 0);
        debug_assert_eq!((x * y) % 4, 0);
        Self { x, y, z: 1 }
    }

    pub fn area(&self) -> u32 {
        self.x * self.y
    }
}

/// Per-vendor workgroup shapes for the spatial-mean reduction. First match
/// wins; anything unrecognized takes the 16x16 default.
pub fn select_workgroup_size(device: &DeviceInfo) -> GroupShape {
    match device.vendor {
        GpuVendor::Adreno(AdrenoSeries::Adreno3xx) => GroupShape::new(16, 8),
        GpuVendor::Mali(MaliSeries::T6xx | MaliSeries::T7xx | MaliSeries::T8xx) => {
            GroupShape::new(8, 4)
        }
        GpuVendor::Mali(MaliSeries::Other) => GroupShape::new(8, 8),
        GpuVendor::Adreno(AdrenoSeries::Other) | GpuVendor::Other => GroupShape::new(16, 16),
    }
}
