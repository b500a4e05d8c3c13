use meanop_api::TensorShape;

use crate::workgroup::GroupShape;

/// Global dispatch extent of one kernel invocation. For the mean reduction
/// the x/y extent equals the workgroup itself (one group performs the whole
/// spatial reduction) and z fans out over (slice, batch) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchGeometry {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl LaunchGeometry {
    /// Workgroup counts for `dispatch_workgroups`-style APIs.
    pub fn workgroup_count(&self, wg: GroupShape) -> (u32, u32, u32) {
        (
            dispatch_size(self.x, wg.x),
            dispatch_size(self.y, wg.y),
            dispatch_size(self.z, wg.z),
        )
    }
}

pub fn mean_grid(wg: GroupShape, dst: &TensorShape) -> LaunchGeometry {
    LaunchGeometry {
        x: wg.x,
        y: wg.y,
        z: dst.slices * dst.batch,
    }
}

pub fn dispatch_size(elements: u32, workgroup: u32) -> u32 {
    if elements == 0 {
        0
    } else {
        ((elements + workgroup - 1) / workgroup).max(1)
    }
}
