//! The spatial-mean operation: fixed WGSL source and workgroup shape at
//! construction, per-dispatch coefficient binding and launch geometry.

use anyhow::Result;
use meanop_api::{ArgumentsBinder, OperationDef, TensorShape};

use crate::device::DeviceInfo;
use crate::dispatch::{mean_grid, LaunchGeometry};
use crate::shaders::mean::build_mean_shader;
use crate::workgroup::{select_workgroup_size, GroupShape};

/// Reduces the W x H spatial extent of the source tensor to a single vec4
/// per (channel-group, batch) pair; the destination has spatial extent 1x1.
pub struct MeanOp {
    workgroup_size: GroupShape,
    source: String,
}

impl MeanOp {
    pub fn new(def: &OperationDef, device: &DeviceInfo) -> Self {
        let workgroup_size = select_workgroup_size(device);
        let source = build_mean_shader(def, workgroup_size);
        log::debug!(
            "mean kernel: workgroup {}x{}x{}, {} bytes of WGSL",
            workgroup_size.x,
            workgroup_size.y,
            workgroup_size.z,
            source.len()
        );
        Self {
            workgroup_size,
            source,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn workgroup_size(&self) -> GroupShape {
        self.workgroup_size
    }

    /// Write the two mean coefficients for the current source shape.
    ///
    /// The split keeps intermediate magnitudes bounded: each lane's partial
    /// sum is scaled by `inv_multiplier_1 = area / (w*h)` before it reaches
    /// workgroup storage, and the folded total by `inv_multiplier_2 =
    /// 1 / area`, so the product divides by the pixel count exactly.
    pub fn bind_arguments(
        &self,
        args: &mut dyn ArgumentsBinder,
        src: &TensorShape,
    ) -> Result<()> {
        let total = f64::from(src.width) * f64::from(src.height);
        let size_0 = f64::from(self.workgroup_size.area());
        let size_1 = total / size_0;
        args.set_float("inv_multiplier_1", (1.0 / size_1) as f32)?;
        args.set_float("inv_multiplier_2", (1.0 / size_0) as f32)?;
        Ok(())
    }

    pub fn grid_size(&self, dst: &TensorShape) -> LaunchGeometry {
        mean_grid(self.workgroup_size, dst)
    }
}

pub fn create_mean(def: &OperationDef, device: &DeviceInfo) -> MeanOp {
    MeanOp::new(def, device)
}
