//! Collaborator surface consumed by the `meanop` kernel-generation core.
//!
//! The core emits WGSL and computes launch parameters; everything that
//! touches real device state lives behind the types and traits here:
//! tensor descriptors and live shapes, the precision mode, the named-scalar
//! argument set the host writes coefficients into, and the `Pod` uniform
//! mirror for frameworks that bind the parameter block directly.

use anyhow::{anyhow, Result};
use bytemuck::{Pod, Zeroable};

/// Storage precision of the destination tensor. Accumulation inside the
/// generated kernel is always f32; `F16` only changes the type of the
/// final converted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    F32,
    F16,
}

/// Axis layout of a tensor. `Bhwc` carries an explicit batch axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    Hwc,
    Bhwc,
}

impl TensorLayout {
    pub fn has_batch_axis(self) -> bool {
        matches!(self, TensorLayout::Bhwc)
    }
}

/// Static description of a tensor operand, fixed at operation construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorDescriptor {
    pub layout: TensorLayout,
}

impl TensorDescriptor {
    pub fn new(layout: TensorLayout) -> Self {
        Self { layout }
    }
}

/// Live tensor dimensions, re-read on every dispatch. `slices` counts
/// channel groups of 4; `batch` is 1 when the layout has no batch axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorShape {
    pub width: u32,
    pub height: u32,
    pub slices: u32,
    pub batch: u32,
}

impl TensorShape {
    pub fn new(width: u32, height: u32, slices: u32, batch: u32) -> Self {
        Self {
            width,
            height,
            slices,
            batch,
        }
    }

    pub fn hw(width: u32, height: u32) -> Self {
        Self::new(width, height, 1, 1)
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Immutable definition of one operation instance: the precision mode and
/// the source/destination operand descriptors.
#[derive(Debug, Clone, Copy)]
pub struct OperationDef {
    pub precision: Precision,
    pub src: TensorDescriptor,
    pub dst: TensorDescriptor,
}

impl OperationDef {
    pub fn new(precision: Precision, src: TensorDescriptor, dst: TensorDescriptor) -> Self {
        Self {
            precision,
            src,
            dst,
        }
    }
}

/// Named-scalar argument set of a compiled kernel. The enclosing framework
/// maps names to uniform-buffer offsets; assignment to an undeclared name
/// is the one failure mode this layer surfaces.
pub trait ArgumentsBinder {
    fn set_float(&mut self, name: &str, value: f32) -> Result<()>;
}

/// Plain argument set backed by a declared-name table. Frameworks copy the
/// values into the kernel's uniform block before dispatch; tests use it to
/// observe exactly what the host bound.
#[derive(Debug, Default, Clone)]
pub struct FloatArgs {
    values: Vec<(String, f32)>,
}

impl FloatArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a float argument by name, initialised to zero.
    pub fn declare(&mut self, name: &str) {
        if !self.values.iter().any(|(n, _)| n == name) {
            self.values.push((name.to_string(), 0.0));
        }
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

impl ArgumentsBinder for FloatArgs {
    fn set_float(&mut self, name: &str, value: f32) -> Result<()> {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => {
                *slot = value;
                Ok(())
            }
            None => Err(anyhow!("unknown kernel argument '{name}'")),
        }
    }
}

/// Uniform mirror of the spatial-mean coefficient block, padded to 16 bytes
/// for std140-compatible binding.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
pub struct MeanParams {
    pub inv_multiplier_1: f32,
    pub inv_multiplier_2: f32,
    pub _pad0: f32,
    pub _pad1: f32,
}
