//! WGSL source generation for the spatial-mean reduction.
//!
//! One workgroup is dispatched per (slice, batch) pair. Its lanes sweep the
//! W x H domain with strides equal to the workgroup extent, park their
//! partial sums (pre-scaled by `inv_multiplier_1`) in workgroup storage,
//! fold four slots at a time while at least eight quads remain, then sum
//! the surviving slots linearly. Lane 0 scales the total by
//! `inv_multiplier_2` and writes the single vec4 result at (0, 0).
//!
//! The tensor accessors (`read_src`, `write_dst`, the dimension getters)
//! and the `args` uniform are prepended by the enclosing framework.

use meanop_api::{OperationDef, Precision};

use crate::workgroup::GroupShape;

/// One 4-wide folding round: lanes below `live` each combine four slots
/// spaced `offset` apart into the slot at `lane * 4 * offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanInRound {
    pub live: u32,
    pub offset: u32,
}

/// Reduction schedule for a workgroup of `area` lanes: the geometric
/// 4-wide rounds, then a linear tail over the remaining live slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanInPlan {
    pub rounds: Vec<FanInRound>,
    pub tail_count: u32,
    pub tail_stride: u32,
}

/// The geometric phase keeps going while a quarter of the live slots still
/// fills at least eight quads; below that the linear tail is cheaper than
/// another barrier.
pub fn fan_in_plan(area: u32) -> FanInPlan {
    debug_assert_eq!(area % 4, 0);
    let mut rounds = Vec::new();
    let mut live = area / 4;
    let mut offset = 1u32;
    while live >= 8 {
        rounds.push(FanInRound { live, offset });
        live /= 4;
        offset *= 4;
    }
    FanInPlan {
        rounds,
        tail_count: live * 4,
        tail_stride: offset,
    }
}

pub fn build_mean_shader(def: &OperationDef, wg: GroupShape) -> String {
    let gx = wg.x;
    let gy = wg.y;
    let area = wg.area();
    let plan = fan_in_plan(area);

    let mut s = String::new();
    if def.precision == Precision::F16 {
        s.push_str("enable f16;\n\n");
    }
    s.push_str("// Prepended by the framework: read_src/write_dst, src_width/src_height,\n");
    s.push_str("// dst_slices/dst_batch, and the `args` uniform (inv_multiplier_1/2).\n\n");
    s.push_str(&format!(
        "var<workgroup> accum: array<vec4<f32>, {area}>;\n\n"
    ));
    s.push_str(&format!("@compute @workgroup_size({gx}, {gy}, 1)\n"));
    s.push_str("fn main(\n");
    s.push_str("    @builtin(local_invocation_id) lid: vec3<u32>,\n");
    s.push_str("    @builtin(workgroup_id) wid: vec3<u32>,\n");
    s.push_str(") {\n");
    s.push_str(&format!("    let local_id = lid.y * {gx}u + lid.x;\n"));
    if def.dst.layout.has_batch_axis() {
        s.push_str("    let linear_id = wid.z;\n");
        s.push_str("    let slice = linear_id / dst_batch();\n");
        s.push_str("    let batch = linear_id % dst_batch();\n");
    } else {
        s.push_str("    let slice = wid.z;\n");
        s.push_str("    let batch = 0u;\n");
    }
    // wid.z is uniform across the workgroup, so returning here keeps the
    // barriers below in uniform control flow.
    s.push_str("    if (slice >= dst_slices()) {\n        return;\n    }\n");
    s.push_str("    var sum = vec4<f32>(0.0);\n");
    s.push_str(&format!(
        "    for (var sy = lid.y; sy < src_height(); sy = sy + {gy}u) {{\n"
    ));
    s.push_str(&format!(
        "        for (var sx = lid.x; sx < src_width(); sx = sx + {gx}u) {{\n"
    ));
    s.push_str("            sum = sum + read_src(sx, sy, slice, batch);\n");
    s.push_str("        }\n");
    s.push_str("    }\n");
    s.push_str("    accum[local_id] = sum * args.inv_multiplier_1;\n");
    s.push_str("    workgroupBarrier();\n");
    for round in &plan.rounds {
        let off = round.offset;
        s.push_str(&format!("    if (local_id < {}u) {{\n", round.live));
        s.push_str(&format!("        let t = local_id * {}u;\n", off * 4));
        s.push_str(&format!("        var part = accum[t + {off}u];\n"));
        s.push_str(&format!("        part = part + accum[t + {}u];\n", off * 2));
        s.push_str(&format!("        part = part + accum[t + {}u];\n", off * 3));
        s.push_str("        accum[t] = accum[t] + part;\n");
        s.push_str("    }\n");
        s.push_str("    workgroupBarrier();\n");
    }
    // Every lane recomputes the tail; only lane 0 writes.
    s.push_str("    var total = accum[0u];\n");
    for i in 1..plan.tail_count {
        s.push_str(&format!(
            "    total = total + accum[{}u];\n",
            plan.tail_stride * i
        ));
    }
    match def.precision {
        Precision::F32 => s.push_str("    let result = total * args.inv_multiplier_2;\n"),
        Precision::F16 => {
            s.push_str("    let result = vec4<f16>(total * args.inv_multiplier_2);\n")
        }
    }
    s.push_str("    if (local_id == 0u) {\n");
    s.push_str("        write_dst(result, 0u, 0u, slice, batch);\n");
    s.push_str("    }\n");
    s.push_str("}\n");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use meanop_api::{Precision, TensorDescriptor, TensorLayout};

    fn def(precision: Precision, dst_layout: TensorLayout) -> OperationDef {
        OperationDef::new(
            precision,
            TensorDescriptor::new(dst_layout),
            TensorDescriptor::new(dst_layout),
        )
    }

    #[test]
    fn plan_shapes_for_selected_workgroups() {
        let plan = fan_in_plan(32); // 8x4
        assert_eq!(plan.rounds, vec![FanInRound { live: 8, offset: 1 }]);
        assert_eq!((plan.tail_count, plan.tail_stride), (8, 4));

        let plan = fan_in_plan(64); // 8x8
        assert_eq!(plan.rounds, vec![FanInRound { live: 16, offset: 1 }]);
        assert_eq!((plan.tail_count, plan.tail_stride), (16, 4));

        let plan = fan_in_plan(128); // 16x8
        assert_eq!(
            plan.rounds,
            vec![
                FanInRound { live: 32, offset: 1 },
                FanInRound { live: 8, offset: 4 },
            ]
        );
        assert_eq!((plan.tail_count, plan.tail_stride), (8, 16));

        let plan = fan_in_plan(256); // 16x16
        assert_eq!(
            plan.rounds,
            vec![
                FanInRound { live: 64, offset: 1 },
                FanInRound { live: 16, offset: 4 },
            ]
        );
        assert_eq!((plan.tail_count, plan.tail_stride), (16, 16));
    }

    #[test]
    fn plan_covers_every_slot_exactly_once() {
        for area in [32u32, 64, 128, 256] {
            let plan = fan_in_plan(area);
            // Track which source slot each live slot has absorbed.
            let mut absorbed = vec![1u32; area as usize];
            for round in &plan.rounds {
                for lane in 0..round.live {
                    let t = (lane * round.offset * 4) as usize;
                    for k in 1..4 {
                        let src = t + (round.offset * k) as usize;
                        absorbed[t] += absorbed[src];
                        absorbed[src] = 0;
                    }
                }
            }
            let mut total = 0;
            for i in 0..plan.tail_count {
                total += absorbed[(plan.tail_stride * i) as usize];
            }
            assert_eq!(total, area, "area {area}");
        }
    }

    #[test]
    fn emitted_source_matches_plan() {
        let wg = GroupShape::new(16, 16);
        let src = build_mean_shader(&def(Precision::F32, TensorLayout::Hwc), wg);
        assert!(src.contains("@workgroup_size(16, 16, 1)"));
        assert!(src.contains("var<workgroup> accum: array<vec4<f32>, 256>;"));
        // One barrier after phase 1, one per fan-in round.
        let barriers = src.matches("workgroupBarrier();").count();
        assert_eq!(barriers, 1 + fan_in_plan(256).rounds.len());
        let tail_terms = src.matches("total = total + accum[").count();
        assert_eq!(tail_terms as u32, fan_in_plan(256).tail_count - 1);
        assert!(src.contains("if (local_id == 0u)"));
        assert!(!src.contains("enable f16;"));
        assert!(!src.contains("dst_batch()"));
    }

    #[test]
    fn strided_loops_use_workgroup_extent() {
        let wg = GroupShape::new(8, 4);
        let src = build_mean_shader(&def(Precision::F32, TensorLayout::Hwc), wg);
        assert!(src.contains("for (var sy = lid.y; sy < src_height(); sy = sy + 4u)"));
        assert!(src.contains("for (var sx = lid.x; sx < src_width(); sx = sx + 8u)"));
        assert!(src.contains("let local_id = lid.y * 8u + lid.x;"));
    }

    #[test]
    fn batch_axis_decomposes_the_z_index() {
        let wg = GroupShape::new(16, 16);
        let src = build_mean_shader(&def(Precision::F32, TensorLayout::Bhwc), wg);
        assert!(src.contains("let slice = linear_id / dst_batch();"));
        assert!(src.contains("let batch = linear_id % dst_batch();"));
        assert!(!src.contains("let batch = 0u;"));
    }

    #[test]
    fn f16_destination_converts_the_final_write() {
        let wg = GroupShape::new(16, 16);
        let src = build_mean_shader(&def(Precision::F16, TensorLayout::Hwc), wg);
        assert!(src.starts_with("enable f16;"));
        assert!(src.contains("vec4<f16>(total * args.inv_multiplier_2)"));
    }

    #[test]
    fn generation_is_deterministic() {
        let wg = GroupShape::new(16, 8);
        let d = def(Precision::F32, TensorLayout::Hwc);
        assert_eq!(build_mean_shader(&d, wg), build_mean_shader(&d, wg));
    }
}
