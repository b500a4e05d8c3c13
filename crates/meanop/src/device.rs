//! GPU vendor/family classification used by workgroup-shape selection.
//!
//! Classification is a read-only input owned by the caller; anything we do
//! not recognize collapses to `GpuVendor::Other` and downstream heuristics
//! fall back to their defaults.

const VENDOR_ID_QUALCOMM: u32 = 0x5143;
const VENDOR_ID_ARM: u32 = 0x13B5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdrenoSeries {
    Adreno3xx,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaliSeries {
    T6xx,
    T7xx,
    T8xx,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuVendor {
    Adreno(AdrenoSeries),
    Mali(MaliSeries),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor: GpuVendor,
}

impl DeviceInfo {
    pub fn new(vendor: GpuVendor) -> Self {
        Self { vendor }
    }

    pub fn unknown() -> Self {
        Self {
            vendor: GpuVendor::Other,
        }
    }

    /// Classify a live adapter by PCI vendor id, falling back to the
    /// adapter name when the id is unhelpful.
    #[cfg(feature = "wgpu")]
    pub fn from_adapter(info: &wgpu::AdapterInfo) -> Self {
        Self::new(classify_vendor(info.vendor, &info.name))
    }
}

pub fn classify_vendor(vendor_id: u32, name: &str) -> GpuVendor {
    let lower = name.to_ascii_lowercase();
    match vendor_id {
        VENDOR_ID_QUALCOMM => GpuVendor::Adreno(classify_adreno(&lower)),
        VENDOR_ID_ARM => GpuVendor::Mali(classify_mali(&lower)),
        _ => {
            // Some drivers report vendor id 0; the name is all we have.
            if lower.contains("adreno") {
                GpuVendor::Adreno(classify_adreno(&lower))
            } else if lower.contains("mali") {
                GpuVendor::Mali(classify_mali(&lower))
            } else {
                GpuVendor::Other
            }
        }
    }
}

/// Adreno names carry the model number directly, e.g. "Adreno (TM) 330".
fn classify_adreno(lower_name: &str) -> AdrenoSeries {
    let digits: String = lower_name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(model) if (300..400).contains(&model) => AdrenoSeries::Adreno3xx,
        _ => AdrenoSeries::Other,
    }
}

/// Midgard-era Mali parts are named "Mali-T<model>"; everything newer
/// (Bifrost "Mali-G<model>" onwards) lands in `Other`.
fn classify_mali(lower_name: &str) -> MaliSeries {
    let model = lower_name
        .split("mali-")
        .nth(1)
        .unwrap_or("")
        .trim_start_matches(char::is_whitespace);
    let mut chars = model.chars();
    if chars.next() != Some('t') {
        return MaliSeries::Other;
    }
    match chars.next() {
        Some('6') => MaliSeries::T6xx,
        Some('7') => MaliSeries::T7xx,
        Some('8') => MaliSeries::T8xx,
        _ => MaliSeries::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualcomm_adreno_by_vendor_id() {
        assert_eq!(
            classify_vendor(VENDOR_ID_QUALCOMM, "Adreno (TM) 330"),
            GpuVendor::Adreno(AdrenoSeries::Adreno3xx)
        );
        assert_eq!(
            classify_vendor(VENDOR_ID_QUALCOMM, "Adreno (TM) 640"),
            GpuVendor::Adreno(AdrenoSeries::Other)
        );
    }

    #[test]
    fn arm_mali_series_from_name() {
        assert_eq!(
            classify_vendor(VENDOR_ID_ARM, "Mali-T628"),
            GpuVendor::Mali(MaliSeries::T6xx)
        );
        assert_eq!(
            classify_vendor(VENDOR_ID_ARM, "Mali-T760"),
            GpuVendor::Mali(MaliSeries::T7xx)
        );
        assert_eq!(
            classify_vendor(VENDOR_ID_ARM, "Mali-T880"),
            GpuVendor::Mali(MaliSeries::T8xx)
        );
        assert_eq!(
            classify_vendor(VENDOR_ID_ARM, "Mali-G76"),
            GpuVendor::Mali(MaliSeries::Other)
        );
    }

    #[test]
    fn zero_vendor_id_falls_back_to_name() {
        assert_eq!(
            classify_vendor(0, "Qualcomm Adreno 320"),
            GpuVendor::Adreno(AdrenoSeries::Adreno3xx)
        );
        assert_eq!(classify_vendor(0, "NVIDIA GeForce RTX 3080"), GpuVendor::Other);
    }

    #[test]
    fn desktop_vendors_are_other() {
        assert_eq!(classify_vendor(0x10DE, "NVIDIA GeForce RTX 3080"), GpuVendor::Other);
        assert_eq!(classify_vendor(0x8086, "Intel Arc A770"), GpuVendor::Other);
    }
}
