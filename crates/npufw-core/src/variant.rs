use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// NPU core generation embedded in the boot image.
///
/// Selects the heuristic used to find where the firmware starts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum FirmwareVariant {
    /// Newer SoCs (e.g. S20): size field stored before the signature
    #[strum(serialize = "cortex-a")]
    CortexA,
    /// Older SoCs (e.g. S10): vector table found by its stack pointer
    #[strum(serialize = "cortex-m")]
    CortexM,
}

impl FirmwareVariant {
    pub const ALL: [FirmwareVariant; 2] = [FirmwareVariant::CortexA, FirmwareVariant::CortexM];

    pub fn name(&self) -> &'static str {
        self.into()
    }
}
