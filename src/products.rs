//! Vernier product catalog.
//!
//! Static mapping from human-readable device family names to the fixed USB
//! product ids the GoIO driver enumerates by. Immutable and known at compile
//! time; there is no lifecycle beyond process duration.

use std::fmt;
use std::str::FromStr;

/// Vernier's USB vendor id, shared by every GoIO product.
pub const VERNIER_VENDOR_ID: u16 = 0x08F7;

/// Device families the GoIO driver knows how to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    /// LabPro interface.
    LabPro,
    /// Go!Temp USB temperature probe.
    GoTemp,
    /// Go!Link single-channel sensor interface.
    GoLink,
    /// Go!Motion motion detector.
    GoMotion,
    /// LabQuest interface.
    LabQuest,
    /// CK low-cost spectrometer.
    CkSpectrometer,
    /// Vernier Mini Gas Chromatograph.
    MiniGasChromatograph,
    /// Stand-alone data acquisition unit.
    StandaloneDaq,
}

impl Product {
    /// Every known family, in the driver's enumeration order.
    pub const ALL: [Product; 8] = [
        Product::LabPro,
        Product::GoTemp,
        Product::GoLink,
        Product::GoMotion,
        Product::LabQuest,
        Product::CkSpectrometer,
        Product::MiniGasChromatograph,
        Product::StandaloneDaq,
    ];

    /// Fixed USB product id for this family.
    pub fn product_id(self) -> u16 {
        match self {
            Product::LabPro => 0x0001,
            Product::GoTemp => 0x0002,
            Product::GoLink => 0x0003,
            Product::GoMotion => 0x0004,
            Product::LabQuest => 0x0005,
            Product::CkSpectrometer => 0x0006,
            Product::MiniGasChromatograph => 0x0007,
            Product::StandaloneDaq => 0x0008,
        }
    }

    /// Human-readable family name as used in console reports.
    pub fn family_name(self) -> &'static str {
        match self {
            Product::LabPro => "LabPro",
            Product::GoTemp => "GoTemp",
            Product::GoLink => "GoLink",
            Product::GoMotion => "GoMotion",
            Product::LabQuest => "LabQuest",
            Product::CkSpectrometer => "CK Spectrometer",
            Product::MiniGasChromatograph => "Mini Gas Chromatograph",
            Product::StandaloneDaq => "Stand-alone DAC",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family_name())
    }
}

impl FromStr for Product {
    type Err = String;

    /// Parses a family name, ignoring case, spaces, and dashes, so CLI
    /// spellings like `golink` or `ck-spectrometer` work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |name: &str| {
            name.chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_' | '!'))
                .collect::<String>()
                .to_ascii_lowercase()
        };
        let wanted = normalize(s);
        Product::ALL
            .into_iter()
            .find(|p| normalize(p.family_name()) == wanted)
            .ok_or_else(|| format!("unknown product family '{s}'"))
    }
}
