//! Device type definitions

use core::fmt;
use core::str::FromStr;

/// Largest device the 16-bit address register can reach
pub const MAX_DEVICE_SIZE: usize = 0x1_0000;

/// Static descriptor of a supported EPROM part
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceProfile {
    /// Part name, e.g. "27256"
    pub name: String,
    /// Total size in bytes
    pub size: usize,
    /// Device type code passed to SET_TYPE
    pub type_code: u8,
}

impl DeviceProfile {
    /// Create a new profile
    pub fn new(name: impl Into<String>, size: usize, type_code: u8) -> Self {
        Self {
            name: name.into(),
            size,
            type_code,
        }
    }

    /// Whether `[address, address + length)` lies inside the device
    pub fn contains(&self, address: u32, length: usize) -> bool {
        (address as usize)
            .checked_add(length)
            .is_some_and(|end| end <= self.size)
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} KiB)", self.name, self.size / 1024)
    }
}

/// Programming voltage selector
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vpp {
    /// 5 V, for reading and EEPROM-style parts
    V5 = 0,
    /// 12.5 V class parts (27C256 and later CMOS)
    V12 = 1,
    /// 21 V class parts (early NMOS 2764/27128)
    V21 = 2,
}

impl Vpp {
    /// All selectors, in code order
    pub const ALL: [Vpp; 3] = [Vpp::V5, Vpp::V12, Vpp::V21];

    /// Code passed to SET_VPP
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Name as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            Vpp::V5 => "5v",
            Vpp::V12 => "12v",
            Vpp::V21 => "21v",
        }
    }

    /// Look up a selector by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Vpp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Vpp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Vpp::from_name(s).ok_or_else(|| {
            format!(
                "unsupported voltage '{}' (expected one of: 5v, 12v, 21v)",
                s
            )
        })
    }
}
