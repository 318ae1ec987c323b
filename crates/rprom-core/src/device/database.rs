//! Device database for lookup by name
//!
//! The built-in table covers the 27xx family the programmer firmware knows
//! about. A RON file can replace it at runtime:
//!
//! ```ron
//! [
//!     (name: "2764", size: KiB(8), type_code: 1),
//!     (name: "27C512", size: B(65536), type_code: 4),
//! ]
//! ```

use std::fs;
use std::io;
use std::path::Path;

use super::types::{DeviceProfile, MAX_DEVICE_SIZE};

/// Error type for device database operations
#[derive(Debug)]
pub enum DeviceDbError {
    /// I/O error reading files
    Io(io::Error),
    /// RON parsing error
    Parse(ron::error::SpannedError),
    /// Validation error
    Validation(String),
}

impl From<io::Error> for DeviceDbError {
    fn from(e: io::Error) -> Self {
        DeviceDbError::Io(e)
    }
}

impl From<ron::error::SpannedError> for DeviceDbError {
    fn from(e: ron::error::SpannedError) -> Self {
        DeviceDbError::Parse(e)
    }
}

impl std::fmt::Display for DeviceDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceDbError::Io(e) => write!(f, "I/O error: {}", e),
            DeviceDbError::Parse(e) => write!(f, "Parse error: {}", e),
            DeviceDbError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for DeviceDbError {}

/// Size specification with human-readable units (for RON parsing)
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub enum Size {
    /// Size in bytes
    B(usize),
    /// Size in kibibytes (1024 bytes)
    KiB(usize),
}

impl Size {
    /// Convert to bytes, `None` if the result does not fit a `usize`
    pub fn to_bytes(self) -> Option<usize> {
        match self {
            Size::B(n) => Some(n),
            Size::KiB(n) => n.checked_mul(1024),
        }
    }
}

/// Device definition in RON format
#[derive(Debug, Clone, serde::Deserialize)]
struct DeviceDef {
    name: String,
    size: Size,
    type_code: u8,
}

/// Collection of known device profiles
#[derive(Debug, Clone, Default)]
pub struct DeviceDatabase {
    devices: Vec<DeviceProfile>,
}

impl DeviceDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// The parts supported by the stock programmer firmware
    pub fn builtin() -> Self {
        Self {
            devices: vec![
                DeviceProfile::new("2764", 8 * 1024, 1),
                DeviceProfile::new("27128", 16 * 1024, 2),
                DeviceProfile::new("27256", 32 * 1024, 3),
                DeviceProfile::new("27512", 64 * 1024, 4),
            ],
        }
    }

    /// Load a database from a RON file
    pub fn load_file(path: &Path) -> Result<Self, DeviceDbError> {
        let content = fs::read_to_string(path)?;
        let db = Self::from_ron_str(&content)?;
        log::debug!("Loaded {} devices from {}", db.len(), path.display());
        Ok(db)
    }

    /// Parse a database from RON text
    pub fn from_ron_str(s: &str) -> Result<Self, DeviceDbError> {
        let defs: Vec<DeviceDef> = ron::from_str(s)?;
        let mut db = Self::new();
        for def in defs {
            let size = def.size.to_bytes().ok_or_else(|| {
                DeviceDbError::Validation(format!("{}: size {:?} overflows", def.name, def.size))
            })?;
            db.add(DeviceProfile::new(def.name, size, def.type_code))?;
        }
        Ok(db)
    }

    /// Add a profile after validating it
    pub fn add(&mut self, profile: DeviceProfile) -> Result<(), DeviceDbError> {
        if profile.size == 0 || profile.size > MAX_DEVICE_SIZE {
            return Err(DeviceDbError::Validation(format!(
                "{}: size {} outside 1..={}",
                profile.name, profile.size, MAX_DEVICE_SIZE
            )));
        }
        if profile.type_code == 0 {
            return Err(DeviceDbError::Validation(format!(
                "{}: type code 0 is reserved for 'no device'",
                profile.name
            )));
        }
        if self.find(&profile.name).is_some() {
            return Err(DeviceDbError::Validation(format!(
                "duplicate device name '{}'",
                profile.name
            )));
        }
        self.devices.push(profile);
        Ok(())
    }

    /// Find a profile by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&DeviceProfile> {
        self.devices
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Iterate over all profiles
    pub fn iter(&self) -> impl Iterator<Item = &DeviceProfile> {
        self.devices.iter()
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the database is empty
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin() {
        let db = DeviceDatabase::builtin();
        assert_eq!(db.len(), 4);
        let p = db.find("27256").unwrap();
        assert_eq!(p.size, 32768);
        assert_eq!(p.type_code, 3);
        assert_eq!(db.find("27512").unwrap().size, 65536);
        assert!(db.find("2716").is_none());
    }

    #[test]
    fn test_parse_ron() {
        let ron = r#"
[
    (name: "2764", size: KiB(8), type_code: 1),
    (name: "27C512", size: B(65536), type_code: 4),
]
"#;
        let db = DeviceDatabase::from_ron_str(ron).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.find("27c512").unwrap().size, 65536);
        assert_eq!(db.find("2764").unwrap().size, 8192);
    }

    #[test]
    fn test_rejects_oversized_device() {
        let ron = r#"[(name: "27C010", size: KiB(128), type_code: 5)]"#;
        assert!(matches!(
            DeviceDatabase::from_ron_str(ron),
            Err(DeviceDbError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_size_overflow() {
        let ron = format!(r#"[(name: "huge", size: KiB({}), type_code: 5)]"#, usize::MAX);
        match DeviceDatabase::from_ron_str(&ron) {
            Err(DeviceDbError::Validation(msg)) => assert!(msg.contains("huge")),
            other => panic!("unexpected {:?}", other.map(|db| db.len())),
        }
    }

    #[test]
    fn test_shipped_database() {
        let db = DeviceDatabase::from_ron_str(include_str!("../../../../devices/27xx.ron")).unwrap();
        let builtin = DeviceDatabase::builtin();
        for profile in builtin.iter() {
            assert_eq!(db.find(&profile.name), Some(profile));
        }
        assert_eq!(db.find("27c256").unwrap().type_code, 3);
    }

    #[test]
    fn test_rejects_type_zero() {
        let ron = r#"[(name: "2716", size: KiB(2), type_code: 0)]"#;
        assert!(matches!(
            DeviceDatabase::from_ron_str(ron),
            Err(DeviceDbError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let ron = r#"[(name: "2764", size: KiB(8), type_code: 1), (name: "2764", size: KiB(8), type_code: 1)]"#;
        assert!(DeviceDatabase::from_ron_str(ron).is_err());
    }
}
