//! Version types for schema compatibility.

use serde::{Deserialize, Serialize};

/// Schema version using semantic versioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version (breaking changes)
    pub major: u16,
    /// Minor version (backwards-compatible additions)
    pub minor: u16,
    /// Patch version (bug fixes)
    pub patch: u16,
}

impl SchemaVersion {
    /// Creates a new schema version.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Current catalog snapshot version.
    pub const CATALOG: Self = Self::new(1, 0, 0);

    /// Parses a `major.minor.patch` string. Missing components default to 0.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(major, minor, patch))
    }

    /// Checks if this version can read data from another version.
    #[must_use]
    pub const fn can_read(&self, data_version: &Self) -> bool {
        self.major == data_version.major
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(SchemaVersion::parse("1.2.3"), Some(SchemaVersion::new(1, 2, 3)));
        assert_eq!(SchemaVersion::parse("2"), Some(SchemaVersion::new(2, 0, 0)));
        assert_eq!(SchemaVersion::parse("1.x"), None);
        assert_eq!(SchemaVersion::parse("1.0.0.0"), None);
    }

    #[test]
    fn test_display_roundtrip() {
        let v = SchemaVersion::CATALOG;
        assert_eq!(SchemaVersion::parse(&v.to_string()), Some(v));
    }

    #[test]
    fn test_can_read_ignores_minor() {
        let reader = SchemaVersion::new(1, 0, 0);
        assert!(reader.can_read(&SchemaVersion::new(1, 4, 0)));
        assert!(!reader.can_read(&SchemaVersion::new(2, 0, 0)));
    }
}
