//! Synchronization mode definitions

use clap::ValueEnum;
use serde::Deserialize;

/// How each increment of the shared counter is protected
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Plain read-modify-write, no mutual exclusion (loses updates)
    #[value(name = "none")]
    #[serde(rename = "none", alias = "unsynchronized")]
    Unsynchronized,
    /// One lock acquisition per increment
    Mutex,
    /// Atomic fetch-and-add per increment
    Atomic,
}

impl SyncMode {
    /// Every mode, in the order they are usually compared
    pub const ALL: [SyncMode; 3] = [Self::Unsynchronized, Self::Mutex, Self::Atomic];

    /// Parse mode from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "unsynchronized" | "racy" => Some(Self::Unsynchronized),
            "mutex" | "lock" => Some(Self::Mutex),
            "atomic" => Some(Self::Atomic),
            _ => None,
        }
    }

    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsynchronized => "NONE",
            Self::Mutex => "MUTEX",
            Self::Atomic => "ATOMIC",
        }
    }

    /// Whether the final counter value is guaranteed to equal tasks × increments
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, Self::Unsynchronized)
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync_modes() {
        assert_eq!(SyncMode::parse("none"), Some(SyncMode::Unsynchronized));
        assert_eq!(SyncMode::parse("NONE"), Some(SyncMode::Unsynchronized));
        assert_eq!(SyncMode::parse("Mutex"), Some(SyncMode::Mutex));
        assert_eq!(SyncMode::parse("atomic"), Some(SyncMode::Atomic));
        assert_eq!(SyncMode::parse("spinlock"), None);
    }

    #[test]
    fn test_is_deterministic() {
        assert!(!SyncMode::Unsynchronized.is_deterministic());
        assert!(SyncMode::Mutex.is_deterministic());
        assert!(SyncMode::Atomic.is_deterministic());
    }

    #[test]
    fn test_value_enum_names() {
        assert_eq!(
            SyncMode::from_str("none", true),
            Ok(SyncMode::Unsynchronized)
        );
        assert_eq!(SyncMode::from_str("mutex", true), Ok(SyncMode::Mutex));
        assert_eq!(SyncMode::from_str("atomic", true), Ok(SyncMode::Atomic));
    }

    #[test]
    fn test_deserialize_yaml() {
        let modes: Vec<SyncMode> = serde_yaml::from_str("[none, mutex, atomic]").unwrap();
        assert_eq!(modes, SyncMode::ALL.to_vec());
    }
}
