// src/config/device_class.rs
//! Source/sink classification of the platform

use crate::config::constants::DEVICE_TYPE_SIZE;
use crate::config::key_path::Section;
use crate::config::ConfigError;
use crate::profile::ProfileStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Whether the platform originates content (set-top box) or renders it (TV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DeviceClass {
    Sink = 0,
    Source = 1,
}

impl DeviceClass {
    pub fn is_source(self) -> bool {
        self == DeviceClass::Source
    }

    pub fn is_sink(self) -> bool {
        self == DeviceClass::Sink
    }

    /// Read `<root>/Type` for a subsystem section.
    pub fn resolve(store: &ProfileStore, section: &Section) -> Result<Self, ConfigError> {
        let key = section.field("Type");
        let text = store
            .get_string(key.as_str(), DEVICE_TYPE_SIZE)
            .map_err(|source| ConfigError::DeviceTypeUnreadable {
                module: section.root,
                source,
            })?;

        let class = text
            .parse::<DeviceClass>()
            .map_err(|_| ConfigError::UnknownDeviceType {
                module: section.root,
                value: text.clone(),
            })?;
        debug!(module = section.root, %class, "device class resolved");
        Ok(class)
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(DeviceClass::Source),
            "sink" => Ok(DeviceClass::Sink),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Source => f.write_str("source"),
            DeviceClass::Sink => f.write_str("sink"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::key_path::AUDIO;

    fn resolve(text: &str) -> Result<DeviceClass, ConfigError> {
        let store = ProfileStore::from_toml_str(text).unwrap();
        DeviceClass::resolve(&store, &AUDIO)
    }

    #[test]
    fn test_source_and_sink() {
        assert_eq!(resolve("[dsAudio]\nType = \"source\"").unwrap(), DeviceClass::Source);
        assert_eq!(resolve("[dsAudio]\nType = \"sink\"").unwrap(), DeviceClass::Sink);
        assert_eq!(DeviceClass::Source as u8, 1);
        assert_eq!(DeviceClass::Sink as u8, 0);
    }

    #[test]
    fn test_other_strings_fail() {
        assert!(matches!(
            resolve("[dsAudio]\nType = \"hybrid\""),
            Err(ConfigError::UnknownDeviceType { .. })
        ));
        assert!(matches!(
            resolve("[dsAudio]\nType = \"Source\""),
            Err(ConfigError::UnknownDeviceType { .. })
        ));
    }

    #[test]
    fn test_missing_or_oversized_type_fails() {
        assert!(matches!(
            resolve("[dsAudio]\nName = \"x\""),
            Err(ConfigError::DeviceTypeUnreadable { .. })
        ));
        assert!(matches!(
            resolve("[dsAudio]\nType = \"sourcesink\""),
            Err(ConfigError::DeviceTypeUnreadable { .. })
        ));
    }
}
