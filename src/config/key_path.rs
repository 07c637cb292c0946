// src/config/key_path.rs
//! Typed construction of profile keys
//!
//! Every key family is described once: the subsystem root, the table that
//! holds its ports or devices (1-based keys, matching the profile layout) and
//! the inner lists (0-based). Each call yields a fresh path so a key can
//! never inherit text from a previous lookup.

use std::fmt;

/// Numbering of a table's entries in the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBase {
    Zero,
    One,
}

impl IndexBase {
    fn key_for(self, position: usize) -> usize {
        match self {
            IndexBase::Zero => position,
            IndexBase::One => position + 1,
        }
    }
}

/// Root of a subsystem section and the table holding its instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub root: &'static str,
    pub instances: &'static str,
}

pub const AUDIO: Section = Section {
    root: "dsAudio",
    instances: "Ports",
};

pub const VIDEO_PORT: Section = Section {
    root: "dsVideoPort",
    instances: "Ports",
};

pub const VIDEO_DEVICE: Section = Section {
    root: "dsVideoDevice",
    instances: "Device",
};

impl Section {
    /// Subsystem level field, e.g. `dsAudio/Name`.
    pub fn field(&self, name: &str) -> KeyPath {
        KeyPath::new(self.root).field(name)
    }

    /// Instance `position` (0-based in the table), e.g. `dsAudio/Ports/1`.
    pub fn instance(&self, position: usize) -> KeyPath {
        KeyPath::new(self.root).entry(self.instances, position, IndexBase::One)
    }

    /// Feature flag under `<root>/features/`.
    pub fn feature(&self, name: &str) -> KeyPath {
        KeyPath::new(self.root).field("features").field(name)
    }
}

/// A profile key under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    path: String,
}

impl KeyPath {
    pub fn new(root: &str) -> Self {
        Self {
            path: root.to_string(),
        }
    }

    /// Child field.
    pub fn field(&self, name: &str) -> KeyPath {
        KeyPath {
            path: format!("{}/{}", self.path, name),
        }
    }

    /// Element `position` of table `name`, numbered per `base`.
    pub fn entry(&self, name: &str, position: usize, base: IndexBase) -> KeyPath {
        KeyPath {
            path: format!("{}/{}/{}", self.path, name, base.key_for(position)),
        }
    }

    /// Element `position` of the 0-based list `name`.
    pub fn item(&self, name: &str, position: usize) -> KeyPath {
        self.entry(name, position, IndexBase::Zero)
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl AsRef<str> for KeyPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_keys_are_one_based() {
        assert_eq!(AUDIO.instance(0).as_str(), "dsAudio/Ports/1");
        assert_eq!(VIDEO_DEVICE.instance(2).as_str(), "dsVideoDevice/Device/3");
    }

    #[test]
    fn test_inner_lists_are_zero_based() {
        let port = VIDEO_PORT.instance(0);
        let res = port.item("supportedResolutions", 0).field("name");
        assert_eq!(res.as_str(), "dsVideoPort/Ports/1/supportedResolutions/0/name");
        assert_eq!(
            AUDIO.instance(1).item("compressions", 3).to_string(),
            "dsAudio/Ports/2/compressions/3"
        );
    }

    #[test]
    fn test_feature_keys() {
        assert_eq!(
            VIDEO_PORT.feature("extendedEnumsSupported").as_str(),
            "dsVideoPort/features/extendedEnumsSupported"
        );
        assert_eq!(AUDIO.field("Type").as_str(), "dsAudio/Type");
    }

    #[test]
    fn test_derived_keys_do_not_share_state() {
        let port = AUDIO.instance(0);
        let min = port.field("dialog_enhancement_level").field("min");
        let name = port.field("Name");
        assert_eq!(min.as_str(), "dsAudio/Ports/1/dialog_enhancement_level/min");
        assert_eq!(name.as_str(), "dsAudio/Ports/1/Name");
    }
}
