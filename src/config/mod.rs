// src/config/mod.rs
//! Platform capability configuration
//!
//! [`parse_configuration`] walks a [`ProfileStore`] once, parses every
//! subsystem the profile declares and returns an immutable
//! [`DeviceSettingsConfig`]. Test cases read that value; nothing in it changes
//! until [`DeviceSettingsConfig::term`] releases the tables.

pub mod audio;
pub mod constants;
pub mod device_class;
pub(crate) mod fields;
pub mod key_path;
pub mod loader;
pub mod video_device;
pub mod video_port;

pub use audio::{AudioConfig, AudioPortDescriptor, DialogEnhancementRange};
pub use device_class::DeviceClass;
pub use loader::{HarnessSettings, SettingsLoader};
pub use video_device::{VideoDeviceConfig, VideoDeviceDescriptor};
pub use video_port::{ResolutionDescriptor, VideoPortConfig, VideoPortDescriptor};

use crate::profile::{ProfileError, ProfileStore};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

/// Configuration parse failures. Every variant aborts the parse.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{module}: device type unreadable: {source}")]
    DeviceTypeUnreadable {
        module: &'static str,
        #[source]
        source: ProfileError,
    },

    #[error("{module}: unrecognised device type '{value}', expected \"source\" or \"sink\"")]
    UnknownDeviceType { module: &'static str, value: String },

    #[error("{module}: required field {key} unavailable: {source}")]
    MissingRequired {
        module: &'static str,
        key: String,
        #[source]
        source: ProfileError,
    },

    #[error("{module}: {key} declares {count} entries but the table holds {capacity}")]
    CapacityExceeded {
        module: &'static str,
        key: String,
        count: usize,
        capacity: usize,
    },

    #[error("{module}: unable to allocate {count} table entries")]
    Allocation { module: &'static str, count: usize },

    #[error("{first_module} declares a {first} platform but {second_module} declares {second}")]
    ConflictingDeviceClass {
        first_module: &'static str,
        first: DeviceClass,
        second_module: &'static str,
        second: DeviceClass,
    },

    #[error("{module} configuration failed (already parsed: {parsed:?}): {source}")]
    Subsystem {
        module: &'static str,
        parsed: Vec<&'static str>,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// The innermost subsystem error, skipping the dispatcher wrapper.
    pub fn root_cause(&self) -> &ConfigError {
        match self {
            ConfigError::Subsystem { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

bitflags! {
    /// Subsystems declared by the profile. Bit values follow `dsModule_t`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ModuleMask: u32 {
        const AUDIO_PORT = 1 << 0;
        const VIDEO_PORT = 1 << 1;
        const COMPOSITE_IN = 1 << 2;
        const HDMI_IN = 1 << 3;
        const VIDEO_DEVICE = 1 << 4;
        const DISPLAY = 1 << 5;
        const FPD = 1 << 6;
        const HOST = 1 << 7;
    }
}

impl Default for ModuleMask {
    fn default() -> Self {
        Self::empty()
    }
}

impl ModuleMask {
    /// Profile section name of a single-bit mask.
    pub fn section_name(self) -> Option<&'static str> {
        PROBES
            .iter()
            .find(|probe| probe.flag == self)
            .map(|probe| probe.section)
    }
}

/// Capability table carried by a profile section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tables {
    Audio,
    VideoDevice,
    VideoPort,
    PresenceOnly,
}

struct Probe {
    section: &'static str,
    flag: ModuleMask,
    tables: Tables,
}

/// Sections probed for presence, in probe order.
const PROBES: [Probe; 8] = [
    Probe { section: "dsAudio", flag: ModuleMask::AUDIO_PORT, tables: Tables::Audio },
    Probe { section: "dsVideoDevice", flag: ModuleMask::VIDEO_DEVICE, tables: Tables::VideoDevice },
    Probe { section: "dsVideoPort", flag: ModuleMask::VIDEO_PORT, tables: Tables::VideoPort },
    Probe { section: "dsCompositeIn", flag: ModuleMask::COMPOSITE_IN, tables: Tables::PresenceOnly },
    Probe { section: "dsFPD", flag: ModuleMask::FPD, tables: Tables::PresenceOnly },
    Probe { section: "dsDisplay", flag: ModuleMask::DISPLAY, tables: Tables::PresenceOnly },
    Probe { section: "dsHost", flag: ModuleMask::HOST, tables: Tables::PresenceOnly },
    Probe { section: "dsHdmiIn", flag: ModuleMask::HDMI_IN, tables: Tables::PresenceOnly },
];

/// Capability tables for every subsystem the profile declares.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSettingsConfig {
    /// `None` when no parsed subsystem declared a type
    pub device_class: Option<DeviceClass>,
    pub modules: ModuleMask,
    pub audio: Option<AudioConfig>,
    pub video_port: Option<VideoPortConfig>,
    pub video_device: Option<VideoDeviceConfig>,
}

/// Parse every subsystem present in `store`.
///
/// Stops at the first subsystem that fails; the error names it and the
/// subsystems already parsed, whose tables are dropped.
pub fn parse_configuration(store: &ProfileStore) -> Result<DeviceSettingsConfig, ConfigError> {
    let mut config = DeviceSettingsConfig::default();
    let mut parsed: Vec<&'static str> = Vec::new();

    for probe in &PROBES {
        let section = probe.section;
        if !store.field_present(section) {
            continue;
        }
        config.modules |= probe.flag;

        let outcome = match probe.tables {
            Tables::Audio => AudioConfig::parse(store).map(|audio| {
                let class = audio.device_class;
                config.audio = Some(audio);
                Some(class)
            }),
            Tables::VideoDevice => VideoDeviceConfig::parse(store).map(|video| {
                let class = video.device_class;
                config.video_device = Some(video);
                Some(class)
            }),
            Tables::VideoPort => VideoPortConfig::parse(store).map(|video| {
                let class = video.device_class;
                config.video_port = Some(video);
                Some(class)
            }),
            Tables::PresenceOnly => Ok(None),
        };

        let has_tables = outcome
            .and_then(|class| match class {
                Some(class) => config.settle_class(section, class, &parsed).map(|_| true),
                None => Ok(false),
            })
            .map_err(|err| {
                error!(module = section, error = %err, "failed to parse configuration");
                ConfigError::Subsystem {
                    module: section,
                    parsed: parsed.clone(),
                    source: Box::new(err),
                }
            })?;

        if has_tables {
            parsed.push(section);
        }
    }

    info!(
        modules = ?config.modules,
        class = ?config.device_class,
        "device settings configuration ready"
    );
    Ok(config)
}

impl DeviceSettingsConfig {
    fn settle_class(
        &mut self,
        module: &'static str,
        class: DeviceClass,
        parsed: &[&'static str],
    ) -> Result<(), ConfigError> {
        match self.device_class {
            None => {
                self.device_class = Some(class);
                Ok(())
            }
            Some(existing) if existing == class => Ok(()),
            Some(existing) => Err(ConfigError::ConflictingDeviceClass {
                first_module: parsed.first().copied().unwrap_or("profile"),
                first: existing,
                second_module: module,
                second: class,
            }),
        }
    }

    /// Whether the profile declared `module`.
    pub fn has(&self, module: ModuleMask) -> bool {
        self.modules.contains(module)
    }

    /// Extended status codes flag of a table-carrying subsystem.
    pub fn extended_enums(&self, module: ModuleMask) -> bool {
        if module == ModuleMask::AUDIO_PORT {
            self.audio.as_ref().is_some_and(|a| a.extended_enums_supported)
        } else if module == ModuleMask::VIDEO_PORT {
            self.video_port
                .as_ref()
                .is_some_and(|v| v.extended_enums_supported)
        } else if module == ModuleMask::VIDEO_DEVICE {
            self.video_device
                .as_ref()
                .is_some_and(|v| v.extended_enums_supported)
        } else {
            false
        }
    }

    /// Release every table. Safe without a prior parse and when repeated.
    pub fn term(&mut self) {
        if let Some(audio) = self.audio.as_mut() {
            audio.term();
        }
        if let Some(video) = self.video_port.as_mut() {
            video.term();
        }
        if let Some(video) = self.video_device.as_mut() {
            video.term();
        }
        self.audio = None;
        self.video_port = None;
        self.video_device = None;
    }

    /// CRC-32 over the canonical JSON form of the tables.
    pub fn fingerprint(&self) -> u32 {
        match serde_json::to_vec(self) {
            Ok(bytes) => crc32fast::hash(&bytes),
            Err(_) => 0,
        }
    }

    /// Cross-field checks the parsers do not enforce; each entry is a warning.
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();

        if let Some(video) = &self.video_port {
            for (i, port) in video.ports.iter().enumerate() {
                if !port.default_resolution.is_empty() && port.default_resolution().is_none() {
                    issues.push(format!(
                        "video port {}: default resolution '{}' is not in the supported list",
                        i, port.default_resolution
                    ));
                }
            }
        }

        if let Some(audio) = &self.audio {
            for (i, port) in audio.ports.iter().enumerate() {
                if let Some(range) = port.dialog_enhancement {
                    if range.min > range.max {
                        issues.push(format!(
                            "audio port {}: dialog enhancement min {} exceeds max {}",
                            i, range.min, range.max
                        ));
                    }
                }
            }
        }

        if let Some(video) = &self.video_device {
            for (i, device) in video.devices.iter().enumerate() {
                if !device.supported_dfcs.is_empty()
                    && !device.supported_dfcs.contains(&device.default_dfc)
                {
                    issues.push(format!(
                        "video device {}: default DFC {:?} is not in the supported list",
                        i, device.default_dfc
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Short description for logs and reports.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            device_class: self.device_class,
            modules: self.modules,
            audio_ports: self.audio.as_ref().map_or(0, |a| a.port_count()),
            video_ports: self.video_port.as_ref().map_or(0, |v| v.port_count()),
            video_devices: self.video_device.as_ref().map_or(0, |v| v.device_count()),
            fingerprint: self.fingerprint(),
        }
    }
}

/// Configuration summary for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub device_class: Option<DeviceClass>,
    pub modules: ModuleMask,
    pub audio_ports: usize,
    pub video_ports: usize,
    pub video_devices: usize,
    pub fingerprint: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUDIO_AND_HOST: &str = r#"
[dsAudio]
Type = "sink"
Name = "Audio"
Number_of_supported_ports = 1

[dsAudio.Ports.1]
Typeid = 3
Index = 0
Name = "SPEAKER0"

[dsHost]
Type = "sink"

[dsFPD]
Type = "sink"
"#;

    fn store(text: &str) -> ProfileStore {
        ProfileStore::from_toml_str(text).unwrap()
    }

    #[test]
    fn test_module_mask_bits() {
        assert_eq!(ModuleMask::AUDIO_PORT.bits(), 0x01);
        assert_eq!(ModuleMask::VIDEO_PORT.bits(), 0x02);
        assert_eq!(ModuleMask::COMPOSITE_IN.bits(), 0x04);
        assert_eq!(ModuleMask::HDMI_IN.bits(), 0x08);
        assert_eq!(ModuleMask::VIDEO_DEVICE.bits(), 0x10);
        assert_eq!(ModuleMask::DISPLAY.bits(), 0x20);
        assert_eq!(ModuleMask::FPD.bits(), 0x40);
        assert_eq!(ModuleMask::HOST.bits(), 0x80);
        assert_eq!(ModuleMask::HOST.section_name(), Some("dsHost"));
    }

    #[test]
    fn test_presence_only_modules_set_bits() {
        let config = parse_configuration(&store(AUDIO_AND_HOST)).unwrap();
        assert_eq!(
            config.modules,
            ModuleMask::AUDIO_PORT | ModuleMask::HOST | ModuleMask::FPD
        );
        assert_eq!(config.device_class, Some(DeviceClass::Sink));
        assert!(config.video_port.is_none());
        assert_eq!(config.summary().audio_ports, 1);
    }

    #[test]
    fn test_empty_profile() {
        let config = parse_configuration(&store("")).unwrap();
        assert!(config.modules.is_empty());
        assert_eq!(config.device_class, None);
    }

    #[test]
    fn test_failure_names_subsystem() {
        let text = format!("{AUDIO_AND_HOST}\n[dsVideoPort]\nType = \"sink\"\n");
        let err = parse_configuration(&store(&text)).unwrap_err();
        match &err {
            ConfigError::Subsystem { module, parsed, .. } => {
                assert_eq!(*module, "dsVideoPort");
                assert_eq!(parsed, &vec!["dsAudio"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(err.root_cause(), ConfigError::MissingRequired { .. }));
    }

    #[test]
    fn test_conflicting_device_class() {
        let text = format!(
            "{AUDIO_AND_HOST}\n[dsVideoDevice]\nType = \"source\"\nName = \"Dec\"\nNumVideoDevices = 0\n"
        );
        let err = parse_configuration(&store(&text)).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            ConfigError::ConflictingDeviceClass { first: DeviceClass::Sink, second: DeviceClass::Source, .. }
        ));
    }

    #[test]
    fn test_term_without_parse_and_twice() {
        let mut config = DeviceSettingsConfig::default();
        config.term();
        config.term();

        let mut config = parse_configuration(&store(AUDIO_AND_HOST)).unwrap();
        config.term();
        config.term();
        assert!(config.audio.is_none());
    }

    #[test]
    fn test_reparse_is_identical() {
        let store = store(AUDIO_AND_HOST);
        let mut first = parse_configuration(&store).unwrap();
        let fingerprint = first.fingerprint();
        first.term();
        let second = parse_configuration(&store).unwrap();
        assert_eq!(second.fingerprint(), fingerprint);
    }

    #[test]
    fn test_validate_consistency_flags_bad_dialog_range() {
        let text = AUDIO_AND_HOST.replace(
            "Name = \"SPEAKER0\"",
            "Name = \"SPEAKER0\"\n[dsAudio.Ports.1.dialog_enhancement_level]\nmin = 9\nmax = 2",
        );
        let config = parse_configuration(&store(&text)).unwrap();
        let issues = config.validate_consistency().unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("dialog enhancement"));
    }
}
