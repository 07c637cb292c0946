// src/config/audio.rs
//! Audio port capability table

use crate::config::constants::audio::*;
use crate::config::device_class::DeviceClass;
use crate::config::fields::FieldReader;
use crate::config::key_path::{KeyPath, AUDIO};
use crate::config::ConfigError;
use crate::hal::types::*;
use crate::profile::ProfileStore;
use arrayvec::{ArrayString, ArrayVec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Inclusive dialog enhancement level range of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DialogEnhancementRange {
    pub min: u16,
    pub max: u16,
}

impl DialogEnhancementRange {
    pub fn contains(&self, level: i32) -> bool {
        level >= i32::from(self.min) && level <= i32::from(self.max)
    }
}

/// Static description of one audio output port.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioPortDescriptor {
    pub type_id: AudioPortType,
    pub index: u32,
    pub port_name: ArrayString<PORT_NAME_SIZE>,
    /// Only read for HDMI ARC ports
    pub arc_type: ArcTypes,
    pub compressions: ArrayVec<AudioCompression, MAX_COMPRESSIONS>,
    pub stereo_modes: ArrayVec<StereoMode, MAX_STEREO_MODES>,
    pub stereo_auto_mode: bool,
    pub ms12_capabilities: Ms12Capabilities,
    pub ms12_audio_profiles: ArrayVec<ArrayString<MS12_PROFILE_NAME_SIZE>, MAX_MS12_PROFILES>,
    pub is_ms12_decode: bool,
    pub is_ms11_decode: bool,
    pub atmos_capability: AtmosCapability,
    pub dialog_enhancement: Option<DialogEnhancementRange>,
}

/// Audio subsystem capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub device_class: DeviceClass,
    pub device_name: ArrayString<DEVICE_NAME_SIZE>,
    pub capabilities: AudioCapabilities,
    pub extended_enums_supported: bool,
    pub ports: Vec<AudioPortDescriptor>,
}

impl AudioConfig {
    pub const MODULE: &'static str = AUDIO.root;

    /// Populate the audio table from the profile.
    ///
    /// Fails on an unreadable device type, a port or list count above the
    /// table capacity, or when the port table cannot be allocated.
    pub fn parse(store: &ProfileStore) -> Result<Self, ConfigError> {
        let device_class = DeviceClass::resolve(store, &AUDIO)?;
        let reader = FieldReader::new(store, Self::MODULE);

        // The device name is informational only
        let device_name = reader.name::<DEVICE_NAME_SIZE>(&AUDIO.field("Name"));
        let capabilities = reader.mask(&AUDIO.field("Audio_Capabilities"));
        let extended_enums_supported = reader.bool(&AUDIO.feature("extendedEnumsSupported"));
        let port_count = reader.count(&AUDIO.field("Number_of_supported_ports"), MAX_PORTS)?;

        let mut ports = Vec::new();
        ports
            .try_reserve_exact(port_count)
            .map_err(|_| ConfigError::Allocation {
                module: Self::MODULE,
                count: port_count,
            })?;

        for position in 0..port_count {
            ports.push(parse_port(&reader, &AUDIO.instance(position))?);
        }

        info!(
            module = Self::MODULE,
            class = %device_class,
            ports = ports.len(),
            "audio configuration parsed"
        );

        Ok(Self {
            device_class,
            device_name,
            capabilities,
            extended_enums_supported,
            ports,
        })
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Port declared with the given type and per-type index.
    pub fn find_port(&self, type_id: AudioPortType, index: u32) -> Option<&AudioPortDescriptor> {
        self.ports
            .iter()
            .find(|port| port.type_id == type_id && port.index == index)
    }

    /// Release the port table. Safe to call repeatedly.
    pub fn term(&mut self) {
        self.ports = Vec::new();
    }
}

fn parse_port(reader: &FieldReader<'_>, port: &KeyPath) -> Result<AudioPortDescriptor, ConfigError> {
    let mut desc = AudioPortDescriptor {
        type_id: reader.enumerated(&port.field("Typeid")),
        ..Default::default()
    };

    if desc.type_id == AudioPortType::HdmiArc {
        desc.arc_type = reader.mask(&port.field("Arc_Types"));
    }

    desc.index = reader.u32(&port.field("Index"));
    desc.port_name = reader.name(&port.field("Name"));

    let compression_count = reader.count(
        &port.field("number_of_supported_compressions"),
        MAX_COMPRESSIONS,
    )?;
    let stereo_mode_count = reader.count(
        &port.field("number_of_supported_stereo_modes"),
        MAX_STEREO_MODES,
    )?;

    desc.stereo_auto_mode = reader.bool(&port.field("stereo_auto_mode"));
    desc.ms12_capabilities = reader.mask(&port.field("MS12_Capabilities"));
    let profile_count = reader.count(&port.field("MS12_AudioProfileCount"), MAX_MS12_PROFILES)?;
    desc.is_ms12_decode = reader.bool(&port.field("IsMS12Decode"));
    desc.is_ms11_decode = reader.bool(&port.field("IsMS11Decode"));
    desc.atmos_capability = reader.enumerated(&port.field("ATMOS_Capabilities"));

    let dialog = port.field("dialog_enhancement_level");
    if reader.present(&dialog) {
        desc.dialog_enhancement = Some(DialogEnhancementRange {
            min: reader.u16(&dialog.field("min")),
            max: reader.u16(&dialog.field("max")),
        });
    }

    // Counts are bounded above, so the pushes below cannot overflow
    desc.compressions.extend(
        (0..compression_count).map(|j| reader.enumerated(&port.item("compressions", j))),
    );
    desc.stereo_modes.extend(
        (0..stereo_mode_count).map(|j| reader.enumerated(&port.item("stereo_modes", j))),
    );
    desc.ms12_audio_profiles.extend(
        (0..profile_count).map(|j| reader.name(&port.item("MS12_AudioProfiles", j))),
    );

    debug!(
        module = AudioConfig::MODULE,
        key = %port,
        type_id = ?desc.type_id,
        index = desc.index,
        compressions = desc.compressions.len(),
        stereo_modes = desc.stereo_modes.len(),
        "audio port parsed"
    );
    Ok(desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PORTS: &str = r#"
[dsAudio]
Type = "source"
Name = "Platform Audio"
Audio_Capabilities = 0x26
Number_of_supported_ports = 2

[dsAudio.features]
extendedEnumsSupported = true

[dsAudio.Ports.1]
Typeid = 4
Arc_Types = 3
Index = 0
Name = "HDMI_ARC0"
number_of_supported_compressions = 2
compressions = [0, 3]
number_of_supported_stereo_modes = 3
stereo_modes = [1, 2, 6]
stereo_auto_mode = true
MS12_Capabilities = 5
MS12_AudioProfileCount = 2
MS12_AudioProfiles = ["Movie", "Music"]
IsMS12Decode = true
IsMS11Decode = false
ATMOS_Capabilities = 2

[dsAudio.Ports.1.dialog_enhancement_level]
min = 0
max = 16

[dsAudio.Ports.2]
Typeid = 2
Arc_Types = 3
Index = 0
Name = "SPDIF0"
number_of_supported_compressions = 1
compressions = [1]
"#;

    fn parse(text: &str) -> Result<AudioConfig, ConfigError> {
        AudioConfig::parse(&ProfileStore::from_toml_str(text).unwrap())
    }

    #[test]
    fn test_two_ports_in_declaration_order() {
        let audio = parse(TWO_PORTS).unwrap();
        assert_eq!(audio.port_count(), 2);
        assert_eq!(audio.device_class, DeviceClass::Source);
        assert_eq!(audio.device_name.as_str(), "Platform Audio");
        assert!(audio.extended_enums_supported);
        assert_eq!(
            audio.capabilities,
            AudioCapabilities::DD | AudioCapabilities::DDPLUS | AudioCapabilities::MS12
        );

        let arc = &audio.ports[0];
        assert_eq!(arc.type_id, AudioPortType::HdmiArc);
        assert_eq!(arc.port_name.as_str(), "HDMI_ARC0");
        assert_eq!(arc.compressions.as_slice(), &[AudioCompression::None, AudioCompression::Heavy]);
        assert_eq!(
            arc.stereo_modes.as_slice(),
            &[StereoMode::Mono, StereoMode::Stereo, StereoMode::DdPlus]
        );
        assert_eq!(arc.ms12_audio_profiles.len(), 2);
        assert_eq!(arc.ms12_audio_profiles[1].as_str(), "Music");
        assert_eq!(arc.atmos_capability, AtmosCapability::AtmosMetadata);
        assert_eq!(arc.dialog_enhancement, Some(DialogEnhancementRange { min: 0, max: 16 }));

        assert_eq!(audio.ports[1].type_id, AudioPortType::Spdif);
    }

    #[test]
    fn test_arc_types_only_for_arc_ports() {
        let audio = parse(TWO_PORTS).unwrap();
        assert_eq!(audio.ports[0].arc_type, ArcTypes::ARC | ArcTypes::EARC);
        assert_eq!(audio.ports[1].arc_type, ArcTypes::empty());
        assert_eq!(audio.ports[1].dialog_enhancement, None);
    }

    #[test]
    fn test_missing_list_entries_default() {
        let text = TWO_PORTS.replace("compressions = [1]", "number_of_supported_stereo_modes = 3\nstereo_modes = [2, 3]");
        let audio = parse(&text).unwrap();
        let spdif = &audio.ports[1];
        assert_eq!(spdif.stereo_modes.len(), 3);
        assert_eq!(spdif.stereo_modes[2], StereoMode::Unknown);
        assert_eq!(spdif.compressions.as_slice(), &[AudioCompression::None]);
    }

    #[test]
    fn test_entries_beyond_declared_count_ignored() {
        let text = TWO_PORTS
            .replace("compressions = [1]", "compressions = [1, 0, 3]")
            .replace("MS12_AudioProfileCount = 2", "MS12_AudioProfileCount = 1")
            .replace("number_of_supported_stereo_modes = 3", "number_of_supported_stereo_modes = 2");
        let audio = parse(&text).unwrap();

        let arc = &audio.ports[0];
        assert_eq!(arc.ms12_audio_profiles.len(), 1);
        assert_eq!(arc.ms12_audio_profiles[0].as_str(), "Movie");
        assert_eq!(arc.stereo_modes.as_slice(), &[StereoMode::Mono, StereoMode::Stereo]);

        let spdif = &audio.ports[1];
        assert_eq!(spdif.compressions.as_slice(), &[AudioCompression::Light]);
    }

    #[test]
    fn test_count_above_capacity_fails() {
        let text = TWO_PORTS.replace(
            "number_of_supported_compressions = 1",
            "number_of_supported_compressions = 5",
        );
        assert!(matches!(
            parse(&text),
            Err(ConfigError::CapacityExceeded { count: 5, capacity: MAX_COMPRESSIONS, .. })
        ));
    }

    #[test]
    fn test_invalid_device_type_fails() {
        let text = TWO_PORTS.replace("Type = \"source\"", "Type = \"tv\"");
        assert!(matches!(parse(&text), Err(ConfigError::UnknownDeviceType { .. })));
    }

    #[test]
    fn test_missing_name_is_not_fatal() {
        let text = TWO_PORTS.replace("Name = \"Platform Audio\"\n", "");
        let audio = parse(&text).unwrap();
        assert!(audio.device_name.is_empty());
    }

    #[test]
    fn test_term_is_idempotent() {
        let mut audio = parse(TWO_PORTS).unwrap();
        audio.term();
        audio.term();
        assert_eq!(audio.port_count(), 0);
    }
}
