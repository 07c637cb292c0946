// tests/parse_configuration.rs
//! Integration tests for profile loading and the configuration dispatcher

use ds_hal_harness::config::ConfigError;
use ds_hal_harness::hal::AudioPortType;
use ds_hal_harness::{parse_configuration, DeviceClass, ModuleMask, ProfileStore};
use std::io::Write;
use tempfile::NamedTempFile;

const SOURCE_PROFILE: &str = include_str!("../profiles/source.toml");
const SINK_PROFILE: &str = include_str!("../profiles/sink.toml");

fn parse(text: &str) -> Result<ds_hal_harness::DeviceSettingsConfig, ConfigError> {
    parse_configuration(&ProfileStore::from_toml_str(text).expect("profile should be valid TOML"))
}

#[test]
fn test_sink_profile_tables() {
    let config = parse(SINK_PROFILE).unwrap();

    assert_eq!(config.device_class, Some(DeviceClass::Sink));
    assert_eq!(
        config.modules,
        ModuleMask::AUDIO_PORT
            | ModuleMask::VIDEO_PORT
            | ModuleMask::VIDEO_DEVICE
            | ModuleMask::HOST
            | ModuleMask::DISPLAY
            | ModuleMask::FPD
    );

    let audio = config.audio.as_ref().unwrap();
    assert!(!audio.extended_enums_supported);
    let names: Vec<&str> = audio.ports.iter().map(|p| p.port_name.as_str()).collect();
    assert_eq!(names, vec!["SPEAKER0", "HEADPHONE0", "HDMI_ARC0"]);
    assert_eq!(audio.ports[0].type_id, AudioPortType::Speaker);
    assert_eq!(audio.ports[0].ms12_audio_profiles.len(), 4);
    assert_eq!(audio.ports[0].dialog_enhancement.map(|r| r.max), Some(16));
    assert_eq!(audio.ports[2].type_id, AudioPortType::HdmiArc);

    let video_port = config.video_port.as_ref().unwrap();
    assert_eq!(video_port.ports.len(), 1);
    assert_eq!(video_port.ports[0].default_resolution.as_str(), "2160p60");
    assert_eq!(video_port.ports[0].supported_resolutions.len(), 2);

    let video_device = config.video_device.as_ref().unwrap();
    let device = &video_device.devices[0];
    assert_eq!(device.supported_display_framerates.len(), 4);
    assert_eq!(device.supported_display_framerates[2].as_str(), "1920x1080px59.94");
    assert!(device.codec_info.is_none());
    assert!(device.supported_dfcs.is_empty());
}

#[test]
fn test_source_profile_tables() {
    let config = parse(SOURCE_PROFILE).unwrap();

    assert_eq!(config.device_class, Some(DeviceClass::Source));
    assert!(config.has(ModuleMask::AUDIO_PORT));
    assert!(config.extended_enums(ModuleMask::VIDEO_DEVICE));

    let video_port = config.video_port.as_ref().unwrap();
    assert_eq!(video_port.ports[0].supported_resolutions.len(), 4);
    assert_eq!(video_port.ports[0].default_resolution.as_str(), "1080p60");

    let device = &config.video_device.as_ref().unwrap().devices[0];
    assert_eq!(device.supported_dfcs.len(), 3);
    let codec = device.codec_info.expect("source decoders carry codec info");
    assert_eq!(codec.num_entries, 1);
    assert!(device.supported_display_framerates.is_empty());
}

#[test]
fn test_profile_file_round_trip() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    file.write_all(SOURCE_PROFILE.as_bytes()).unwrap();

    let store = ProfileStore::load(file.path()).unwrap();
    assert_eq!(store.source(), Some(file.path()));

    let from_file = parse_configuration(&store).unwrap();
    let from_text = parse(SOURCE_PROFILE).unwrap();
    assert_eq!(from_file, from_text);
    assert_eq!(from_file.fingerprint(), from_text.fingerprint());
}

#[test]
fn test_json_profile_matches_toml() {
    let json = r#"{
        "dsVideoDevice": {
            "Type": "sink",
            "Name": "Panel decoder",
            "NumVideoDevices": 1,
            "features": { "extendedEnumsSupported": true },
            "Device": {
                "1": {
                    "DefaultDFC": 0,
                    "HDRCapabilities": 1,
                    "SupportedVideoCodingFormats": 3,
                    "SupportedDisplayFramerate": ["1920x1080px60"]
                }
            }
        }
    }"#;
    let toml = r#"
[dsVideoDevice]
Type = "sink"
Name = "Panel decoder"
NumVideoDevices = 1

[dsVideoDevice.features]
extendedEnumsSupported = true

[dsVideoDevice.Device.1]
DefaultDFC = 0
HDRCapabilities = 1
SupportedVideoCodingFormats = 3
SupportedDisplayFramerate = ["1920x1080px60"]
"#;

    let from_json = parse_configuration(&ProfileStore::from_json_str(json).unwrap()).unwrap();
    assert_eq!(from_json, parse(toml).unwrap());
    assert_eq!(from_json.modules, ModuleMask::VIDEO_DEVICE);
}

#[test]
fn test_failing_subsystem_is_named_with_parsed_ones() {
    let broken = SINK_PROFILE.replace("NumVideoDevices = 1", "NumVideoDevices = 9");
    let err = parse(&broken).unwrap_err();

    match &err {
        ConfigError::Subsystem { module, parsed, .. } => {
            assert_eq!(*module, "dsVideoDevice");
            assert_eq!(parsed, &vec!["dsAudio"]);
        }
        other => panic!("expected a subsystem error, got {other:?}"),
    }
    assert!(matches!(err.root_cause(), ConfigError::CapacityExceeded { count: 9, .. }));
    assert!(err.to_string().contains("dsVideoDevice"));
}

#[test]
fn test_mixed_device_classes_rejected() {
    let mixed = SINK_PROFILE.replacen("[dsVideoPort]\nType = \"sink\"", "[dsVideoPort]\nType = \"source\"", 1);
    assert_ne!(mixed, SINK_PROFILE);

    let err = parse(&mixed).unwrap_err();
    assert!(matches!(err.root_cause(), ConfigError::ConflictingDeviceClass { .. }), "{err}");
}

#[test]
fn test_unknown_device_type_rejected() {
    let bad = SINK_PROFILE.replacen("Type = \"sink\"", "Type = \"hybrid\"", 1);
    let err = parse(&bad).unwrap_err();
    assert!(
        matches!(err.root_cause(), ConfigError::UnknownDeviceType { module: "dsAudio", .. }),
        "{err}"
    );
}

#[test]
fn test_presence_only_profile() {
    let config = parse("[dsFPD]\nType = \"sink\"\n\n[dsHdmiIn]\n").unwrap();
    assert_eq!(config.modules, ModuleMask::FPD | ModuleMask::HDMI_IN);
    assert_eq!(config.device_class, None);
    assert!(config.audio.is_none());
}
