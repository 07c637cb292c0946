// src/config/video_device.rs
//! Video device (decoder) capability table

use crate::config::constants::video_device::*;
use crate::config::device_class::DeviceClass;
use crate::config::fields::FieldReader;
use crate::config::key_path::{KeyPath, VIDEO_DEVICE};
use crate::config::ConfigError;
use crate::hal::traits::VideoCodecInfo;
use crate::hal::types::*;
use crate::profile::ProfileStore;
use arrayvec::{ArrayString, ArrayVec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Static description of one decoder.
///
/// Zoom modes and codec info only exist on source platforms, display frame
/// rates only on sinks; the other side's fields stay empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoDeviceDescriptor {
    pub supported_dfcs: ArrayVec<VideoZoom, MAX_DFCS>,
    pub default_dfc: VideoZoom,
    pub hdr_capabilities: HdrCapabilities,
    pub supported_video_coding_formats: VideoCodingFormats,
    pub supported_display_framerates: ArrayVec<ArrayString<FRAMERATE_NAME_SIZE>, MAX_DISPLAY_FRAMERATES>,
    pub codec_info: Option<VideoCodecInfo>,
}

/// Video device subsystem capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDeviceConfig {
    pub device_class: DeviceClass,
    pub device_name: ArrayString<DEVICE_NAME_SIZE>,
    pub extended_enums_supported: bool,
    pub devices: Vec<VideoDeviceDescriptor>,
}

impl VideoDeviceConfig {
    pub const MODULE: &'static str = VIDEO_DEVICE.root;

    /// Populate the decoder table from the profile.
    ///
    /// The device type and name are required. On sinks every declared display
    /// frame rate must be a readable string.
    pub fn parse(store: &ProfileStore) -> Result<Self, ConfigError> {
        let reader = FieldReader::new(store, Self::MODULE);

        let device_count = usize::from(reader.u16(&VIDEO_DEVICE.field("NumVideoDevices")));
        let device_count =
            reader.bounded(&VIDEO_DEVICE.field("NumVideoDevices"), device_count, MAX_DEVICES)?;

        let device_class = DeviceClass::resolve(store, &VIDEO_DEVICE)?;
        let device_name = reader.required_name::<DEVICE_NAME_SIZE>(&VIDEO_DEVICE.field("Name"))?;
        let extended_enums_supported =
            reader.bool(&VIDEO_DEVICE.feature("extendedEnumsSupported"));

        let mut devices = Vec::new();
        devices
            .try_reserve_exact(device_count)
            .map_err(|_| ConfigError::Allocation {
                module: Self::MODULE,
                count: device_count,
            })?;

        for position in 0..device_count {
            let device = VIDEO_DEVICE.instance(position);
            devices.push(parse_device(&reader, &device, device_class)?);
        }

        info!(
            module = Self::MODULE,
            class = %device_class,
            devices = devices.len(),
            "video device configuration parsed"
        );

        Ok(Self {
            device_class,
            device_name,
            extended_enums_supported,
            devices,
        })
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Release the device table. Safe to call repeatedly.
    pub fn term(&mut self) {
        self.devices = Vec::new();
    }
}

fn parse_device(
    reader: &FieldReader<'_>,
    device: &KeyPath,
    class: DeviceClass,
) -> Result<VideoDeviceDescriptor, ConfigError> {
    let mut desc = VideoDeviceDescriptor::default();

    if class.is_source() {
        let dfcs = device.field("SupportedDFCs");
        let count = reader.store().list_count(dfcs.as_str());
        let count = reader.bounded(&dfcs, count, MAX_DFCS)?;
        desc.supported_dfcs
            .extend((0..count).map(|j| reader.enumerated(&device.item("SupportedDFCs", j))));
    }

    desc.default_dfc = reader.enumerated(&device.field("DefaultDFC"));
    desc.hdr_capabilities = reader.mask(&device.field("HDRCapabilities"));
    desc.supported_video_coding_formats = reader.mask(&device.field("SupportedVideoCodingFormats"));

    if class.is_sink() {
        let rates = device.field("SupportedDisplayFramerate");
        let count = reader.store().list_count(rates.as_str());
        let count = reader.bounded(&rates, count, MAX_DISPLAY_FRAMERATES)?;
        for j in 0..count {
            let entry = device.item("SupportedDisplayFramerate", j);
            let rate = reader.required_name::<FRAMERATE_NAME_SIZE>(&entry)?;
            desc.supported_display_framerates.push(rate);
        }
    }

    if class.is_source() {
        let info = device.field("VideoCodecInfo");
        let num_entries = reader.u32(&info.field("num_entries"));
        reader.bounded(
            &info.field("num_entries"),
            num_entries as usize,
            MAX_CODEC_ENTRIES as usize,
        )?;
        let codec = info.field("VideoCodec0");
        desc.codec_info = Some(VideoCodecInfo {
            num_entries,
            level: reader.f32(&codec.field("level")),
            profile: reader.mask(&codec.field("profile")),
        });
    }

    debug!(
        module = VideoDeviceConfig::MODULE,
        key = %device,
        dfcs = desc.supported_dfcs.len(),
        framerates = desc.supported_display_framerates.len(),
        "video device parsed"
    );
    Ok(desc)
}
