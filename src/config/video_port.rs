// src/config/video_port.rs
//! Video port capability table

use crate::config::constants::video_port::*;
use crate::config::device_class::DeviceClass;
use crate::config::fields::FieldReader;
use crate::config::key_path::{KeyPath, VIDEO_PORT};
use crate::config::ConfigError;
use crate::hal::types::*;
use crate::profile::ProfileStore;
use arrayvec::{ArrayString, ArrayVec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One video mode a port can output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolutionDescriptor {
    pub name: ArrayString<RESOLUTION_NAME_SIZE>,
    pub pixel_resolution: PixelResolution,
    pub aspect_ratio: AspectRatio,
    pub stereo_scopic_mode: StereoScopicMode,
    pub frame_rate: FrameRate,
    pub interlaced: bool,
}

/// Static description of one video output port.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoPortDescriptor {
    pub type_id: VideoPortType,
    pub index: u32,
    pub port_name: ArrayString<PORT_NAME_SIZE>,
    pub dtcp_supported: bool,
    pub hdcp_supported: bool,
    pub supported_resolutions: ArrayVec<ResolutionDescriptor, MAX_RESOLUTIONS>,
    pub default_resolution: ArrayString<RESOLUTION_NAME_SIZE>,
    pub colorspace: ColorSpace,
    pub display_surround: bool,
    pub surround_mode: SurroundMode,
    pub supported_tv_resolutions: TvResolutions,
    pub hdr_capabilities: HdrCapabilities,
    pub hdcp_protocol_version: HdcpProtocolVersion,
    pub quantization_range: QuantizationRange,
    pub matrix_coefficients: MatrixCoefficients,
}

impl VideoPortDescriptor {
    /// The supported resolution named by `default_resolution`.
    pub fn default_resolution(&self) -> Option<&ResolutionDescriptor> {
        self.resolution(&self.default_resolution)
    }

    pub fn resolution(&self, name: &str) -> Option<&ResolutionDescriptor> {
        self.supported_resolutions
            .iter()
            .find(|res| res.name.as_str() == name)
    }
}

/// Video port subsystem capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPortConfig {
    pub device_class: DeviceClass,
    pub device_name: ArrayString<DEVICE_NAME_SIZE>,
    pub color_depth: ColorDepth,
    pub extended_enums_supported: bool,
    pub ports: Vec<VideoPortDescriptor>,
}

impl VideoPortConfig {
    pub const MODULE: &'static str = VIDEO_PORT.root;

    /// Populate the video port table from the profile.
    ///
    /// The device type and the device name are required.
    pub fn parse(store: &ProfileStore) -> Result<Self, ConfigError> {
        let reader = FieldReader::new(store, Self::MODULE);

        let port_count = reader.count(&VIDEO_PORT.field("Number_of_ports"), MAX_PORTS)?;
        let color_depth = ColorDepth::from_bits_retain(u32::from(
            reader.u16(&VIDEO_PORT.field("color_depth")),
        ));

        let mut ports = Vec::new();
        ports
            .try_reserve_exact(port_count)
            .map_err(|_| ConfigError::Allocation {
                module: Self::MODULE,
                count: port_count,
            })?;

        let device_class = DeviceClass::resolve(store, &VIDEO_PORT)?;
        let device_name = reader.required_name::<DEVICE_NAME_SIZE>(&VIDEO_PORT.field("Name"))?;
        let extended_enums_supported =
            reader.bool(&VIDEO_PORT.feature("extendedEnumsSupported"));

        for position in 0..port_count {
            ports.push(parse_port(&reader, &VIDEO_PORT.instance(position))?);
        }

        info!(
            module = Self::MODULE,
            class = %device_class,
            ports = ports.len(),
            "video port configuration parsed"
        );

        Ok(Self {
            device_class,
            device_name,
            color_depth,
            extended_enums_supported,
            ports,
        })
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn find_port(&self, type_id: VideoPortType, index: u32) -> Option<&VideoPortDescriptor> {
        self.ports
            .iter()
            .find(|port| port.type_id == type_id && port.index == index)
    }

    /// Release the port table. Safe to call repeatedly.
    pub fn term(&mut self) {
        self.ports = Vec::new();
    }
}

fn parse_port(reader: &FieldReader<'_>, port: &KeyPath) -> Result<VideoPortDescriptor, ConfigError> {
    let mut desc = VideoPortDescriptor {
        type_id: reader.enumerated(&port.field("Typeid")),
        index: reader.u32(&port.field("Index")),
        port_name: reader.name(&port.field("Name")),
        dtcp_supported: reader.bool(&port.field("dtcp_supported")),
        hdcp_supported: reader.bool(&port.field("hdcp_supported")),
        ..Default::default()
    };

    let resolution_count =
        reader.count(&port.field("numSupportedResolutions"), MAX_RESOLUTIONS)?;

    desc.default_resolution = reader.name(&port.field("defaultResolution"));
    desc.colorspace = reader.enumerated(&port.field("colorspaces"));
    desc.display_surround = reader.bool(&port.field("DisplaySurround"));
    desc.surround_mode = reader.enumerated(&port.field("SurroundMode"));
    desc.supported_tv_resolutions = reader.mask(&port.field("Supported_tv_resolutions_capabilities"));
    desc.hdr_capabilities = reader.mask(&port.field("hdr_capabilities"));
    desc.hdcp_protocol_version = reader.enumerated(&port.field("hdcp_protocol_version"));
    desc.quantization_range = reader.enumerated(&port.field("quantization_ranges"));
    desc.matrix_coefficients = reader.enumerated(&port.field("matrix_coefficients"));

    desc.supported_resolutions.extend((0..resolution_count).map(|j| {
        let res = port.item("supportedResolutions", j);
        ResolutionDescriptor {
            name: reader.name(&res.field("name")),
            pixel_resolution: reader.enumerated(&res.field("pixelResolution")),
            aspect_ratio: reader.enumerated(&res.field("aspectRatio")),
            stereo_scopic_mode: reader.enumerated(&res.field("stereoScopicMode")),
            frame_rate: reader.enumerated(&res.field("frameRate")),
            interlaced: reader.bool(&res.field("interlaced")),
        }
    }));

    debug!(
        module = VideoPortConfig::MODULE,
        key = %port,
        type_id = ?desc.type_id,
        index = desc.index,
        resolutions = desc.supported_resolutions.len(),
        "video port parsed"
    );
    Ok(desc)
}
