// src/hal/traits.rs
//! HAL surface exercised by the conformance suites
//!
//! One trait per subsystem. Every call returns a [`HalResult`]; a backend that
//! wraps a native library maps its `dsError_t` onto [`DsStatus`] and its out
//! parameters onto the `Ok` value.

use crate::config::ResolutionDescriptor;
use crate::hal::status::HalResult;
use crate::hal::types::*;
use serde::{Deserialize, Serialize};

/// Opaque port or device handle handed out by a HAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortHandle(pub isize);

impl PortHandle {
    /// A handle no HAL ever returns.
    pub const INVALID: PortHandle = PortHandle(-1);
}

impl Default for PortHandle {
    fn default() -> Self {
        PortHandle::INVALID
    }
}

/// Audio port HAL (`dsAudio.h`).
pub trait AudioPortHal {
    /// Initialize the audio port subsystem
    fn audio_port_init(&mut self) -> HalResult<()>;

    /// Terminate the audio port subsystem
    fn audio_port_term(&mut self) -> HalResult<()>;

    /// Look up a port by type and per-type index
    fn get_audio_port(&mut self, port_type: AudioPortType, index: i32) -> HalResult<PortHandle>;

    fn get_audio_compression(&mut self, handle: PortHandle) -> HalResult<AudioCompression>;

    fn set_audio_compression(&mut self, handle: PortHandle, compression: AudioCompression) -> HalResult<()>;

    fn get_stereo_mode(&mut self, handle: PortHandle) -> HalResult<StereoMode>;

    fn set_stereo_mode(&mut self, handle: PortHandle, mode: StereoMode) -> HalResult<()>;

    fn get_stereo_auto(&mut self, handle: PortHandle) -> HalResult<bool>;

    fn set_stereo_auto(&mut self, handle: PortHandle, auto_mode: bool) -> HalResult<()>;

    fn get_dialog_enhancement(&mut self, handle: PortHandle) -> HalResult<i32>;

    fn set_dialog_enhancement(&mut self, handle: PortHandle, level: i32) -> HalResult<()>;

    /// Names of the MS12 audio profiles the port supports
    fn get_ms12_audio_profile_list(&mut self, handle: PortHandle) -> HalResult<Vec<String>>;

    fn get_supported_arc_types(&mut self, handle: PortHandle) -> HalResult<ArcTypes>;

    fn get_sink_device_atmos_capability(&mut self, handle: PortHandle) -> HalResult<AtmosCapability>;

    fn is_audio_ms12_decode(&mut self, handle: PortHandle) -> HalResult<bool>;

    fn is_audio_ms11_decode(&mut self, handle: PortHandle) -> HalResult<bool>;

    fn get_audio_capabilities(&mut self, handle: PortHandle) -> HalResult<AudioCapabilities>;

    fn get_ms12_capabilities(&mut self, handle: PortHandle) -> HalResult<Ms12Capabilities>;
}

/// Video port HAL (`dsVideoPort.h`).
pub trait VideoPortHal {
    /// Initialize the video port subsystem
    fn video_port_init(&mut self) -> HalResult<()>;

    /// Terminate the video port subsystem
    fn video_port_term(&mut self) -> HalResult<()>;

    /// Look up a port by type and per-type index
    fn get_video_port(&mut self, port_type: VideoPortType, index: i32) -> HalResult<PortHandle>;

    fn is_display_surround(&mut self, handle: PortHandle) -> HalResult<bool>;

    fn get_surround_mode(&mut self, handle: PortHandle) -> HalResult<SurroundMode>;

    fn set_resolution(&mut self, handle: PortHandle, resolution: &ResolutionDescriptor) -> HalResult<()>;

    fn get_resolution(&mut self, handle: PortHandle) -> HalResult<ResolutionDescriptor>;

    fn get_hdcp_protocol(&mut self, handle: PortHandle) -> HalResult<HdcpProtocolVersion>;

    fn get_tv_hdr_capabilities(&mut self, handle: PortHandle) -> HalResult<HdrCapabilities>;

    fn supported_tv_resolutions(&mut self, handle: PortHandle) -> HalResult<TvResolutions>;

    fn get_color_depth(&mut self, handle: PortHandle) -> HalResult<ColorDepth>;

    fn get_color_space(&mut self, handle: PortHandle) -> HalResult<ColorSpace>;

    fn get_quantization_range(&mut self, handle: PortHandle) -> HalResult<QuantizationRange>;

    fn get_matrix_coefficients(&mut self, handle: PortHandle) -> HalResult<MatrixCoefficients>;
}

/// Decoder codec information returned by [`VideoDeviceHal::get_video_codec_info`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoCodecInfo {
    pub num_entries: u32,
    pub level: f32,
    pub profile: HevcProfiles,
}

/// Video device (decoder) HAL (`dsVideoDevice.h`).
pub trait VideoDeviceHal {
    /// Initialize the video device subsystem
    fn video_device_init(&mut self) -> HalResult<()>;

    /// Terminate the video device subsystem
    fn video_device_term(&mut self) -> HalResult<()>;

    /// Look up a decoder by index
    fn get_video_device(&mut self, index: i32) -> HalResult<PortHandle>;

    fn set_dfc(&mut self, handle: PortHandle, zoom: VideoZoom) -> HalResult<()>;

    fn get_dfc(&mut self, handle: PortHandle) -> HalResult<VideoZoom>;

    fn get_hdr_capabilities(&mut self, handle: PortHandle) -> HalResult<HdrCapabilities>;

    fn get_supported_video_coding_formats(&mut self, handle: PortHandle) -> HalResult<VideoCodingFormats>;

    fn get_video_codec_info(&mut self, handle: PortHandle, codec: VideoCodingFormats) -> HalResult<VideoCodecInfo>;

    fn get_current_display_framerate(&mut self, handle: PortHandle) -> HalResult<String>;

    fn set_display_framerate(&mut self, handle: PortHandle, framerate: &str) -> HalResult<()>;
}

/// A complete device settings HAL as seen by the runner.
pub trait DeviceSettingsHal: AudioPortHal + VideoPortHal + VideoDeviceHal {
    /// Short name of the backend for reports
    fn backend_name(&self) -> &str;
}
