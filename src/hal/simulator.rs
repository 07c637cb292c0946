// src/hal/simulator.rs
//! In-process device settings HAL driven by the capability tables
//!
//! [`SimulatedHal`] answers every getter from a [`DeviceSettingsConfig`] and
//! keeps the values written by setters until the next init. It follows the
//! status rules a conforming platform HAL must follow, so the bundled suites
//! pass against it for any well-formed profile. Individual calls can be forced
//! to fail with [`SimulatedHal::inject_fault`] to exercise the runner.

use crate::config::{
    AudioPortDescriptor, DeviceClass, DeviceSettingsConfig, ModuleMask, ResolutionDescriptor,
    VideoDeviceDescriptor, VideoPortDescriptor,
};
use crate::hal::status::{DsStatus, HalResult};
use crate::hal::traits::*;
use crate::hal::types::*;
use std::collections::HashMap;
use tracing::{debug, trace};

const AUDIO_HANDLE_BASE: isize = 0x100;
const VIDEO_PORT_HANDLE_BASE: isize = 0x200;
const VIDEO_DEVICE_HANDLE_BASE: isize = 0x300;

/// Statuses a subsystem returns when extended status codes are disabled.
#[derive(Debug, Clone, Copy)]
struct LegacyCodes {
    /// Init while already initialized
    reinit: DsStatus,
    /// Any call before init
    uninit: DsStatus,
}

#[derive(Debug)]
struct Lifecycle {
    initialized: bool,
    extended: bool,
    legacy: LegacyCodes,
}

impl Lifecycle {
    fn new(extended: bool, legacy: LegacyCodes) -> Self {
        Self {
            initialized: false,
            extended,
            legacy,
        }
    }

    fn init(&mut self) -> HalResult<()> {
        if self.initialized {
            return Self::status(self.extended, DsStatus::AlreadyInitialized, self.legacy.reinit);
        }
        self.initialized = true;
        Ok(())
    }

    fn term(&mut self) -> HalResult<()> {
        if !self.initialized {
            return Self::status(self.extended, DsStatus::NotInitialized, DsStatus::None);
        }
        self.initialized = false;
        Ok(())
    }

    fn reject<T: Default>(&self) -> Option<HalResult<T>> {
        self.reject_with(self.legacy.uninit)
    }

    /// The early return for a call made before init, if any.
    fn reject_with<T: Default>(&self, legacy: DsStatus) -> Option<HalResult<T>> {
        if self.initialized {
            None
        } else {
            Some(Self::status(self.extended, DsStatus::NotInitialized, legacy))
        }
    }

    fn status<T: Default>(extended: bool, enhanced: DsStatus, legacy: DsStatus) -> HalResult<T> {
        match if extended { enhanced } else { legacy } {
            DsStatus::None => Ok(T::default()),
            status => Err(status),
        }
    }
}

macro_rules! enter {
    ($self:ident . $sub:ident, $call:literal) => {
        enter!(@check $self, $sub, $call, $self.$sub.lifecycle.reject())
    };
    ($self:ident . $sub:ident, $call:literal, legacy = $legacy:expr) => {
        enter!(@check $self, $sub, $call, $self.$sub.lifecycle.reject_with($legacy))
    };
    (@check $self:ident, $sub:ident, $call:literal, $reject:expr) => {{
        trace!(call = $call, "hal call");
        if let Some(early) = $reject {
            return early;
        }
        if let Some(&status) = $self.faults.get($call) {
            return Err(status);
        }
    }};
}

fn slot(handle: PortHandle, base: isize, len: usize) -> HalResult<usize> {
    handle
        .0
        .checked_sub(base)
        .and_then(|offset| usize::try_from(offset).ok())
        .filter(|&index| index < len)
        .ok_or(DsStatus::InvalidParam)
}

fn handle_for(base: isize, index: usize) -> PortHandle {
    PortHandle(base + index as isize)
}

/// `<width>x<height>px<rate>`, e.g. `3840x2160px59.94`.
fn is_framerate_name(name: &str) -> bool {
    let Some((dimensions, rate)) = name.split_once("px") else {
        return false;
    };
    let Some((width, height)) = dimensions.split_once('x') else {
        return false;
    };
    width.parse::<u32>().is_ok() && height.parse::<u32>().is_ok() && rate.parse::<f32>().is_ok()
}

#[derive(Debug, Clone)]
struct AudioPortState {
    compression: AudioCompression,
    stereo_mode: StereoMode,
    stereo_auto: bool,
    dialog_level: i32,
}

impl AudioPortState {
    fn from_descriptor(port: &AudioPortDescriptor) -> Self {
        Self {
            compression: port.compressions.first().copied().unwrap_or_default(),
            stereo_mode: port.stereo_modes.first().copied().unwrap_or_default(),
            stereo_auto: port.stereo_auto_mode,
            dialog_level: port.dialog_enhancement.map_or(0, |range| i32::from(range.min)),
        }
    }
}

#[derive(Debug)]
struct AudioState {
    lifecycle: Lifecycle,
    capabilities: AudioCapabilities,
    ports: Vec<AudioPortDescriptor>,
    current: Vec<AudioPortState>,
}

impl AudioState {
    fn slot(&self, handle: PortHandle) -> HalResult<usize> {
        slot(handle, AUDIO_HANDLE_BASE, self.ports.len())
    }

    fn reset(&mut self) {
        self.current = self.ports.iter().map(AudioPortState::from_descriptor).collect();
    }
}

#[derive(Debug)]
struct VideoPortState {
    lifecycle: Lifecycle,
    class: Option<DeviceClass>,
    color_depth: ColorDepth,
    ports: Vec<VideoPortDescriptor>,
    current: Vec<ResolutionDescriptor>,
}

impl VideoPortState {
    fn slot(&self, handle: PortHandle) -> HalResult<usize> {
        slot(handle, VIDEO_PORT_HANDLE_BASE, self.ports.len())
    }

    fn reset(&mut self) {
        self.current = self
            .ports
            .iter()
            .map(|port| port.default_resolution().cloned().unwrap_or_default())
            .collect();
    }

    fn is_sink(&self) -> bool {
        self.class.is_some_and(DeviceClass::is_sink)
    }
}

#[derive(Debug, Clone)]
struct VideoDeviceCurrent {
    dfc: VideoZoom,
    framerate: String,
}

#[derive(Debug)]
struct VideoDeviceState {
    lifecycle: Lifecycle,
    class: Option<DeviceClass>,
    devices: Vec<VideoDeviceDescriptor>,
    current: Vec<VideoDeviceCurrent>,
}

impl VideoDeviceState {
    fn slot(&self, handle: PortHandle) -> HalResult<usize> {
        slot(handle, VIDEO_DEVICE_HANDLE_BASE, self.devices.len())
    }

    fn reset(&mut self) {
        self.current = self
            .devices
            .iter()
            .map(|device| VideoDeviceCurrent {
                dfc: device.default_dfc,
                framerate: device
                    .supported_display_framerates
                    .first()
                    .map(|rate| rate.to_string())
                    .unwrap_or_default(),
            })
            .collect();
    }

    fn is_source(&self) -> bool {
        self.class.is_some_and(DeviceClass::is_source)
    }

    fn is_sink(&self) -> bool {
        self.class.is_some_and(DeviceClass::is_sink)
    }
}

/// Reference HAL backend seeded from parsed capability tables.
#[derive(Debug)]
pub struct SimulatedHal {
    audio: AudioState,
    video_port: VideoPortState,
    video_device: VideoDeviceState,
    faults: HashMap<&'static str, DsStatus>,
}

impl SimulatedHal {
    pub const NAME: &'static str = "simulated";

    /// Build a backend that reports exactly what `config` declares.
    pub fn new(config: &DeviceSettingsConfig) -> Self {
        let audio = config.audio.as_ref();
        let video_port = config.video_port.as_ref();
        let video_device = config.video_device.as_ref();

        let mut hal = Self {
            audio: AudioState {
                lifecycle: Lifecycle::new(
                    config.extended_enums(ModuleMask::AUDIO_PORT),
                    LegacyCodes {
                        reinit: DsStatus::General,
                        uninit: DsStatus::InvalidParam,
                    },
                ),
                capabilities: audio.map(|a| a.capabilities).unwrap_or_default(),
                ports: audio.map(|a| a.ports.clone()).unwrap_or_default(),
                current: Vec::new(),
            },
            video_port: VideoPortState {
                lifecycle: Lifecycle::new(
                    config.extended_enums(ModuleMask::VIDEO_PORT),
                    LegacyCodes {
                        reinit: DsStatus::General,
                        uninit: DsStatus::InvalidParam,
                    },
                ),
                class: video_port.map(|v| v.device_class),
                color_depth: video_port.map(|v| v.color_depth).unwrap_or_default(),
                ports: video_port.map(|v| v.ports.clone()).unwrap_or_default(),
                current: Vec::new(),
            },
            video_device: VideoDeviceState {
                lifecycle: Lifecycle::new(
                    config.extended_enums(ModuleMask::VIDEO_DEVICE),
                    LegacyCodes {
                        reinit: DsStatus::None,
                        uninit: DsStatus::None,
                    },
                ),
                class: video_device.map(|v| v.device_class),
                devices: video_device.map(|v| v.devices.clone()).unwrap_or_default(),
                current: Vec::new(),
            },
            faults: HashMap::new(),
        };
        hal.audio.reset();
        hal.video_port.reset();
        hal.video_device.reset();

        debug!(
            audio_ports = hal.audio.ports.len(),
            video_ports = hal.video_port.ports.len(),
            video_devices = hal.video_device.devices.len(),
            "simulated HAL ready"
        );
        hal
    }

    /// Make every later call to `call` (the trait method name) fail with `status`.
    pub fn inject_fault(&mut self, call: &'static str, status: DsStatus) {
        self.faults.insert(call, status);
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }
}

impl AudioPortHal for SimulatedHal {
    fn audio_port_init(&mut self) -> HalResult<()> {
        self.audio.lifecycle.init()?;
        self.audio.reset();
        Ok(())
    }

    fn audio_port_term(&mut self) -> HalResult<()> {
        self.audio.lifecycle.term()
    }

    fn get_audio_port(&mut self, port_type: AudioPortType, index: i32) -> HalResult<PortHandle> {
        enter!(self.audio, "get_audio_port", legacy = DsStatus::None);
        let index = u32::try_from(index).map_err(|_| DsStatus::InvalidParam)?;
        self.audio
            .ports
            .iter()
            .position(|port| port.type_id == port_type && port.index == index)
            .map(|i| handle_for(AUDIO_HANDLE_BASE, i))
            .ok_or(DsStatus::InvalidParam)
    }

    fn get_audio_compression(&mut self, handle: PortHandle) -> HalResult<AudioCompression> {
        enter!(self.audio, "get_audio_compression");
        let i = self.audio.slot(handle)?;
        if self.audio.ports[i].compressions.is_empty() {
            return Err(DsStatus::OperationNotSupported);
        }
        Ok(self.audio.current[i].compression)
    }

    fn set_audio_compression(&mut self, handle: PortHandle, compression: AudioCompression) -> HalResult<()> {
        enter!(self.audio, "set_audio_compression");
        let i = self.audio.slot(handle)?;
        let supported = &self.audio.ports[i].compressions;
        if supported.is_empty() {
            return Err(DsStatus::OperationNotSupported);
        }
        if !supported.contains(&compression) {
            return Err(DsStatus::InvalidParam);
        }
        self.audio.current[i].compression = compression;
        Ok(())
    }

    fn get_stereo_mode(&mut self, handle: PortHandle) -> HalResult<StereoMode> {
        enter!(self.audio, "get_stereo_mode");
        let i = self.audio.slot(handle)?;
        if self.audio.ports[i].stereo_modes.is_empty() {
            return Err(DsStatus::OperationNotSupported);
        }
        Ok(self.audio.current[i].stereo_mode)
    }

    fn set_stereo_mode(&mut self, handle: PortHandle, mode: StereoMode) -> HalResult<()> {
        enter!(self.audio, "set_stereo_mode");
        let i = self.audio.slot(handle)?;
        let supported = &self.audio.ports[i].stereo_modes;
        if supported.is_empty() {
            return Err(DsStatus::OperationNotSupported);
        }
        if !supported.contains(&mode) {
            return Err(DsStatus::InvalidParam);
        }
        self.audio.current[i].stereo_mode = mode;
        Ok(())
    }

    fn get_stereo_auto(&mut self, handle: PortHandle) -> HalResult<bool> {
        enter!(self.audio, "get_stereo_auto");
        let i = self.audio.slot(handle)?;
        Ok(self.audio.current[i].stereo_auto)
    }

    fn set_stereo_auto(&mut self, handle: PortHandle, auto_mode: bool) -> HalResult<()> {
        enter!(self.audio, "set_stereo_auto");
        let i = self.audio.slot(handle)?;
        if !self.audio.ports[i].stereo_auto_mode {
            return Err(DsStatus::OperationNotSupported);
        }
        self.audio.current[i].stereo_auto = auto_mode;
        Ok(())
    }

    fn get_dialog_enhancement(&mut self, handle: PortHandle) -> HalResult<i32> {
        enter!(self.audio, "get_dialog_enhancement");
        let i = self.audio.slot(handle)?;
        if self.audio.ports[i].dialog_enhancement.is_none() {
            return Err(DsStatus::OperationNotSupported);
        }
        Ok(self.audio.current[i].dialog_level)
    }

    fn set_dialog_enhancement(&mut self, handle: PortHandle, level: i32) -> HalResult<()> {
        enter!(self.audio, "set_dialog_enhancement");
        let i = self.audio.slot(handle)?;
        let range = self.audio.ports[i]
            .dialog_enhancement
            .ok_or(DsStatus::OperationNotSupported)?;
        if !range.contains(level) {
            return Err(DsStatus::InvalidParam);
        }
        self.audio.current[i].dialog_level = level;
        Ok(())
    }

    fn get_ms12_audio_profile_list(&mut self, handle: PortHandle) -> HalResult<Vec<String>> {
        enter!(self.audio, "get_ms12_audio_profile_list");
        let i = self.audio.slot(handle)?;
        let profiles = &self.audio.ports[i].ms12_audio_profiles;
        if profiles.is_empty() {
            return Err(DsStatus::OperationNotSupported);
        }
        Ok(profiles.iter().map(|name| name.to_string()).collect())
    }

    fn get_supported_arc_types(&mut self, handle: PortHandle) -> HalResult<ArcTypes> {
        enter!(self.audio, "get_supported_arc_types");
        let i = self.audio.slot(handle)?;
        let port = &self.audio.ports[i];
        if port.type_id != AudioPortType::HdmiArc {
            return Err(DsStatus::OperationNotSupported);
        }
        Ok(port.arc_type)
    }

    fn get_sink_device_atmos_capability(&mut self, handle: PortHandle) -> HalResult<AtmosCapability> {
        enter!(self.audio, "get_sink_device_atmos_capability");
        let i = self.audio.slot(handle)?;
        Ok(self.audio.ports[i].atmos_capability)
    }

    fn is_audio_ms12_decode(&mut self, handle: PortHandle) -> HalResult<bool> {
        enter!(self.audio, "is_audio_ms12_decode");
        let i = self.audio.slot(handle)?;
        Ok(self.audio.ports[i].is_ms12_decode)
    }

    fn is_audio_ms11_decode(&mut self, handle: PortHandle) -> HalResult<bool> {
        enter!(self.audio, "is_audio_ms11_decode");
        let i = self.audio.slot(handle)?;
        Ok(self.audio.ports[i].is_ms11_decode)
    }

    fn get_audio_capabilities(&mut self, handle: PortHandle) -> HalResult<AudioCapabilities> {
        enter!(self.audio, "get_audio_capabilities");
        self.audio.slot(handle)?;
        Ok(self.audio.capabilities)
    }

    fn get_ms12_capabilities(&mut self, handle: PortHandle) -> HalResult<Ms12Capabilities> {
        enter!(self.audio, "get_ms12_capabilities");
        let i = self.audio.slot(handle)?;
        Ok(self.audio.ports[i].ms12_capabilities)
    }
}

impl VideoPortHal for SimulatedHal {
    fn video_port_init(&mut self) -> HalResult<()> {
        self.video_port.lifecycle.init()?;
        self.video_port.reset();
        Ok(())
    }

    fn video_port_term(&mut self) -> HalResult<()> {
        self.video_port.lifecycle.term()
    }

    fn get_video_port(&mut self, port_type: VideoPortType, index: i32) -> HalResult<PortHandle> {
        enter!(self.video_port, "get_video_port", legacy = DsStatus::None);
        let index = u32::try_from(index).map_err(|_| DsStatus::InvalidParam)?;
        self.video_port
            .ports
            .iter()
            .position(|port| port.type_id == port_type && port.index == index)
            .map(|i| handle_for(VIDEO_PORT_HANDLE_BASE, i))
            .ok_or(DsStatus::InvalidParam)
    }

    fn is_display_surround(&mut self, handle: PortHandle) -> HalResult<bool> {
        enter!(self.video_port, "is_display_surround");
        let i = self.video_port.slot(handle)?;
        Ok(self.video_port.ports[i].display_surround)
    }

    fn get_surround_mode(&mut self, handle: PortHandle) -> HalResult<SurroundMode> {
        enter!(self.video_port, "get_surround_mode");
        let i = self.video_port.slot(handle)?;
        if self.video_port.is_sink() {
            return Err(DsStatus::OperationNotSupported);
        }
        Ok(self.video_port.ports[i].surround_mode)
    }

    fn set_resolution(&mut self, handle: PortHandle, resolution: &ResolutionDescriptor) -> HalResult<()> {
        enter!(self.video_port, "set_resolution");
        let i = self.video_port.slot(handle)?;
        let declared = self.video_port.ports[i]
            .resolution(&resolution.name)
            .filter(|declared| *declared == resolution)
            .cloned()
            .ok_or(DsStatus::InvalidParam)?;
        if self.video_port.is_sink() {
            return Err(DsStatus::OperationNotSupported);
        }
        self.video_port.current[i] = declared;
        Ok(())
    }

    fn get_resolution(&mut self, handle: PortHandle) -> HalResult<ResolutionDescriptor> {
        enter!(self.video_port, "get_resolution");
        let i = self.video_port.slot(handle)?;
        Ok(self.video_port.current[i].clone())
    }

    fn get_hdcp_protocol(&mut self, handle: PortHandle) -> HalResult<HdcpProtocolVersion> {
        enter!(self.video_port, "get_hdcp_protocol");
        let i = self.video_port.slot(handle)?;
        Ok(self.video_port.ports[i].hdcp_protocol_version)
    }

    fn get_tv_hdr_capabilities(&mut self, handle: PortHandle) -> HalResult<HdrCapabilities> {
        enter!(self.video_port, "get_tv_hdr_capabilities");
        let i = self.video_port.slot(handle)?;
        Ok(self.video_port.ports[i].hdr_capabilities)
    }

    fn supported_tv_resolutions(&mut self, handle: PortHandle) -> HalResult<TvResolutions> {
        enter!(self.video_port, "supported_tv_resolutions");
        let i = self.video_port.slot(handle)?;
        Ok(self.video_port.ports[i].supported_tv_resolutions)
    }

    fn get_color_depth(&mut self, handle: PortHandle) -> HalResult<ColorDepth> {
        enter!(self.video_port, "get_color_depth");
        self.video_port.slot(handle)?;
        Ok(self.video_port.color_depth)
    }

    fn get_color_space(&mut self, handle: PortHandle) -> HalResult<ColorSpace> {
        enter!(self.video_port, "get_color_space");
        let i = self.video_port.slot(handle)?;
        Ok(self.video_port.ports[i].colorspace)
    }

    fn get_quantization_range(&mut self, handle: PortHandle) -> HalResult<QuantizationRange> {
        enter!(self.video_port, "get_quantization_range");
        let i = self.video_port.slot(handle)?;
        Ok(self.video_port.ports[i].quantization_range)
    }

    fn get_matrix_coefficients(&mut self, handle: PortHandle) -> HalResult<MatrixCoefficients> {
        enter!(self.video_port, "get_matrix_coefficients");
        let i = self.video_port.slot(handle)?;
        Ok(self.video_port.ports[i].matrix_coefficients)
    }
}

impl VideoDeviceHal for SimulatedHal {
    fn video_device_init(&mut self) -> HalResult<()> {
        self.video_device.lifecycle.init()?;
        self.video_device.reset();
        Ok(())
    }

    fn video_device_term(&mut self) -> HalResult<()> {
        self.video_device.lifecycle.term()
    }

    fn get_video_device(&mut self, index: i32) -> HalResult<PortHandle> {
        enter!(self.video_device, "get_video_device");
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.video_device.devices.len())
            .map(|i| handle_for(VIDEO_DEVICE_HANDLE_BASE, i))
            .ok_or(DsStatus::InvalidParam)
    }

    fn set_dfc(&mut self, handle: PortHandle, zoom: VideoZoom) -> HalResult<()> {
        enter!(self.video_device, "set_dfc");
        // Zoom control only exists on source platforms, whatever the handle
        if self.video_device.is_sink() {
            return Err(DsStatus::OperationNotSupported);
        }
        let i = self.video_device.slot(handle)?;
        if !zoom.is_settable() || !self.video_device.devices[i].supported_dfcs.contains(&zoom) {
            return Err(DsStatus::InvalidParam);
        }
        self.video_device.current[i].dfc = zoom;
        Ok(())
    }

    fn get_dfc(&mut self, handle: PortHandle) -> HalResult<VideoZoom> {
        enter!(self.video_device, "get_dfc");
        let i = self.video_device.slot(handle)?;
        if self.video_device.is_sink() {
            return Err(DsStatus::OperationNotSupported);
        }
        Ok(self.video_device.current[i].dfc)
    }

    fn get_hdr_capabilities(&mut self, handle: PortHandle) -> HalResult<HdrCapabilities> {
        enter!(self.video_device, "get_hdr_capabilities");
        let i = self.video_device.slot(handle)?;
        Ok(self.video_device.devices[i].hdr_capabilities)
    }

    fn get_supported_video_coding_formats(&mut self, handle: PortHandle) -> HalResult<VideoCodingFormats> {
        enter!(self.video_device, "get_supported_video_coding_formats");
        let i = self.video_device.slot(handle)?;
        Ok(self.video_device.devices[i].supported_video_coding_formats)
    }

    fn get_video_codec_info(&mut self, handle: PortHandle, codec: VideoCodingFormats) -> HalResult<VideoCodecInfo> {
        enter!(
            self.video_device,
            "get_video_codec_info",
            legacy = DsStatus::OperationNotSupported
        );
        let i = self.video_device.slot(handle)?;
        if codec.bits().count_ones() != 1 || !VideoCodingFormats::all().contains(codec) {
            return Err(DsStatus::InvalidParam);
        }
        if !self.video_device.is_source() {
            return Err(DsStatus::OperationNotSupported);
        }
        let device = &self.video_device.devices[i];
        if !device.supported_video_coding_formats.contains(codec) {
            return Err(DsStatus::OperationNotSupported);
        }
        Ok(device.codec_info.unwrap_or_default())
    }

    fn get_current_display_framerate(&mut self, handle: PortHandle) -> HalResult<String> {
        enter!(self.video_device, "get_current_display_framerate");
        let i = self.video_device.slot(handle)?;
        if !self.video_device.is_sink() {
            return Err(DsStatus::OperationNotSupported);
        }
        Ok(self.video_device.current[i].framerate.clone())
    }

    fn set_display_framerate(&mut self, handle: PortHandle, framerate: &str) -> HalResult<()> {
        enter!(self.video_device, "set_display_framerate");
        let i = self.video_device.slot(handle)?;
        if !is_framerate_name(framerate) {
            return Err(DsStatus::InvalidParam);
        }
        if !self.video_device.is_sink() {
            return Err(DsStatus::OperationNotSupported);
        }
        let supported = self.video_device.devices[i]
            .supported_display_framerates
            .iter()
            .any(|rate| rate.as_str() == framerate);
        if !supported {
            return Err(DsStatus::InvalidParam);
        }
        self.video_device.current[i].framerate = framerate.to_string();
        Ok(())
    }
}

impl DeviceSettingsHal for SimulatedHal {
    fn backend_name(&self) -> &str {
        Self::NAME
    }
}
