// src/config/constants.rs
//! Capacities of the capability tables and profile string buffers

/// Audio subsystem limits
pub mod audio {
    pub const MAX_PORTS: usize = 16;
    pub const DEVICE_NAME_SIZE: usize = 64;
    pub const PORT_NAME_SIZE: usize = 32;
    /// One entry per `AudioCompression` value
    pub const MAX_COMPRESSIONS: usize = 4;
    /// One entry per `StereoMode` value
    pub const MAX_STEREO_MODES: usize = 7;
    pub const MAX_MS12_PROFILES: usize = 10;
    pub const MS12_PROFILE_NAME_SIZE: usize = 32;
}

/// Video port subsystem limits
pub mod video_port {
    pub const MAX_PORTS: usize = 16;
    pub const DEVICE_NAME_SIZE: usize = 64;
    pub const PORT_NAME_SIZE: usize = 64;
    pub const MAX_RESOLUTIONS: usize = 32;
    pub const RESOLUTION_NAME_SIZE: usize = 32;
}

/// Video device subsystem limits
pub mod video_device {
    pub const MAX_DEVICES: usize = 4;
    pub const DEVICE_NAME_SIZE: usize = 64;
    /// One entry per settable `VideoZoom` value
    pub const MAX_DFCS: usize = 12;
    pub const MAX_DISPLAY_FRAMERATES: usize = 20;
    pub const FRAMERATE_NAME_SIZE: usize = 64;
    pub const MAX_CODEC_ENTRIES: u32 = 10;
}

/// Device type string buffer, fits "source" or "sink"
pub const DEVICE_TYPE_SIZE: usize = 8;

/// Environment prefix for harness settings overrides
pub const ENV_PREFIX: &str = "DSHAL";

/// Harness settings defaults
pub mod settings {
    pub const DEFAULT_PROFILE_PATH: &str = "deviceSettings.toml";
    pub const DEFAULT_LOG_FILTER: &str = "info";
    pub const DEFAULT_BACKEND: &str = "simulated";
}
