// src/hal/types.rs
//! Enumerations and capability bitmasks shared by the HAL surface and the
//! capability tables.
//!
//! Discriminants are the raw values used by the platform profile and the C
//! headers. Enumerations expose `from_raw`, which rejects anything outside the
//! defined range (including the `_MAX` sentinel). Bitmasks keep unknown bits
//! so that a profile value is never silently narrowed.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Common view of the HAL enumerations, used by the profile readers.
pub trait HalEnum: Sized + Copy + Default + std::fmt::Debug {
    /// Rust name of the enumeration, for diagnostics.
    const TYPE_NAME: &'static str;

    /// Variant for a raw value, `None` outside the defined range.
    fn decode(raw: i64) -> Option<Self>;
}

macro_rules! hal_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            /// Every defined value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Number of defined values, the `_MAX` sentinel of the header.
            pub const COUNT: usize = Self::ALL.len();

            /// Map a raw profile or HAL value onto a variant.
            pub fn from_raw(raw: i64) -> Option<Self> {
                $( if raw == $value as i64 { return Some($name::$variant); } )+
                None
            }

            /// Raw numeric value.
            pub fn raw(self) -> i32 {
                self as i32
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl HalEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn decode(raw: i64) -> Option<Self> {
                $name::from_raw(raw)
            }
        }
    };
}

macro_rules! mask_default {
    ($($name:ident),+ $(,)?) => {
        $(
            impl Default for $name {
                fn default() -> Self {
                    Self::empty()
                }
            }
        )+
    };
}

hal_enum! {
    /// Audio output port type.
    AudioPortType, default = Lr {
        Lr = 0,
        Hdmi = 1,
        Spdif = 2,
        Speaker = 3,
        HdmiArc = 4,
        Headphone = 5,
    }
}

hal_enum! {
    /// Audio dynamic range compression level.
    AudioCompression, default = None {
        None = 0,
        Light = 1,
        Medium = 2,
        Heavy = 3,
    }
}

hal_enum! {
    /// Audio stereo mode.
    StereoMode, default = Unknown {
        Unknown = 0,
        Mono = 1,
        Stereo = 2,
        Surround = 3,
        Passthru = 4,
        Dd = 5,
        DdPlus = 6,
    }
}

hal_enum! {
    /// ATMOS capability of the connected sink.
    AtmosCapability, default = NotSupported {
        NotSupported = 0,
        DdPlusStream = 1,
        AtmosMetadata = 2,
    }
}

hal_enum! {
    /// Audio surround mode reported on a video port.
    SurroundMode, default = None {
        None = 0,
        Dd = 1,
        DdPlus = 2,
    }
}

hal_enum! {
    /// Video output port type.
    VideoPortType, default = Rf {
        Rf = 0,
        Bb = 1,
        SVideo = 2,
        Ieee1394 = 3,
        Dvi = 4,
        Component = 5,
        Hdmi = 6,
        HdmiInput = 7,
        Internal = 8,
    }
}

hal_enum! {
    /// Pixel resolution of a video mode.
    PixelResolution, default = R720x480 {
        R720x480 = 0,
        R720x576 = 1,
        R1280x720 = 2,
        R1366x768 = 3,
        R1920x1080 = 4,
        R3840x2160 = 5,
        R4096x2160 = 6,
    }
}

hal_enum! {
    /// Display aspect ratio.
    AspectRatio, default = R4x3 {
        R4x3 = 0,
        R16x9 = 1,
    }
}

hal_enum! {
    /// Stereoscopic (3D) mode.
    StereoScopicMode, default = Unknown {
        Unknown = 0,
        Mode2d = 1,
        SideBySide3d = 2,
        TopAndBottom3d = 3,
    }
}

hal_enum! {
    /// Video frame rate.
    FrameRate, default = Unknown {
        Unknown = 0,
        Fps24 = 1,
        Fps25 = 2,
        Fps30 = 3,
        Fps60 = 4,
        Fps23_98 = 5,
        Fps29_97 = 6,
        Fps50 = 7,
        Fps59_94 = 8,
    }
}

hal_enum! {
    /// HDCP protocol version.
    HdcpProtocolVersion, default = V1x {
        V1x = 0,
        V2x = 1,
    }
}

hal_enum! {
    /// Output colour space.
    ColorSpace, default = Unknown {
        Unknown = 0,
        Rgb = 1,
        YCbCr422 = 2,
        YCbCr444 = 3,
        YCbCr420 = 4,
        Auto = 5,
    }
}

hal_enum! {
    /// Output quantization range.
    QuantizationRange, default = Unknown {
        Unknown = 0,
        Limited = 1,
        Full = 2,
    }
}

hal_enum! {
    /// Matrix coefficients of the output signal.
    MatrixCoefficients, default = Unknown {
        Unknown = 0,
        Bt709 = 1,
        Bt470_2Bg = 2,
        Smpte170m = 3,
        XvYcc709 = 4,
        EXvYcc601 = 5,
        Bt2020Ncl = 6,
        Bt2020Cl = 7,
        EDviFrRgb = 8,
        EHdmiRgb = 9,
        EFcc = 10,
        ESmpte240m = 11,
        EHdmiFrYCbCr = 12,
    }
}

hal_enum! {
    /// Decoder format conversion (zoom) mode.
    VideoZoom, default = None {
        Unknown = -1,
        None = 0,
        Full = 1,
        Lb16_9 = 2,
        Lb14_9 = 3,
        Cco = 4,
        PanScan = 5,
        Lb2_21_1On4_3 = 6,
        Lb2_21_1On16_9 = 7,
        Platform = 8,
        Zoom16_9 = 9,
        Pillarbox4_3 = 10,
        Wide4_3 = 11,
    }
}

impl VideoZoom {
    /// Modes a HAL may be asked to apply; `Unknown` is report-only.
    pub fn is_settable(self) -> bool {
        self != VideoZoom::Unknown
    }
}

bitflags! {
    /// Audio decoding and processing capabilities of the platform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AudioCapabilities: u32 {
        const ATMOS = 0x01;
        const DD = 0x02;
        const DDPLUS = 0x04;
        const DAD = 0x08;
        const DAPV2 = 0x10;
        const MS12 = 0x20;
        const MS12V2 = 0x40;
        const INVALID = 0x80;
    }
}

bitflags! {
    /// MS12 audio processing capabilities of a port.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Ms12Capabilities: u32 {
        const DOLBY_VOLUME = 0x01;
        const INTELLIGENT_EQUALIZER = 0x02;
        const DIALOGUE_ENHANCER = 0x04;
        const INVALID = 0x80;
    }
}

bitflags! {
    /// Audio return channel types supported by an HDMI ARC port.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ArcTypes: u32 {
        const ARC = 0x01;
        const EARC = 0x02;
    }
}

bitflags! {
    /// HDR standards supported by a display or decoder.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HdrCapabilities: u32 {
        const HDR10 = 0x01;
        const HLG = 0x02;
        const DOLBY_VISION = 0x04;
        const TECHNICOLOR_PRIME = 0x08;
        const HDR10_PLUS = 0x10;
        const SDR = 0x20;
        const INVALID = 0x80;
    }
}

bitflags! {
    /// TV resolutions supported by the display on a port.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TvResolutions: u32 {
        const R480I = 0x000001;
        const R480P = 0x000002;
        const R576I = 0x000004;
        const R576P = 0x000008;
        const R576P50 = 0x000010;
        const R720P = 0x000020;
        const R720P50 = 0x000040;
        const R1080I = 0x000080;
        const R1080P = 0x000100;
        const R1080P24 = 0x000200;
        const R1080I25 = 0x000400;
        const R1080P25 = 0x000800;
        const R1080P30 = 0x001000;
        const R1080I50 = 0x002000;
        const R1080P50 = 0x004000;
        const R1080P60 = 0x008000;
        const R2160P24 = 0x010000;
        const R2160P25 = 0x020000;
        const R2160P30 = 0x040000;
        const R2160P50 = 0x080000;
        const R2160P60 = 0x100000;
    }
}

bitflags! {
    /// Colour depths supported on the video output.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ColorDepth: u32 {
        const BIT8 = 0x01;
        const BIT10 = 0x02;
        const BIT12 = 0x04;
        const AUTO = 0x08;
    }
}

bitflags! {
    /// Video coding formats the decoder accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct VideoCodingFormats: u32 {
        const MPEGH_PART2 = 0x01;
        const MPEG4_PART10 = 0x02;
        const MPEG2 = 0x04;
    }
}

bitflags! {
    /// HEVC profiles reported in the decoder's codec info.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HevcProfiles: u32 {
        const MAIN = 0x01;
        const MAIN10 = 0x02;
        const MAIN_STILL_PICTURE = 0x04;
    }
}

mask_default!(
    AudioCapabilities,
    Ms12Capabilities,
    ArcTypes,
    HdrCapabilities,
    TvResolutions,
    ColorDepth,
    VideoCodingFormats,
    HevcProfiles,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_counts_match_max_sentinels() {
        assert_eq!(AudioPortType::COUNT, 6);
        assert_eq!(AudioCompression::COUNT, 4);
        assert_eq!(StereoMode::COUNT, 7);
        assert_eq!(VideoPortType::COUNT, 9);
        assert_eq!(FrameRate::COUNT, 9);
        assert_eq!(MatrixCoefficients::COUNT, 13);
    }

    #[test]
    fn test_from_raw_rejects_sentinel() {
        assert_eq!(AudioPortType::from_raw(4), Some(AudioPortType::HdmiArc));
        assert_eq!(AudioPortType::from_raw(6), None);
        assert_eq!(StereoMode::from_raw(-1), None);
    }

    #[test]
    fn test_video_zoom_negative_value() {
        assert_eq!(VideoZoom::from_raw(-1), Some(VideoZoom::Unknown));
        assert_eq!(VideoZoom::default(), VideoZoom::None);
        assert!(!VideoZoom::Unknown.is_settable());
        assert!(VideoZoom::Wide4_3.is_settable());
        assert_eq!(VideoZoom::from_raw(12), None);
    }

    #[test]
    fn test_bitmask_keeps_unknown_bits() {
        let caps = HdrCapabilities::from_bits_retain(0x41);
        assert!(caps.contains(HdrCapabilities::HDR10));
        assert_eq!(caps.bits(), 0x41);
        assert_eq!(ColorDepth::default(), ColorDepth::empty());
    }
}
