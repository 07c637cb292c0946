// src/suite/l1_video_port.rs
//! L1 video port cases

use super::l1_audio::index_of;
use super::{CaseContext, CaseResult, Subsystem, TestCase, TestSuite, Tier};
use crate::config::{DeviceClass, DeviceSettingsConfig, ModuleMask, ResolutionDescriptor, VideoPortDescriptor};
use crate::hal::status::DsStatus;
use crate::hal::traits::{DeviceSettingsHal, PortHandle};
use arrayvec::ArrayString;

pub(super) const VIDEO_PORT: Subsystem = Subsystem {
    module: ModuleMask::VIDEO_PORT,
    section: "dsVideoPort",
    init: |hal| hal.video_port_init(),
    term: |hal| hal.video_port_term(),
    init_call: "dsVideoPortInit",
    term_call: "dsVideoPortTerm",
    legacy_reinit: DsStatus::General,
    legacy_uninit: DsStatus::InvalidParam,
    first_handle: |config, hal| {
        let port = ports(config).first().ok_or(DsStatus::InvalidParam)?;
        hal.get_video_port(port.type_id, index_of(port.index))
    },
};

pub(super) fn ports(config: &DeviceSettingsConfig) -> &[VideoPortDescriptor] {
    config.video_port.as_ref().map_or(&[], |video| video.ports.as_slice())
}

pub(super) fn device_class(config: &DeviceSettingsConfig) -> Option<DeviceClass> {
    config.video_port.as_ref().map(|video| video.device_class)
}

pub(super) fn each_port(
    ctx: &mut CaseContext<'_>,
    hal: &mut dyn DeviceSettingsHal,
    mut body: impl FnMut(&mut CaseContext<'_>, &mut dyn DeviceSettingsHal, &VideoPortDescriptor, PortHandle) -> CaseResult,
) -> CaseResult {
    let config = ctx.config();
    for port in ports(config) {
        let result = hal.get_video_port(port.type_id, index_of(port.index));
        let handle = ctx.require_ok(result, "dsGetVideoPort")?;
        body(ctx, hal, port, handle)?;
    }
    Ok(())
}

/// A resolution no port declares.
fn undeclared_resolution() -> ResolutionDescriptor {
    ResolutionDescriptor {
        name: ArrayString::from("NULL").unwrap_or_default(),
        ..Default::default()
    }
}

fn first_resolution(config: &DeviceSettingsConfig) -> ResolutionDescriptor {
    ports(config)
        .first()
        .and_then(|port| port.supported_resolutions.first())
        .cloned()
        .unwrap_or_default()
}

pub(super) fn suite() -> TestSuite {
    VIDEO_PORT.suite(
        Tier::L1,
        None,
        vec![
            TestCase::new("dsVideoPortInit_L1_positive", |ctx, hal| VIDEO_PORT.init_term_positive(ctx, hal)),
            TestCase::new("dsVideoPortInit_L1_negative", |ctx, hal| VIDEO_PORT.init_negative(ctx, hal)),
            TestCase::new("dsVideoPortTerm_L1_positive", |ctx, hal| VIDEO_PORT.init_term_positive(ctx, hal)),
            TestCase::new("dsVideoPortTerm_L1_negative", |ctx, hal| VIDEO_PORT.term_negative(ctx, hal)),
            TestCase::new("dsGetVideoPort_L1_positive", get_video_port_positive),
            TestCase::new("dsGetVideoPort_L1_negative", get_video_port_negative),
            TestCase::new("dsIsDisplaySurround_L1_positive", display_surround_positive),
            TestCase::new("dsIsDisplaySurround_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsIsDisplaySurround", |hal, h| hal.is_display_surround(h))
            }),
            TestCase::new("dsGetSurroundMode_L1_positive", surround_mode_positive),
            TestCase::new("dsGetSurroundMode_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsGetSurroundMode", |hal, h| hal.get_surround_mode(h))
            }),
            TestCase::new("dsSetResolution_L1_positive", set_resolution_positive),
            TestCase::new("dsSetResolution_L1_negative", set_resolution_negative),
            TestCase::new("dsGetResolution_L1_positive", get_resolution_positive),
            TestCase::new("dsGetResolution_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsGetResolution", |hal, h| hal.get_resolution(h))
            }),
            TestCase::new("dsGetHDCPProtocol_L1_positive", |ctx, hal| {
                compare_each(ctx, hal, "dsGetHDCPProtocol", |hal, h| hal.get_hdcp_protocol(h), |p| {
                    p.hdcp_protocol_version
                })
            }),
            TestCase::new("dsGetHDCPProtocol_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsGetHDCPProtocol", |hal, h| hal.get_hdcp_protocol(h))
            }),
            TestCase::new("dsGetTVHDRCapabilities_L1_positive", |ctx, hal| {
                compare_each(ctx, hal, "dsGetTVHDRCapabilities", |hal, h| hal.get_tv_hdr_capabilities(h), |p| {
                    p.hdr_capabilities
                })
            }),
            TestCase::new("dsGetTVHDRCapabilities_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsGetTVHDRCapabilities", |hal, h| {
                    hal.get_tv_hdr_capabilities(h)
                })
            }),
            TestCase::new("dsSupportedTvResolutions_L1_positive", |ctx, hal| {
                compare_each(ctx, hal, "dsSupportedTvResolutions", |hal, h| hal.supported_tv_resolutions(h), |p| {
                    p.supported_tv_resolutions
                })
            }),
            TestCase::new("dsSupportedTvResolutions_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsSupportedTvResolutions", |hal, h| {
                    hal.supported_tv_resolutions(h)
                })
            }),
            TestCase::new("dsGetColorDepth_L1_positive", color_depth_positive),
            TestCase::new("dsGetColorDepth_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsGetColorDepth", |hal, h| hal.get_color_depth(h))
            }),
            TestCase::new("dsGetColorSpace_L1_positive", |ctx, hal| {
                compare_each(ctx, hal, "dsGetColorSpace", |hal, h| hal.get_color_space(h), |p| p.colorspace)
            }),
            TestCase::new("dsGetColorSpace_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsGetColorSpace", |hal, h| hal.get_color_space(h))
            }),
            TestCase::new("dsGetQuantizationRange_L1_positive", |ctx, hal| {
                compare_each(ctx, hal, "dsGetQuantizationRange", |hal, h| hal.get_quantization_range(h), |p| {
                    p.quantization_range
                })
            }),
            TestCase::new("dsGetQuantizationRange_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsGetQuantizationRange", |hal, h| {
                    hal.get_quantization_range(h)
                })
            }),
            TestCase::new("dsGetMatrixCoefficients_L1_positive", |ctx, hal| {
                compare_each(ctx, hal, "dsGetMatrixCoefficients", |hal, h| hal.get_matrix_coefficients(h), |p| {
                    p.matrix_coefficients
                })
            }),
            TestCase::new("dsGetMatrixCoefficients_L1_negative", |ctx, hal| {
                VIDEO_PORT.handle_negative(ctx, hal, "dsGetMatrixCoefficients", |hal, h| {
                    hal.get_matrix_coefficients(h)
                })
            }),
        ],
    )
}

/// Compare a per-port getter with the declared value on every port.
pub(super) fn compare_each<T: PartialEq + std::fmt::Debug>(
    ctx: &mut CaseContext<'_>,
    hal: &mut dyn DeviceSettingsHal,
    call: &'static str,
    mut get: impl FnMut(&mut dyn DeviceSettingsHal, PortHandle) -> crate::hal::HalResult<T>,
    declared: impl Fn(&VideoPortDescriptor) -> T,
) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            ctx.check_eq(get(hal, handle), Ok(declared(port)), call);
            Ok(())
        })
    })
}

fn get_video_port_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            ctx.check(handle != PortHandle::INVALID, format!("{}: invalid handle", port.port_name));
            let again = hal.get_video_port(port.type_id, index_of(port.index));
            ctx.check_eq(again, Ok(handle), "dsGetVideoPort repeated lookup");
            Ok(())
        })
    })
}

fn get_video_port_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let config = ctx.config();
    let Some(first) = ports(config).first() else {
        ctx.fail("dsVideoPort declares no ports");
        return Ok(());
    };

    let result = hal.get_video_port(first.type_id, index_of(first.index));
    ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::None, "dsGetVideoPort");

    VIDEO_PORT.init(ctx, hal)?;
    let result = hal.get_video_port(first.type_id, -1);
    ctx.check_status(&result, DsStatus::InvalidParam, "dsGetVideoPort");
    VIDEO_PORT.term(ctx, hal)?;

    let result = hal.get_video_port(first.type_id, index_of(first.index));
    ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::None, "dsGetVideoPort");
    Ok(())
}

fn display_surround_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            ctx.check_eq(hal.is_display_surround(handle), Ok(port.display_surround), "dsIsDisplaySurround");
            Ok(())
        })
    })
}

fn surround_mode_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let sink = device_class(ctx.config()).is_some_and(DeviceClass::is_sink);
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let result = hal.get_surround_mode(handle);
            if sink {
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetSurroundMode");
            } else {
                ctx.check_eq(result, Ok(port.surround_mode), "dsGetSurroundMode");
            }
            Ok(())
        })
    })
}

fn set_resolution_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let sink = device_class(ctx.config()).is_some_and(DeviceClass::is_sink);
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            for resolution in &port.supported_resolutions {
                let result = hal.set_resolution(handle, resolution);
                let expected = if sink { DsStatus::OperationNotSupported } else { DsStatus::None };
                ctx.check_status(&result, expected, "dsSetResolution");
            }
            Ok(())
        })
    })
}

fn set_resolution_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let valid = first_resolution(ctx.config());
    VIDEO_PORT.handle_negative(ctx, hal, "dsSetResolution", |hal, h| hal.set_resolution(h, &valid))?;

    let undeclared = undeclared_resolution();
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, _port, handle| {
            let result = hal.set_resolution(handle, &undeclared);
            ctx.check_status(&result, DsStatus::InvalidParam, "dsSetResolution");
            Ok(())
        })
    })
}

fn get_resolution_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let current = ctx.require_ok(hal.get_resolution(handle), "dsGetResolution")?;
            match port.default_resolution() {
                Some(default) => {
                    ctx.check_eq(&current.pixel_resolution, &default.pixel_resolution, "pixelResolution");
                    ctx.check_eq(&current.aspect_ratio, &default.aspect_ratio, "aspectRatio");
                    ctx.check_eq(&current.stereo_scopic_mode, &default.stereo_scopic_mode, "stereoScopicMode");
                    ctx.check_eq(&current.frame_rate, &default.frame_rate, "frameRate");
                    ctx.check_eq(&current.interlaced, &default.interlaced, "interlaced");
                }
                None => {
                    ctx.check(
                        port.resolution(&current.name).is_some(),
                        format!("{}: current resolution '{}' not declared", port.port_name, current.name),
                    );
                }
            }
            Ok(())
        })
    })
}

fn color_depth_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let declared = ctx
        .config()
        .video_port
        .as_ref()
        .map(|video| video.color_depth)
        .unwrap_or_default();
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, _port, handle| {
            ctx.check_eq(hal.get_color_depth(handle), Ok(declared), "dsGetColorDepth");
            Ok(())
        })
    })
}
