// src/suite/l1_video_device.rs
//! L1 video device cases
//!
//! Decoders have no per-type lookup: device `n` is the `n`th table entry.
//! Zoom (DFC) and codec info are source features, display frame rates are
//! sink features; the other class must answer `OperationNotSupported`.

use super::{CaseContext, CaseResult, Subsystem, TestCase, TestSuite, Tier};
use crate::config::{DeviceClass, DeviceSettingsConfig, ModuleMask, VideoDeviceDescriptor};
use crate::hal::status::DsStatus;
use crate::hal::traits::{DeviceSettingsHal, PortHandle};
use crate::hal::types::*;

pub(super) const VIDEO_DEVICE: Subsystem = Subsystem {
    module: ModuleMask::VIDEO_DEVICE,
    section: "dsVideoDevice",
    init: |hal| hal.video_device_init(),
    term: |hal| hal.video_device_term(),
    init_call: "dsVideoDeviceInit",
    term_call: "dsVideoDeviceTerm",
    legacy_reinit: DsStatus::None,
    legacy_uninit: DsStatus::None,
    first_handle: |_config, hal| hal.get_video_device(0),
};

pub(super) fn devices(config: &DeviceSettingsConfig) -> &[VideoDeviceDescriptor] {
    config.video_device.as_ref().map_or(&[], |video| video.devices.as_slice())
}

pub(super) fn device_class(config: &DeviceSettingsConfig) -> Option<DeviceClass> {
    config.video_device.as_ref().map(|video| video.device_class)
}

pub(super) fn each_device(
    ctx: &mut CaseContext<'_>,
    hal: &mut dyn DeviceSettingsHal,
    mut body: impl FnMut(&mut CaseContext<'_>, &mut dyn DeviceSettingsHal, &VideoDeviceDescriptor, PortHandle) -> CaseResult,
) -> CaseResult {
    let config = ctx.config();
    for (index, device) in devices(config).iter().enumerate() {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        let handle = ctx.require_ok(hal.get_video_device(index), "dsGetVideoDevice")?;
        body(ctx, hal, device, handle)?;
    }
    Ok(())
}

/// Single coding formats, one per defined bit.
pub(super) fn coding_formats() -> impl Iterator<Item = VideoCodingFormats> {
    VideoCodingFormats::all().iter()
}

pub(super) fn suite() -> TestSuite {
    VIDEO_DEVICE.suite(
        Tier::L1,
        None,
        vec![
            TestCase::new("dsVideoDeviceInit_L1_positive", |ctx, hal| VIDEO_DEVICE.init_term_positive(ctx, hal)),
            TestCase::new("dsVideoDeviceInit_L1_negative", |ctx, hal| VIDEO_DEVICE.init_negative(ctx, hal)),
            TestCase::new("dsVideoDeviceTerm_L1_positive", |ctx, hal| VIDEO_DEVICE.init_term_positive(ctx, hal)),
            TestCase::new("dsVideoDeviceTerm_L1_negative", |ctx, hal| VIDEO_DEVICE.term_negative(ctx, hal)),
            TestCase::new("dsGetVideoDevice_L1_positive", get_video_device_positive),
            TestCase::new("dsGetVideoDevice_L1_negative", get_video_device_negative),
            TestCase::new("dsSetDFC_L1_positive", set_dfc_positive),
            TestCase::new("dsSetDFC_L1_negative", set_dfc_negative),
            TestCase::new("dsGetDFC_L1_positive", get_dfc_positive),
            TestCase::new("dsGetDFC_L1_negative", |ctx, hal| {
                VIDEO_DEVICE.handle_negative(ctx, hal, "dsGetDFC", |hal, h| hal.get_dfc(h))
            }),
            TestCase::new("dsGetHDRCapabilities_L1_positive", hdr_capabilities_positive),
            TestCase::new("dsGetHDRCapabilities_L1_negative", |ctx, hal| {
                VIDEO_DEVICE.handle_negative(ctx, hal, "dsGetHDRCapabilities", |hal, h| hal.get_hdr_capabilities(h))
            }),
            TestCase::new("dsGetSupportedVideoCodingFormats_L1_positive", coding_formats_positive),
            TestCase::new("dsGetSupportedVideoCodingFormats_L1_negative", |ctx, hal| {
                VIDEO_DEVICE.handle_negative(ctx, hal, "dsGetSupportedVideoCodingFormats", |hal, h| {
                    hal.get_supported_video_coding_formats(h)
                })
            }),
            TestCase::new("dsGetVideoCodecInfo_L1_positive", codec_info_positive),
            TestCase::new("dsGetVideoCodecInfo_L1_negative", codec_info_negative),
            TestCase::new("dsGetCurrentDisplayframerate_L1_positive", current_framerate_positive),
            TestCase::new("dsGetCurrentDisplayframerate_L1_negative", |ctx, hal| {
                VIDEO_DEVICE.handle_negative(ctx, hal, "dsGetCurrentDisplayframerate", |hal, h| {
                    hal.get_current_display_framerate(h)
                })
            }),
            TestCase::new("dsSetDisplayframerate_L1_positive", set_framerate_positive),
            TestCase::new("dsSetDisplayframerate_L1_negative", set_framerate_negative),
        ],
    )
}

fn get_video_device_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, _hal, _device, handle| {
            ctx.check(handle != PortHandle::INVALID, "dsGetVideoDevice returned an invalid handle");
            Ok(())
        })
    })
}

fn get_video_device_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let count = i32::try_from(devices(ctx.config()).len()).unwrap_or(i32::MAX);

    let result = hal.get_video_device(0);
    ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::None, "dsGetVideoDevice");

    VIDEO_DEVICE.init(ctx, hal)?;
    let result = hal.get_video_device(-1);
    ctx.check_status(&result, DsStatus::InvalidParam, "dsGetVideoDevice");
    let result = hal.get_video_device(count);
    ctx.check_status(&result, DsStatus::InvalidParam, "dsGetVideoDevice");
    VIDEO_DEVICE.term(ctx, hal)?;

    let result = hal.get_video_device(0);
    ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::None, "dsGetVideoDevice");
    Ok(())
}

fn set_dfc_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let source = device_class(ctx.config()).is_some_and(DeviceClass::is_source);
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            if !source {
                let result = hal.set_dfc(handle, VideoZoom::Full);
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsSetDFC");
                return Ok(());
            }
            for &zoom in &device.supported_dfcs {
                ctx.check_status(&hal.set_dfc(handle, zoom), DsStatus::None, "dsSetDFC");
            }
            Ok(())
        })
    })
}

fn set_dfc_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let source = device_class(ctx.config()).is_some_and(DeviceClass::is_source);
    if !source {
        // Sinks refuse zoom control before looking at the handle
        return VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
            let result = hal.set_dfc(PortHandle::INVALID, VideoZoom::Full);
            ctx.check_status(&result, DsStatus::OperationNotSupported, "dsSetDFC");
            Ok(())
        });
    }

    VIDEO_DEVICE.handle_negative(ctx, hal, "dsSetDFC", |hal, h| hal.set_dfc(h, VideoZoom::None))?;
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            let result = hal.set_dfc(handle, VideoZoom::Unknown);
            ctx.check_status(&result, DsStatus::InvalidParam, "dsSetDFC");
            let undeclared = VideoZoom::ALL
                .iter()
                .copied()
                .find(|zoom| zoom.is_settable() && !device.supported_dfcs.contains(zoom));
            if let Some(zoom) = undeclared {
                ctx.check_status(&hal.set_dfc(handle, zoom), DsStatus::InvalidParam, "dsSetDFC");
            }
            Ok(())
        })
    })
}

fn get_dfc_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let source = device_class(ctx.config()).is_some_and(DeviceClass::is_source);
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            let result = hal.get_dfc(handle);
            if source {
                ctx.check_eq(result, Ok(device.default_dfc), "dsGetDFC");
            } else {
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetDFC");
            }
            Ok(())
        })
    })
}

fn hdr_capabilities_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            ctx.check_eq(hal.get_hdr_capabilities(handle), Ok(device.hdr_capabilities), "dsGetHDRCapabilities");
            Ok(())
        })
    })
}

fn coding_formats_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            ctx.check_eq(
                hal.get_supported_video_coding_formats(handle),
                Ok(device.supported_video_coding_formats),
                "dsGetSupportedVideoCodingFormats",
            );
            Ok(())
        })
    })
}

fn codec_info_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let source = device_class(ctx.config()).is_some_and(DeviceClass::is_source);
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            for codec in coding_formats() {
                let result = hal.get_video_codec_info(handle, codec);
                if source && device.supported_video_coding_formats.contains(codec) {
                    let info = ctx.require_ok(result, "dsGetVideoCodecInfo")?;
                    ctx.check_eq(info, device.codec_info.unwrap_or_default(), "dsGetVideoCodecInfo");
                } else {
                    ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetVideoCodecInfo");
                }
            }
            Ok(())
        })
    })
}

fn codec_info_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_DEVICE.handle_negative_as(
        ctx,
        hal,
        "dsGetVideoCodecInfo",
        DsStatus::OperationNotSupported,
        |hal, h| hal.get_video_codec_info(h, VideoCodingFormats::MPEGH_PART2),
    )?;

    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, _device, handle| {
            // Zero or several formats at once name no codec
            for codec in [VideoCodingFormats::empty(), VideoCodingFormats::all()] {
                let result = hal.get_video_codec_info(handle, codec);
                ctx.check_status(&result, DsStatus::InvalidParam, "dsGetVideoCodecInfo");
            }
            Ok(())
        })
    })
}

fn current_framerate_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let sink = device_class(ctx.config()).is_some_and(DeviceClass::is_sink);
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            let result = hal.get_current_display_framerate(handle);
            if !sink {
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetCurrentDisplayframerate");
                return Ok(());
            }
            let rate = ctx.require_ok(result, "dsGetCurrentDisplayframerate")?;
            ctx.check(
                device.supported_display_framerates.iter().any(|r| r.as_str() == rate),
                format!("current display frame rate '{rate}' not declared"),
            );
            Ok(())
        })
    })
}

fn set_framerate_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let sink = device_class(ctx.config()).is_some_and(DeviceClass::is_sink);
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            if !sink {
                let result = hal.set_display_framerate(handle, "1920x1080px60");
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsSetDisplayframerate");
                return Ok(());
            }
            for rate in &device.supported_display_framerates {
                let result = hal.set_display_framerate(handle, rate.as_str());
                ctx.check_status(&result, DsStatus::None, "dsSetDisplayframerate");
            }
            Ok(())
        })
    })
}

fn set_framerate_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let first_rate = devices(ctx.config())
        .first()
        .and_then(|device| device.supported_display_framerates.first())
        .map(|rate| rate.to_string())
        .unwrap_or_else(|| "1920x1080px60".to_string());

    VIDEO_DEVICE.handle_negative(ctx, hal, "dsSetDisplayframerate", |hal, h| {
        hal.set_display_framerate(h, &first_rate)
    })?;

    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, _device, handle| {
            let result = hal.set_display_framerate(handle, "junk");
            ctx.check_status(&result, DsStatus::InvalidParam, "dsSetDisplayframerate");
            Ok(())
        })
    })
}
