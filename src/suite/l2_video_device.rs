// src/suite/l2_video_device.rs
//! L2 video device cases

use super::l1_video_device::{coding_formats, each_device, VIDEO_DEVICE};
use super::{CaseContext, CaseResult, TestCase, TestSuite, Tier};
use crate::config::DeviceClass;
use crate::hal::traits::DeviceSettingsHal;

pub(super) fn suite(class: Option<DeviceClass>) -> TestSuite {
    let mut cases = vec![
        TestCase::new("L2_GetHDRCapabilities", hdr_capabilities),
        TestCase::new("L2_GetSupportedVideoCodingFormats", supported_coding_formats),
    ];
    match class {
        Some(DeviceClass::Sink) => {
            cases.push(TestCase::new("L2_SetAndVerifyDisplayframerate_sink", set_and_verify_framerate_sink));
        }
        Some(DeviceClass::Source) => {
            cases.push(TestCase::new("L2_SetAndGetDFC_source", set_and_get_dfc_source));
            cases.push(TestCase::new("L2_GetVideoCodecInfo_source", codec_info_source));
        }
        None => {}
    }
    VIDEO_DEVICE.suite(Tier::L2, class, cases)
}

fn hdr_capabilities(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            let caps = ctx.require_ok(hal.get_hdr_capabilities(handle), "dsGetHDRCapabilities")?;
            ctx.check_eq(caps, device.hdr_capabilities, "decoder HDR capabilities");
            Ok(())
        })
    })
}

fn supported_coding_formats(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            let formats = ctx.require_ok(
                hal.get_supported_video_coding_formats(handle),
                "dsGetSupportedVideoCodingFormats",
            )?;
            ctx.check_eq(formats, device.supported_video_coding_formats, "video coding formats");
            Ok(())
        })
    })
}

fn set_and_verify_framerate_sink(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            for rate in &device.supported_display_framerates {
                ctx.require_ok(hal.set_display_framerate(handle, rate.as_str()), "dsSetDisplayframerate")?;
                let current = ctx.require_ok(
                    hal.get_current_display_framerate(handle),
                    "dsGetCurrentDisplayframerate",
                )?;
                ctx.check_eq(current.as_str(), rate.as_str(), "display frame rate read back");
            }
            Ok(())
        })
    })
}

fn set_and_get_dfc_source(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            for &zoom in &device.supported_dfcs {
                ctx.require_ok(hal.set_dfc(handle, zoom), "dsSetDFC")?;
                let current = ctx.require_ok(hal.get_dfc(handle), "dsGetDFC")?;
                ctx.check_eq(current, zoom, "DFC read back");
            }
            Ok(())
        })
    })
}

fn codec_info_source(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_DEVICE.with_init(ctx, hal, |ctx, hal| {
        each_device(ctx, hal, |ctx, hal, device, handle| {
            let Some(expected) = device.codec_info else {
                return Ok(());
            };
            for codec in coding_formats().filter(|c| device.supported_video_coding_formats.contains(*c)) {
                let info = ctx.require_ok(hal.get_video_codec_info(handle, codec), "dsGetVideoCodecInfo")?;
                ctx.check_eq(info.num_entries, expected.num_entries, "codec entries");
                ctx.check(
                    (info.level - expected.level).abs() < f32::EPSILON,
                    format!("codec level: expected {}, got {}", expected.level, info.level),
                );
                ctx.check_eq(info.profile, expected.profile, "codec profile");
            }
            Ok(())
        })
    })
}
