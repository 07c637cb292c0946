// src/suite/l2_video_port.rs
//! L2 video port cases

use super::l1_video_port::{each_port, VIDEO_PORT};
use super::{CaseContext, CaseResult, TestCase, TestSuite, Tier};
use crate::config::DeviceClass;
use crate::hal::status::DsStatus;
use crate::hal::traits::DeviceSettingsHal;

pub(super) fn suite(class: Option<DeviceClass>) -> TestSuite {
    let mut cases = vec![
        TestCase::new("L2_RetrieveAndVerifySurroundModeCapabilities", surround_mode_capabilities),
        TestCase::new("L2_VerifySupportedTvResolutions", supported_tv_resolutions),
        TestCase::new("L2_GetHDRCapabilities", hdr_capabilities),
        TestCase::new("L2_VerifyHDCPProtocolStatus", hdcp_protocol),
        TestCase::new("L2_GetColorSpace", color_space),
        TestCase::new("L2_GetColorDepth", color_depth),
        TestCase::new("L2_GetQuantizationRange", quantization_range),
        TestCase::new("L2_GetMatrixCoefficients", matrix_coefficients),
    ];
    if class == Some(DeviceClass::Source) {
        cases.push(TestCase::new("L2_SetAndGetResolution_source", set_and_get_resolution_source));
    }
    VIDEO_PORT.suite(Tier::L2, class, cases)
}

fn surround_mode_capabilities(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let sink = ctx
        .config()
        .video_port
        .as_ref()
        .is_some_and(|video| video.device_class.is_sink());
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let surround = ctx.require_ok(hal.is_display_surround(handle), "dsIsDisplaySurround")?;
            ctx.check_eq(surround, port.display_surround, "display surround");

            let result = hal.get_surround_mode(handle);
            if sink {
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetSurroundMode");
            } else {
                let mode = ctx.require_ok(result, "dsGetSurroundMode")?;
                ctx.check_eq(mode, port.surround_mode, "surround mode");
            }
            Ok(())
        })
    })
}

fn supported_tv_resolutions(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let resolutions = ctx.require_ok(hal.supported_tv_resolutions(handle), "dsSupportedTvResolutions")?;
            ctx.check_eq(resolutions, port.supported_tv_resolutions, "supported TV resolutions");
            Ok(())
        })
    })
}

fn hdr_capabilities(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let caps = ctx.require_ok(hal.get_tv_hdr_capabilities(handle), "dsGetTVHDRCapabilities")?;
            ctx.check_eq(caps, port.hdr_capabilities, "TV HDR capabilities");
            Ok(())
        })
    })
}

fn hdcp_protocol(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let version = ctx.require_ok(hal.get_hdcp_protocol(handle), "dsGetHDCPProtocol")?;
            ctx.check_eq(version, port.hdcp_protocol_version, "HDCP protocol version");
            Ok(())
        })
    })
}

fn color_space(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let space = ctx.require_ok(hal.get_color_space(handle), "dsGetColorSpace")?;
            ctx.check_eq(space, port.colorspace, "colour space");
            Ok(())
        })
    })
}

fn color_depth(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let declared = ctx
        .config()
        .video_port
        .as_ref()
        .map(|video| video.color_depth)
        .unwrap_or_default();
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, _port, handle| {
            let depth = ctx.require_ok(hal.get_color_depth(handle), "dsGetColorDepth")?;
            ctx.check(
                declared.contains(depth),
                format!("colour depth {depth:?} outside declared {declared:?}"),
            );
            Ok(())
        })
    })
}

fn quantization_range(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let range = ctx.require_ok(hal.get_quantization_range(handle), "dsGetQuantizationRange")?;
            ctx.check_eq(range, port.quantization_range, "quantization range");
            Ok(())
        })
    })
}

fn matrix_coefficients(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let coefficients = ctx.require_ok(hal.get_matrix_coefficients(handle), "dsGetMatrixCoefficients")?;
            ctx.check_eq(coefficients, port.matrix_coefficients, "matrix coefficients");
            Ok(())
        })
    })
}

fn set_and_get_resolution_source(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    VIDEO_PORT.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            for resolution in &port.supported_resolutions {
                ctx.require_ok(hal.set_resolution(handle, resolution), "dsSetResolution")?;
                let current = ctx.require_ok(hal.get_resolution(handle), "dsGetResolution")?;
                ctx.check_eq(&current, resolution, "resolution read back");
            }
            Ok(())
        })
    })
}
