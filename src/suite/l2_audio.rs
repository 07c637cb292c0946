// src/suite/l2_audio.rs
//! L2 audio port cases: set/get round trips and table comparisons on every
//! declared port.

use super::l1_audio::{each_port, AUDIO};
use super::{CaseContext, CaseResult, TestCase, TestSuite, Tier};
use crate::config::DeviceClass;
use crate::hal::traits::DeviceSettingsHal;
use crate::hal::types::Ms12Capabilities;

pub(super) fn suite(class: Option<DeviceClass>) -> TestSuite {
    let mut cases = vec![
        TestCase::new("L2_RetrieveAndVerifyMS12Capabilities", ms12_capabilities),
        TestCase::new("L2_SetAndGetAudioCompression", set_and_get_compression),
        TestCase::new("L2_SetAndGetDialogEnhancement", set_and_get_dialog_enhancement),
        TestCase::new("L2_CheckMS12DecodeSupport", ms12_decode),
        TestCase::new("L2_CheckMS11DecodeSupport", ms11_decode),
    ];
    if class == Some(DeviceClass::Sink) {
        cases.push(TestCase::new("L2_VerifyMS12AudioProfiles_sink", ms12_profiles_sink));
    }
    cases.push(TestCase::new("L2_SetAndGetStereoMode", set_and_get_stereo_mode));
    if class == Some(DeviceClass::Sink) {
        cases.push(TestCase::new("L2_SetAndGetStereoAuto_sink", set_and_get_stereo_auto_sink));
        cases.push(TestCase::new("L2_VerifyAtmosCapabilities_sink", atmos_capabilities_sink));
    }
    cases.push(TestCase::new("L2_GetAudioCapabilities", audio_capabilities));

    AUDIO.suite(Tier::L2, class, cases)
}

fn ms12_capabilities(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let caps = ctx.require_ok(hal.get_ms12_capabilities(handle), "dsGetMS12Capabilities")?;
            ctx.check_eq(caps, port.ms12_capabilities, "MS12 capabilities");
            Ok(())
        })
    })
}

fn set_and_get_compression(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            for &compression in &port.compressions {
                let result = hal.set_audio_compression(handle, compression);
                ctx.require_ok(result, "dsSetAudioCompression")?;
                let current = ctx.require_ok(hal.get_audio_compression(handle), "dsGetAudioCompression")?;
                ctx.check_eq(current, compression, "compression read back");
            }
            Ok(())
        })
    })
}

fn set_and_get_dialog_enhancement(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let Some(range) = port.dialog_enhancement else {
                return Ok(());
            };
            if !port.ms12_capabilities.contains(Ms12Capabilities::DIALOGUE_ENHANCER) {
                return Ok(());
            }
            for level in i32::from(range.min)..=i32::from(range.max) {
                ctx.require_ok(hal.set_dialog_enhancement(handle, level), "dsSetDialogEnhancement")?;
                let current = ctx.require_ok(hal.get_dialog_enhancement(handle), "dsGetDialogEnhancement")?;
                ctx.check_eq(current, level, "dialog enhancement read back");
            }
            Ok(())
        })
    })
}

fn ms12_decode(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let decode = ctx.require_ok(hal.is_audio_ms12_decode(handle), "dsIsAudioMS12Decode")?;
            ctx.check_eq(decode, port.is_ms12_decode, "MS12 decode");
            Ok(())
        })
    })
}

fn ms11_decode(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let decode = ctx.require_ok(hal.is_audio_ms11_decode(handle), "dsIsAudioMS11Decode")?;
            ctx.check_eq(decode, port.is_ms11_decode, "MS11 decode");
            Ok(())
        })
    })
}

fn ms12_profiles_sink(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            if port.ms12_audio_profiles.is_empty() {
                return Ok(());
            }
            let profiles = ctx.require_ok(hal.get_ms12_audio_profile_list(handle), "dsGetMS12AudioProfileList")?;
            ctx.check_eq(profiles.len(), port.ms12_audio_profiles.len(), "MS12 profile count");
            for (reported, declared) in profiles.iter().zip(&port.ms12_audio_profiles) {
                ctx.check_eq(reported.as_str(), declared.as_str(), "MS12 profile name");
            }
            Ok(())
        })
    })
}

fn set_and_get_stereo_mode(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            for &mode in &port.stereo_modes {
                ctx.require_ok(hal.set_stereo_mode(handle, mode), "dsSetStereoMode")?;
                let current = ctx.require_ok(hal.get_stereo_mode(handle), "dsGetStereoMode")?;
                ctx.check_eq(current, mode, "stereo mode read back");
            }
            Ok(())
        })
    })
}

fn set_and_get_stereo_auto_sink(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            if !port.stereo_auto_mode {
                return Ok(());
            }
            for auto_mode in [true, false] {
                ctx.require_ok(hal.set_stereo_auto(handle, auto_mode), "dsSetStereoAuto")?;
                let current = ctx.require_ok(hal.get_stereo_auto(handle), "dsGetStereoAuto")?;
                ctx.check_eq(current, auto_mode, "stereo auto read back");
            }
            Ok(())
        })
    })
}

fn atmos_capabilities_sink(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let atmos = ctx.require_ok(
                hal.get_sink_device_atmos_capability(handle),
                "dsGetSinkDeviceAtmosCapability",
            )?;
            ctx.check_eq(atmos, port.atmos_capability, "ATMOS capability");
            Ok(())
        })
    })
}

fn audio_capabilities(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let declared = ctx.config().audio.as_ref().map(|audio| audio.capabilities).unwrap_or_default();
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, _port, handle| {
            let caps = ctx.require_ok(hal.get_audio_capabilities(handle), "dsGetAudioCapabilities")?;
            ctx.check_eq(caps, declared, "audio capabilities");
            Ok(())
        })
    })
}
