// src/suite/l1_audio.rs
//! L1 audio port cases

use super::{CaseContext, CaseResult, Subsystem, TestCase, TestSuite, Tier};
use crate::config::{AudioPortDescriptor, DeviceSettingsConfig, ModuleMask};
use crate::hal::status::DsStatus;
use crate::hal::traits::{DeviceSettingsHal, PortHandle};
use crate::hal::types::*;

pub(super) const AUDIO: Subsystem = Subsystem {
    module: ModuleMask::AUDIO_PORT,
    section: "dsAudio",
    init: |hal| hal.audio_port_init(),
    term: |hal| hal.audio_port_term(),
    init_call: "dsAudioPortInit",
    term_call: "dsAudioPortTerm",
    legacy_reinit: DsStatus::General,
    legacy_uninit: DsStatus::InvalidParam,
    first_handle: |config, hal| {
        let port = ports(config).first().ok_or(DsStatus::InvalidParam)?;
        hal.get_audio_port(port.type_id, index_of(port.index))
    },
};

pub(super) fn ports(config: &DeviceSettingsConfig) -> &[AudioPortDescriptor] {
    config.audio.as_ref().map_or(&[], |audio| audio.ports.as_slice())
}

pub(super) fn index_of(index: u32) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Look up every declared port and run `body` on it.
pub(super) fn each_port(
    ctx: &mut CaseContext<'_>,
    hal: &mut dyn DeviceSettingsHal,
    mut body: impl FnMut(&mut CaseContext<'_>, &mut dyn DeviceSettingsHal, &AudioPortDescriptor, PortHandle) -> CaseResult,
) -> CaseResult {
    let config = ctx.config();
    for port in ports(config) {
        let result = hal.get_audio_port(port.type_id, index_of(port.index));
        let handle = ctx.require_ok(result, "dsGetAudioPort")?;
        body(ctx, hal, port, handle)?;
    }
    Ok(())
}

pub(super) fn suite() -> TestSuite {
    AUDIO.suite(
        Tier::L1,
        None,
        vec![
            TestCase::new("dsAudioPortInit_L1_positive", |ctx, hal| AUDIO.init_term_positive(ctx, hal)),
            TestCase::new("dsAudioPortInit_L1_negative", |ctx, hal| AUDIO.init_negative(ctx, hal)),
            TestCase::new("dsAudioPortTerm_L1_positive", |ctx, hal| AUDIO.init_term_positive(ctx, hal)),
            TestCase::new("dsAudioPortTerm_L1_negative", |ctx, hal| AUDIO.term_negative(ctx, hal)),
            TestCase::new("dsGetAudioPort_L1_positive", get_audio_port_positive),
            TestCase::new("dsGetAudioPort_L1_negative", get_audio_port_negative),
            TestCase::new("dsGetAudioCompression_L1_positive", get_compression_positive),
            TestCase::new("dsGetAudioCompression_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsGetAudioCompression", |hal, h| hal.get_audio_compression(h))
            }),
            TestCase::new("dsSetAudioCompression_L1_positive", set_compression_positive),
            TestCase::new("dsSetAudioCompression_L1_negative", set_compression_negative),
            TestCase::new("dsGetStereoMode_L1_positive", get_stereo_mode_positive),
            TestCase::new("dsGetStereoMode_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsGetStereoMode", |hal, h| hal.get_stereo_mode(h))
            }),
            TestCase::new("dsSetStereoMode_L1_positive", set_stereo_mode_positive),
            TestCase::new("dsSetStereoMode_L1_negative", set_stereo_mode_negative),
            TestCase::new("dsGetStereoAuto_L1_positive", get_stereo_auto_positive),
            TestCase::new("dsGetStereoAuto_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsGetStereoAuto", |hal, h| hal.get_stereo_auto(h))
            }),
            TestCase::new("dsGetDialogEnhancement_L1_positive", get_dialog_enhancement_positive),
            TestCase::new("dsGetDialogEnhancement_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsGetDialogEnhancement", |hal, h| hal.get_dialog_enhancement(h))
            }),
            TestCase::new("dsSetDialogEnhancement_L1_positive", set_dialog_enhancement_positive),
            TestCase::new("dsSetDialogEnhancement_L1_negative", set_dialog_enhancement_negative),
            TestCase::new("dsGetMS12AudioProfileList_L1_positive", ms12_profiles_positive),
            TestCase::new("dsGetMS12AudioProfileList_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsGetMS12AudioProfileList", |hal, h| {
                    hal.get_ms12_audio_profile_list(h)
                })
            }),
            TestCase::new("dsGetSupportedARCTypes_L1_positive", arc_types_positive),
            TestCase::new("dsGetSupportedARCTypes_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsGetSupportedARCTypes", |hal, h| hal.get_supported_arc_types(h))
            }),
            TestCase::new("dsGetSinkDeviceAtmosCapability_L1_positive", atmos_positive),
            TestCase::new("dsGetSinkDeviceAtmosCapability_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsGetSinkDeviceAtmosCapability", |hal, h| {
                    hal.get_sink_device_atmos_capability(h)
                })
            }),
            TestCase::new("dsIsAudioMS12Decode_L1_positive", ms12_decode_positive),
            TestCase::new("dsIsAudioMS12Decode_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsIsAudioMS12Decode", |hal, h| hal.is_audio_ms12_decode(h))
            }),
            TestCase::new("dsIsAudioMS11Decode_L1_positive", ms11_decode_positive),
            TestCase::new("dsIsAudioMS11Decode_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsIsAudioMS11Decode", |hal, h| hal.is_audio_ms11_decode(h))
            }),
            TestCase::new("dsGetAudioCapabilities_L1_positive", audio_capabilities_positive),
            TestCase::new("dsGetAudioCapabilities_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsGetAudioCapabilities", |hal, h| hal.get_audio_capabilities(h))
            }),
            TestCase::new("dsGetMS12Capabilities_L1_positive", ms12_capabilities_positive),
            TestCase::new("dsGetMS12Capabilities_L1_negative", |ctx, hal| {
                AUDIO.handle_negative(ctx, hal, "dsGetMS12Capabilities", |hal, h| hal.get_ms12_capabilities(h))
            }),
        ],
    )
}

fn get_audio_port_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            ctx.check(handle != PortHandle::INVALID, format!("{}: invalid handle", port.port_name));
            // Same port, same handle
            let again = hal.get_audio_port(port.type_id, index_of(port.index));
            ctx.check_eq(again, Ok(handle), "dsGetAudioPort repeated lookup");
            Ok(())
        })
    })
}

fn get_audio_port_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let config = ctx.config();
    let Some(first) = ports(config).first() else {
        ctx.fail("dsAudio declares no ports");
        return Ok(());
    };

    let result = hal.get_audio_port(first.type_id, index_of(first.index));
    ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::None, "dsGetAudioPort");

    AUDIO.init(ctx, hal)?;
    let result = hal.get_audio_port(first.type_id, -1);
    ctx.check_status(&result, DsStatus::InvalidParam, "dsGetAudioPort");
    let result = hal.get_audio_port(first.type_id, i32::MAX);
    ctx.check_status(&result, DsStatus::InvalidParam, "dsGetAudioPort");
    AUDIO.term(ctx, hal)?;

    let result = hal.get_audio_port(first.type_id, index_of(first.index));
    ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::None, "dsGetAudioPort");
    Ok(())
}

fn get_compression_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let result = hal.get_audio_compression(handle);
            if port.compressions.is_empty() {
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetAudioCompression");
            } else {
                let value = ctx.require_ok(result, "dsGetAudioCompression")?;
                ctx.check(
                    port.compressions.contains(&value),
                    format!("{}: compression {value:?} not declared", port.port_name),
                );
            }
            Ok(())
        })
    })
}

fn set_compression_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            if port.compressions.is_empty() {
                let result = hal.set_audio_compression(handle, AudioCompression::None);
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsSetAudioCompression");
            }
            for &compression in &port.compressions {
                let result = hal.set_audio_compression(handle, compression);
                ctx.check_status(&result, DsStatus::None, "dsSetAudioCompression");
            }
            Ok(())
        })
    })
}

fn set_compression_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.handle_negative(ctx, hal, "dsSetAudioCompression", |hal, h| {
        hal.set_audio_compression(h, AudioCompression::None)
    })?;

    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let undeclared = AudioCompression::ALL
                .iter()
                .copied()
                .find(|c| !port.compressions.contains(c));
            if let Some(compression) = undeclared {
                let expected = if port.compressions.is_empty() {
                    DsStatus::OperationNotSupported
                } else {
                    DsStatus::InvalidParam
                };
                let result = hal.set_audio_compression(handle, compression);
                ctx.check_status(&result, expected, "dsSetAudioCompression");
            }
            Ok(())
        })
    })
}

fn get_stereo_mode_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let result = hal.get_stereo_mode(handle);
            if port.stereo_modes.is_empty() {
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetStereoMode");
            } else {
                let mode = ctx.require_ok(result, "dsGetStereoMode")?;
                ctx.check(
                    port.stereo_modes.contains(&mode),
                    format!("{}: stereo mode {mode:?} not declared", port.port_name),
                );
            }
            Ok(())
        })
    })
}

fn set_stereo_mode_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            if port.stereo_modes.is_empty() {
                let result = hal.set_stereo_mode(handle, StereoMode::Stereo);
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsSetStereoMode");
            }
            for &mode in &port.stereo_modes {
                let result = hal.set_stereo_mode(handle, mode);
                ctx.check_status(&result, DsStatus::None, "dsSetStereoMode");
            }
            Ok(())
        })
    })
}

fn set_stereo_mode_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.handle_negative(ctx, hal, "dsSetStereoMode", |hal, h| hal.set_stereo_mode(h, StereoMode::Stereo))?;

    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let undeclared = StereoMode::ALL
                .iter()
                .copied()
                .find(|m| !port.stereo_modes.contains(m));
            if let Some(mode) = undeclared {
                let expected = if port.stereo_modes.is_empty() {
                    DsStatus::OperationNotSupported
                } else {
                    DsStatus::InvalidParam
                };
                let result = hal.set_stereo_mode(handle, mode);
                ctx.check_status(&result, expected, "dsSetStereoMode");
            }
            Ok(())
        })
    })
}

fn get_stereo_auto_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let auto = ctx.require_ok(hal.get_stereo_auto(handle), "dsGetStereoAuto")?;
            ctx.check_eq(auto, port.stereo_auto_mode, "dsGetStereoAuto");
            Ok(())
        })
    })
}

fn get_dialog_enhancement_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let result = hal.get_dialog_enhancement(handle);
            match port.dialog_enhancement {
                None => {
                    ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetDialogEnhancement");
                }
                Some(range) => {
                    let level = ctx.require_ok(result, "dsGetDialogEnhancement")?;
                    ctx.check(
                        range.contains(level),
                        format!("{}: level {level} outside {}..={}", port.port_name, range.min, range.max),
                    );
                }
            }
            Ok(())
        })
    })
}

fn set_dialog_enhancement_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            match port.dialog_enhancement {
                None => {
                    let result = hal.set_dialog_enhancement(handle, 0);
                    ctx.check_status(&result, DsStatus::OperationNotSupported, "dsSetDialogEnhancement");
                }
                Some(range) => {
                    for level in [range.min, range.max] {
                        let result = hal.set_dialog_enhancement(handle, i32::from(level));
                        ctx.check_status(&result, DsStatus::None, "dsSetDialogEnhancement");
                    }
                }
            }
            Ok(())
        })
    })
}

fn set_dialog_enhancement_negative(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.handle_negative(ctx, hal, "dsSetDialogEnhancement", |hal, h| hal.set_dialog_enhancement(h, 0))?;

    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            if let Some(range) = port.dialog_enhancement {
                let result = hal.set_dialog_enhancement(handle, i32::from(range.max) + 1);
                ctx.check_status(&result, DsStatus::InvalidParam, "dsSetDialogEnhancement");
                let result = hal.set_dialog_enhancement(handle, i32::from(range.min) - 1);
                ctx.check_status(&result, DsStatus::InvalidParam, "dsSetDialogEnhancement");
            }
            Ok(())
        })
    })
}

fn ms12_profiles_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let result = hal.get_ms12_audio_profile_list(handle);
            if port.ms12_audio_profiles.is_empty() {
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetMS12AudioProfileList");
            } else {
                let profiles = ctx.require_ok(result, "dsGetMS12AudioProfileList")?;
                let declared: Vec<String> = port.ms12_audio_profiles.iter().map(|p| p.to_string()).collect();
                ctx.check_eq(profiles, declared, "dsGetMS12AudioProfileList");
            }
            Ok(())
        })
    })
}

fn arc_types_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let result = hal.get_supported_arc_types(handle);
            if port.type_id == AudioPortType::HdmiArc {
                ctx.check_eq(result, Ok(port.arc_type), "dsGetSupportedARCTypes");
            } else {
                ctx.check_status(&result, DsStatus::OperationNotSupported, "dsGetSupportedARCTypes");
            }
            Ok(())
        })
    })
}

fn atmos_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            let result = hal.get_sink_device_atmos_capability(handle);
            ctx.check_eq(result, Ok(port.atmos_capability), "dsGetSinkDeviceAtmosCapability");
            Ok(())
        })
    })
}

fn ms12_decode_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            ctx.check_eq(hal.is_audio_ms12_decode(handle), Ok(port.is_ms12_decode), "dsIsAudioMS12Decode");
            Ok(())
        })
    })
}

fn ms11_decode_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            ctx.check_eq(hal.is_audio_ms11_decode(handle), Ok(port.is_ms11_decode), "dsIsAudioMS11Decode");
            Ok(())
        })
    })
}

fn audio_capabilities_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    let declared = ctx.config().audio.as_ref().map(|audio| audio.capabilities).unwrap_or_default();
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, _port, handle| {
            ctx.check_eq(hal.get_audio_capabilities(handle), Ok(declared), "dsGetAudioCapabilities");
            Ok(())
        })
    })
}

fn ms12_capabilities_positive(ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
    AUDIO.with_init(ctx, hal, |ctx, hal| {
        each_port(ctx, hal, |ctx, hal, port, handle| {
            ctx.check_eq(hal.get_ms12_capabilities(handle), Ok(port.ms12_capabilities), "dsGetMS12Capabilities");
            Ok(())
        })
    })
}
