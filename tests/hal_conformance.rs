// tests/hal_conformance.rs
//! Full L1/L2 runs of the bundled profiles against the simulated HAL

use ds_hal_harness::suite::{CaseOutcome, RunReport};
use ds_hal_harness::{
    parse_configuration, DeviceClass, DsStatus, HarnessSettings, ProfileStore, Session, SimulatedHal, Tier,
};

const SOURCE_PROFILE: &str = include_str!("../profiles/source.toml");
const SINK_PROFILE: &str = include_str!("../profiles/sink.toml");

fn session(profile: &str, tiers: Vec<Tier>) -> Session {
    let store = ProfileStore::from_toml_str(profile).expect("profile should parse");
    let config = parse_configuration(&store).expect("configuration should parse");
    let settings = HarnessSettings {
        tiers,
        ..Default::default()
    };
    Session::with_config(settings, config)
}

fn outcome<'r>(report: &'r RunReport, suite: &str, case: &str) -> &'r CaseOutcome {
    let suite = report
        .suites
        .iter()
        .find(|s| s.name == suite)
        .unwrap_or_else(|| panic!("suite {suite} not in report"));
    &suite
        .cases
        .iter()
        .find(|c| c.name == case)
        .unwrap_or_else(|| panic!("case {case} not in {}", suite.name))
        .outcome
}

#[test]
fn test_source_profile_passes_every_case() {
    let session = session(SOURCE_PROFILE, vec![Tier::L1, Tier::L2]);
    let mut hal = session.backend().unwrap();
    let report = session.run(&mut hal).unwrap();

    assert!(report.success(), "failed cases: {:?}", report.failed_cases());
    assert_eq!(report.device_class, Some(DeviceClass::Source));
    assert_eq!(report.backend, SimulatedHal::NAME);

    let names: Vec<&str> = report.suites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "[L1 dsAudio]",
            "[L1 dsVideoPort]",
            "[L1 dsVideoDevice]",
            "[L2 dsAudio - Source]",
            "[L2 dsVideoPort - Source]",
            "[L2 dsVideoDevice - Source]",
            "[L3 dsDeviceSettings]",
        ]
    );
    assert!(outcome(&report, "[L2 dsVideoDevice - Source]", "L2_GetVideoCodecInfo_source").is_pass());
}

#[test]
fn test_sink_profile_passes_every_case() {
    let session = session(SINK_PROFILE, vec![Tier::L1, Tier::L2]);
    let mut hal = session.backend().unwrap();
    let report = session.run(&mut hal).unwrap();

    assert!(report.success(), "failed cases: {:?}", report.failed_cases());
    assert_eq!(report.device_class, Some(DeviceClass::Sink));
    assert!(outcome(&report, "[L2 dsAudio - Sink]", "L2_SetAndGetStereoAuto_sink").is_pass());
    assert!(outcome(&report, "[L2 dsVideoDevice - Sink]", "L2_SetAndVerifyDisplayframerate_sink").is_pass());
}

#[test]
fn test_report_totals_match_cases() {
    let session = session(SINK_PROFILE, vec![Tier::L1]);
    let mut hal = session.backend().unwrap();
    let report = session.run(&mut hal).unwrap();

    let cases: usize = report.suites.iter().map(|s| s.cases.len()).sum();
    assert_eq!(report.totals.total(), cases);
    assert_eq!(report.totals.passed, cases);
    assert_eq!(report.fingerprint, session.config().unwrap().fingerprint());
}

#[test]
fn test_l3_entry_always_reported() {
    for tiers in [vec![Tier::L3], vec![Tier::L1]] {
        let session = session(SOURCE_PROFILE, tiers);
        let mut hal = session.backend().unwrap();
        let report = session.run(&mut hal).unwrap();

        let l3 = report.suites.last().expect("L3 entry");
        assert_eq!(l3.name, "[L3 dsDeviceSettings]");
        assert_eq!(l3.tier, Tier::L3);
        assert!(l3.cases.is_empty());
        assert!(report.success());
    }
}

#[test]
fn test_wrong_status_fails_case_without_aborting() {
    let session = session(SINK_PROFILE, vec![Tier::L1, Tier::L2]);
    let mut hal = session.backend().unwrap();
    hal.inject_fault("get_audio_capabilities", DsStatus::General);
    let report = session.run(&mut hal).unwrap();

    assert!(!report.success());

    let positive = outcome(&report, "[L1 dsAudio]", "dsGetAudioCapabilities_L1_positive");
    assert!(matches!(positive, CaseOutcome::Failed { .. }), "{positive:?}");
    let sink_ports = session.config().unwrap().audio.as_ref().unwrap().ports.len();
    assert_eq!(positive.failures().len(), sink_ports);

    let negative = outcome(&report, "[L1 dsAudio]", "dsGetAudioCapabilities_L1_negative");
    assert!(matches!(negative, CaseOutcome::Failed { .. }), "{negative:?}");
    assert!(negative.failures()[0].message.contains("dsERR_GENERAL"));
}

#[test]
fn test_aborted_case_terms_subsystem_for_the_next_case() {
    let session = session(SINK_PROFILE, vec![Tier::L2]);
    let mut hal = session.backend().unwrap();
    hal.inject_fault("get_audio_capabilities", DsStatus::OperationFailed);
    let report = session.run(&mut hal).unwrap();

    let aborted = outcome(&report, "[L2 dsAudio - Sink]", "L2_GetAudioCapabilities");
    assert!(matches!(aborted, CaseOutcome::Aborted { .. }), "{aborted:?}");
    assert_eq!(report.totals.aborted, 1);
    assert_eq!(report.failed_cases(), vec!["[L2 dsAudio - Sink]/L2_GetAudioCapabilities".to_string()]);

    // the video suites after it still init cleanly
    for suite in report.suites.iter().filter(|s| s.name != "[L2 dsAudio - Sink]") {
        assert!(suite.cases.iter().all(|c| c.outcome.is_pass()), "{}", suite.name);
    }
}

#[test]
fn test_cleared_faults_restore_conformance() {
    let session = session(SOURCE_PROFILE, vec![Tier::L1]);
    let mut hal = session.backend().unwrap();
    hal.inject_fault("get_resolution", DsStatus::InvalidState);
    assert!(!session.run(&mut hal).unwrap().success());

    hal.clear_faults();
    let report = session.run(&mut hal).unwrap();
    assert!(report.success(), "failed cases: {:?}", report.failed_cases());
}
