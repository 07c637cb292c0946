// tests/error_propagation_tests.rs
//! Error propagation through a harness session
//!
//! Every stage of a session reports failures as a [`HarnessError`] tagged
//! with the phase it belongs to, so the command line runner can tell a setup
//! failure from a failed run.

use ds_hal_harness::config::ConfigError;
use ds_hal_harness::{HarnessError, HarnessSettings, Phase, ProfileError, Session, SettingsLoader};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn profile_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn open(profile: &NamedTempFile) -> Result<Session, HarnessError> {
    Session::open(HarnessSettings {
        profile_path: profile.path().to_path_buf(),
        ..Default::default()
    })
}

#[test]
fn test_unreadable_profile() {
    let err = Session::open(HarnessSettings {
        profile_path: PathBuf::from("/nonexistent/deviceSettings.toml"),
        ..Default::default()
    })
    .err()
    .unwrap();

    assert!(matches!(err, HarnessError::Profile(ProfileError::Io { .. })));
    assert_eq!(err.phase(), Phase::ProfileLoad);
    assert!(err.is_setup_failure());
    assert!(err.to_string().starts_with("[PROFILE]"));
}

#[test]
fn test_malformed_profile() {
    let file = profile_file("[dsAudio\nType = ");
    let err = open(&file).err().unwrap();

    assert!(matches!(err, HarnessError::Profile(ProfileError::Parse { .. })));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn test_parse_failure_keeps_source_chain() {
    let file = profile_file("[dsAudio]\nType = \"sink\"\nName = \"TV\"\nNumber_of_supported_ports = 99\n");
    let err = open(&file).err().unwrap();

    assert_eq!(err.phase(), Phase::Parse);
    let HarnessError::Config(config) = &err else {
        panic!("expected a configuration error, got {err:?}");
    };
    assert!(matches!(config.root_cause(), ConfigError::CapacityExceeded { count: 99, .. }));

    // dispatcher error -> subsystem error
    let source = err.source().expect("dispatcher error");
    assert!(source.source().is_some());
}

#[test]
fn test_presence_only_profile_is_not_a_failure() {
    let file = profile_file("[dsHost]\nType = \"source\"\n\n[dsFPD]\nType = \"source\"\n");
    let session = open(&file).unwrap();

    let suites = session.suites().unwrap();
    assert!(suites.iter().all(|suite| suite.cases.is_empty()));
    let mut hal = session.backend().unwrap();
    assert!(session.run(&mut hal).unwrap().success());
}

#[test]
fn test_unknown_backend_is_setup_failure() {
    let file = profile_file(include_str!("../profiles/sink.toml"));
    let session = Session::open(HarnessSettings {
        profile_path: file.path().to_path_buf(),
        backend: "hardware".to_string(),
        ..Default::default()
    })
    .unwrap();

    let err = session.backend().err().unwrap();
    assert_eq!(err.phase(), Phase::Registration);
    assert!(err.is_setup_failure());
    assert!(err.to_string().contains("hardware"));
}

#[test]
fn test_unwritable_report_names_path() {
    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("missing").join("report.json");
    let profile = profile_file(include_str!("../profiles/source.toml"));

    let session = Session::open(HarnessSettings {
        profile_path: profile.path().to_path_buf(),
        report_path: Some(report_path.clone()),
        ..Default::default()
    })
    .unwrap();
    let mut hal = session.backend().unwrap();
    let report = session.run(&mut hal).unwrap();

    let err = session.write_report(&report).unwrap_err();
    assert_eq!(err.phase(), Phase::Report);
    assert!(!err.is_setup_failure());
    match err {
        HarnessError::Io { path, .. } => assert_eq!(path, report_path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn test_closed_session_rejects_work() {
    let profile = profile_file(include_str!("../profiles/sink.toml"));
    let mut session = open(&profile).unwrap();
    session.close();

    let err = session.backend().err().unwrap();
    assert!(matches!(err, HarnessError::Closed { .. }));
    assert_eq!(err.phase(), Phase::Run);
}

#[test]
fn test_settings_error_conversion() {
    let err: HarnessError = SettingsLoader::new()
        .with_file("/nonexistent/harness.toml")
        .load()
        .unwrap_err()
        .into();
    assert_eq!(err.phase(), Phase::Settings);
    assert!(err.to_string().starts_with("[SETTINGS]"));
}
