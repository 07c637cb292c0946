// src/session.rs
//! One harness invocation: load the profile, build the tables, run suites
//!
//! ```rust,no_run
//! use ds_hal_harness::config::SettingsLoader;
//! use ds_hal_harness::session::Session;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = SettingsLoader::new().with_file("harness.toml").load()?;
//!     let mut session = Session::open(settings)?;
//!     let mut hal = session.backend()?;
//!     let report = session.run(&mut hal)?;
//!     session.write_report(&report)?;
//!     session.close();
//!     Ok(())
//! }
//! ```

use crate::config::{parse_configuration, DeviceSettingsConfig, HarnessSettings, ModuleMask};
use crate::error::{HarnessError, HarnessResult, IoContext};
use crate::hal::{DeviceSettingsHal, SimulatedHal};
use crate::profile::ProfileStore;
use crate::suite::{register_suites, RunReport, Runner, TestSuite};
use std::path::PathBuf;
use tracing::{info, warn};

/// Subsystems with capability tables and bundled suites.
const TESTABLE: ModuleMask = ModuleMask::AUDIO_PORT
    .union(ModuleMask::VIDEO_PORT)
    .union(ModuleMask::VIDEO_DEVICE);

pub struct Session {
    settings: HarnessSettings,
    config: Option<DeviceSettingsConfig>,
}

impl Session {
    /// Load and parse the profile named by `settings`.
    pub fn open(settings: HarnessSettings) -> HarnessResult<Self> {
        let store = ProfileStore::load(&settings.profile_path)?;
        let config = parse_configuration(&store)?;
        Ok(Self::with_config(settings, config))
    }

    /// Session over tables that were parsed elsewhere.
    pub fn with_config(settings: HarnessSettings, config: DeviceSettingsConfig) -> Self {
        if let Err(issues) = config.validate_consistency() {
            for issue in issues {
                warn!(%issue, "profile inconsistency");
            }
        }

        let summary = config.summary();
        info!(
            profile = %settings.profile_path.display(),
            class = ?summary.device_class,
            modules = ?summary.modules,
            audio_ports = summary.audio_ports,
            video_ports = summary.video_ports,
            video_devices = summary.video_devices,
            fingerprint = %format!("{:08x}", summary.fingerprint),
            "session opened"
        );

        Self {
            settings,
            config: Some(config),
        }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    pub fn config(&self) -> HarnessResult<&DeviceSettingsConfig> {
        self.config
            .as_ref()
            .ok_or(HarnessError::Closed { operation: "config" })
    }

    /// Suites for the configured tiers.
    ///
    /// A profile without any table-carrying subsystem still registers; its
    /// run has no L1 or L2 cases.
    pub fn suites(&self) -> HarnessResult<Vec<TestSuite>> {
        let config = self.config()?;
        if !config.modules.intersects(TESTABLE) {
            warn!(modules = ?config.modules, "profile declares no subsystem with bundled L1/L2 cases");
        }
        Ok(register_suites(config.modules, config.device_class, &self.settings.tiers))
    }

    /// HAL backend named by the settings.
    pub fn backend(&self) -> HarnessResult<SimulatedHal> {
        let config = self.config()?;
        match self.settings.backend.as_str() {
            SimulatedHal::NAME => Ok(SimulatedHal::new(config)),
            other => Err(HarnessError::Registration(format!("backend '{other}' is not available"))),
        }
    }

    pub fn run(&self, hal: &mut dyn DeviceSettingsHal) -> HarnessResult<RunReport> {
        let suites = self.suites()?;
        let config = self.config()?;
        Ok(Runner::new(config).run(&suites, hal))
    }

    /// Write the JSON report if a report path is configured.
    pub fn write_report(&self, report: &RunReport) -> HarnessResult<Option<PathBuf>> {
        let Some(path) = &self.settings.report_path else {
            return Ok(None);
        };
        let json = report.to_json_pretty()?;
        std::fs::write(path, json).with_path(path)?;
        info!(path = %path.display(), "report written");
        Ok(Some(path.clone()))
    }

    /// Release the capability tables. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut config) = self.config.take() {
            config.term();
            info!("session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.config.is_none()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Phase;
    use crate::suite::Tier;
    use tempfile::TempDir;

    const SINK_PROFILE: &str = include_str!("../profiles/sink.toml");

    fn sink_session(tiers: Vec<Tier>) -> Session {
        let store = ProfileStore::from_toml_str(SINK_PROFILE).unwrap();
        let settings = HarnessSettings {
            tiers,
            ..Default::default()
        };
        Session::with_config(settings, parse_configuration(&store).unwrap())
    }

    #[test]
    fn test_missing_profile_is_setup_failure() {
        let settings = HarnessSettings {
            profile_path: PathBuf::from("/nonexistent/deviceSettings.toml"),
            ..Default::default()
        };
        let err = Session::open(settings).err().unwrap();
        assert_eq!(err.phase(), Phase::ProfileLoad);
        assert!(err.is_setup_failure());
    }

    #[test]
    fn test_presence_only_profile_runs_without_cases() {
        let store = ProfileStore::from_toml_str("[dsHost]\nType = \"sink\"\n\n[dsFPD]\nType = \"sink\"\n").unwrap();
        let settings = HarnessSettings {
            tiers: vec![Tier::L1, Tier::L2],
            ..Default::default()
        };
        let session = Session::with_config(settings, parse_configuration(&store).unwrap());

        let suites = session.suites().unwrap();
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].tier, Tier::L3);

        let mut hal = session.backend().unwrap();
        let report = session.run(&mut hal).unwrap();
        assert!(report.success());
        assert_eq!(report.totals.total(), 0);
    }

    #[test]
    fn test_unknown_backend_is_registration_failure() {
        let mut session = sink_session(vec![Tier::L1]);
        session.settings.backend = "hardware".to_string();
        let err = session.backend().err().unwrap();
        assert_eq!(err.phase(), Phase::Registration);
        assert!(err.is_setup_failure());
    }

    #[test]
    fn test_run_sink_profile() {
        let session = sink_session(vec![Tier::L1, Tier::L2]);
        let mut hal = session.backend().unwrap();
        let report = session.run(&mut hal).unwrap();
        assert!(report.success(), "failed: {:?}", report.failed_cases());
        assert_eq!(report.suites.len(), 7);
    }

    #[test]
    fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let mut session = sink_session(vec![Tier::L1]);
        session.settings.report_path = Some(path.clone());

        let mut hal = session.backend().unwrap();
        let report = session.run(&mut hal).unwrap();
        assert_eq!(session.write_report(&report).unwrap(), Some(path.clone()));

        let written: RunReport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, report);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut session = sink_session(vec![Tier::L1]);
        session.close();
        session.close();
        assert!(session.is_closed());
        assert!(matches!(session.suites(), Err(HarnessError::Closed { .. })));
    }
}
