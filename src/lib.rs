//! ds-hal-harness: profile-driven conformance harness for the device settings HAL
//!
//! The harness reads a platform profile describing what the device under
//! test is supposed to support, turns it into typed capability tables and
//! runs L1/L2 conformance suites against a HAL backend, comparing every
//! answer with the tables. It features:
//!
//! - A read-only key-value profile store over TOML or JSON documents
//! - Capability parsers for audio ports, video ports and video devices
//! - A module dispatcher driven by the subsystems the profile declares
//! - Suites that check status codes in both legacy and extended mode
//! - A simulated HAL backend that answers from the tables
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ds_hal_harness::{HarnessSettings, Session, Tier};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = HarnessSettings {
//!         profile_path: "profiles/sink.toml".into(),
//!         tiers: vec![Tier::L1, Tier::L2],
//!         ..Default::default()
//!     };
//!     let session = Session::open(settings)?;
//!     let mut hal = session.backend()?;
//!     let report = session.run(&mut hal)?;
//!     println!("{} of {} cases passed", report.totals.passed, report.totals.total());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod hal;
pub mod profile;
pub mod session;
pub mod suite;

// Re-export commonly used types for convenience
pub use crate::config::{
    parse_configuration, ConfigError, DeviceClass, DeviceSettingsConfig, HarnessSettings, ModuleMask,
    SettingsLoader,
};
pub use error::{HarnessError, HarnessResult, Phase};
pub use hal::{DeviceSettingsHal, DsStatus, HalResult, SimulatedHal};
pub use profile::{ProfileError, ProfileStore};
pub use session::Session;
pub use suite::{register_suites, RunReport, Runner, TestSuite, Tier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Profile-driven conformance harness for the device settings HAL".to_string(),
        backends: crate::config::loader::KNOWN_BACKENDS.iter().map(|b| b.to_string()).collect(),
        tiers: vec![Tier::L1, Tier::L2, Tier::L3],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// HAL backends this build can drive
    pub backends: Vec<String>,
    /// Tiers accepted on the command line
    pub tiers: Vec<Tier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert_eq!(info.backends, vec![SimulatedHal::NAME.to_string()]);
        assert_eq!(info.tiers.len(), 3);
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "ds-hal-harness");
    }
}
