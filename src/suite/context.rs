// src/suite/context.rs
//! Per-case assertion context
//!
//! Non-fatal checks record a [`CheckFailure`] and let the case continue.
//! Fatal checks (`require_*`) record the failure and return [`CaseAborted`],
//! which the case propagates with `?`.

use crate::config::{DeviceSettingsConfig, ModuleMask};
use crate::hal::status::{DsStatus, HalResult};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::panic::Location;
use tracing::debug;

/// A fatal check failed; the case stops here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseAborted;

pub type CaseResult = Result<(), CaseAborted>;

/// One failed check, with the location of the check in the case body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub message: String,
    pub file: String,
    pub line: u32,
}

/// State handed to a running test case.
pub struct CaseContext<'a> {
    config: &'a DeviceSettingsConfig,
    extended: bool,
    failures: Vec<CheckFailure>,
}

impl<'a> CaseContext<'a> {
    /// Context for a case exercising `module`; the module's
    /// `extendedEnumsSupported` flag picks the expected status codes.
    pub fn new(config: &'a DeviceSettingsConfig, module: ModuleMask) -> Self {
        Self {
            config,
            extended: config.extended_enums(module),
            failures: Vec::new(),
        }
    }

    pub fn config(&self) -> &'a DeviceSettingsConfig {
        self.config
    }

    /// Whether the subsystem under test reports extended status codes.
    pub fn extended(&self) -> bool {
        self.extended
    }

    /// Status the HAL must return: `enhanced` with extended codes, `legacy` otherwise.
    pub fn expected_status(&self, enhanced: DsStatus, legacy: DsStatus) -> DsStatus {
        if self.extended {
            enhanced
        } else {
            legacy
        }
    }

    #[track_caller]
    pub fn fail(&mut self, message: impl Into<String>) {
        let location = Location::caller();
        let failure = CheckFailure {
            message: message.into(),
            file: location.file().to_string(),
            line: location.line(),
        };
        debug!(file = %failure.file, line = failure.line, "{}", failure.message);
        self.failures.push(failure);
    }

    #[track_caller]
    pub fn check(&mut self, condition: bool, what: impl Into<String>) -> bool {
        if !condition {
            self.fail(what);
        }
        condition
    }

    #[track_caller]
    pub fn check_eq<T: PartialEq + Debug>(&mut self, actual: T, expected: T, what: &str) -> bool {
        if actual == expected {
            return true;
        }
        self.fail(format!("{what}: expected {expected:?}, got {actual:?}"));
        false
    }

    #[track_caller]
    pub fn require_eq<T: PartialEq + Debug>(&mut self, actual: T, expected: T, what: &str) -> CaseResult {
        if self.check_eq(actual, expected, what) {
            Ok(())
        } else {
            Err(CaseAborted)
        }
    }

    /// Check that `call` returned `expected` (`DsStatus::None` for success).
    #[track_caller]
    pub fn check_status<T>(&mut self, result: &HalResult<T>, expected: DsStatus, call: &str) -> bool {
        let actual = DsStatus::of(result);
        if actual == expected {
            return true;
        }
        self.fail(format!("{call}: expected {expected}, got {actual}"));
        false
    }

    /// Check a status that depends on extended status code support.
    #[track_caller]
    pub fn check_extended<T>(
        &mut self,
        result: &HalResult<T>,
        enhanced: DsStatus,
        legacy: DsStatus,
        call: &str,
    ) -> bool {
        let expected = self.expected_status(enhanced, legacy);
        self.check_status(result, expected, call)
    }

    /// Unwrap a successful call or abort the case.
    #[track_caller]
    pub fn require_ok<T>(&mut self, result: HalResult<T>, call: &str) -> Result<T, CaseAborted> {
        match result {
            Ok(value) => Ok(value),
            Err(status) => {
                self.fail(format!("{call}: expected {}, got {status}", DsStatus::None));
                Err(CaseAborted)
            }
        }
    }

    pub fn failures(&self) -> &[CheckFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<CheckFailure> {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_config() -> DeviceSettingsConfig {
        DeviceSettingsConfig::default()
    }

    #[test]
    fn test_check_eq_records_location() {
        let config = legacy_config();
        let mut ctx = CaseContext::new(&config, ModuleMask::AUDIO_PORT);
        assert!(ctx.check_eq(3, 3, "count"));
        assert!(!ctx.check_eq(3, 4, "count"));

        let failure = &ctx.failures()[0];
        assert_eq!(failure.message, "count: expected 4, got 3");
        assert!(failure.file.ends_with("context.rs"));
        assert!(failure.line > 0);
    }

    #[test]
    fn test_require_ok_aborts() {
        let config = legacy_config();
        let mut ctx = CaseContext::new(&config, ModuleMask::VIDEO_PORT);
        assert_eq!(ctx.require_ok(Ok::<u8, DsStatus>(7), "get"), Ok(7));
        assert_eq!(
            ctx.require_ok(Err::<u8, DsStatus>(DsStatus::General), "get"),
            Err(CaseAborted)
        );
        assert!(ctx.failures()[0].message.contains("dsERR_GENERAL"));
    }

    #[test]
    fn test_check_extended_uses_legacy_without_flag() {
        let config = legacy_config();
        let mut ctx = CaseContext::new(&config, ModuleMask::AUDIO_PORT);
        assert!(!ctx.extended());

        let result: HalResult<()> = Err(DsStatus::InvalidParam);
        assert!(ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::InvalidParam, "get"));

        // Legacy success maps onto Ok
        let result: HalResult<()> = Ok(());
        assert!(ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::None, "term"));
        assert!(ctx.into_failures().is_empty());
    }
}
