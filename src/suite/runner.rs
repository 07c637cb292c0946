// src/suite/runner.rs
//! Sequential suite runner and its report

use super::context::{CaseAborted, CaseContext, CheckFailure};
use super::{TestCase, TestSuite, Tier};
use crate::config::{DeviceClass, DeviceSettingsConfig, ModuleMask};
use crate::hal::traits::DeviceSettingsHal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CaseOutcome {
    Passed,
    /// Every check ran; some failed
    Failed { failures: Vec<CheckFailure> },
    /// A fatal check stopped the case
    Aborted { failures: Vec<CheckFailure> },
}

impl CaseOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, CaseOutcome::Passed)
    }

    pub fn failures(&self) -> &[CheckFailure] {
        match self {
            CaseOutcome::Passed => &[],
            CaseOutcome::Failed { failures } | CaseOutcome::Aborted { failures } => failures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    pub name: String,
    pub outcome: CaseOutcome,
    pub duration_us: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub name: String,
    pub module: ModuleMask,
    pub tier: Tier,
    pub cases: Vec<CaseReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
}

impl Totals {
    fn record(&mut self, outcome: &CaseOutcome) {
        match outcome {
            CaseOutcome::Passed => self.passed += 1,
            CaseOutcome::Failed { .. } => self.failed += 1,
            CaseOutcome::Aborted { .. } => self.aborted += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.aborted
    }
}

/// Everything a run produced, serialisable as the JSON report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub backend: String,
    /// Fingerprint of the capability tables the run checked against
    pub fingerprint: u32,
    pub device_class: Option<DeviceClass>,
    pub suites: Vec<SuiteReport>,
    pub totals: Totals,
}

impl RunReport {
    /// True when no case failed or aborted.
    pub fn success(&self) -> bool {
        self.totals.failed == 0 && self.totals.aborted == 0
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Names of every case that did not pass, as `suite/case`.
    pub fn failed_cases(&self) -> Vec<String> {
        self.suites
            .iter()
            .flat_map(|suite| {
                suite
                    .cases
                    .iter()
                    .filter(|case| !case.outcome.is_pass())
                    .map(move |case| format!("{}/{}", suite.name, case.name))
            })
            .collect()
    }
}

/// Runs registered suites against one HAL, in order, one case at a time.
pub struct Runner<'a> {
    config: &'a DeviceSettingsConfig,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a DeviceSettingsConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, suites: &[TestSuite], hal: &mut dyn DeviceSettingsHal) -> RunReport {
        let mut totals = Totals::default();
        let mut reports = Vec::with_capacity(suites.len());

        info!(backend = hal.backend_name(), suites = suites.len(), "starting run");

        for suite in suites {
            info!(suite = %suite.name, cases = suite.cases.len(), "running suite");
            let mut cases = Vec::with_capacity(suite.cases.len());
            for case in &suite.cases {
                let report = self.run_case(suite, case, hal);
                totals.record(&report.outcome);
                cases.push(report);
            }
            reports.push(SuiteReport {
                name: suite.name.clone(),
                module: suite.module,
                tier: suite.tier,
                cases,
            });
        }

        info!(
            passed = totals.passed,
            failed = totals.failed,
            aborted = totals.aborted,
            "run complete"
        );

        RunReport {
            backend: hal.backend_name().to_string(),
            fingerprint: self.config.fingerprint(),
            device_class: self.config.device_class,
            suites: reports,
            totals,
        }
    }

    /// Run a single case; an aborted case is followed by the suite teardown.
    pub fn run_case(&self, suite: &TestSuite, case: &TestCase, hal: &mut dyn DeviceSettingsHal) -> CaseReport {
        let mut ctx = CaseContext::new(self.config, suite.module);
        let started = Instant::now();
        let result = (case.run)(&mut ctx, hal);
        let duration_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        let failures = ctx.into_failures();

        let outcome = match result {
            Err(CaseAborted) => {
                warn!(suite = %suite.name, case = case.name, "case aborted");
                if let Err(status) = (suite.teardown)(hal) {
                    debug!(suite = %suite.name, %status, "teardown after abort");
                }
                CaseOutcome::Aborted { failures }
            }
            Ok(()) if failures.is_empty() => {
                debug!(suite = %suite.name, case = case.name, "case passed");
                CaseOutcome::Passed
            }
            Ok(()) => {
                warn!(
                    suite = %suite.name,
                    case = case.name,
                    failures = failures.len(),
                    "case failed"
                );
                CaseOutcome::Failed { failures }
            }
        };

        CaseReport {
            name: case.name.to_string(),
            outcome,
            duration_us,
        }
    }
}
