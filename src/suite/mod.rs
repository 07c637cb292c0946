// src/suite/mod.rs
//! Conformance suites and their registration
//!
//! A suite is a named list of [`TestCase`]s for one subsystem and tier. Cases
//! are plain functions taking a [`CaseContext`] and the HAL under test, so the
//! same suite runs unchanged against any [`DeviceSettingsHal`] backend.
//!
//! L1 cases exercise each call in isolation (lifecycle, invalid handles,
//! values against the capability tables). L2 cases chain calls: set a value,
//! read it back, repeat for every declared port and value.

pub mod context;
pub mod runner;

mod l1_audio;
mod l1_video_device;
mod l1_video_port;
mod l2_audio;
mod l2_video_device;
mod l2_video_port;

pub use context::{CaseAborted, CaseContext, CaseResult, CheckFailure};
pub use runner::{CaseOutcome, CaseReport, RunReport, Runner, SuiteReport, Totals};

use crate::config::{DeviceClass, DeviceSettingsConfig, ModuleMask};
use crate::hal::status::{DsStatus, HalResult};
use crate::hal::traits::{DeviceSettingsHal, PortHandle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use tracing::info;

/// Test level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Tier {
    /// Single-call unit checks
    L1,
    /// Multi-call module checks
    L2,
    /// Interactive checks with an operator; accepted but nothing is bundled
    L3,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::L1 => "L1",
            Tier::L2 => "L2",
            Tier::L3 => "L3",
        };
        f.write_str(name)
    }
}

pub type CaseFn = fn(&mut CaseContext<'_>, &mut dyn DeviceSettingsHal) -> CaseResult;

pub(crate) type HalCall = fn(&mut dyn DeviceSettingsHal) -> HalResult<()>;

#[derive(Debug, Clone, Copy)]
pub struct TestCase {
    pub name: &'static str,
    pub run: CaseFn,
}

impl TestCase {
    pub const fn new(name: &'static str, run: CaseFn) -> Self {
        Self { name, run }
    }
}

/// Cases for one subsystem at one tier.
#[derive(Debug, Clone)]
pub struct TestSuite {
    pub name: String,
    pub module: ModuleMask,
    pub tier: Tier,
    pub cases: Vec<TestCase>,
    /// Subsystem term, called by the runner after an aborted case
    pub(crate) teardown: HalCall,
}

impl TestSuite {
    pub fn case(&self, name: &str) -> Option<&TestCase> {
        self.cases.iter().find(|case| case.name == name)
    }

    pub fn case_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cases.iter().map(|case| case.name)
    }
}

/// Register the suites for every table-carrying subsystem in `modules`,
/// followed by the L3 entry, which is always present.
///
/// Class-gated L2 cases are only registered when `class` matches. Tiers are
/// processed once each in ascending order whatever order they are given in.
pub fn register_suites(modules: ModuleMask, class: Option<DeviceClass>, tiers: &[Tier]) -> Vec<TestSuite> {
    let mut tiers = tiers.to_vec();
    tiers.sort();
    tiers.dedup();

    let mut suites = Vec::new();
    for tier in tiers {
        match tier {
            Tier::L1 => {
                if modules.contains(ModuleMask::AUDIO_PORT) {
                    suites.push(l1_audio::suite());
                }
                if modules.contains(ModuleMask::VIDEO_PORT) {
                    suites.push(l1_video_port::suite());
                }
                if modules.contains(ModuleMask::VIDEO_DEVICE) {
                    suites.push(l1_video_device::suite());
                }
            }
            Tier::L2 => {
                if modules.contains(ModuleMask::AUDIO_PORT) {
                    suites.push(l2_audio::suite(class));
                }
                if modules.contains(ModuleMask::VIDEO_PORT) {
                    suites.push(l2_video_port::suite(class));
                }
                if modules.contains(ModuleMask::VIDEO_DEVICE) {
                    suites.push(l2_video_device::suite(class));
                }
            }
            // registered below for every profile
            Tier::L3 => {}
        }
    }
    suites.push(l3_suite());

    info!(
        suites = suites.len(),
        cases = suites.iter().map(|s| s.cases.len()).sum::<usize>(),
        "test suites registered"
    );
    suites
}

/// Protocol-level tier. It is registered whatever the profile declares and
/// carries no bundled cases.
fn l3_suite() -> TestSuite {
    TestSuite {
        name: format!("[{} dsDeviceSettings]", Tier::L3),
        module: ModuleMask::empty(),
        tier: Tier::L3,
        cases: Vec::new(),
        teardown: |_| Ok(()),
    }
}

/// `[L1 dsAudio]`, `[L2 dsVideoPort - Sink]`
fn suite_name(tier: Tier, section: &str, class: Option<DeviceClass>) -> String {
    match (tier, class) {
        (Tier::L1, _) | (_, None) => format!("[{tier} {section}]"),
        (_, Some(DeviceClass::Source)) => format!("[{tier} {section} - Source]"),
        (_, Some(DeviceClass::Sink)) => format!("[{tier} {section} - Sink]"),
    }
}

/// Lifecycle calls and legacy status codes of one subsystem, shared by its
/// cases.
pub(crate) struct Subsystem {
    pub module: ModuleMask,
    pub section: &'static str,
    pub init: HalCall,
    pub term: HalCall,
    pub init_call: &'static str,
    pub term_call: &'static str,
    /// Legacy status of a second init
    pub legacy_reinit: DsStatus,
    /// Legacy status of calls made before init
    pub legacy_uninit: DsStatus,
    /// Handle of the first declared port or device
    pub first_handle: fn(&DeviceSettingsConfig, &mut dyn DeviceSettingsHal) -> HalResult<PortHandle>,
}

impl Subsystem {
    fn suite(&self, tier: Tier, class: Option<DeviceClass>, cases: Vec<TestCase>) -> TestSuite {
        TestSuite {
            name: suite_name(tier, self.section, class),
            module: self.module,
            tier,
            cases,
            teardown: self.term,
        }
    }

    #[track_caller]
    pub fn init(&self, ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
        let result = (self.init)(hal);
        ctx.require_ok(result, self.init_call)
    }

    #[track_caller]
    pub fn term(&self, ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
        let result = (self.term)(hal);
        ctx.require_ok(result, self.term_call)
    }

    /// Run `body` between init and term.
    #[track_caller]
    pub fn with_init(
        &self,
        ctx: &mut CaseContext<'_>,
        hal: &mut dyn DeviceSettingsHal,
        body: impl FnOnce(&mut CaseContext<'_>, &mut dyn DeviceSettingsHal) -> CaseResult,
    ) -> CaseResult {
        self.init(ctx, hal)?;
        body(ctx, hal)?;
        self.term(ctx, hal)
    }

    #[track_caller]
    pub fn first_handle(
        &self,
        ctx: &mut CaseContext<'_>,
        hal: &mut dyn DeviceSettingsHal,
    ) -> Result<PortHandle, CaseAborted> {
        let config = ctx.config();
        let result = (self.first_handle)(config, hal);
        ctx.require_ok(result, "port lookup")
    }

    /// Init and term twice in a row.
    pub fn init_term_positive(&self, ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
        self.init(ctx, hal)?;
        self.term(ctx, hal)?;
        self.init(ctx, hal)?;
        self.term(ctx, hal)
    }

    /// A second init must be refused.
    pub fn init_negative(&self, ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
        self.init(ctx, hal)?;
        let result = (self.init)(hal);
        ctx.check_extended(&result, DsStatus::AlreadyInitialized, self.legacy_reinit, self.init_call);
        self.term(ctx, hal)
    }

    /// Term before init and after term must be refused.
    pub fn term_negative(&self, ctx: &mut CaseContext<'_>, hal: &mut dyn DeviceSettingsHal) -> CaseResult {
        let result = (self.term)(hal);
        ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::None, self.term_call);
        self.init(ctx, hal)?;
        self.term(ctx, hal)?;
        let result = (self.term)(hal);
        ctx.check_extended(&result, DsStatus::NotInitialized, DsStatus::None, self.term_call);
        Ok(())
    }

    /// Handle-taking call: before init, with an invalid handle, after term.
    pub fn handle_negative<T>(
        &self,
        ctx: &mut CaseContext<'_>,
        hal: &mut dyn DeviceSettingsHal,
        call: &str,
        op: impl FnMut(&mut dyn DeviceSettingsHal, PortHandle) -> HalResult<T>,
    ) -> CaseResult {
        self.handle_negative_as(ctx, hal, call, self.legacy_uninit, op)
    }

    /// [`Self::handle_negative`] for calls whose legacy uninitialized status
    /// differs from the rest of the subsystem.
    pub fn handle_negative_as<T>(
        &self,
        ctx: &mut CaseContext<'_>,
        hal: &mut dyn DeviceSettingsHal,
        call: &str,
        legacy_uninit: DsStatus,
        mut op: impl FnMut(&mut dyn DeviceSettingsHal, PortHandle) -> HalResult<T>,
    ) -> CaseResult {
        let result = op(hal, PortHandle::INVALID);
        ctx.check_extended(&result, DsStatus::NotInitialized, legacy_uninit, call);

        self.init(ctx, hal)?;
        let handle = self.first_handle(ctx, hal)?;
        let result = op(hal, PortHandle::INVALID);
        ctx.check_status(&result, DsStatus::InvalidParam, call);
        self.term(ctx, hal)?;

        let result = op(hal, handle);
        ctx.check_extended(&result, DsStatus::NotInitialized, legacy_uninit, call);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(suites: &[TestSuite]) -> Vec<&str> {
        suites.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_only_present_modules_registered() {
        let suites = register_suites(
            ModuleMask::AUDIO_PORT | ModuleMask::HOST | ModuleMask::FPD,
            Some(DeviceClass::Sink),
            &[Tier::L1],
        );
        assert_eq!(names(&suites), vec!["[L1 dsAudio]", "[L3 dsDeviceSettings]"]);
        assert_eq!(suites[0].tier, Tier::L1);
    }

    #[test]
    fn test_tiers_sorted_and_deduplicated() {
        let modules = ModuleMask::AUDIO_PORT | ModuleMask::VIDEO_PORT | ModuleMask::VIDEO_DEVICE;
        let suites = register_suites(
            modules,
            Some(DeviceClass::Source),
            &[Tier::L2, Tier::L1, Tier::L2, Tier::L3],
        );
        assert_eq!(
            names(&suites),
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
    }

    #[test]
    fn test_l3_registered_for_every_profile() {
        for tiers in [&[Tier::L1][..], &[Tier::L1, Tier::L2], &[Tier::L3]] {
            let suites = register_suites(ModuleMask::empty(), None, tiers);
            assert_eq!(names(&suites), vec!["[L3 dsDeviceSettings]"]);
            assert_eq!(suites[0].tier, Tier::L3);
            assert!(suites[0].cases.is_empty());
        }

        let presence_only = register_suites(
            ModuleMask::HOST | ModuleMask::FPD | ModuleMask::HDMI_IN,
            Some(DeviceClass::Sink),
            &[Tier::L1, Tier::L2],
        );
        assert_eq!(names(&presence_only), vec!["[L3 dsDeviceSettings]"]);
    }

    #[test]
    fn test_class_gated_cases() {
        let sink = register_suites(ModuleMask::VIDEO_DEVICE, Some(DeviceClass::Sink), &[Tier::L2]);
        let source = register_suites(ModuleMask::VIDEO_DEVICE, Some(DeviceClass::Source), &[Tier::L2]);

        assert!(sink[0].case("L2_SetAndVerifyDisplayframerate_sink").is_some());
        assert!(sink[0].case("L2_SetAndGetDFC_source").is_none());
        assert!(source[0].case("L2_SetAndGetDFC_source").is_some());
        assert!(source[0].case("L2_SetAndVerifyDisplayframerate_sink").is_none());
    }

    #[test]
    fn test_case_names_unique_per_suite() {
        let modules = ModuleMask::AUDIO_PORT | ModuleMask::VIDEO_PORT | ModuleMask::VIDEO_DEVICE;
        for class in [DeviceClass::Source, DeviceClass::Sink] {
            for suite in register_suites(modules, Some(class), &[Tier::L1, Tier::L2]) {
                let mut seen: Vec<&str> = suite.case_names().collect();
                let total = seen.len();
                seen.sort();
                seen.dedup();
                assert_eq!(seen.len(), total, "duplicate case in {}", suite.name);
            }
        }
    }

    #[test]
    fn test_tier_display_and_serde() {
        assert_eq!(Tier::L2.to_string(), "L2");
        assert_eq!(serde_json::to_string(&Tier::L3).unwrap(), "\"l3\"");
    }
}
