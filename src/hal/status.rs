// src/hal/status.rs
//! Status codes returned by every device settings HAL entry point.
//!
//! Values are wire compatible with the C `dsError_t` enumeration so that a
//! status read from a native binding can be converted losslessly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HAL status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum DsStatus {
    /// Success
    #[default]
    None = 0,
    /// Unspecified failure
    General = 1,
    /// An argument was out of range or did not name a known port
    InvalidParam = 2,
    /// The call is not legal in the current state
    InvalidState = 3,
    /// Init called twice without an intervening term
    AlreadyInitialized = 4,
    /// Called before init or after term
    NotInitialized = 5,
    /// The platform does not implement the call
    OperationNotSupported = 6,
    /// A required resource is unavailable
    ResourceNotAvailable = 7,
    /// The underlying driver reported a failure
    OperationFailed = 8,
}

/// Result of a HAL call: `Ok` maps to [`DsStatus::None`].
pub type HalResult<T> = Result<T, DsStatus>;

impl DsStatus {
    /// Every status code, in numeric order.
    pub const ALL: [DsStatus; 9] = [
        DsStatus::None,
        DsStatus::General,
        DsStatus::InvalidParam,
        DsStatus::InvalidState,
        DsStatus::AlreadyInitialized,
        DsStatus::NotInitialized,
        DsStatus::OperationNotSupported,
        DsStatus::ResourceNotAvailable,
        DsStatus::OperationFailed,
    ];

    /// Numeric value as defined by `dsError_t`.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Collapse a HAL result into the status the C API would have returned.
    pub fn of<T>(result: &HalResult<T>) -> DsStatus {
        match result {
            Ok(_) => DsStatus::None,
            Err(status) => *status,
        }
    }

    /// Name of the C enumerator, used in logs and reports.
    pub fn c_name(self) -> &'static str {
        match self {
            DsStatus::None => "dsERR_NONE",
            DsStatus::General => "dsERR_GENERAL",
            DsStatus::InvalidParam => "dsERR_INVALID_PARAM",
            DsStatus::InvalidState => "dsERR_INVALID_STATE",
            DsStatus::AlreadyInitialized => "dsERR_ALREADY_INITIALIZED",
            DsStatus::NotInitialized => "dsERR_NOT_INITIALIZED",
            DsStatus::OperationNotSupported => "dsERR_OPERATION_NOT_SUPPORTED",
            DsStatus::ResourceNotAvailable => "dsERR_RESOURCE_NOT_AVAILABLE",
            DsStatus::OperationFailed => "dsERR_OPERATION_FAILED",
        }
    }
}

impl TryFrom<i32> for DsStatus {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        DsStatus::ALL
            .iter()
            .copied()
            .find(|status| status.code() == code)
            .ok_or(code)
    }
}

impl fmt::Display for DsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.c_name(), self.code())
    }
}

impl std::error::Error for DsStatus {}
