use thiserror::Error;

use crate::{DType, Device};

/// Why the accelerator probe did not yield a device.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("no accelerators detected")]
    NoAccelerator,
    #[error("accelerator probing unsupported: {0}")]
    Unsupported(&'static str),
    #[error("accelerator driver query failed: {0}")]
    Driver(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KernelError {
    #[error("kernel `{kernel}` does not accept {dtype} inputs")]
    UnsupportedDType { kernel: &'static str, dtype: DType },
    #[error("kernel `{0}` received an empty input")]
    EmptyInput(&'static str),
    #[error("kernel `{kernel}` signature mismatch: {reason}")]
    Signature { kernel: &'static str, reason: String },
    #[error("kernel `{kernel}` cannot run on {device}")]
    UnsupportedDevice { kernel: &'static str, device: Device },
    #[error("kernel `{kernel}` storage error: {reason}")]
    Storage { kernel: &'static str, reason: String },
}

/// Failures surfaced by the harness, one variant per stage.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HarnessError {
    #[error("graph `{graph}` is malformed: {reason}")]
    InvalidGraph { graph: String, reason: String },
    #[error("failed to load graph `{graph}`: {reason}")]
    GraphLoad { graph: String, reason: String },
    #[error("execution of graph `{graph}` failed: {reason}")]
    Execution { graph: String, reason: String },
    #[error("verification failed for `{check}`: got {actual}, expected {expected}")]
    Verification {
        check: String,
        actual: f64,
        expected: f64,
    },
    #[error("tensor error: {0}")]
    Tensor(String),
}

impl HarnessError {
    pub fn stage(&self) -> &'static str {
        match self {
            HarnessError::InvalidGraph { .. } => "build",
            HarnessError::GraphLoad { .. } => "load",
            HarnessError::Execution { .. } | HarnessError::Tensor(_) => "execute",
            HarnessError::Verification { .. } => "verify",
        }
    }
}
