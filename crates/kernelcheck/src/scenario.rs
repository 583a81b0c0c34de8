use kernelcheck_core::{DType, HarnessError};
use kernelcheck_runtime::{generate_input, InputVector, ReductionCheck};

use crate::cli::Command;

pub const INT_VECTOR_SIZE: usize = 10;
pub const FLOAT_VECTOR_SIZE: usize = 100;
pub const DEFAULT_SEED: u64 = 0;

/// An input vector plus the checks run against it.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub title: &'static str,
    pub input: InputVector,
    pub checks: Vec<ReductionCheck>,
}

pub fn max_int(size: usize) -> Result<Scenario, HarnessError> {
    Ok(Scenario {
        title: "max over int32 vector",
        input: generate_input(size, DType::I32, DEFAULT_SEED)?,
        checks: vec![ReductionCheck::max(DType::I32)],
    })
}

pub fn reductions(size: usize, seed: u64) -> Result<Scenario, HarnessError> {
    Ok(Scenario {
        title: "max/min/mean over float32 vector",
        input: generate_input(size, DType::F32, seed)?,
        checks: vec![
            ReductionCheck::max(DType::F32),
            ReductionCheck::min(DType::F32),
            ReductionCheck::mean(),
        ],
    })
}

pub fn for_command(command: Option<Command>) -> Result<Vec<Scenario>, HarnessError> {
    Ok(match command {
        Some(Command::MaxInt { size }) => vec![max_int(size)?],
        Some(Command::Reductions { size, seed }) => vec![reductions(size, seed)?],
        Some(Command::All) | None => vec![
            max_int(INT_VECTOR_SIZE)?,
            reductions(FLOAT_VECTOR_SIZE, DEFAULT_SEED)?,
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_scenario_uses_configured_length() {
        let scenario = max_int(INT_VECTOR_SIZE).expect("scenario");
        assert_eq!(scenario.input.len(), 10);
        assert_eq!(scenario.input.dtype(), DType::I32);
        assert_eq!(scenario.checks.len(), 1);
    }

    #[test]
    fn default_run_covers_both_scenarios() {
        let scenarios = for_command(None).expect("scenarios");
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[1].input.len(), 100);
        assert_eq!(scenarios[1].checks.len(), 3);
    }
}
