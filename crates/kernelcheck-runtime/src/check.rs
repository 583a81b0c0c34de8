use kernelcheck_core::{build_graph, DType, HarnessError, Scalar};
use tracing::{info, warn};

use crate::{verify, HarnessContext, InputVector, Reduction, Tolerance};

/// One kernel result checked against one host reduction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReductionCheck {
    pub graph_name: String,
    pub kernel_name: String,
    pub reduction: Reduction,
    pub output_dtype: DType,
}

impl ReductionCheck {
    pub fn new(graph_name: &str, kernel_name: &str, reduction: Reduction, output_dtype: DType) -> Self {
        Self {
            graph_name: graph_name.to_string(),
            kernel_name: kernel_name.to_string(),
            reduction,
            output_dtype,
        }
    }

    pub fn max(input: DType) -> Self {
        Self::new("max_vector_1d", "max_1d_vector", Reduction::Max, input)
    }

    pub fn min(input: DType) -> Self {
        Self::new("min_vector_1d", "min_1d_vector", Reduction::Min, input)
    }

    pub fn mean() -> Self {
        Self::new("mean_vector_1d", "mean_1d_vector", Reduction::Mean, DType::F32)
    }
}

#[derive(Clone, Debug)]
pub struct CheckReport {
    pub check: ReductionCheck,
    pub expected: Option<f64>,
    pub actual: Option<Scalar>,
    pub outcome: Result<(), HarnessError>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&HarnessError> {
        self.outcome.as_ref().err()
    }
}

/// Build, load, execute and verify one check. Failures at any stage land in
/// the report instead of propagating.
pub fn run_check(
    ctx: &HarnessContext,
    check: &ReductionCheck,
    input: &InputVector,
    tolerance: Tolerance,
) -> CheckReport {
    let expected = check.reduction.reference(&input.values_f64());
    let mut actual = None;
    let outcome = (|| -> Result<(), HarnessError> {
        let graph = build_graph(
            &check.graph_name,
            &check.kernel_name,
            input.len(),
            input.dtype(),
            check.output_dtype,
        )?;
        let model = ctx.load(&graph)?;
        let tensor = input.to_tensor().to(model.device());
        let value = model.execute_scalar(&tensor)?;
        actual = Some(value);

        let expected = expected.ok_or_else(|| HarnessError::Verification {
            check: check.graph_name.clone(),
            actual: value.as_f64(),
            expected: f64::NAN,
        })?;
        if verify(value.as_f64(), expected, tolerance) {
            Ok(())
        } else {
            Err(HarnessError::Verification {
                check: check.graph_name.clone(),
                actual: value.as_f64(),
                expected,
            })
        }
    })();

    match &outcome {
        Ok(()) => info!(check = %check.graph_name, "check passed"),
        Err(err) => warn!(check = %check.graph_name, stage = err.stage(), error = %err, "check failed"),
    }

    CheckReport {
        check: check.clone(),
        expected,
        actual,
        outcome,
    }
}

#[derive(Clone, Debug, Default)]
pub struct SuiteReport {
    pub reports: Vec<CheckReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.reports.iter().all(CheckReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckReport> {
        self.reports.iter().filter(|r| !r.passed())
    }
}

/// Runs every check, even after one fails, and aggregates the results.
pub fn run_checks(
    ctx: &HarnessContext,
    checks: &[ReductionCheck],
    input: &InputVector,
    tolerance: Tolerance,
) -> SuiteReport {
    SuiteReport {
        reports: checks
            .iter()
            .map(|check| run_check(ctx, check, input, tolerance))
            .collect(),
    }
}
