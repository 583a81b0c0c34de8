use std::io::{self, Write};

use kernelcheck_core::{DType, DeviceSelection, HarnessError};
use kernelcheck_runtime::{CheckReport, SuiteReport};

use crate::scenario::Scenario;

const SAMPLE_LEN: usize = 10;

pub fn print_device(out: &mut impl Write, selection: &DeviceSelection) -> io::Result<()> {
    if selection.fell_back() {
        writeln!(out, "Using CPU fallback")
    } else {
        writeln!(out, "Using device: {}", selection.device.kind())
    }
}

pub fn print_input(out: &mut impl Write, scenario: &Scenario) -> io::Result<()> {
    writeln!(out, "\n== {}", scenario.title)?;
    writeln!(out, "Input data shape: ({},)", scenario.input.len())?;
    writeln!(out, "Input data sample: {}", scenario.input.sample(SAMPLE_LEN))
}

pub fn print_suite(out: &mut impl Write, suite: &SuiteReport) -> io::Result<()> {
    for report in &suite.reports {
        print_check(out, report)?;
    }
    let failed = suite.failures().count();
    if suite.reports.len() > 1 {
        writeln!(
            out,
            "\n{} of {} checks passed",
            suite.reports.len() - failed,
            suite.reports.len()
        )?;
    }
    Ok(())
}

fn print_check(out: &mut impl Write, report: &CheckReport) -> io::Result<()> {
    let label = report.check.reduction.label();

    if let Some(actual) = report.actual {
        writeln!(out, "\nResult:")?;
        writeln!(out, "{label} value: {actual}")?;
    }
    if let Some(expected) = report.expected {
        writeln!(out, "\nExpected:")?;
        writeln!(
            out,
            "{label} value: {}",
            format_expected(expected, report.check.output_dtype)
        )?;
    }

    match &report.outcome {
        Ok(()) => writeln!(out, "\nVerification successful!"),
        Err(HarnessError::Verification { check, .. }) => {
            writeln!(out, "\nVerification failed for {check}!")
        }
        Err(err) => {
            writeln!(out, "Error during execution: {err}")?;
            writeln!(
                out,
                "Check that the kernel library provides `{}` and was built for this device",
                report.check.kernel_name
            )
        }
    }
}

/// Renders the reference value the way the kernel's output dtype prints.
fn format_expected(value: f64, dtype: DType) -> String {
    match dtype {
        DType::I32 if value.fract() == 0.0 => format!("{}", value as i64),
        DType::I32 => format!("{value}"),
        DType::F32 => format!("{:?}", value as f32),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kernelcheck_core::{Device, ProbeError};
    use kernelcheck_kernels::ReferenceKernels;
    use kernelcheck_runtime::{run_checks, HarnessContext, ReductionCheck, Tolerance};

    use super::*;
    use crate::scenario;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("write to buffer");
        String::from_utf8(buf).expect("utf-8 output")
    }

    fn run(ctx: &HarnessContext, scenario: &Scenario) -> SuiteReport {
        run_checks(ctx, &scenario.checks, &scenario.input, Tolerance::default())
    }

    fn cpu_context(library: ReferenceKernels) -> HarnessContext {
        HarnessContext::new(vec![Device::Cpu], Arc::new(library))
    }

    #[test]
    fn int_scenario_reports_success() {
        let scenario = scenario::max_int(scenario::INT_VECTOR_SIZE).expect("scenario");
        let suite = run(&cpu_context(ReferenceKernels::new()), &scenario);

        let text = render(|out| {
            print_input(out, &scenario)?;
            print_suite(out, &suite)
        });

        assert!(text.contains("Input data shape: (10,)"));
        assert!(text.contains("Input data sample: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]"));
        assert!(text.contains("Result:\nMax value: 9\n"));
        assert!(text.contains("Expected:\nMax value: 9\n"));
        assert!(text.contains("Verification successful!"));
    }

    #[test]
    fn float_results_and_expectations_print_alike() {
        let scenario = scenario::reductions(100, 0).expect("scenario");
        let suite = run(&cpu_context(ReferenceKernels::new()), &scenario);
        let text = render(|out| print_suite(out, &suite));

        assert!(text.contains("Result:\nMax value: 99.0\n\nExpected:\nMax value: 99.0\n"));
        assert!(text.contains("Result:\nMin value: 0.0\n\nExpected:\nMin value: 0.0\n"));
        assert!(text.contains("Result:\nMean value: 49.5\n\nExpected:\nMean value: 49.5\n"));
        assert!(text.contains("3 of 3 checks passed"));
    }

    #[test]
    fn device_lines() {
        let fallback = DeviceSelection {
            device: Device::Cpu,
            fallback_reason: Some(ProbeError::Driver("no driver".to_string())),
        };
        assert_eq!(render(|out| print_device(out, &fallback)), "Using CPU fallback\n");

        let accel = DeviceSelection {
            device: Device::Accelerator { device_id: 0 },
            fallback_reason: None,
        };
        assert_eq!(render(|out| print_device(out, &accel)), "Using device: Accelerator\n");

        let cpu = DeviceSelection {
            device: Device::Cpu,
            fallback_reason: None,
        };
        assert_eq!(render(|out| print_device(out, &cpu)), "Using device: CPU\n");
    }

    #[test]
    fn unresolved_kernel_prints_error_and_hint() {
        let scenario = Scenario {
            title: "max over int32 vector",
            input: kernelcheck_runtime::InputVector::I32((0..10).collect()),
            checks: vec![ReductionCheck::max(DType::I32)],
        };
        let suite = run(&cpu_context(ReferenceKernels::empty()), &scenario);
        let text = render(|out| print_suite(out, &suite));

        assert!(!text.contains("Verification successful!"));
        assert!(text.contains("Error during execution: failed to load graph `max_vector_1d`"));
        assert!(text.contains(
            "Check that the kernel library provides `max_1d_vector` and was built for this device"
        ));
    }

    #[test]
    fn expected_values_follow_output_dtype() {
        assert_eq!(format_expected(9.0, DType::I32), "9");
        assert_eq!(format_expected(99.0, DType::F32), "99.0");
        assert_eq!(format_expected(49.5, DType::F32), "49.5");
    }
}
