mod cli;
mod report;
mod scenario;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use kernelcheck_core::{select_device, Device, DeviceSelection, SystemProbe};
use kernelcheck_kernels::ReferenceKernels;
use kernelcheck_runtime::{run_checks, HarnessContext, Tolerance};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    std::env::set_var("RUST_LOG", &cli.log);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let selection = match parse_device(&cli.device)? {
        Some(device) => DeviceSelection {
            device,
            fallback_reason: None,
        },
        None => select_device(&SystemProbe),
    };
    let mut out = io::stdout().lock();
    report::print_device(&mut out, &selection)?;

    let ctx = HarnessContext::new(vec![selection.device], Arc::new(ReferenceKernels::new()));

    let mut all_passed = true;
    for scenario in scenario::for_command(cli.command).context("invalid scenario settings")? {
        report::print_input(&mut out, &scenario)?;
        let suite = run_checks(&ctx, &scenario.checks, &scenario.input, Tolerance::default());
        report::print_suite(&mut out, &suite)?;
        all_passed &= suite.passed();
    }
    out.flush()?;

    info!(passed = all_passed, "kernelcheck finished");
    Ok(if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `None` means "probe for an accelerator".
fn parse_device(raw: &str) -> Result<Option<Device>> {
    if raw.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }

    if raw.eq_ignore_ascii_case("cpu") {
        return Ok(Some(Device::Cpu));
    }

    if let Some(rest) = raw.strip_prefix("accelerator:") {
        let device_id: u32 = rest.parse().context("invalid accelerator device id")?;
        return Ok(Some(Device::Accelerator { device_id }));
    }

    anyhow::bail!("unsupported device: {raw} (expected auto, cpu or accelerator:N)");
}
