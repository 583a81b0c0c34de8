use clap::{Parser, Subcommand};

use crate::scenario::{DEFAULT_SEED, FLOAT_VECTOR_SIZE, INT_VECTOR_SIZE};

#[derive(Parser, Debug)]
#[command(
    name = "kernelcheck",
    version,
    about = "Checks vector reduction kernels against host reference values"
)]
pub struct Cli {
    /// Log level (RUST_LOG)
    #[arg(long, default_value = "warn", global = true)]
    pub log: String,

    /// Device to run on (auto, cpu or accelerator:N)
    #[arg(long, default_value = "auto", global = true)]
    pub device: String,

    /// Scenario to run; all of them when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Max over an ascending int32 vector
    MaxInt {
        /// Vector length
        #[arg(long, default_value_t = INT_VECTOR_SIZE)]
        size: usize,
    },
    /// Max, min and mean over a shuffled float32 vector
    Reductions {
        /// Vector length
        #[arg(long, default_value_t = FLOAT_VECTOR_SIZE)]
        size: usize,

        /// Shuffle seed
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Every scenario with its default settings
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_runs_everything() {
        let cli = Cli::try_parse_from(["kernelcheck"]).expect("parse");
        assert_eq!(cli.command, None);
        assert_eq!(cli.device, "auto");
        assert_eq!(cli.log, "warn");
    }

    #[test]
    fn scenario_flags() {
        let cli = Cli::try_parse_from(["kernelcheck", "reductions", "--seed", "4", "--device", "cpu"])
            .expect("parse");
        assert_eq!(cli.command, Some(Command::Reductions { size: 100, seed: 4 }));
        assert_eq!(cli.device, "cpu");

        let cli = Cli::try_parse_from(["kernelcheck", "max-int"]).expect("parse");
        assert_eq!(cli.command, Some(Command::MaxInt { size: 10 }));
    }

    #[test]
    fn zero_size_is_parsed_and_left_to_graph_validation() {
        let cli = Cli::try_parse_from(["kernelcheck", "max-int", "--size", "0"]).expect("parse");
        assert_eq!(cli.command, Some(Command::MaxInt { size: 0 }));
    }
}
