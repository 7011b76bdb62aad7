//! Definition of the CLI arguments for integration tests

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::constants::{DEFAULT_DEVNET_HOSTPORT, DEFAULT_DEPLOYMENTS_FILE};

/// CLI tool for running integration tests against a running devnet node.
///
/// Assumes the Notional system invoked in the tests has already been
/// deployed to the devnet and its markets initialized.
#[derive(Parser)]
pub(crate) struct Cli {
    /// Test to run
    #[arg(short, long, default_value = "all")]
    pub(crate) test: Tests,

    /// Path to the file containing contract deployment info
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_FILE)]
    pub(crate) deployments_file: PathBuf,

    /// Private keys of the funded devnet accounts, owner first; defaults to
    /// the standard dev-node keys
    #[arg(short, long, num_args = 1.., required = false)]
    pub(crate) priv_keys: Vec<String>,

    /// Devnet RPC URL
    #[arg(short, long, default_value = DEFAULT_DEVNET_HOSTPORT)]
    pub(crate) rpc_url: String,
}

/// The set of named integration tests
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tests {
    /// Run every test in order
    All,
    LendFailures,
    LendUnderlying,
    LendEth,
    LendAsset,
    RollLend,
    LendBitmap,
    BorrowPrimeToLend,
    LendSupplyCap,
    LendDebtCap,
    LeveragedLendDebtCap,
    BatchLendUnsorted,
    BatchLendEmpty,
    BatchLendNonLend,
    BatchLendSlippage,
    BatchLendInsufficientCash,
    BatchLendNoTransfer,
    BatchLendMultiCurrency,
    BatchLendMultipleTrades,
    BatchLendBitmap,
    BatchLendTransferFee,
}

impl Tests {
    /// Every runnable test, in execution order
    pub(crate) fn all() -> &'static [Tests] {
        &[
            Tests::LendFailures,
            Tests::LendUnderlying,
            Tests::LendEth,
            Tests::LendAsset,
            Tests::RollLend,
            Tests::LendBitmap,
            Tests::BorrowPrimeToLend,
            Tests::LendSupplyCap,
            Tests::LendDebtCap,
            Tests::LeveragedLendDebtCap,
            Tests::BatchLendUnsorted,
            Tests::BatchLendEmpty,
            Tests::BatchLendNonLend,
            Tests::BatchLendSlippage,
            Tests::BatchLendInsufficientCash,
            Tests::BatchLendNoTransfer,
            Tests::BatchLendMultiCurrency,
            Tests::BatchLendMultipleTrades,
            Tests::BatchLendBitmap,
            Tests::BatchLendTransferFee,
        ]
    }

    /// The kebab-case name the test is invoked by
    pub(crate) fn name(&self) -> String {
        self.to_possible_value()
            .expect("every variant has a value")
            .get_name()
            .to_string()
    }
}
