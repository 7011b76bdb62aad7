//! Stateful integration tests for the Notional contract system. These assume
//! that a devnet with the system deployed is already running locally.

use clap::Parser;
use cli::{Cli, Tests};
use colored::Colorize;
use eyre::Result;
use harness::{setup_test_args, TestArgs};

mod cli;
mod constants;
mod contracts;
mod harness;
mod invariants;
mod tests;
mod txn;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let args = setup_test_args(&cli).await?;

    let selected: Vec<Tests> = match cli.test {
        Tests::All => Tests::all().to_vec(),
        test => vec![test],
    };

    let mut failures = 0;
    for test in selected {
        let name = test.name();

        // Each test runs against a fresh snapshot so state does not leak
        // between them
        let snapshot = args.snapshot().await?;
        let result = run_test(test, &args).await;
        args.revert_to(&snapshot).await?;

        match result {
            Ok(()) => println!("{} {}", "PASS".green(), name),
            Err(e) => {
                failures += 1;
                println!("{} {}: {:#}", "FAIL".red(), name, e);
            }
        }
    }

    if failures > 0 {
        eyre::bail!("{failures} test(s) failed");
    }

    Ok(())
}

/// Dispatches a single named test
async fn run_test(test: Tests, args: &TestArgs) -> Result<()> {
    match test {
        Tests::All => unreachable!("expanded by the caller"),
        Tests::LendFailures => tests::lend::test_lend_failures(args).await,
        Tests::LendUnderlying => tests::lend::test_deposit_underlying_and_lend(args).await,
        Tests::LendEth => tests::lend::test_deposit_eth_and_lend(args).await,
        Tests::LendAsset => tests::lend::test_deposit_asset_and_lend(args).await,
        Tests::RollLend => tests::lend::test_roll_lend_to_maturity(args).await,
        Tests::LendBitmap => tests::lend::test_deposit_and_lend_bitmap(args).await,
        Tests::BorrowPrimeToLend => tests::lend::test_borrow_prime_to_lend_fixed(args).await,
        Tests::LendSupplyCap => tests::lend::test_lend_fails_on_supply_cap(args).await,
        Tests::LendDebtCap => tests::lend::test_can_lend_when_debt_cap_exceeded(args).await,
        Tests::LeveragedLendDebtCap => {
            tests::lend::test_cannot_leveraged_lend_over_debt_cap(args).await
        }
        Tests::BatchLendUnsorted => tests::batch_lend::test_fail_on_unsorted_actions(args).await,
        Tests::BatchLendEmpty => tests::batch_lend::test_fail_on_zero_trades(args).await,
        Tests::BatchLendNonLend => tests::batch_lend::test_fail_on_non_lend_trades(args).await,
        Tests::BatchLendSlippage => tests::batch_lend::test_fail_on_slippage(args).await,
        Tests::BatchLendInsufficientCash => {
            tests::batch_lend::test_lend_insufficient_cash(args).await
        }
        Tests::BatchLendNoTransfer => {
            tests::batch_lend::test_lend_sufficient_cash_no_transfer(args).await
        }
        Tests::BatchLendMultiCurrency => {
            tests::batch_lend::test_multi_currency_lend_actions(args).await
        }
        Tests::BatchLendMultipleTrades => {
            tests::batch_lend::test_multiple_lend_trades(args).await
        }
        Tests::BatchLendBitmap => {
            tests::batch_lend::test_multi_currency_fails_on_bitmap(args).await
        }
        Tests::BatchLendTransferFee => {
            tests::batch_lend::test_token_with_transfer_fee_reverts(args).await
        }
    }
}
