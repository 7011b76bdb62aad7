//! System-wide invariant checks run after every mutating test.
//!
//! The checks iterate the tracked account set rather than the whole chain;
//! on a devnet the tracked accounts are the only ones that have acted, so
//! conservation holds exactly.

use std::collections::BTreeMap;

use alloy::providers::Provider;
use alloy_primitives::{Address, U256};
use eyre::{ensure, Result};
use notional_common::constants::{FCASH_ASSET_TYPE, INTERNAL_TOKEN_PRECISION};

use crate::{
    harness::{to_i128, TestArgs},
    txn::call_helper,
};

/// Runs every invariant check against the current chain state
pub(crate) async fn check_system_invariants(args: &TestArgs) -> Result<()> {
    let max_currency_id = call_helper(args.notional().getMaxCurrencyId()).await?._0;

    check_account_debt_flags(args, max_currency_id).await?;
    for currency_id in 1..=max_currency_id {
        check_fcash_conservation(args, currency_id).await?;
        check_prime_cash_solvency(args, currency_id).await?;
    }

    Ok(())
}

/// An account that actually carries debt must have the matching context flag
/// set; the protocol clears flags lazily, so the converse is not checked
async fn check_account_debt_flags(args: &TestArgs, max_currency_id: u16) -> Result<()> {
    let notional = args.notional();

    for &account in &args.accounts {
        let context = call_helper(notional.getAccountContext(account)).await?._0.decode();

        let mut cash_debt = false;
        for currency_id in 1..=max_currency_id {
            let balance = call_helper(notional.getAccountBalance(currency_id, account)).await?;
            if balance.cashBalance.is_negative() {
                cash_debt = true;
            }
        }

        let portfolio = call_helper(notional.getAccountPortfolio(account)).await?._0;
        let mut asset_debt = false;
        for asset in &portfolio {
            if asset.decode()?.notional < 0 {
                asset_debt = true;
            }
        }

        ensure!(
            !cash_debt || context.has_cash_debt(),
            "account {account} has a negative cash balance but no cash debt flag"
        );
        ensure!(
            !asset_debt || context.has_asset_debt(),
            "account {account} has a negative fCash position but no asset debt flag"
        );
    }

    Ok(())
}

/// fCash is minted in offsetting pairs, so summed over every holder (markets,
/// the nToken, and the tracked accounts) each maturity must net to zero, and
/// the negative side must match the protocol's reported debt outstanding
async fn check_fcash_conservation(args: &TestArgs, currency_id: u16) -> Result<()> {
    let notional = args.notional();

    // Net holdings and total negative holdings per maturity
    let mut net: BTreeMap<u64, i128> = BTreeMap::new();
    let mut debt: BTreeMap<u64, i128> = BTreeMap::new();
    let mut add = |maturity: u64, notional: i128| {
        *net.entry(maturity).or_default() += notional;
        if notional < 0 {
            *debt.entry(maturity).or_default() += notional;
        }
    };

    let markets = call_helper(notional.getActiveMarkets(currency_id)).await?._0;
    for market in &markets {
        let market = market.decode()?;
        add(market.maturity, market.total_fcash);
    }

    let ntoken = call_helper(notional.nTokenAddress(currency_id)).await?._0;
    if ntoken != Address::ZERO {
        let ntoken_portfolio = call_helper(notional.getNTokenPortfolio(ntoken)).await?;
        for asset in &ntoken_portfolio.netfCashAssets {
            let asset = asset.decode()?;
            add(asset.maturity, asset.notional);
        }
    }

    for &account in &args.accounts {
        let portfolio = call_helper(notional.getAccountPortfolio(account)).await?._0;
        for asset in &portfolio {
            let asset = asset.decode()?;
            if asset.currency_id == currency_id && asset.asset_type == FCASH_ASSET_TYPE {
                add(asset.maturity, asset.notional);
            }
        }
    }

    for (&maturity, &total) in &net {
        ensure!(
            total == 0,
            "fCash does not net to zero for currency {currency_id} maturity {maturity}: {total}"
        );

        let reported = to_i128(
            call_helper(notional.getTotalfCashDebtOutstanding(currency_id, U256::from(maturity)))
                .await?
                ._0,
        )?;
        let held = debt.get(&maturity).copied().unwrap_or_default();
        ensure!(
            held == reported,
            "fCash debt mismatch for currency {currency_id} maturity {maturity}: \
             held {held}, reported {reported}"
        );
    }

    Ok(())
}

/// Prime supply must cover prime debt in underlying terms, and the stored
/// underlying value must be backed by tokens the protocol actually holds
async fn check_prime_cash_solvency(args: &TestArgs, currency_id: u16) -> Result<()> {
    let notional = args.notional();
    let factors = call_helper(notional.getPrimeFactorsStored(currency_id)).await?._0;

    let supply_value = factors.totalPrimeSupply * factors.supplyScalar;
    let debt_value = factors.totalPrimeDebt * factors.debtScalar;
    ensure!(
        supply_value >= debt_value,
        "prime debt exceeds prime supply for currency {currency_id}"
    );

    let currency = call_helper(notional.getCurrency(currency_id)).await?;
    let underlying = currency.underlyingToken;
    let balance = if underlying.tokenAddress == Address::ZERO {
        args.client.get_balance(args.notional_address).await?
    } else {
        let token = args.erc20(underlying.tokenAddress);
        call_helper(token.balanceOf(args.notional_address)).await?._0
    };

    // Token.decimals holds the precision, e.g. 1e18, not the decimal count
    let precision = U256::try_from(underlying.decimals)
        .map_err(|_| eyre::eyre!("negative token precision"))?;
    let balance_internal = balance * U256::from(INTERNAL_TOKEN_PRECISION) / precision;

    // One unit of dust absorbs scalar rounding at stored precision
    ensure!(
        balance_internal + U256::from(1) >= factors.lastTotalUnderlyingValue,
        "stored underlying value exceeds actual holdings for currency {currency_id}"
    );

    Ok(())
}
