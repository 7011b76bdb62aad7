//! Stateful tests for lending through `batchBalanceAndTradeAction`.
//!
//! These act against a freshly initialized devnet deployment: listed
//! currencies ETH/DAI/USDC with two active markets each, funded test
//! accounts with token approvals already in place, and nTokens seeded with
//! initial liquidity.

use alloy_primitives::{aliases::I88, aliases::U88, U256};
use eyre::{ensure, eyre, Result};
use notional_common::{
    constants::{HAS_CASH_DEBT, RATE_PRECISION},
    types::{BalanceActionWithTrades, DepositActionType, Trade},
};

use crate::{
    constants::{CASH_DUST, DAI, DEBT_ACCRUAL_SECONDS, ETH, USDC},
    harness::{external, internal, to_i128, TestArgs},
    invariants::check_system_invariants,
    txn::{assert_reverts_with, call_helper, wait_for_tx_success},
};

/// Builds a lend trade with no rate bound
fn lend_trade(market_index: u8, notional: u128) -> Trade {
    Trade::Lend {
        market_index,
        notional,
        min_implied_rate: 0,
    }
}

/// The failure matrix of the lend trade path
pub(crate) async fn test_lend_failures(args: &TestArgs) -> Result<()> {
    let notional = args.notional();

    // No cash balance to lend against
    let action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::None,
        &[lend_trade(1, internal(100))],
    )?;
    assert_reverts_with(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
        "No Prime Borrow",
    )
    .await?;

    // Market index beyond the active markets
    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositAsset,
        &[lend_trade(3, internal(100))],
    )?;
    action.deposit_action_amount = internal(100);
    assert_reverts_with(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
        "Invalid market",
    )
    .await?;

    // Deposit too small for the lend
    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositAsset,
        &[lend_trade(1, internal(500))],
    )?;
    action.deposit_action_amount = internal(100);
    assert_reverts_with(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
        "No Prime Borrow",
    )
    .await?;

    // Rate bound above what the market can fill at
    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositAsset,
        &[Trade::Lend {
            market_index: 1,
            notional: internal(500),
            min_implied_rate: (4 * RATE_PRECISION / 10) as u32,
        }],
    )?;
    action.deposit_action_amount = internal(100);
    assert_reverts_with(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
        "Trade failed, slippage",
    )
    .await?;

    // Notional beyond the market's liquidity
    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositAsset,
        &[lend_trade(1, internal(500_000))],
    )?;
    action.deposit_action_amount = internal(200_000);
    assert_reverts_with(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
        "Trade failed, liquidity",
    )
    .await?;

    Ok(())
}

/// Deposit underlying and lend an exact fCash amount quoted by the protocol
pub(crate) async fn test_deposit_underlying_and_lend(args: &TestArgs) -> Result<()> {
    let notional = args.notional();

    let cash = I88::try_from(-(internal(100) as i128)).expect("fits in 88 bits");
    let quoted = call_helper(notional.getfCashAmountGivenCashAmount(
        DAI,
        cash,
        U256::from(1),
        U256::from(args.block_time().await? + 60),
    ))
    .await?;
    let fcash_amount = to_i128(quoted._0)?;
    ensure!(fcash_amount > 0, "quoted fCash amount must be positive");

    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositUnderlying,
        &[lend_trade(1, fcash_amount as u128)],
    )?;
    action.deposit_action_amount = external(100, 18).to::<u128>();
    action.withdraw_entire_cash_balance = true;

    let markets_before = args.active_markets(DAI).await?;
    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
    )
    .await?;

    let context = args.context(args.account).await?;
    let active = context.active_currency_list();
    ensure!(active.len() == 1, "expected one active currency");
    ensure!(
        active[0].currency_id == DAI && active[0].in_portfolio && !active[0].in_balances,
        "unexpected active currency entry: {:?}",
        active[0]
    );
    ensure!(context.has_debt == 0, "account should carry no debt");
    ensure!(
        args.balance(DAI, args.account).await? == (0, 0, 0),
        "cash balance should be fully withdrawn"
    );

    let portfolio = args.portfolio(args.account).await?;
    ensure!(portfolio.len() == 1, "expected a single fCash position");
    ensure!(portfolio[0].currency_id == DAI, "wrong portfolio currency");
    ensure!(
        portfolio[0].maturity == markets_before[0].maturity,
        "position must mature with the three month market"
    );
    ensure!(portfolio[0].asset_type == 1, "expected an fCash asset");
    ensure!(
        portfolio[0].notional == fcash_amount,
        "position must match the quoted fCash amount"
    );

    let markets_after = args.active_markets(DAI).await?;
    ensure!(
        markets_before[1] == markets_after[1],
        "the six month market must be untouched"
    );
    ensure!(
        markets_before[0].total_fcash - markets_after[0].total_fcash == fcash_amount,
        "market fCash must drop by the traded notional"
    );
    ensure!(
        markets_before[0].total_liquidity == markets_after[0].total_liquidity,
        "lending must not move market liquidity"
    );
    ensure!(
        markets_before[0].last_implied_rate > markets_after[0].last_implied_rate,
        "lending must push the implied rate down"
    );

    check_system_invariants(args).await
}

/// Deposit ETH alongside the transaction and lend in the ETH markets
pub(crate) async fn test_deposit_eth_and_lend(args: &TestArgs) -> Result<()> {
    let notional = args.notional();
    let deposit = external(100, 18);

    let mut action = BalanceActionWithTrades::new(
        ETH,
        DepositActionType::DepositUnderlying,
        &[lend_trade(1, internal(100))],
    )?;
    action.deposit_action_amount = deposit.to::<u128>();
    action.withdraw_entire_cash_balance = true;
    action.redeem_to_underlying = true;

    let markets_before = args.active_markets(ETH).await?;
    let balance_before = args.client.get_balance(args.account).await?;

    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account)
            .value(deposit),
    )
    .await?;

    // The residual above the lend cost is refunded, so the account spends
    // strictly less than the deposit
    let balance_after = args.client.get_balance(args.account).await?;
    let spent = balance_before - balance_after;
    ensure!(
        U256::ZERO < spent && spent < deposit,
        "residual ETH was not refunded"
    );

    let context = args.context(args.account).await?;
    let active = context.active_currency_list();
    ensure!(
        active.len() == 1 && active[0].currency_id == ETH,
        "expected ETH as the only active currency"
    );
    ensure!(context.has_debt == 0, "account should carry no debt");

    let portfolio = args.portfolio(args.account).await?;
    ensure!(portfolio.len() == 1, "expected a single fCash position");
    ensure!(
        portfolio[0].maturity == markets_before[0].maturity,
        "position must mature with the three month market"
    );
    ensure!(
        portfolio[0].notional == internal(100) as i128,
        "position must match the traded notional"
    );

    let markets_after = args.active_markets(ETH).await?;
    ensure!(
        markets_before[0].total_fcash - markets_after[0].total_fcash
            == internal(100) as i128,
        "market fCash must drop by the traded notional"
    );
    ensure!(
        markets_before[0].last_implied_rate > markets_after[0].last_implied_rate,
        "lending must push the implied rate down"
    );

    check_system_invariants(args).await
}

/// Deposit prime cash and lend against it
pub(crate) async fn test_deposit_asset_and_lend(args: &TestArgs) -> Result<()> {
    let notional = args.notional();

    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositAsset,
        &[lend_trade(1, internal(100))],
    )?;
    action.deposit_action_amount = internal(5100);
    action.withdraw_entire_cash_balance = true;

    let markets_before = args.active_markets(DAI).await?;
    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
    )
    .await?;

    let context = args.context(args.account).await?;
    let active = context.active_currency_list();
    ensure!(
        active.len() == 1
            && active[0].currency_id == DAI
            && active[0].in_portfolio
            && !active[0].in_balances,
        "unexpected active currency list"
    );
    ensure!(context.has_debt == 0, "account should carry no debt");
    ensure!(
        args.balance(DAI, args.account).await? == (0, 0, 0),
        "cash balance should be fully withdrawn"
    );

    let portfolio = args.portfolio(args.account).await?;
    ensure!(portfolio.len() == 1, "expected a single fCash position");
    ensure!(
        portfolio[0].maturity == markets_before[0].maturity
            && portfolio[0].asset_type == 1
            && portfolio[0].notional == internal(100) as i128,
        "unexpected fCash position"
    );

    let markets_after = args.active_markets(DAI).await?;
    ensure!(
        markets_before[1] == markets_after[1],
        "the six month market must be untouched"
    );
    ensure!(
        markets_before[0].total_fcash - markets_after[0].total_fcash == internal(100) as i128,
        "market fCash must drop by the traded notional"
    );
    ensure!(
        markets_before[0].total_liquidity == markets_after[0].total_liquidity,
        "lending must not move market liquidity"
    );

    check_system_invariants(args).await
}

/// Borrow out of the near maturity and lend into the far one in a single
/// batch, rolling the position
pub(crate) async fn test_roll_lend_to_maturity(args: &TestArgs) -> Result<()> {
    let notional = args.notional();

    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositAsset,
        &[lend_trade(1, internal(100))],
    )?;
    action.deposit_action_amount = internal(5100);
    action.withdraw_entire_cash_balance = true;
    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
    )
    .await?;

    let markets_before = args.active_markets(DAI).await?;
    let block_time = args.block_time().await? + 1;

    // Quote the cash freed by unwinding the lend, then the fCash that cash
    // buys at the six month maturity
    let unwind = call_helper(notional.getCashAmountGivenfCashAmount(
        DAI,
        I88::try_from(-(internal(100) as i128)).expect("fits in 88 bits"),
        U256::from(1),
        U256::from(block_time),
    ))
    .await?;
    let cash = to_i128(unwind._1)?;
    let quoted = call_helper(notional.getfCashAmountGivenCashAmount(
        DAI,
        I88::try_from(-cash).map_err(|_| eyre!("cash quote out of 88 bits"))?,
        U256::from(2),
        U256::from(block_time),
    ))
    .await?;
    let fcash_amount = to_i128(quoted._0)?;

    let roll = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::None,
        &[
            Trade::Borrow {
                market_index: 1,
                notional: internal(100),
                max_implied_rate: 0,
            },
            lend_trade(2, fcash_amount as u128),
        ],
    )?;
    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&roll).into()])
            .from(args.account),
    )
    .await?;

    let context = args.context(args.account).await?;
    ensure!(context.has_debt == 0, "roll must not leave debt behind");

    let (residual, ntoken, incentive) = args.balance(DAI, args.account).await?;
    ensure!(ntoken == 0 && incentive == 0, "no nToken state expected");
    ensure!(
        0 <= residual && residual < CASH_DUST,
        "roll left more than dust behind: {residual}"
    );

    let portfolio = args.portfolio(args.account).await?;
    ensure!(portfolio.len() == 1, "expected a single rolled position");
    ensure!(
        portfolio[0].maturity == markets_before[1].maturity,
        "position must roll to the six month maturity"
    );
    ensure!(
        portfolio[0].notional == fcash_amount,
        "rolled position must match the quoted fCash amount"
    );

    check_system_invariants(args).await
}

/// Lending into a bitmap-enabled currency stores the position in the bitmap
/// portfolio rather than the asset array
pub(crate) async fn test_deposit_and_lend_bitmap(args: &TestArgs) -> Result<()> {
    let notional = args.notional();

    wait_for_tx_success(notional.enableBitmapCurrency(DAI).from(args.account)).await?;

    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositAsset,
        &[lend_trade(1, internal(100))],
    )?;
    action.deposit_action_amount = internal(5100);
    action.withdraw_entire_cash_balance = true;

    let markets_before = args.active_markets(DAI).await?;
    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
    )
    .await?;

    let context = args.context(args.account).await?;
    ensure!(
        context.active_currency_list().is_empty(),
        "bitmap accounts keep an empty active currency list"
    );
    ensure!(context.has_debt == 0, "account should carry no debt");
    ensure!(context.asset_array_length == 0, "no array assets expected");
    ensure!(
        context.bitmap_currency_id == DAI,
        "bitmap currency must be recorded in the context"
    );
    ensure!(
        args.balance(DAI, args.account).await? == (0, 0, 0),
        "cash balance should be fully withdrawn"
    );

    let portfolio = args.portfolio(args.account).await?;
    ensure!(
        portfolio.len() == 1
            && portfolio[0].currency_id == DAI
            && portfolio[0].maturity == markets_before[0].maturity
            && portfolio[0].notional == internal(100) as i128,
        "unexpected bitmap fCash position"
    );

    let markets_after = args.active_markets(DAI).await?;
    ensure!(
        markets_before[0].total_fcash - markets_after[0].total_fcash == internal(100) as i128,
        "market fCash must drop by the traded notional"
    );

    check_system_invariants(args).await
}

/// A lend larger than the deposit implicitly borrows variable; this is
/// gated until the account opts into prime borrowing, after which the debt
/// accrues against the cash balance
pub(crate) async fn test_borrow_prime_to_lend_fixed(args: &TestArgs) -> Result<()> {
    let notional = args.notional();

    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositUnderlying,
        &[lend_trade(1, internal(100))],
    )?;
    action.deposit_action_amount = external(5, 18).to::<u128>();
    action.withdraw_entire_cash_balance = true;
    action.redeem_to_underlying = true;

    let markets_before = args.active_markets(DAI).await?;
    let quote = call_helper(notional.getDepositFromfCashLend(
        DAI,
        U256::from(internal(100)),
        U256::from(markets_before[0].maturity),
        0,
        U256::from(args.block_time().await?),
    ))
    .await?;
    let deposit_underlying = quote.depositAmountUnderlying;

    assert_reverts_with(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
        "No Prime Borrow",
    )
    .await?;

    wait_for_tx_success(notional.enablePrimeBorrow(true).from(args.account)).await?;
    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
    )
    .await?;

    let context = args.context(args.account).await?;
    let active = context.active_currency_list();
    ensure!(
        active.len() == 1
            && active[0].currency_id == DAI
            && active[0].in_portfolio
            && active[0].in_balances,
        "account must be active in both portfolio and balances"
    );
    ensure!(
        context.has_debt == HAS_CASH_DEBT,
        "account must carry a cash debt flag"
    );

    // The cash debt covers the shortfall between the deposit and the lend
    // cost; allow leeway for debt accrual between blocks
    let (cash_balance, _, _) = args.balance(DAI, args.account).await?;
    ensure!(cash_balance < 0, "expected a negative cash balance");
    let debt_external = call_helper(notional.convertCashBalanceToExternal(
        DAI,
        alloy_primitives::I256::try_from(cash_balance).expect("i128 fits"),
        true,
    ))
    .await?;
    let expected = alloy_primitives::I256::try_from(external(5, 18))
        .expect("fits")
        - alloy_primitives::I256::try_from(deposit_underlying)
            .map_err(|_| eyre!("deposit quote out of range"))?;
    let tolerance = alloy_primitives::I256::try_from(external(5, 12)).expect("fits");
    let diff = debt_external._0 - expected;
    ensure!(
        -tolerance < diff && diff < tolerance,
        "cash debt does not match the lend shortfall"
    );

    let portfolio = args.portfolio(args.account).await?;
    ensure!(
        portfolio.len() == 1
            && portfolio[0].currency_id == DAI
            && portfolio[0].asset_type == 1
            && portfolio[0].notional == internal(100) as i128,
        "unexpected fCash position"
    );

    // The variable debt accrues as chain time passes
    args.advance_time(DEBT_ACCRUAL_SECONDS).await?;
    let (cash_after, _, _) = args.balance(DAI, args.account).await?;
    ensure!(
        cash_after < cash_balance,
        "prime debt must accrue over time"
    );

    check_system_invariants(args).await
}

/// Lend deposits are rejected once the currency's underlying supply cap is
/// reached, and allowed again after the cap is raised
pub(crate) async fn test_lend_fails_on_supply_cap(args: &TestArgs) -> Result<()> {
    let notional = args.notional();

    let factors = call_helper(notional.getPrimeFactorsStored(DAI)).await?._0;
    wait_for_tx_success(
        notional
            .setMaxUnderlyingSupply(
                DAI,
                factors.lastTotalUnderlyingValue + U256::from(internal(1)),
                70,
            )
            .from(args.owner),
    )
    .await?;

    let mut action = BalanceActionWithTrades::new(
        DAI,
        DepositActionType::DepositUnderlying,
        &[lend_trade(1, internal(100))],
    )?;
    action.deposit_action_amount = external(100, 18).to::<u128>();
    action.withdraw_entire_cash_balance = true;

    assert_reverts_with(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
        "Over Supply Cap",
    )
    .await?;

    // Raising the cap lets the same action through
    wait_for_tx_success(
        notional
            .setMaxUnderlyingSupply(
                DAI,
                factors.lastTotalUnderlyingValue + U256::from(internal(100)),
                100,
            )
            .from(args.owner),
    )
    .await?;
    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
    )
    .await?;

    let portfolio = args.portfolio(args.account).await?;
    ensure!(
        portfolio.len() == 1
            && portfolio[0].currency_id == DAI
            && portfolio[0].asset_type == 1
            && portfolio[0].notional == internal(100) as i128,
        "unexpected fCash position"
    );

    check_system_invariants(args).await
}

/// Pushes the owner's prime debt in USDC right up to the debt cap
async fn exhaust_debt_cap(args: &TestArgs) -> Result<()> {
    let notional = args.notional();

    // Buffer the supply cap so interest accrual does not push the total
    // over it immediately
    let factors = call_helper(
        notional.getPrimeFactors(USDC, U256::from(args.block_time().await? + 1)),
    )
    .await?;
    let max_supply =
        factors.factors.lastTotalUnderlyingValue * U256::from(110) / U256::from(100);
    wait_for_tx_success(
        notional
            .setMaxUnderlyingSupply(USDC, max_supply, 70)
            .from(args.owner),
    )
    .await?;

    wait_for_tx_success(notional.enablePrimeBorrow(true).from(args.owner)).await?;

    // Borrow right up to the debt cap
    let factors = call_helper(
        notional.getPrimeFactors(USDC, U256::from(args.block_time().await? + 1)),
    )
    .await?;
    let max_prime_cash = call_helper(notional.convertUnderlyingToPrimeCash(
        USDC,
        alloy_primitives::I256::try_from(factors.maxUnderlyingDebt / U256::from(100))
            .map_err(|_| eyre!("debt cap out of range"))?,
    ))
    .await?;
    let withdraw_amount = U88::try_from(to_i128(max_prime_cash._0)?)
        .map_err(|_| eyre!("withdrawal out of 88 bits"))?;
    wait_for_tx_success(
        notional
            .withdraw(USDC, withdraw_amount, true)
            .from(args.owner),
    )
    .await?;

    // One more unit of withdrawal breaches the cap
    assert_reverts_with(
        notional
            .withdraw(USDC, U88::try_from(internal(1)).expect("fits"), true)
            .from(args.owner),
        "Over Debt Cap",
    )
    .await
}

/// A true deposit-and-lend is still allowed when the debt cap is exhausted,
/// as is borrowing fixed against it
pub(crate) async fn test_can_lend_when_debt_cap_exceeded(args: &TestArgs) -> Result<()> {
    let notional = args.notional();
    exhaust_debt_cap(args).await?;

    let mut lend = BalanceActionWithTrades::new(
        USDC,
        DepositActionType::DepositUnderlying,
        &[lend_trade(1, internal(100))],
    )?;
    lend.deposit_action_amount = external(100, 6).to::<u128>();
    lend.withdraw_entire_cash_balance = true;
    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&lend).into()])
            .from(args.account),
    )
    .await?;

    let mut borrow = BalanceActionWithTrades::new(
        USDC,
        DepositActionType::DepositUnderlying,
        &[Trade::Borrow {
            market_index: 1,
            notional: internal(100),
            max_implied_rate: 0,
        }],
    )?;
    borrow.withdraw_entire_cash_balance = true;
    wait_for_tx_success(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&borrow).into()])
            .from(args.account),
    )
    .await?;

    check_system_invariants(args).await
}

/// Leveraged lending borrows variable under the hood and must respect the
/// debt cap
pub(crate) async fn test_cannot_leveraged_lend_over_debt_cap(args: &TestArgs) -> Result<()> {
    let notional = args.notional();
    exhaust_debt_cap(args).await?;

    wait_for_tx_success(notional.enablePrimeBorrow(true).from(args.account)).await?;
    wait_for_tx_success(
        notional
            .depositUnderlyingToken(args.account, ETH, external(100, 18))
            .from(args.account)
            .value(external(100, 18)),
    )
    .await?;

    // A lend with no deposit is a leveraged lend
    let action = BalanceActionWithTrades::new(
        USDC,
        DepositActionType::None,
        &[lend_trade(1, internal(100))],
    )?;
    assert_reverts_with(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
        "Over Debt Cap",
    )
    .await?;

    // As is minting nTokens out of a cash balance the account does not have
    let mut action = BalanceActionWithTrades::new(
        USDC,
        DepositActionType::ConvertCashToNToken,
        &[],
    )?;
    action.deposit_action_amount = internal(100);
    assert_reverts_with(
        notional
            .batchBalanceAndTradeAction(args.account, vec![(&action).into()])
            .from(args.account),
        "Over Debt Cap",
    )
    .await?;

    check_system_invariants(args).await
}
