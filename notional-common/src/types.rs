//! Client-side views of the protocol's account, portfolio, and market state

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{ACTIVE_CURRENCIES_BYTES, HAS_ASSET_DEBT, HAS_CASH_DEBT},
    encoding::{encode_trade, EncodeError},
};

/// The action types understood by the batch trading entrypoint.
///
/// Discriminants match the on-chain `TradeActionType` enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TradeActionType {
    /// Buy fCash at a fixed rate
    Lend = 0,
    /// Sell fCash at a fixed rate
    Borrow = 1,
    /// Provide prime cash liquidity to a market
    AddLiquidity = 2,
    /// Withdraw prime cash liquidity from a market
    RemoveLiquidity = 3,
    /// Purchase an idle nToken fCash residual
    PurchaseNTokenResidual = 4,
    /// Lend against another account's matured cash debt
    SettleCashDebt = 5,
}

/// The deposit/withdraw action types understood by the batch balance
/// entrypoints.
///
/// Discriminants match the on-chain `DepositActionType` enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DepositActionType {
    /// No deposit, trade against cash already held in the protocol
    None = 0,
    /// Deposit prime cash denominated amounts
    DepositAsset = 1,
    /// Deposit underlying tokens, converted to prime cash on entry
    DepositUnderlying = 2,
    /// Deposit prime cash and mint nTokens with it
    DepositAssetAndMintNToken = 3,
    /// Deposit underlying and mint nTokens with it
    DepositUnderlyingAndMintNToken = 4,
    /// Redeem nTokens into prime cash
    RedeemNToken = 5,
    /// Convert an existing cash balance into nTokens
    ConvertCashToNToken = 6,
}

/// A single market trade, prior to packing into its `bytes32` wire form.
///
/// Notional amounts are in internal (1e8) precision and must fit in 88 bits;
/// rate limits are implied rates in `RATE_PRECISION` terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trade {
    /// Buy `notional` fCash in the market at `market_index`, reverting if the
    /// post-trade implied rate falls below `min_implied_rate`
    Lend {
        /// The 1-indexed market to trade in
        market_index: u8,
        /// The fCash amount to buy, internal precision
        notional: u128,
        /// The minimum acceptable post-trade implied rate, zero for no bound
        min_implied_rate: u32,
    },
    /// Sell `notional` fCash in the market at `market_index`, reverting if the
    /// post-trade implied rate rises above `max_implied_rate`
    Borrow {
        /// The 1-indexed market to trade in
        market_index: u8,
        /// The fCash amount to sell, internal precision
        notional: u128,
        /// The maximum acceptable post-trade implied rate, zero for no bound
        max_implied_rate: u32,
    },
    /// Deposit `notional` prime cash into the market at `market_index`
    AddLiquidity {
        /// The 1-indexed market to trade in
        market_index: u8,
        /// The prime cash amount to deposit, internal precision
        notional: u128,
        /// The minimum acceptable post-trade implied rate
        min_implied_rate: u32,
        /// The maximum acceptable post-trade implied rate, zero for no bound
        max_implied_rate: u32,
    },
    /// Withdraw `notional` liquidity tokens from the market at `market_index`
    RemoveLiquidity {
        /// The 1-indexed market to trade in
        market_index: u8,
        /// The liquidity token amount to withdraw, internal precision
        notional: u128,
        /// The minimum acceptable post-trade implied rate
        min_implied_rate: u32,
        /// The maximum acceptable post-trade implied rate, zero for no bound
        max_implied_rate: u32,
    },
}

impl Trade {
    /// The wire discriminant of this trade
    pub fn action_type(&self) -> TradeActionType {
        match self {
            Trade::Lend { .. } => TradeActionType::Lend,
            Trade::Borrow { .. } => TradeActionType::Borrow,
            Trade::AddLiquidity { .. } => TradeActionType::AddLiquidity,
            Trade::RemoveLiquidity { .. } => TradeActionType::RemoveLiquidity,
        }
    }

    /// The market this trade executes in
    pub fn market_index(&self) -> u8 {
        match self {
            Trade::Lend { market_index, .. }
            | Trade::Borrow { market_index, .. }
            | Trade::AddLiquidity { market_index, .. }
            | Trade::RemoveLiquidity { market_index, .. } => *market_index,
        }
    }

    /// The notional amount this trade moves
    pub fn notional(&self) -> u128 {
        match self {
            Trade::Lend { notional, .. }
            | Trade::Borrow { notional, .. }
            | Trade::AddLiquidity { notional, .. }
            | Trade::RemoveLiquidity { notional, .. } => *notional,
        }
    }
}

/// A deposit/withdraw action on a single currency together with the packed
/// trades to execute against its markets, as submitted to
/// `batchBalanceAndTradeAction`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceActionWithTrades {
    /// The deposit action to take before trading
    pub action_type: DepositActionType,
    /// The currency to act on
    pub currency_id: u16,
    /// The deposit amount, in the precision implied by `action_type`
    pub deposit_action_amount: u128,
    /// An exact cash amount to withdraw after trading, internal precision
    pub withdraw_amount_internal_precision: u128,
    /// Withdraw the entire residual cash balance after trading
    pub withdraw_entire_cash_balance: bool,
    /// Redeem withdrawn cash to the underlying token rather than prime cash
    pub redeem_to_underlying: bool,
    /// The packed trades to execute, in order
    pub trades: Vec<B256>,
}

impl BalanceActionWithTrades {
    /// Build an action for `currency_id` packing the given trades.
    ///
    /// Deposit and withdraw fields start zeroed/false; callers set them
    /// directly for the handful of combinations the entrypoint accepts.
    pub fn new(
        currency_id: u16,
        action_type: DepositActionType,
        trades: &[Trade],
    ) -> Result<Self, EncodeError> {
        let trades = trades.iter().map(encode_trade).collect::<Result<_, _>>()?;

        Ok(Self {
            action_type,
            currency_id,
            deposit_action_amount: 0,
            withdraw_amount_internal_precision: 0,
            withdraw_entire_cash_balance: false,
            redeem_to_underlying: false,
            trades,
        })
    }
}

/// Returns whether a batch of actions is sorted by ascending currency id.
///
/// The entrypoint reverts unsorted batches; this is the client-side check.
pub fn actions_sorted_by_currency(actions: &[BalanceActionWithTrades]) -> bool {
    actions.windows(2).all(|w| w[0].currency_id < w[1].currency_id)
}

/// A lend-only action on a single currency, as submitted to the
/// gas-optimized `batchLend` entrypoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLend {
    /// The currency to lend in
    pub currency_id: u16,
    /// Pull the deposit in underlying tokens rather than prime cash
    pub deposit_underlying: bool,
    /// The packed trades to execute, in order
    pub trades: Vec<B256>,
}

impl BatchLend {
    /// Build a batch lend action for `currency_id` packing the given trades.
    ///
    /// Trades are packed as given; the entrypoint itself rejects anything
    /// that is not a lend.
    pub fn new(
        currency_id: u16,
        deposit_underlying: bool,
        trades: &[Trade],
    ) -> Result<Self, EncodeError> {
        let trades = trades.iter().map(encode_trade).collect::<Result<_, _>>()?;

        Ok(Self {
            currency_id,
            deposit_underlying,
            trades,
        })
    }
}

/// One entry of an account context's packed active-currencies list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCurrency {
    /// The currency id
    pub currency_id: u16,
    /// Whether the account holds portfolio assets in this currency
    pub in_portfolio: bool,
    /// Whether the account holds a cash or nToken balance in this currency
    pub in_balances: bool,
}

/// An account's context record, as returned by `getAccountContext`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    /// The next timestamp at which the account must be settled, zero if none
    pub next_settle_time: u64,
    /// Debt flag byte, a combination of `HAS_ASSET_DEBT` and `HAS_CASH_DEBT`
    pub has_debt: u8,
    /// The number of assets in the account's array portfolio
    pub asset_array_length: u8,
    /// The single currency the account holds a bitmap portfolio in, zero if
    /// the account uses an array portfolio
    pub bitmap_currency_id: u16,
    /// The packed active-currencies list
    pub active_currencies: [u8; ACTIVE_CURRENCIES_BYTES],
}

impl AccountContext {
    /// Whether the account has any negative fCash position
    pub fn has_asset_debt(&self) -> bool {
        self.has_debt & HAS_ASSET_DEBT != 0
    }

    /// Whether the account has any negative cash balance
    pub fn has_cash_debt(&self) -> bool {
        self.has_debt & HAS_CASH_DEBT != 0
    }

    /// Decodes the packed active-currencies list.
    ///
    /// Entries are two bytes each: the low 14 bits are the currency id, the
    /// top bit flags portfolio activity and the next bit balance activity.
    /// A zero currency id terminates the list.
    pub fn active_currency_list(&self) -> Vec<ActiveCurrency> {
        let mut currencies = Vec::new();
        for chunk in self.active_currencies.chunks_exact(2) {
            let currency_id = u16::from_be_bytes([chunk[0] & 0x3f, chunk[1]]);
            if currency_id == 0 {
                break;
            }

            currencies.push(ActiveCurrency {
                currency_id,
                in_portfolio: chunk[0] & 0x80 != 0,
                in_balances: chunk[0] & 0x40 != 0,
            });
        }

        currencies
    }
}

/// A single asset in an account's portfolio, as returned by
/// `getAccountPortfolio`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioAsset {
    /// The currency the asset is denominated in
    pub currency_id: u16,
    /// The unix timestamp at which the asset matures
    pub maturity: u64,
    /// The asset type, `FCASH_ASSET_TYPE` for fCash
    pub asset_type: u8,
    /// The signed notional amount, internal precision
    pub notional: i128,
}

/// The state of a single fixed-rate market, as returned by
/// `getActiveMarkets`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketData {
    /// The storage slot the market occupies
    pub storage_slot: B256,
    /// The unix timestamp at which the market matures
    pub maturity: u64,
    /// Total fCash available in the market, internal precision
    pub total_fcash: i128,
    /// Total prime cash held by the market, internal precision
    pub total_prime_cash: i128,
    /// Total liquidity tokens outstanding for the market
    pub total_liquidity: i128,
    /// The implied rate after the last trade, `RATE_PRECISION` terms
    pub last_implied_rate: u64,
    /// The time-smoothed oracle rate, `RATE_PRECISION` terms
    pub oracle_rate: u64,
    /// The timestamp of the last trade against the market
    pub previous_trade_time: u64,
}
