//! Protocol constants and fixed-maturity market math

/// The precision of implied interest rates, 1e9
pub const RATE_PRECISION: u64 = 1_000_000_000;

/// One basis point in `RATE_PRECISION` terms
pub const BASIS_POINT: u64 = RATE_PRECISION / 10_000;

/// The internal precision of cash and fCash balances, 1e8
pub const INTERNAL_TOKEN_PRECISION: u64 = 100_000_000;

/// The number of seconds in a day
pub const SECONDS_IN_DAY: u64 = 86_400;

/// The number of seconds in a 90-day quarter
pub const SECONDS_IN_QUARTER: u64 = 90 * SECONDS_IN_DAY;

/// Flag set in an account's debt byte when some fCash position is negative
pub const HAS_ASSET_DEBT: u8 = 0x01;

/// Flag set in an account's debt byte when some cash balance is negative
pub const HAS_CASH_DEBT: u8 = 0x02;

/// The asset type of an fCash position in a portfolio
pub const FCASH_ASSET_TYPE: u8 = 1;

/// The highest market index the protocol will ever trade (a 20 year tenor)
pub const MAX_MARKET_INDEX: u8 = 7;

/// The number of bytes in the packed active-currencies list of an
/// account context
pub const ACTIVE_CURRENCIES_BYTES: usize = 18;

/// The largest notional amount representable in a packed trade, `2^88 - 1`
pub const MAX_TRADE_NOTIONAL: u128 = (1 << 88) - 1;

/// Tenor of each traded market, indexed by `marketIndex - 1`, in quarters
const MARKET_TENOR_QUARTERS: [u64; MAX_MARKET_INDEX as usize] = [1, 2, 4, 8, 20, 40, 80];

/// Returns the quarterly time reference preceding the given timestamp.
///
/// All market maturities are offsets from this reference time.
pub fn time_ref(timestamp: u64) -> u64 {
    timestamp - (timestamp % SECONDS_IN_QUARTER)
}

/// Returns the maturity of the market at `market_index` (1-indexed) relative
/// to the time reference of `timestamp`.
///
/// Returns `None` if the market index is zero or beyond the longest tenor.
pub fn market_maturity(timestamp: u64, market_index: u8) -> Option<u64> {
    if market_index == 0 || market_index > MAX_MARKET_INDEX {
        return None;
    }

    let quarters = MARKET_TENOR_QUARTERS[(market_index - 1) as usize];
    Some(time_ref(timestamp) + quarters * SECONDS_IN_QUARTER)
}
