//! Packing of trades into the protocol's `bytes32` wire layout.
//!
//! A packed trade is big-endian: one byte of trade type, one byte of market
//! index, 88 bits of notional, then one (lend/borrow) or two (liquidity)
//! 32-bit implied-rate limits. The remainder of the word is zero.

use core::fmt::{self, Display, Formatter};

use alloy_primitives::B256;

use crate::{
    constants::{MAX_MARKET_INDEX, MAX_TRADE_NOTIONAL},
    types::{Trade, TradeActionType},
};

/// The byte offset of the market index in a packed trade
const MARKET_INDEX_OFFSET: usize = 1;

/// The byte range of the 88-bit notional in a packed trade
const NOTIONAL_RANGE: core::ops::Range<usize> = 2..13;

/// The byte range of the first implied-rate limit in a packed trade
const RATE_LIMIT_RANGE: core::ops::Range<usize> = 13..17;

/// The byte range of the second implied-rate limit in a liquidity trade
const MAX_RATE_LIMIT_RANGE: core::ops::Range<usize> = 17..21;

/// Errors that can occur while packing or unpacking trades
#[derive(Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// The market index is zero or beyond the longest traded tenor
    InvalidMarketIndex(u8),
    /// The notional amount does not fit in 88 bits
    NotionalOverflow(u128),
    /// The packed word carries a trade type this codec does not handle
    UnknownTradeType(u8),
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::InvalidMarketIndex(index) => {
                write!(f, "invalid market index: {}", index)
            }
            EncodeError::NotionalOverflow(notional) => {
                write!(f, "notional exceeds 88 bits: {}", notional)
            }
            EncodeError::UnknownTradeType(trade_type) => {
                write!(f, "unknown trade type: {}", trade_type)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Packs a trade into its `bytes32` wire form
pub fn encode_trade(trade: &Trade) -> Result<B256, EncodeError> {
    let market_index = trade.market_index();
    if market_index == 0 || market_index > MAX_MARKET_INDEX {
        return Err(EncodeError::InvalidMarketIndex(market_index));
    }

    let notional = trade.notional();
    if notional > MAX_TRADE_NOTIONAL {
        return Err(EncodeError::NotionalOverflow(notional));
    }

    let mut word = [0u8; 32];
    word[0] = trade.action_type() as u8;
    word[MARKET_INDEX_OFFSET] = market_index;
    // The low 11 bytes of the big-endian u128 are the 88-bit notional
    word[NOTIONAL_RANGE].copy_from_slice(&notional.to_be_bytes()[5..]);

    match *trade {
        Trade::Lend {
            min_implied_rate, ..
        } => {
            word[RATE_LIMIT_RANGE].copy_from_slice(&min_implied_rate.to_be_bytes());
        }
        Trade::Borrow {
            max_implied_rate, ..
        } => {
            word[RATE_LIMIT_RANGE].copy_from_slice(&max_implied_rate.to_be_bytes());
        }
        Trade::AddLiquidity {
            min_implied_rate,
            max_implied_rate,
            ..
        }
        | Trade::RemoveLiquidity {
            min_implied_rate,
            max_implied_rate,
            ..
        } => {
            word[RATE_LIMIT_RANGE].copy_from_slice(&min_implied_rate.to_be_bytes());
            word[MAX_RATE_LIMIT_RANGE].copy_from_slice(&max_implied_rate.to_be_bytes());
        }
    }

    Ok(B256::from(word))
}

/// Unpacks a `bytes32` wire-form trade.
///
/// Only the market trade types (lend, borrow, add/remove liquidity) are
/// handled; residual purchases and cash-debt settlements carry different
/// payloads.
pub fn decode_trade(word: &B256) -> Result<Trade, EncodeError> {
    let bytes = word.as_slice();
    let market_index = bytes[MARKET_INDEX_OFFSET];

    let mut notional_bytes = [0u8; 16];
    notional_bytes[5..].copy_from_slice(&bytes[NOTIONAL_RANGE]);
    let notional = u128::from_be_bytes(notional_bytes);

    // Can `unwrap` here since the ranges are a constant four bytes wide
    let rate_limit = u32::from_be_bytes(bytes[RATE_LIMIT_RANGE].try_into().unwrap());
    let max_rate_limit = u32::from_be_bytes(bytes[MAX_RATE_LIMIT_RANGE].try_into().unwrap());

    let trade = match bytes[0] {
        t if t == TradeActionType::Lend as u8 => Trade::Lend {
            market_index,
            notional,
            min_implied_rate: rate_limit,
        },
        t if t == TradeActionType::Borrow as u8 => Trade::Borrow {
            market_index,
            notional,
            max_implied_rate: rate_limit,
        },
        t if t == TradeActionType::AddLiquidity as u8 => Trade::AddLiquidity {
            market_index,
            notional,
            min_implied_rate: rate_limit,
            max_implied_rate: max_rate_limit,
        },
        t if t == TradeActionType::RemoveLiquidity as u8 => Trade::RemoveLiquidity {
            market_index,
            notional,
            min_implied_rate: rate_limit,
            max_implied_rate: max_rate_limit,
        },
        t => return Err(EncodeError::UnknownTradeType(t)),
    };

    Ok(trade)
}
