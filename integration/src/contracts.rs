//! Contains ABI definitions for the Notional proxy and associated contracts

use alloy::sol_types::sol;
use notional_common::types;

pub(crate) use INotional::*;

sol! {
    #[sol(rpc)]
    interface INotional {
        struct BalanceActionWithTrades {
            uint8 actionType;
            uint16 currencyId;
            uint256 depositActionAmount;
            uint256 withdrawAmountInternalPrecision;
            bool withdrawEntireCashBalance;
            bool redeemToUnderlying;
            bytes32[] trades;
        }

        struct BatchLend {
            uint16 currencyId;
            bool depositUnderlying;
            bytes32[] trades;
        }

        struct AccountContext {
            uint40 nextSettleTime;
            bytes1 hasDebt;
            uint8 assetArrayLength;
            uint16 bitmapCurrencyId;
            bytes18 activeCurrencies;
        }

        struct PortfolioAsset {
            uint256 currencyId;
            uint256 maturity;
            uint256 assetType;
            int256 notional;
            uint256 storageSlot;
            uint8 storageState;
        }

        struct MarketParameters {
            bytes32 storageSlot;
            uint256 maturity;
            int256 totalfCash;
            int256 totalPrimeCash;
            int256 totalLiquidity;
            uint256 lastImpliedRate;
            uint256 oracleRate;
            uint256 previousTradeTime;
        }

        struct PrimeRate {
            int256 supplyFactor;
            int256 debtFactor;
            uint256 oracleSupplyRate;
        }

        struct PrimeCashFactors {
            uint256 lastAccrueTime;
            uint256 totalPrimeSupply;
            uint256 totalPrimeDebt;
            uint256 oracleSupplyRate;
            uint256 lastTotalUnderlyingValue;
            uint256 underlyingScalar;
            uint256 supplyScalar;
            uint256 debtScalar;
            uint256 rateOracleTimeWindow;
        }

        struct Token {
            address tokenAddress;
            bool hasTransferFee;
            int256 decimals;
            uint8 tokenType;
            uint256 deprecatedMaxCollateralBalance;
        }

        function batchBalanceAndTradeAction(
            address account,
            BalanceActionWithTrades[] calldata actions
        ) external payable;

        function batchLend(address account, BatchLend[] calldata actions) external;

        function getAccountContext(address account) external view returns (AccountContext memory);

        function getAccountBalance(uint16 currencyId, address account)
            external
            view
            returns (int256 cashBalance, int256 nTokenBalance, uint256 lastClaimTime);

        function getAccountPortfolio(address account)
            external
            view
            returns (PortfolioAsset[] memory);

        function getActiveMarkets(uint16 currencyId)
            external
            view
            returns (MarketParameters[] memory);

        function getfCashAmountGivenCashAmount(
            uint16 currencyId,
            int88 netCashToAccount,
            uint256 marketIndex,
            uint256 blockTime
        ) external view returns (int256);

        function getCashAmountGivenfCashAmount(
            uint16 currencyId,
            int88 fCashAmount,
            uint256 marketIndex,
            uint256 blockTime
        ) external view returns (int256, int256);

        function getDepositFromfCashLend(
            uint16 currencyId,
            uint256 fCashAmount,
            uint256 maturity,
            uint32 minLendRate,
            uint256 blockTime
        )
            external
            view
            returns (
                uint256 depositAmountUnderlying,
                uint256 depositAmountAsset,
                uint8 marketIndex,
                bytes32 encodedTrade
            );

        function convertCashBalanceToExternal(
            uint16 currencyId,
            int256 cashBalanceInternal,
            bool useUnderlying
        ) external view returns (int256);

        function convertUnderlyingToPrimeCash(uint16 currencyId, int256 underlyingExternal)
            external
            view
            returns (int256);

        function enableBitmapCurrency(uint16 currencyId) external;

        function enablePrimeBorrow(bool allowPrimeBorrow) external;

        function depositUnderlyingToken(
            address account,
            uint16 currencyId,
            uint256 amountExternalPrecision
        ) external payable returns (uint256);

        function withdraw(
            uint16 currencyId,
            uint88 amountInternalPrecision,
            bool redeemToUnderlying
        ) external returns (uint256);

        function setMaxUnderlyingSupply(
            uint16 currencyId,
            uint256 maxUnderlyingSupply,
            uint8 maxPrimeDebtUtilization
        ) external;

        function getPrimeFactorsStored(uint16 currencyId)
            external
            view
            returns (PrimeCashFactors memory);

        function getPrimeFactors(uint16 currencyId, uint256 blockTime)
            external
            view
            returns (
                PrimeRate memory primeRate,
                PrimeCashFactors memory factors,
                uint256 maxUnderlyingSupply,
                uint256 totalUnderlyingSupply,
                uint256 maxUnderlyingDebt,
                uint256 totalUnderlyingDebt
            );

        function initializeMarkets(uint16 currencyId, bool isFirstInit) external;

        function nTokenAddress(uint16 currencyId) external view returns (address);

        function getNTokenPortfolio(address tokenAddress)
            external
            view
            returns (PortfolioAsset[] memory liquidityTokens, PortfolioAsset[] memory netfCashAssets);

        function getTotalfCashDebtOutstanding(uint16 currencyId, uint256 maturity)
            external
            view
            returns (int256);

        function getCurrency(uint16 currencyId)
            external
            view
            returns (Token memory assetToken, Token memory underlyingToken);

        function getMaxCurrencyId() external view returns (uint16);
    }
}

sol! {
    #[sol(rpc)]
    interface ERC20Mock {
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }
}

impl AccountContext {
    /// Converts the raw context tuple into its decoded client-side view
    pub(crate) fn decode(&self) -> types::AccountContext {
        types::AccountContext {
            next_settle_time: self.nextSettleTime.to::<u64>(),
            has_debt: self.hasDebt.0[0],
            asset_array_length: self.assetArrayLength,
            bitmap_currency_id: self.bitmapCurrencyId,
            active_currencies: self.activeCurrencies.0,
        }
    }
}

impl PortfolioAsset {
    /// Converts the raw asset tuple into its decoded client-side view
    pub(crate) fn decode(&self) -> eyre::Result<types::PortfolioAsset> {
        Ok(types::PortfolioAsset {
            currency_id: self.currencyId.to::<u16>(),
            maturity: self.maturity.to::<u64>(),
            asset_type: self.assetType.to::<u8>(),
            notional: i128::try_from(self.notional)
                .map_err(|_| eyre::eyre!("notional out of i128 range"))?,
        })
    }
}

impl MarketParameters {
    /// Converts the raw market tuple into its decoded client-side view
    pub(crate) fn decode(&self) -> eyre::Result<types::MarketData> {
        Ok(types::MarketData {
            storage_slot: self.storageSlot,
            maturity: self.maturity.to::<u64>(),
            total_fcash: i128::try_from(self.totalfCash)
                .map_err(|_| eyre::eyre!("totalfCash out of i128 range"))?,
            total_prime_cash: i128::try_from(self.totalPrimeCash)
                .map_err(|_| eyre::eyre!("totalPrimeCash out of i128 range"))?,
            total_liquidity: i128::try_from(self.totalLiquidity)
                .map_err(|_| eyre::eyre!("totalLiquidity out of i128 range"))?,
            last_implied_rate: self.lastImpliedRate.to::<u64>(),
            oracle_rate: self.oracleRate.to::<u64>(),
            previous_trade_time: self.previousTradeTime.to::<u64>(),
        })
    }
}

impl From<&notional_common::types::BalanceActionWithTrades> for BalanceActionWithTrades {
    fn from(action: &notional_common::types::BalanceActionWithTrades) -> Self {
        Self {
            actionType: action.action_type as u8,
            currencyId: action.currency_id,
            depositActionAmount: alloy_primitives::U256::from(action.deposit_action_amount),
            withdrawAmountInternalPrecision: alloy_primitives::U256::from(
                action.withdraw_amount_internal_precision,
            ),
            withdrawEntireCashBalance: action.withdraw_entire_cash_balance,
            redeemToUnderlying: action.redeem_to_underlying,
            trades: action.trades.clone(),
        }
    }
}

impl From<&notional_common::types::BatchLend> for BatchLend {
    fn from(action: &notional_common::types::BatchLend) -> Self {
        Self {
            currencyId: action.currency_id,
            depositUnderlying: action.deposit_underlying,
            trades: action.trades.clone(),
        }
    }
}
