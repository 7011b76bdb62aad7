//! Setup and shared state for the integration tests

use alloy::{
    network::{Ethereum, EthereumWallet},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{BlockNumberOrTag, BlockTransactionsKind},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, I256, U256};
use eyre::{eyre, Result};
use notional_common::{
    constants::INTERNAL_TOKEN_PRECISION,
    types::{AccountContext, MarketData, PortfolioAsset},
};
use scripts::{constants::NOTIONAL_PROXY_KEY, utils::parse_addr_from_deployments_file};

use crate::{
    cli::Cli,
    constants::DEV_PRIVATE_KEYS,
    contracts::{ERC20Mock, INotional},
    txn::call_helper,
};

/// The provider type for the tests
pub(crate) type Wallet = DynProvider<Ethereum>;
/// A Notional proxy instance using the default generics
pub(crate) type Notional = INotional::INotionalInstance<Wallet, Ethereum>;
/// An ERC20 instance using the default generics
pub(crate) type ERC20 = ERC20Mock::ERC20MockInstance<Wallet, Ethereum>;

/// The arguments provided to each integration test
#[derive(Clone)]
pub(crate) struct TestArgs {
    /// The RPC client, with every test account's signer registered
    pub client: Wallet,
    /// The Notional proxy contract instance
    pub notional: Notional,
    /// The address of the Notional proxy contract
    pub notional_address: Address,
    /// The protocol owner account
    pub owner: Address,
    /// The primary user account the tests act through
    pub account: Address,
    /// Every tracked account, owner first; the invariant checks iterate
    /// these
    pub accounts: Vec<Address>,
}

/// Builds the test arguments from the CLI: a provider wired with all test
/// signers and the proxy address from the deployments file
pub(crate) async fn setup_test_args(cli: &Cli) -> Result<TestArgs> {
    let keys: Vec<String> = if cli.priv_keys.is_empty() {
        DEV_PRIVATE_KEYS.iter().map(|k| k.to_string()).collect()
    } else {
        cli.priv_keys.clone()
    };

    let mut signers = Vec::with_capacity(keys.len());
    for key in &keys {
        signers.push(key.parse::<PrivateKeySigner>()?);
    }
    let accounts: Vec<Address> = signers.iter().map(|s| s.address()).collect();

    let mut wallet = EthereumWallet::from(signers[0].clone());
    for signer in signers.into_iter().skip(1) {
        wallet.register_signer(signer);
    }

    let url = Url::parse(&cli.rpc_url)?;
    let provider = ProviderBuilder::new().wallet(wallet).on_http(url);
    let client = DynProvider::new(provider);

    let notional_address =
        parse_addr_from_deployments_file(&cli.deployments_file, NOTIONAL_PROXY_KEY)?;
    let notional = INotional::new(notional_address, client.clone());

    Ok(TestArgs {
        client,
        notional,
        notional_address,
        owner: accounts[0],
        account: accounts[1],
        accounts,
    })
}

impl TestArgs {
    /// The Notional instance the tests act through
    pub(crate) fn notional(&self) -> &Notional {
        &self.notional
    }

    /// An ERC20 instance over the test provider
    pub(crate) fn erc20(&self, address: Address) -> ERC20 {
        ERC20Mock::new(address, self.client.clone())
    }

    /// The underlying token listed for the given currency
    pub(crate) async fn underlying_token(&self, currency_id: u16) -> Result<Address> {
        let currency = call_helper(self.notional.getCurrency(currency_id)).await?;
        Ok(currency.underlyingToken.tokenAddress)
    }

    /// The timestamp of the latest block
    pub(crate) async fn block_time(&self) -> Result<u64> {
        let block = self
            .client
            .get_block_by_number(BlockNumberOrTag::Latest, BlockTransactionsKind::Hashes)
            .await?
            .ok_or_else(|| eyre!("no latest block"))?;
        Ok(block.header.timestamp)
    }

    /// Advances chain time by `seconds` and mines a block.
    ///
    /// Uses the dev-node `evm_increaseTime`/`evm_mine` methods; a plain node
    /// will reject these.
    pub(crate) async fn advance_time(&self, seconds: u64) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .raw_request("evm_increaseTime".into(), (seconds,))
            .await?;
        let _: serde_json::Value = self.client.raw_request("evm_mine".into(), ()).await?;
        Ok(())
    }

    /// Takes a dev-node state snapshot, returning its id
    pub(crate) async fn snapshot(&self) -> Result<String> {
        let id: String = self.client.raw_request("evm_snapshot".into(), ()).await?;
        Ok(id)
    }

    /// Reverts the dev node to a previously taken snapshot
    pub(crate) async fn revert_to(&self, snapshot_id: &str) -> Result<()> {
        let reverted: bool = self
            .client
            .raw_request("evm_revert".into(), (snapshot_id,))
            .await?;
        if !reverted {
            return Err(eyre!("devnet refused to revert to snapshot {snapshot_id}"));
        }
        Ok(())
    }

    // --- State Readers --- //

    /// The decoded account context of `account`
    pub(crate) async fn context(&self, account: Address) -> Result<AccountContext> {
        let context = call_helper(self.notional.getAccountContext(account)).await?;
        Ok(context._0.decode())
    }

    /// The decoded portfolio of `account`
    pub(crate) async fn portfolio(&self, account: Address) -> Result<Vec<PortfolioAsset>> {
        let assets = call_helper(self.notional.getAccountPortfolio(account)).await?;
        assets._0.iter().map(|a| a.decode()).collect()
    }

    /// The account's balance record in the given currency: cash balance,
    /// nToken balance, and last claim time
    pub(crate) async fn balance(
        &self,
        currency_id: u16,
        account: Address,
    ) -> Result<(i128, i128, u64)> {
        let balance = call_helper(self.notional.getAccountBalance(currency_id, account)).await?;
        Ok((
            to_i128(balance.cashBalance)?,
            to_i128(balance.nTokenBalance)?,
            balance.lastClaimTime.to::<u64>(),
        ))
    }

    /// The decoded active markets of the given currency
    pub(crate) async fn active_markets(&self, currency_id: u16) -> Result<Vec<MarketData>> {
        let markets = call_helper(self.notional.getActiveMarkets(currency_id)).await?;
        markets._0.iter().map(|m| m.decode()).collect()
    }
}

/// Converts a whole-token amount to internal 1e8 precision
pub(crate) fn internal(whole: u64) -> u128 {
    whole as u128 * INTERNAL_TOKEN_PRECISION as u128
}

/// Converts a whole-token amount to external precision with the given
/// decimals
pub(crate) fn external(whole: u64, decimals: u8) -> U256 {
    U256::from(whole) * U256::from(10).pow(U256::from(decimals))
}

/// Narrows an `I256` to `i128`, erroring on protocol-impossible magnitudes
pub(crate) fn to_i128(value: I256) -> Result<i128> {
    i128::try_from(value).map_err(|_| eyre!("value out of i128 range: {value}"))
}
