//! Constants used in the integration tests

/// Default devnet RPC URL
pub(crate) const DEFAULT_DEVNET_HOSTPORT: &str = "http://localhost:8545";

/// Default path of the deployments file written by the deploy scripts
pub(crate) const DEFAULT_DEPLOYMENTS_FILE: &str = "v3.localhost.json";

/// The pre-funded dev-node private keys used when none are passed.
///
/// Owner first, then the user accounts the tests act through.
pub(crate) const DEV_PRIVATE_KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

/// The currency id ETH is listed under
pub(crate) const ETH: u16 = 1;

/// The currency id DAI is listed under
pub(crate) const DAI: u16 = 2;

/// The currency id USDC is listed under
pub(crate) const USDC: u16 = 3;

/// The residual cash balance treated as dust after a full withdrawal,
/// internal precision
pub(crate) const CASH_DUST: i128 = 100_000_000;

/// Seconds the chain is advanced to observe prime debt accrual
pub(crate) const DEBT_ACCRUAL_SECONDS: u64 = 7 * 86_400;
