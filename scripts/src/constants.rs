//! Constants used in the deploy scripts

/// The external library contracts, deployed before anything that links them
pub const LIBRARY_CONTRACTS: [&str; 6] = [
    "FreeCollateralExternal",
    "SettleAssetsExternal",
    "MigrateIncentives",
    "TradingAction",
    "nTokenMintAction",
    "nTokenRedeemAction",
];

/// The action contracts wired into the router, deployed after the libraries
pub const ACTION_CONTRACTS: [&str; 15] = [
    "AccountAction",
    "BatchAction",
    "CalculationViews",
    "ERC1155Action",
    "GovernanceAction",
    "InitializeMarketsAction",
    "LiquidateCurrencyAction",
    "LiquidatefCashAction",
    "nTokenAction",
    "TreasuryAction",
    "VaultAccountAction",
    "VaultAccountHealth",
    "VaultAction",
    "VaultLiquidationAction",
    "Views",
];

/// The action contracts passed to the pause router constructor, in
/// constructor-argument order
pub const PAUSE_ROUTER_CONSTRUCTOR: [&str; 4] = [
    "Views",
    "LiquidateCurrencyAction",
    "LiquidatefCashAction",
    "VaultAccountHealth",
];

/// The action contracts passed to the router constructor, in
/// constructor-argument order
pub const ROUTER_CONSTRUCTOR: [&str; 15] = [
    "GovernanceAction",
    "Views",
    "InitializeMarketsAction",
    "nTokenAction",
    "BatchAction",
    "AccountAction",
    "ERC1155Action",
    "LiquidateCurrencyAction",
    "LiquidatefCashAction",
    "TreasuryAction",
    "CalculationViews",
    "VaultAccountAction",
    "VaultAction",
    "VaultLiquidationAction",
    "VaultAccountHealth",
];

/// The beacon implementation contracts, each constructed against the
/// Notional proxy address
pub const BEACON_IMPLEMENTATIONS: [&str; 3] =
    ["nTokenERC20Proxy", "PrimeCashProxy", "PrimeDebtProxy"];

/// The authorized callback contracts, each constructed against the
/// Notional proxy address
pub const AUTHORIZED_CALLBACKS: [&str; 1] = ["LeveragedNTokenAdapter"];

/// The name of the pause router contract
pub const PAUSE_ROUTER_CONTRACT: &str = "PauseRouter";

/// The name of the router contract
pub const ROUTER_CONTRACT: &str = "Router";

/// The deployments-file key under which the Notional proxy address is
/// recorded. The proxy predates this deployer and is never deployed by it.
pub const NOTIONAL_PROXY_KEY: &str = "NotionalProxy";

/// The artifact name and output file name of each exported ABI
pub const ABI_EXPORTS: [(&str, &str); 6] = [
    ("NotionalProxy", "Notional"),
    ("SecondaryRewarder", "SecondaryRewarder"),
    ("IStrategyVault", "IStrategyVault"),
    ("BaseERC4626Proxy", "ERC4626"),
    ("IPrimeCashHoldingsOracle", "PrimeCashHoldingsOracle"),
    ("LeveragedNTokenAdapter", "LeveragedNTokenAdapter"),
];

/// The prefix of the per-network deployments file, `v3.<network>.json`
pub const DEPLOYMENTS_FILE_PREFIX: &str = "v3";

/// The default directory containing compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default directory ABI files are exported to
pub const DEFAULT_ABI_DIR: &str = "abi";

/// The suffix of the per-network deployer key environment variable,
/// e.g. `MAINNET_DEPLOYER_PK`
pub const DEPLOYER_KEY_ENV_SUFFIX: &str = "_DEPLOYER_PK";

/// The phrase that must be typed to confirm a broadcast deployment
pub const CONFIRMATION_PHRASE: &str = "I am sure";

/// The JSON key holding a contract's ABI within a compiled artifact
pub const ARTIFACT_ABI_KEY: &str = "abi";
