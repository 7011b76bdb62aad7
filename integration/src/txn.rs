//! Utilities for sending transactions and asserting on protocol reverts

use alloy::{network::Ethereum, rpc::types::TransactionReceipt};
use alloy_contract::{CallBuilder, CallDecoder};
use eyre::{bail, eyre, Result};
use notional_common::revert::{decode_revert_reason, revert_reason_from_message};

use crate::harness::Wallet;

/// The call builder type for the tests
pub(crate) type TestCallBuilder<'a, C> = CallBuilder<&'a Wallet, C, Ethereum>;

// ----------------
// | Transactions |
// ----------------

/// Send a transaction and wait for it to succeed or fail
pub(crate) async fn send_tx<C: CallDecoder>(
    tx: TestCallBuilder<'_, C>,
) -> Result<TransactionReceipt> {
    let pending_tx = tx.send().await?;
    let receipt = pending_tx.get_receipt().await?;
    Ok(receipt)
}

/// Wait for a transaction receipt and ensure it was successful
pub(crate) async fn wait_for_tx_success<C: CallDecoder>(
    tx: TestCallBuilder<'_, C>,
) -> Result<TransactionReceipt> {
    let receipt = send_tx(tx).await?;
    if !receipt.status() {
        bail!("transaction reverted on-chain: {:?}", receipt.transaction_hash);
    }
    Ok(receipt)
}

/// Send a call and return the result
pub(crate) async fn call_helper<C: CallDecoder + Unpin>(
    call: TestCallBuilder<'_, C>,
) -> Result<C::CallOutput> {
    let res = call.call().await?;
    Ok(res)
}

// -----------
// | Reverts |
// -----------

/// Assert that a transaction reverts with the exact protocol reason
pub(crate) async fn assert_reverts_with<C: CallDecoder>(
    tx: TestCallBuilder<'_, C>,
    expected: &str,
) -> Result<()> {
    match tx.send().await {
        Ok(pending) => {
            bail!(
                "expected revert '{}', transaction was accepted: {:?}",
                expected,
                pending.tx_hash()
            )
        }
        Err(e) => {
            let reason = revert_reason(&e)
                .ok_or_else(|| eyre!("expected revert '{}', got: {}", expected, e))?;
            if reason != expected {
                bail!("expected revert '{}', got '{}'", expected, reason);
            }
            Ok(())
        }
    }
}

/// Assert that a transaction reverts, with any reason
pub(crate) async fn assert_reverts<C: CallDecoder>(tx: TestCallBuilder<'_, C>) -> Result<()> {
    if let Ok(pending) = tx.send().await {
        bail!(
            "expected transaction to revert, it was accepted: {:?}",
            pending.tx_hash()
        );
    }
    Ok(())
}

/// Extracts the protocol revert reason from a contract error, if any
fn revert_reason(error: &alloy_contract::Error) -> Option<String> {
    if let alloy_contract::Error::TransportError(transport) = error {
        if let Some(payload) = transport.as_error_resp() {
            if let Some(data) = payload.as_revert_data() {
                return decode_revert_reason(&data);
            }
        }
    }

    // Some providers only surface the revert payload in the message body
    revert_reason_from_message(&error.to_string())
}
