//! Decoding of revert payloads into the protocol's revert-reason strings

use alloy_primitives::hex;
use alloy_sol_types::{Revert, SolError};

/// Extracts the `Error(string)` reason from raw revert data, if present
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data, true).ok().map(|revert| revert.reason)
}

/// Extracts a revert reason from an error's display form.
///
/// JSON-RPC providers differ in where they surface revert data; some embed
/// the raw `Error(string)` selector hex in the message body. This scans the
/// rendered error for such a payload and falls back to `None` when the
/// reason cannot be recovered.
pub fn revert_reason_from_message(message: &str) -> Option<String> {
    // 0x08c379a0 is the selector of Error(string)
    let start = message.find("08c379a0")?;
    let hex_payload: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();

    let bytes = hex::decode(&hex_payload).ok()?;
    decode_revert_reason(&bytes)
}
