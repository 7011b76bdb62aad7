//! Common types shared between the deploy scripts and the integration test
//! runner: protocol constants, action encodings, and views of on-chain state.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod constants;
pub mod encoding;
pub mod revert;
pub mod types;
