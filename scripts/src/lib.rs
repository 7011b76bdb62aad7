//! Scripts for deploying and maintaining the Notional lending system.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
mod commands;
pub mod constants;
pub mod deployer;
pub mod errors;
pub mod utils;
