//! Binary crate for the `cityinfo` Telegram bot.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and interactive configuration
//! - Wiring the core service into the Telegram dispatcher
//! - Logging setup

use clap::Parser;

mod bot;
mod cli;
mod logging;
mod session;
mod texts;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
