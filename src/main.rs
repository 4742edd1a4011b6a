//! Framequote CLI

use std::io;

use anyhow::Result;
use clap::Parser;
use framequote::cli::{QuoteArgs, init_logging, run};

/// Quote an order from the fixture directory
pub fn main() -> Result<()> {
    _ = dotenvy::dotenv();

    let args = QuoteArgs::parse();

    init_logging(&args.logging)?;

    let stdout = io::stdout();
    let handle = stdout.lock();

    run(&args, handle)?;

    Ok(())
}
