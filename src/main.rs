//
//  vika
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vika::cli::{Cli, Commands};
use vika::{exit_code_for, exit_codes};

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code_for(&e));
        }
    }
}

/// Logs go to stderr, filtered by `VIKA_DEBUG` (e.g. `VIKA_DEBUG=vika=debug`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("VIKA_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Auth(cmd) => cmd.run(&cli.global).await,
        Commands::Record(cmd) => cmd.run(&cli.global).await,
        Commands::Field(cmd) => cmd.run(&cli.global).await,
        Commands::Upload(cmd) => cmd.run(&cli.global).await,
        Commands::Space(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("vika version {}", vika::VERSION);
            Ok(())
        }
    }
}
