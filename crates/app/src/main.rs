//! Passport application
//!
//! Connects to a peer through the gateway and runs either the interactive
//! menu or a single non-interactive command.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use passport_app::{Cli, Command, Shell, ShellError};
use passport_common::signing;
use passport_gateway::{ConnectionConfig, Gateway, HttpTransport, Identity, PassportClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; quiet by default so logs do not interleave with the menu
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ConnectionConfig::from_env().context("Failed to load configuration")?;
    cli.apply(&mut config);

    info!("Connecting to {} as {}", config.peer_address(), config.msp_id);

    let identity = Identity::from_pem_file(config.msp_id.clone(), &config.cert_path)?;
    let signing_key = signing::load_signing_key(&config.key_path)?;

    let transport = match &config.tls_cert_path {
        Some(path) => {
            let pem = std::fs::read(path)
                .with_context(|| format!("Failed to read TLS certificate {}", path.display()))?;
            HttpTransport::with_tls_root(config.peer_address(), &pem)?
        }
        None => HttpTransport::new(config.peer_address()),
    };

    let gateway = Gateway::connect(identity, signing_key, transport, config.timeouts);
    let contract = gateway.network(config.channel.clone()).contract(config.chaincode.clone());
    let client = PassportClient::new(contract);

    let stdin = std::io::stdin();
    let mut shell = Shell::new(&client, stdin.lock(), std::io::stdout());

    let outcome = execute(&mut shell, cli.init, cli.command()).await;

    match outcome {
        Err(ShellError::Gateway(err)) => {
            shell.report(&err)?;
            std::process::exit(1);
        }
        other => other.context("Shell failed")?,
    }

    Ok(())
}

async fn execute<R: BufRead, W: Write>(
    shell: &mut Shell<'_, R, W>,
    init: bool,
    command: Command,
) -> Result<(), ShellError> {
    if init && command != Command::Init {
        shell.init().await?;
    }

    match command {
        Command::Init => shell.init().await,
        Command::List => shell.list().await,
        Command::Read { id } => shell.show(&id).await,
        Command::History { id } => shell.show_history(&id).await,
        Command::Delete { id } => shell.remove(&id).await,
        Command::Shell => shell.run().await,
    }
}
