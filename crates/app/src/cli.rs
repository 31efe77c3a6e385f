//! Command line interface

use clap::{Parser, Subcommand};
use passport_gateway::ConnectionConfig;

#[derive(Debug, Parser)]
#[command(name = "passport")]
#[command(about = "Create, query and audit passport records on the ledger")]
pub struct Cli {
    /// Peer endpoint (overrides PEER_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Channel name (overrides CHANNEL_NAME)
    #[arg(long, global = true)]
    pub channel: Option<String>,

    /// Chaincode name (overrides CHAINCODE_NAME)
    #[arg(long, global = true)]
    pub chaincode: Option<String>,

    /// Seed the ledger with the example records before running the command
    #[arg(long, global = true)]
    pub init: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Seed the ledger with the example records
    Init,

    /// Print every record
    List,

    /// Print one record
    Read { id: String },

    /// Print the change log of a record
    History { id: String },

    /// Delete a record
    Delete { id: String },

    /// Interactive menu (default)
    Shell,
}

impl Cli {
    /// Apply command line overrides on top of the environment configuration
    pub fn apply(&self, config: &mut ConnectionConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.peer_endpoint = endpoint.clone();
        }
        if let Some(channel) = &self.channel {
            config.channel = channel.clone();
        }
        if let Some(chaincode) = &self.chaincode {
            config.chaincode = chaincode.clone();
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Shell)
    }
}
