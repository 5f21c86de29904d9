//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cb", about = "Chama WhatsApp webhook bot", version)]
pub struct Cli {
    /// Path to config file (default: .chamabot.yml, then ~/.config/chamabot/chamabot.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the webhook server
    Serve {
        /// Override the configured bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one reminder sweep for the current period and exit
    Remind,

    /// Manage the admin set
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Flag a phone number as an admin
    Add {
        /// Phone number in canonical form, e.g. +254700000001
        phone: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_with_port() {
        let cli = Cli::parse_from(["cb", "serve", "--port", "9000"]);
        match cli.command {
            Some(Command::Serve { port }) => assert_eq!(port, Some(9000)),
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_admin_add() {
        let cli = Cli::parse_from(["cb", "admin", "add", "+254700000001"]);
        match cli.command {
            Some(Command::Admin {
                command: AdminCommand::Add { phone },
            }) => assert_eq!(phone, "+254700000001"),
            _ => panic!("expected admin add command"),
        }
    }
}
