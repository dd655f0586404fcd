//! Command-line interface for cpatrack.

pub mod commands;

use clap::{Parser, Subcommand};

/// cpatrack - CPA affiliate tracking backend
#[derive(Parser)]
#[command(name = "cpatrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create the default config file
    Init,

    /// Provision an admin account
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["cpatrack"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_create_admin() {
        let cli = Cli::try_parse_from([
            "cpatrack",
            "create-admin",
            "--email",
            "root@example.com",
            "--password",
            "s3cret",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CreateAdmin { email, password }) => {
                assert_eq!(email, "root@example.com");
                assert_eq!(password, "s3cret");
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn create_admin_requires_email() {
        assert!(Cli::try_parse_from(["cpatrack", "create-admin", "--password", "x"]).is_err());
    }
}
