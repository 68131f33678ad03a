use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod clipboard;
mod config;
mod error;
mod keys;
mod prompt;
mod token;
mod ui;
mod version;

mod claims;
mod expiration;
mod jwt;
mod key;
mod utils;

#[cfg(test)]
mod tests;

use cli::CliHandler;
use version::CURRENT_VERSION;

#[derive(Parser)]
#[command(
    name = "jwt-forge",
    about = "Generate and verify RS256 JWTs with a managed RSA keypair",
    long_about = "jwt-forge - RS256 JWT generation and verification

OVERVIEW:
  Keeps one RSA keypair under your config directory and uses it to sign
  and verify JSON Web Tokens. Claims and expiration can be entered
  interactively or passed as flags.

QUICK START:
  jwt-forge keys gen                           # Create a 2048-bit keypair
  jwt-forge gen                                # Interactive token generation
  jwt-forge gen --subject bob --json           # Scripted, prints JSON
  jwt-forge gen --claims '{\"role\":\"admin\"}' --expires 15m --copy
  jwt-forge verify <TOKEN>                     # Check signature and expiry
  jwt-forge keys show                          # Inspect key files",
    version = CURRENT_VERSION,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use an alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a signed JWT
    #[command(aliases = &["g", "generate"])]
    Gen(GenArgs),

    /// Verify a JWT against the public key
    #[command(aliases = &["v"])]
    Verify(VerifyArgs),

    /// Manage the RSA keypair
    Keys(KeysArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenArgs {
    /// Token issuer (iss)
    #[arg(short, long)]
    pub issuer: Option<String>,

    /// Token subject (sub)
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Custom claims as a JSON object
    #[arg(short, long, value_name = "JSON")]
    pub claims: Option<String>,

    /// Expiration: 5m, 15m, 30m, 1h, 6h, 12h, 1d, 7d or <n>m|h|d
    #[arg(short, long, value_name = "SPEC")]
    pub expires: Option<String>,

    /// Copy the token to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Print a JSON object and never prompt
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    pub token: String,
}

#[derive(Args)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[derive(Subcommand)]
pub enum KeysCommand {
    /// Generate a new keypair
    Gen(KeysGenArgs),

    /// Show key file details
    #[command(aliases = &["ls"])]
    Show,

    /// Point the config at existing key files
    Set(KeysSetArgs),
}

#[derive(Args, Debug, Clone)]
pub struct KeysGenArgs {
    /// Key size in bits (2048 or 3072); defaults to the configured size
    #[arg(short, long)]
    pub bits: Option<u32>,

    /// Overwrite existing keys without asking
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct KeysSetArgs {
    #[arg(long, value_name = "PATH")]
    pub private: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub public: Option<PathBuf>,
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_every_flag_is_documented() {
        let command = Cli::command();
        command.clone().debug_assert();

        for arg in command.get_arguments() {
            if matches!(arg.get_id().as_str(), "help" | "version") {
                continue;
            }
            assert!(arg.get_help().is_some(), "--{} has no help text", arg.get_id());
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["jwt-forge", "keys", "show", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Keys(KeysArgs { command: KeysCommand::Show })));
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("jwt_forge={}", log_level))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{}", version::format_version_info());

    let json_output = matches!(&cli.command, Commands::Gen(args) if args.json);

    let mut handler = CliHandler::with_config_path(cli.config);
    if let Err(e) = handler.execute(cli.command).await {
        if json_output {
            println!("{}", token::json_error(&e));
        } else {
            eprintln!("Error: {}", e);
            if let Some(hint) = keys::hint_for(&e) {
                eprintln!("{}", hint);
            }
        }
        std::process::exit(1);
    }
}
