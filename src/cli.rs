use crate::clipboard::SystemClipboard;
use crate::config::{default_config_path, Config, EnvOverrides};
use crate::error::Result;
use crate::keys::KeysService;
use crate::prompt::DialoguerPrompter;
use crate::token::TokenService;
use crate::ui::UI;
use crate::{Commands, GenArgs, KeysCommand, VerifyArgs};
use std::path::PathBuf;

/// CLI handler for processing commands
pub struct CliHandler {
    config_path: PathBuf,
    ui: UI,
}

impl CliHandler {
    /// Create a handler reading the given config file, or the default one
    pub fn with_config_path(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path: config_path.unwrap_or_else(default_config_path),
            ui: UI::new(),
        }
    }

    /// Config as stored on disk
    async fn load_file_config(&self) -> Result<Config> {
        Config::load(Some(&self.config_path)).await
    }

    /// Config with `JWT_FORGE_*` overrides applied
    async fn load_config(&self) -> Result<Config> {
        self.load_file_config().await?.with_env_overrides()
    }

    /// Execute a CLI command
    pub async fn execute(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Gen(args) => self.handle_gen(args).await,
            Commands::Verify(args) => self.handle_verify(args).await,
            Commands::Keys(args) => self.handle_keys(args.command).await,
        }
    }

    async fn handle_gen(&mut self, args: GenArgs) -> Result<()> {
        let config = self.load_config().await?;
        let service = TokenService::new(config, args.json);
        service
            .generate(args, &DialoguerPrompter::new(), &SystemClipboard)
            .await?;
        Ok(())
    }

    async fn handle_verify(&mut self, args: VerifyArgs) -> Result<()> {
        let config = self.load_config().await?;
        let service = TokenService::new(config, false);
        if let Err(e) = service.verify(&args.token).await {
            if e.is_verification_error() {
                self.ui.error("✗ JWT verification failed");
            }
            return Err(e);
        }
        Ok(())
    }

    async fn handle_keys(&mut self, command: KeysCommand) -> Result<()> {
        let file_config = self.load_file_config().await?;
        let overrides = EnvOverrides::from_env()?;
        let mut service = KeysService::new(file_config, overrides, self.config_path.clone());
        let prompter = DialoguerPrompter::new();

        match command {
            KeysCommand::Gen(args) => service.generate(args, &prompter).await.map(|_| ()),
            KeysCommand::Show => service.show().await,
            KeysCommand::Set(args) => service.set(args, &prompter).await.map(|_| ()),
        }
    }
}
