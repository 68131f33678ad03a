//! `gen` and `verify`

use serde::Serialize;
use serde_json::Value;

use crate::claims::{Claims, ClaimsBuilder};
use crate::clipboard::ClipboardSink;
use crate::config::Config;
use crate::error::{ForgeError, Result};
use crate::expiration::{
    format_expiration, format_timestamp, ExpirationInfo, ExpirationSpec, DEFAULT_EXPIRATION_SECONDS,
};
use crate::jwt::{self, Header, VerifiedToken};
use crate::key::KeyStore;
use crate::keys::{create_keypair, report_permissions};
use crate::prompt::{self, KeypairChoice, Prompter};
use crate::ui::UI;
use crate::GenArgs;

/// Everything produced by a successful `gen`
#[derive(Debug, Clone)]
pub struct GeneratedToken {
    pub token: String,
    pub header: Header,
    pub claims: Claims,
    pub expiration: ExpirationInfo,
}

/// Shape printed by `gen --json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOutput<'a> {
    pub token: &'a str,
    pub header: &'a Header,
    pub payload: &'a Claims,
    pub expires_at: &'a str,
    pub expires_in: &'a str,
}

impl<'a> From<&'a GeneratedToken> for TokenOutput<'a> {
    fn from(generated: &'a GeneratedToken) -> Self {
        Self {
            token: &generated.token,
            header: &generated.header,
            payload: &generated.claims,
            expires_at: &generated.expiration.expires_at,
            expires_in: &generated.expiration.expires_in,
        }
    }
}

/// Error object printed on stdout when `gen --json` fails
pub fn json_error(error: &ForgeError) -> Value {
    serde_json::json!({
        "error": {
            "code": error.code().as_str(),
            "kind": error.code().kind(),
            "message": error.to_string(),
        }
    })
}

pub struct TokenService {
    config: Config,
    ui: UI,
}

impl TokenService {
    pub fn new(config: Config, quiet: bool) -> Self {
        let ui = if quiet { UI::quiet() } else { UI::new() };
        Self { config, ui }
    }

    /// Issue a token, prompting for anything not given as a flag
    ///
    /// With `--json` nothing is prompted: existing keys are reused and every
    /// unspecified value takes its default.
    pub async fn generate<C: ClipboardSink>(
        &self,
        args: GenArgs,
        prompter: &dyn Prompter,
        clipboard: &C,
    ) -> Result<GeneratedToken> {
        let interactive = !args.json;

        // Flag values are checked before any key material is touched
        let mut builder = ClaimsBuilder::new();
        if let Some(json) = args.claims.as_deref() {
            builder = builder.custom_json(json)?;
        }
        let flag_seconds = args
            .expires
            .as_deref()
            .map(|spec| spec.parse::<ExpirationSpec>()?.resolve())
            .transpose()?;

        let paths = self.config.key_paths();
        let regenerate = if KeyStore::exists(&paths).both() {
            interactive
                && prompt::choose_keypair_action(prompter)? == KeypairChoice::GenerateNew
        } else {
            true
        };

        if regenerate {
            self.ui.info("Generating new RSA keypair...");
            create_keypair(&self.ui, &paths, self.config.key_bits).await?;
            self.ui.success("✓ Keypair generated and saved");
            self.ui
                .detail(&format!("Private key: {}", paths.private_key_path.display()));
            self.ui
                .detail(&format!("Public key: {}", paths.public_key_path.display()));
        }

        report_permissions(&self.ui, &paths.private_key_path);
        let private_key = KeyStore::load_private_key(&paths.private_key_path).await?;

        let issuer = match args.issuer {
            Some(issuer) => Some(issuer),
            None if interactive => Some(prompt::prompt_issuer(prompter)?),
            None => None,
        };
        let subject = match args.subject {
            Some(subject) => Some(subject),
            None if interactive => Some(prompt::prompt_subject(prompter)?),
            None => None,
        };
        builder = builder.issuer(issuer).subject(subject);
        if args.claims.is_none() && interactive {
            builder = builder.custom_claims(prompt::collect_custom_claims(prompter)?)?;
        }
        let mut claims = builder.build();

        let seconds = match flag_seconds {
            Some(seconds) => seconds,
            None if interactive => prompt::select_expiration(prompter)?,
            None => DEFAULT_EXPIRATION_SECONDS,
        };

        let now = jwt::now();
        let exp = now + seconds;
        claims.set_issued_at(now);
        claims.set_expiration(exp);

        self.ui.info("Signing JWT...");
        let token = jwt::sign_at(&claims, &private_key, now)?;
        let generated = GeneratedToken {
            token,
            header: Header::default(),
            claims,
            expiration: format_expiration(exp, now),
        };

        tracing::debug!("Issued token expiring at {}", exp);

        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&TokenOutput::from(&generated))?
            );
        } else {
            self.ui.blank_line();
            self.ui.success("✓ JWT generated successfully!");
            self.ui
                .detail(&format!("Expires in: {}", generated.expiration.expires_in));
            self.ui
                .detail(&format!("Expires at: {}", generated.expiration.expires_at));
            self.ui.blank_line();
            self.ui.plain(&generated.token);
        }

        if args.copy {
            match clipboard.copy(&generated.token).await {
                Ok(()) => self.ui.success("✓ Token copied to clipboard"),
                Err(e) => self
                    .ui
                    .warning(&format!("⚠ Could not copy to clipboard: {}", e)),
            }
        }

        Ok(generated)
    }

    /// Verify a token against the configured public key and print its contents
    pub async fn verify(&self, token: &str) -> Result<VerifiedToken> {
        let public_key = KeyStore::load_public_key(&self.config.public_key_path).await?;

        self.ui.info("Verifying JWT...");
        let now = jwt::now();
        let verified = jwt::verify_at(token, &public_key, now)?;

        self.ui.blank_line();
        self.ui.success("✓ JWT is valid!");
        self.ui.blank_line();
        self.ui
            .json_block("Header:", &Value::Object(verified.header.clone()));
        self.ui.blank_line();
        self.ui
            .json_block("Payload:", &Value::Object(verified.claims.as_map().clone()));

        if let Some(exp) = verified.claims.expiration() {
            let info = format_expiration(exp, now);
            self.ui.blank_line();
            self.ui.success(&format!("✓ Expires in: {}", info.expires_in));
            self.ui.detail(&format!("Expires at: {}", info.expires_at));
        }

        if let Some(iat) = verified.claims.issued_at() {
            self.ui.detail(&format!("Issued at: {}", format_timestamp(iat)));
        }

        Ok(verified)
    }
}
