//! Unified error handling for jwt-forge
//!
//! This module provides a single error type with:
//! - Unique error codes for debugging and documentation
//! - Structured error information with context
//! - Convenient constructor methods
//! - Automatic conversions from common error types

use std::fmt;
use thiserror::Error;

/// Unified Result type for all jwt-forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Error codes for jwt-forge operations
///
/// Each error has a unique code in the format `FXXX` where:
/// - F1XX: Key management errors
/// - F2XX: Claim errors
/// - F3XX: Expiration errors
/// - F4XX: Token errors
/// - F5XX: File and I/O errors
/// - F6XX: Configuration errors
/// - F7XX: UI and interaction errors
/// - F9XX: Internal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Keys (F1XX)
    /// F101: Key size is not 2048 or 3072 bits
    InvalidKeySize,
    /// F102: Key file does not exist
    KeyNotFound,
    /// F103: Key file is not a usable RS256 key
    KeyParseError,
    /// F104: RSA key generation failed
    KeyGenerationFailed,

    // Claims (F2XX)
    /// F201: Custom claims are not a JSON object
    InvalidClaimsJson,
    /// F202: Custom claim collides with a standard claim
    ReservedClaimOverride,
    /// F203: Interactive claim value left empty
    ClaimValueEmpty,

    // Expiration (F3XX)
    /// F301: Custom expiration outside 1..=1 year
    ExpirationOutOfRange,
    /// F302: Expiration string could not be parsed
    InvalidExpiration,

    // Token (F4XX)
    /// F401: Token structure is invalid
    MalformedToken,
    /// F402: Signature does not verify
    SignatureInvalid,
    /// F403: Token is past its `exp`
    TokenExpired,
    /// F404: Header `alg` is not RS256
    UnsupportedAlgorithm,
    /// F405: Signing failed
    SigningFailed,

    // File/IO (F5XX)
    /// F501: File read error
    FileReadError,
    /// F502: File write error
    FileWriteError,
    /// F503: Directory error
    DirectoryError,

    // Configuration (F6XX)
    /// F601: Configuration error
    ConfigError,

    // UI (F7XX)
    /// F701: Dialog error
    DialogError,
    /// F702: User cancelled
    UserCancelled,
    /// F703: Clipboard could not be written
    ClipboardUnavailable,

    // Internal (F9XX)
    /// F901: Internal error
    InternalError,
    /// F902: Serialization error
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u16 {
        match self {
            // Keys (F1XX)
            ErrorCode::InvalidKeySize => 101,
            ErrorCode::KeyNotFound => 102,
            ErrorCode::KeyParseError => 103,
            ErrorCode::KeyGenerationFailed => 104,

            // Claims (F2XX)
            ErrorCode::InvalidClaimsJson => 201,
            ErrorCode::ReservedClaimOverride => 202,
            ErrorCode::ClaimValueEmpty => 203,

            // Expiration (F3XX)
            ErrorCode::ExpirationOutOfRange => 301,
            ErrorCode::InvalidExpiration => 302,

            // Token (F4XX)
            ErrorCode::MalformedToken => 401,
            ErrorCode::SignatureInvalid => 402,
            ErrorCode::TokenExpired => 403,
            ErrorCode::UnsupportedAlgorithm => 404,
            ErrorCode::SigningFailed => 405,

            // File/IO (F5XX)
            ErrorCode::FileReadError => 501,
            ErrorCode::FileWriteError => 502,
            ErrorCode::DirectoryError => 503,

            // Configuration (F6XX)
            ErrorCode::ConfigError => 601,

            // UI (F7XX)
            ErrorCode::DialogError => 701,
            ErrorCode::UserCancelled => 702,
            ErrorCode::ClipboardUnavailable => 703,

            // Internal (F9XX)
            ErrorCode::InternalError => 901,
            ErrorCode::SerializationError => 902,
        }
    }

    /// Get the string code (e.g., "F101")
    pub fn as_str(&self) -> String {
        format!("F{}", self.code())
    }

    /// Stable kind name used in machine-readable output
    pub fn kind(&self) -> &'static str {
        match self {
            ErrorCode::InvalidKeySize => "InvalidKeySize",
            ErrorCode::KeyNotFound => "KeyNotFound",
            ErrorCode::KeyParseError => "KeyParseError",
            ErrorCode::KeyGenerationFailed => "KeyGenerationFailed",
            ErrorCode::InvalidClaimsJson => "InvalidClaimsJSON",
            ErrorCode::ReservedClaimOverride => "ReservedClaimOverride",
            ErrorCode::ClaimValueEmpty => "ClaimValueEmpty",
            ErrorCode::ExpirationOutOfRange => "ExpirationOutOfRange",
            ErrorCode::InvalidExpiration => "InvalidExpiration",
            ErrorCode::MalformedToken => "MalformedToken",
            ErrorCode::SignatureInvalid => "SignatureInvalid",
            ErrorCode::TokenExpired => "TokenExpired",
            ErrorCode::UnsupportedAlgorithm => "UnsupportedAlgorithm",
            ErrorCode::SigningFailed => "SigningFailed",
            ErrorCode::FileReadError => "FileReadError",
            ErrorCode::FileWriteError => "FileWriteError",
            ErrorCode::DirectoryError => "DirectoryError",
            ErrorCode::ConfigError => "ConfigError",
            ErrorCode::DialogError => "DialogError",
            ErrorCode::UserCancelled => "UserCancelled",
            ErrorCode::ClipboardUnavailable => "ClipboardUnavailable",
            ErrorCode::InternalError => "InternalError",
            ErrorCode::SerializationError => "SerializationError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.code())
    }
}

/// Main error type for all jwt-forge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    // ==================== Key Errors (F1XX) ====================
    /// Key management error
    #[error("[{code}] Key error: {message}")]
    Key { code: ErrorCode, message: String },

    // ==================== Claim Errors (F2XX) ====================
    /// Claim validation error
    #[error("[{code}] Claims error: {message}")]
    Claims {
        code: ErrorCode,
        message: String,
        claim: Option<String>,
    },

    // ==================== Expiration Errors (F3XX) ====================
    /// Expiration error
    #[error("[{code}] Expiration error: {message}")]
    Expiration { code: ErrorCode, message: String },

    // ==================== Token Errors (F4XX) ====================
    /// Token encoding or verification error
    #[error("[{code}] Token error: {message}")]
    Token { code: ErrorCode, message: String },

    /// Token expired, with the moment it expired
    #[error("[{code}] Token has expired: expired {elapsed} ago")]
    Expired {
        code: ErrorCode,
        expired_at: i64,
        elapsed: String,
    },

    // ==================== File/IO Errors (F5XX) ====================
    /// File or IO error
    #[error("[{code}] {context}: {message}")]
    Io {
        code: ErrorCode,
        context: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // ==================== Configuration Errors (F6XX) ====================
    /// Configuration error
    #[error("[{code}] Configuration error: {message}")]
    Config {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<config::ConfigError>,
    },

    // ==================== UI Errors (F7XX) ====================
    /// UI/Dialog error
    #[error("[{code}] UI error: {message}")]
    Ui { code: ErrorCode, message: String },

    // ==================== Internal Errors (F9XX) ====================
    /// Internal/Unexpected error
    #[error("[{code}] Internal error: {message}")]
    Internal { code: ErrorCode, message: String },

    /// JSON serialization error
    #[error("[{code}] Serialization error: {message}")]
    Serialization {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

// ==================== Constructor Methods ====================

impl ForgeError {
    // --- Keys ---

    /// Create invalid key size error
    pub fn invalid_key_size(bits: u32) -> Self {
        Self::Key {
            code: ErrorCode::InvalidKeySize,
            message: format!("Key size must be 2048 or 3072 bits, got {}", bits),
        }
    }

    /// Create key not found error
    pub fn key_not_found(role: impl fmt::Display, path: impl fmt::Display) -> Self {
        Self::Key {
            code: ErrorCode::KeyNotFound,
            message: format!("{} key not found at: {}", role, path),
        }
    }

    /// Create key parse error
    pub fn key_parse(message: impl Into<String>) -> Self {
        Self::Key {
            code: ErrorCode::KeyParseError,
            message: message.into(),
        }
    }

    /// Create key generation error
    pub fn key_generation(message: impl Into<String>) -> Self {
        Self::Key {
            code: ErrorCode::KeyGenerationFailed,
            message: message.into(),
        }
    }

    // --- Claims ---

    /// Create invalid custom claims error
    pub fn invalid_claims_json(message: impl Into<String>) -> Self {
        Self::Claims {
            code: ErrorCode::InvalidClaimsJson,
            message: format!("Invalid JSON in custom claims: {}", message.into()),
            claim: None,
        }
    }

    /// Create reserved claim override error
    pub fn reserved_claim(claim: impl Into<String>) -> Self {
        let claim = claim.into();
        Self::Claims {
            code: ErrorCode::ReservedClaimOverride,
            message: format!("Cannot override standard JWT claim '{}'", claim),
            claim: Some(claim),
        }
    }

    /// Create empty claim value error
    pub fn empty_claim_value(claim: impl Into<String>) -> Self {
        Self::Claims {
            code: ErrorCode::ClaimValueEmpty,
            message: "Value cannot be empty".to_string(),
            claim: Some(claim.into()),
        }
    }

    // --- Expiration ---

    /// Create expiration out of range error
    pub fn expiration_out_of_range(message: impl Into<String>) -> Self {
        Self::Expiration {
            code: ErrorCode::ExpirationOutOfRange,
            message: message.into(),
        }
    }

    /// Create unparseable expiration error
    pub fn invalid_expiration(message: impl Into<String>) -> Self {
        Self::Expiration {
            code: ErrorCode::InvalidExpiration,
            message: message.into(),
        }
    }

    // --- Token ---

    /// Create malformed token error
    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::Token {
            code: ErrorCode::MalformedToken,
            message: format!("Malformed JWT token: {}", message.into()),
        }
    }

    /// Create invalid signature error
    pub fn signature_invalid() -> Self {
        Self::Token {
            code: ErrorCode::SignatureInvalid,
            message:
                "Invalid signature - token may be tampered with or signed with a different key"
                    .to_string(),
        }
    }

    /// Create unsupported algorithm error
    pub fn unsupported_algorithm(alg: impl fmt::Display) -> Self {
        Self::Token {
            code: ErrorCode::UnsupportedAlgorithm,
            message: format!("Unsupported algorithm '{}', only RS256 is accepted", alg),
        }
    }

    /// Create token expired error
    pub fn token_expired(expired_at: i64, elapsed: impl Into<String>) -> Self {
        Self::Expired {
            code: ErrorCode::TokenExpired,
            expired_at,
            elapsed: elapsed.into(),
        }
    }

    /// Create signing error
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Token {
            code: ErrorCode::SigningFailed,
            message: message.into(),
        }
    }

    // --- File/IO ---

    /// Create IO error from std::io::Error
    pub fn io_from_error(context: impl Into<String>, err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorCode::FileWriteError,
            std::io::ErrorKind::AlreadyExists => ErrorCode::DirectoryError,
            _ => ErrorCode::FileReadError,
        };

        Self::Io {
            code,
            context: context.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create file write error from std::io::Error
    pub fn write_failed(context: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            code: ErrorCode::FileWriteError,
            context: context.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    // --- Configuration ---

    /// Create configuration error with source
    pub fn config_from_error(err: config::ConfigError) -> Self {
        Self::Config {
            code: ErrorCode::ConfigError,
            message: err.to_string(),
            source: Some(err),
        }
    }

    // --- UI ---

    /// Create user cancelled error
    pub fn user_cancelled() -> Self {
        Self::Ui {
            code: ErrorCode::UserCancelled,
            message: "Operation cancelled by user".to_string(),
        }
    }

    /// Create clipboard error
    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Ui {
            code: ErrorCode::ClipboardUnavailable,
            message: message.into(),
        }
    }

    // --- Internal ---

    /// Create internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            message: message.into(),
        }
    }

    // --- Utility Methods ---

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Key { code, .. } => *code,
            Self::Claims { code, .. } => *code,
            Self::Expiration { code, .. } => *code,
            Self::Token { code, .. } => *code,
            Self::Expired { code, .. } => *code,
            Self::Io { code, .. } => *code,
            Self::Config { code, .. } => *code,
            Self::Ui { code, .. } => *code,
            Self::Internal { code, .. } => *code,
            Self::Serialization { code, .. } => *code,
        }
    }

    /// Check if this error came out of token verification
    pub fn is_verification_error(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::MalformedToken
                | ErrorCode::SignatureInvalid
                | ErrorCode::TokenExpired
                | ErrorCode::UnsupportedAlgorithm
        )
    }

    /// Errors that are reported but must not abort the command
    pub fn is_fatal(&self) -> bool {
        self.code() != ErrorCode::ClipboardUnavailable
    }
}

// ==================== From Implementations ====================

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        Self::io_from_error("IO operation", err)
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            code: ErrorCode::SerializationError,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<config::ConfigError> for ForgeError {
    fn from(err: config::ConfigError) -> Self {
        Self::config_from_error(err)
    }
}

impl From<dialoguer::Error> for ForgeError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                Self::user_cancelled()
            }
            other => Self::Ui {
                code: ErrorCode::DialogError,
                message: format!("Dialog error: {}", other),
            },
        }
    }
}
