//! RS256 compact JWT encoding and verification

use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::sha2::Sha256;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::claims::{numeric_date, Claims};
use crate::error::{ForgeError, Result};
use crate::expiration::format_duration;
use crate::utils::CryptoUtils;

/// The only algorithm this tool signs or accepts
pub const ALGORITHM: &str = "RS256";

/// Protected header written into every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
    pub typ: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// A token whose signature and expiry have been checked
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub header: Map<String, Value>,
    pub claims: Claims,
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Sign `claims` with the current time as the default `iat`
pub fn sign(claims: &Claims, private_key: &RsaPrivateKey) -> Result<String> {
    sign_at(claims, private_key, now())
}

pub fn sign_at(claims: &Claims, private_key: &RsaPrivateKey, now: i64) -> Result<String> {
    let mut claims = claims.clone();
    if !claims.contains("iat") {
        claims.set_issued_at(now);
    }

    let header = serde_json::to_vec(&Header::default())?;
    let payload = serde_json::to_vec(&claims)?;
    let signing_input = format!(
        "{}.{}",
        CryptoUtils::encode_base64url(&header),
        CryptoUtils::encode_base64url(&payload)
    );

    // PKCS#1 v1.5 is deterministic; the RNG only drives blinding
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key
        .try_sign_with_rng(&mut rand::thread_rng(), signing_input.as_bytes())
        .map_err(|e| ForgeError::signing(format!("RS256 signing failed: {}", e)))?;

    tracing::debug!("Signed token with {} claims", claims.len());

    Ok(format!(
        "{}.{}",
        signing_input,
        CryptoUtils::encode_base64url(&signature.to_bytes())
    ))
}

pub fn verify(token: &str, public_key: &RsaPublicKey) -> Result<VerifiedToken> {
    verify_at(token, public_key, now())
}

/// Decode and check a compact token
///
/// Checks run in a fixed order: structure, algorithm, signature, expiry. The
/// algorithm is checked before any signature work.
pub fn verify_at(token: &str, public_key: &RsaPublicKey, now: i64) -> Result<VerifiedToken> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    let [header_b64, payload_b64, signature_b64] = segments.as_slice() else {
        return Err(ForgeError::malformed_token(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    let header = decode_json_object(header_b64, "header")?;
    match header.get("alg").and_then(Value::as_str) {
        Some(ALGORITHM) => {}
        Some(other) => return Err(ForgeError::unsupported_algorithm(other)),
        None => return Err(ForgeError::unsupported_algorithm("(missing)")),
    }

    let payload = decode_json_object(payload_b64, "payload")?;

    if signature_b64.is_empty() {
        return Err(ForgeError::malformed_token("signature segment is empty"));
    }
    let signature_bytes = CryptoUtils::decode_base64url(signature_b64)?;
    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(|_| ForgeError::signature_invalid())?;

    let signing_input = format!("{}.{}", header_b64, payload_b64);
    VerifyingKey::<Sha256>::new(public_key.clone())
        .verify(signing_input.as_bytes(), &signature)
        .map_err(|_| ForgeError::signature_invalid())?;

    if let Some(exp) = payload.get("exp") {
        let exp = numeric_date(exp)
            .ok_or_else(|| ForgeError::malformed_token("'exp' claim is not a number"))?;
        if exp < now {
            return Err(ForgeError::token_expired(
                exp,
                format_duration(now.saturating_sub(exp)),
            ));
        }
    }

    tracing::debug!("Token verified");

    Ok(VerifiedToken {
        header,
        claims: Claims::from_map(payload),
    })
}

fn decode_json_object(segment: &str, name: &str) -> Result<Map<String, Value>> {
    let bytes = CryptoUtils::decode_base64url(segment)?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ForgeError::malformed_token(format!(
            "{} is not a JSON object",
            name
        ))),
        Err(e) => Err(ForgeError::malformed_token(format!(
            "{} is not valid JSON: {}",
            name, e
        ))),
    }
}
