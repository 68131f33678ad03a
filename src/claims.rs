//! Claim set assembly and the standard-claim protection rules

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ForgeError, Result};

/// Registered claims that only the tool itself may set
pub const RESERVED_CLAIMS: [&str; 7] = ["iss", "sub", "iat", "exp", "nbf", "jti", "aud"];

pub const DEFAULT_ISSUER: &str = "jwt-forge";
pub const DEFAULT_SUBJECT: &str = "user";

pub fn is_reserved_claim(name: &str) -> bool {
    RESERVED_CLAIMS.contains(&name)
}

/// Read a NumericDate claim; fractional seconds are truncated
pub fn numeric_date(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|seconds| seconds as i64))
}

/// JWT payload, kept in insertion order
///
/// The order produced by [`ClaimsBuilder`] is `iss`, `sub`, custom claims as
/// entered, then `iat` and `exp` once the token is stamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.0.get("iat").and_then(numeric_date)
    }

    pub fn expiration(&self) -> Option<i64> {
        self.0.get("exp").and_then(numeric_date)
    }

    /// Add a non-standard claim; standard names are refused and nothing changes
    pub fn insert_custom(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if is_reserved_claim(&name) {
            return Err(ForgeError::reserved_claim(name));
        }
        self.0.insert(name, value);
        Ok(())
    }

    /// Set `iat`; a new `iat` goes in front of an existing `exp`
    pub fn set_issued_at(&mut self, timestamp: i64) {
        if self.0.contains_key("iat") || !self.0.contains_key("exp") {
            self.0.insert("iat".to_string(), Value::from(timestamp));
            return;
        }

        let mut reordered = Map::with_capacity(self.0.len() + 1);
        for (name, value) in std::mem::take(&mut self.0) {
            if name == "exp" {
                reordered.insert("iat".to_string(), Value::from(timestamp));
            }
            reordered.insert(name, value);
        }
        self.0 = reordered;
    }

    pub fn set_expiration(&mut self, timestamp: i64) {
        self.0.insert("exp".to_string(), Value::from(timestamp));
    }

    fn set_standard(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Builds the claim set for a new token
#[derive(Debug, Default)]
pub struct ClaimsBuilder {
    issuer: Option<String>,
    subject: Option<String>,
    custom: Map<String, Value>,
}

impl ClaimsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty strings count as "not given" and fall back to the default
    pub fn issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer.filter(|s| !s.is_empty());
        self
    }

    pub fn subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject.filter(|s| !s.is_empty());
        self
    }

    /// Merge custom claims from a JSON object document
    ///
    /// Every key is checked before anything is merged, so a rejected document
    /// leaves the builder exactly as it was.
    pub fn custom_json(self, json: &str) -> Result<Self> {
        let parsed: Value =
            serde_json::from_str(json).map_err(|e| ForgeError::invalid_claims_json(e.to_string()))?;

        let Value::Object(object) = parsed else {
            return Err(ForgeError::invalid_claims_json(
                "expected a JSON object like {\"role\":\"admin\"}",
            ));
        };

        self.custom_claims(object)
    }

    /// Merge already-parsed custom claims (e.g. from interactive entry)
    pub fn custom_claims(mut self, claims: Map<String, Value>) -> Result<Self> {
        if let Some(reserved) = claims.keys().find(|k| is_reserved_claim(k)) {
            return Err(ForgeError::reserved_claim(reserved.clone()));
        }
        self.custom.extend(claims);
        Ok(self)
    }

    pub fn build(self) -> Claims {
        let mut claims = Claims::new();
        claims.set_standard("iss", self.issuer.unwrap_or_else(|| DEFAULT_ISSUER.to_string()));
        claims.set_standard("sub", self.subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string()));
        for (name, value) in self.custom {
            claims.0.insert(name, value);
        }
        claims
    }
}

/// Build claims from command-line style inputs
pub fn build_claims(
    issuer: Option<String>,
    subject: Option<String>,
    custom_json: Option<&str>,
) -> Result<Claims> {
    let mut builder = ClaimsBuilder::new().issuer(issuer).subject(subject);
    if let Some(json) = custom_json {
        builder = builder.custom_json(json)?;
    }
    Ok(builder.build())
}

/// Interpret an interactively entered value: JSON when it parses, plain string otherwise
pub fn parse_claim_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Where interactive claim entry currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    AwaitingKey,
    AwaitingValue(String),
    Finished,
}

/// Key/value claim entry driven one answer at a time
///
/// An empty key ends the session. Keys are validated as they are submitted,
/// so a standard claim name is rejected before a value is ever asked for.
#[derive(Debug)]
pub struct ClaimEntry {
    state: EntryState,
    claims: Map<String, Value>,
}

impl ClaimEntry {
    pub fn new() -> Self {
        Self {
            state: EntryState::AwaitingKey,
            claims: Map::new(),
        }
    }

    pub fn state(&self) -> &EntryState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == EntryState::Finished
    }

    pub fn submit_key(&mut self, key: &str) -> Result<&EntryState> {
        if self.state != EntryState::AwaitingKey {
            return Err(ForgeError::internal(format!(
                "claim key submitted while {:?}",
                self.state
            )));
        }

        let key = key.trim();
        if key.is_empty() {
            self.state = EntryState::Finished;
        } else if is_reserved_claim(key) {
            return Err(ForgeError::reserved_claim(key));
        } else {
            self.state = EntryState::AwaitingValue(key.to_string());
        }
        Ok(&self.state)
    }

    pub fn submit_value(&mut self, raw: &str) -> Result<()> {
        let EntryState::AwaitingValue(key) = &self.state else {
            return Err(ForgeError::internal(format!(
                "claim value submitted while {:?}",
                self.state
            )));
        };

        if raw.is_empty() {
            return Err(ForgeError::empty_claim_value(key.clone()));
        }

        self.claims.insert(key.clone(), parse_claim_value(raw));
        self.state = EntryState::AwaitingKey;
        Ok(())
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn into_claims(self) -> Map<String, Value> {
        self.claims
    }
}

impl Default for ClaimEntry {
    fn default() -> Self {
        Self::new()
    }
}
