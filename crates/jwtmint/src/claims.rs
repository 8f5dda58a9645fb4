//! Claims assembly for issued tokens
//!
//! Caller-supplied extension claims are inserted first and the reserved
//! claims (`iss`, `sub`, `exp`, `iat`, `nbf`, `alg`, `name`, `scope`) are
//! written on top, so a reserved value always wins on a name collision.

use crate::error::{Error, Result};
use miniserde::json::{self, Number, Object, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Claim names computed by the issuer
pub const RESERVED_CLAIMS: [&str; 8] = ["iss", "sub", "exp", "iat", "nbf", "alg", "name", "scope"];

/// Subject identifier, written to `sub` in string form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectId {
    Text(String),
    Integer(i128),
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Text(text) => f.write_str(text),
            SubjectId::Integer(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        SubjectId::Text(value.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        SubjectId::Text(value)
    }
}

impl From<i32> for SubjectId {
    fn from(value: i32) -> Self {
        SubjectId::Integer(value as i128)
    }
}

impl From<i64> for SubjectId {
    fn from(value: i64) -> Self {
        SubjectId::Integer(value as i128)
    }
}

impl From<u32> for SubjectId {
    fn from(value: u32) -> Self {
        SubjectId::Integer(value as i128)
    }
}

impl From<u64> for SubjectId {
    fn from(value: u64) -> Self {
        SubjectId::Integer(value as i128)
    }
}

impl From<usize> for SubjectId {
    fn from(value: usize) -> Self {
        SubjectId::Integer(value as i128)
    }
}

/// Value of a caller-supplied extension claim
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ClaimValue {
    fn to_json(&self, claim: &str) -> Result<Value> {
        Ok(match self {
            ClaimValue::Null => Value::Null,
            ClaimValue::Bool(b) => Value::Bool(*b),
            ClaimValue::Int(i) => int_value(*i),
            ClaimValue::Float(f) if f.is_finite() => Value::Number(Number::F64(*f)),
            ClaimValue::Float(f) => {
                return Err(Error::ClaimsSerialization(format!(
                    "claim '{claim}' holds non-finite number {f}"
                )));
            }
            ClaimValue::String(s) => Value::String(s.clone()),
        })
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::String(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::String(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Int(value)
    }
}

impl From<i32> for ClaimValue {
    fn from(value: i32) -> Self {
        ClaimValue::Int(value.into())
    }
}

impl From<f64> for ClaimValue {
    fn from(value: f64) -> Self {
        ClaimValue::Float(value)
    }
}

impl<T: Into<ClaimValue>> From<Option<T>> for ClaimValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ClaimValue::Null, Into::into)
    }
}

/// Extra claims merged into every token below the reserved claims
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionClaims(BTreeMap<String, ClaimValue>);

impl ExtensionClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ClaimValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<ClaimValue>> FromIterator<(K, V)> for ExtensionClaims {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Builder for the claims set of one token
#[derive(Debug, Clone)]
pub struct ClaimsBuilder {
    issuer: String,
    subject: SubjectId,
    name: Option<String>,
    scopes: Vec<String>,
    extensions: ExtensionClaims,
    algorithm: String,
    expires_in: u64,
}

impl ClaimsBuilder {
    pub fn new(issuer: impl Into<String>, subject: impl Into<SubjectId>) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
            name: None,
            scopes: Vec::new(),
            extensions: ExtensionClaims::new(),
            algorithm: String::new(),
            expires_in: 0,
        }
    }

    /// Display name; `None` is serialized as `null`
    pub fn name(mut self, name: Option<&str>) -> Self {
        self.name = name.map(str::to_string);
        self
    }

    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scopes = scopes.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn extensions(mut self, extensions: ExtensionClaims) -> Self {
        self.extensions = extensions;
        self
    }

    /// Configured algorithm name, recorded in the `alg` claim verbatim
    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Token lifetime in seconds
    pub fn expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = seconds;
        self
    }

    /// Build the claims set with `iat` and `nbf` set to `issued_at`
    pub fn build(self, issued_at: i64) -> Result<ClaimsSet> {
        let lifetime = i64::try_from(self.expires_in).map_err(|_| Error::TimestampOverflow)?;
        let expiration = issued_at
            .checked_add(lifetime)
            .ok_or(Error::TimestampOverflow)?;

        let mut object = Object::new();
        for (claim, value) in self.extensions.iter() {
            object.insert(claim.to_string(), value.to_json(claim)?);
        }

        let name = self.name.map_or(Value::Null, Value::String);
        let reserved = [
            ("iss", Value::String(self.issuer)),
            ("sub", Value::String(self.subject.to_string())),
            ("exp", int_value(expiration)),
            ("iat", int_value(issued_at)),
            ("nbf", int_value(issued_at)),
            ("alg", Value::String(self.algorithm)),
            ("name", name),
            ("scope", Value::String(self.scopes.join(" "))),
        ];
        for (claim, value) in reserved {
            object.insert(claim.to_string(), value);
        }

        Ok(ClaimsSet(object))
    }
}

fn int_value(value: i64) -> Value {
    match u64::try_from(value) {
        Ok(unsigned) => Value::Number(Number::U64(unsigned)),
        Err(_) => Value::Number(Number::I64(value)),
    }
}

/// Assembled claims of one token
///
/// Keys are kept sorted, so [`ClaimsSet::to_json`] is canonical: the same
/// claims always serialize to the same bytes.
#[derive(Debug, Clone)]
pub struct ClaimsSet(Object);

impl ClaimsSet {
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    pub fn contains(&self, claim: &str) -> bool {
        self.0.contains_key(claim)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.string(claim_names::ISSUER)
    }

    pub fn subject(&self) -> Option<&str> {
        self.string(claim_names::SUBJECT)
    }

    pub fn scope(&self) -> Option<&str> {
        self.string(claim_names::SCOPE)
    }

    pub fn expiration(&self) -> Option<i64> {
        self.integer(claim_names::EXPIRATION)
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.integer(claim_names::ISSUED_AT)
    }

    pub fn not_before(&self) -> Option<i64> {
        self.integer(claim_names::NOT_BEFORE)
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> String {
        json::to_string(&self.0)
    }

    fn string(&self, claim: &str) -> Option<&str> {
        match self.0.get(claim)? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn integer(&self, claim: &str) -> Option<i64> {
        match self.0.get(claim)? {
            Value::Number(Number::U64(n)) => i64::try_from(*n).ok(),
            Value::Number(Number::I64(n)) => Some(*n),
            _ => None,
        }
    }
}

mod claim_names {
    pub(super) const ISSUER: &str = "iss";
    pub(super) const SUBJECT: &str = "sub";
    pub(super) const SCOPE: &str = "scope";
    pub(super) const EXPIRATION: &str = "exp";
    pub(super) const ISSUED_AT: &str = "iat";
    pub(super) const NOT_BEFORE: &str = "nbf";
}

/// Get current Unix timestamp
pub(crate) fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
