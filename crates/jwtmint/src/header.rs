use crate::algorithm::AlgorithmType;
use miniserde::json::{self, Object, Value};

/// JWT header structure
///
/// Represents the JOSE header declaring the signing algorithm and key ID.
#[derive(Debug, Clone)]
pub(crate) struct TokenHeader {
    /// Algorithm used for signing
    pub algorithm: AlgorithmType,

    /// Key ID, emitted as `kid` when configured
    pub key_id: Option<String>,
}

impl TokenHeader {
    pub(crate) fn new(algorithm: AlgorithmType, key_id: Option<String>) -> Self {
        Self { algorithm, key_id }
    }

    pub(crate) fn to_json(&self) -> String {
        let mut object = Object::new();
        object.insert("alg".into(), Value::String(self.algorithm.as_str().into()));
        if let Some(kid) = &self.key_id {
            object.insert("kid".into(), Value::String(kid.clone()));
        }
        object.insert("typ".into(), Value::String("JWT".into()));
        json::to_string(&object)
    }
}
