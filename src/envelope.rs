//! L6 — the three typed JSON bundles: `Input`, `Params`, `Secret` (spec
//! §3, §6.2). Serialization is JSON; integers are decimal numbers, byte
//! strings are uppercase hex. `Input` and `Params` reject unknown fields;
//! `Secret` is deliberately lenient (spec §9's open question — preserved,
//! not "fixed", per `SPEC_FULL.md`).

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyVaultError, Result};

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode_upper(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_hex_bytes(s: &str) -> Result<Vec<u8>> {
    if s.is_empty() || s.len() % 2 != 0 {
        return Err(FuzzyVaultError::input_shape(
            "hex string must have an even, non-zero length",
        ));
    }
    hex::decode(s).map_err(|e| FuzzyVaultError::input_shape(format!("malformed hex: {e}")))
}

/// `{setSize, correctThreshold, corpusSize, randomBytes?}` (spec §3, §6.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Input {
    #[serde(rename = "setSize")]
    pub set_size: u32,
    #[serde(rename = "correctThreshold")]
    pub correct_threshold: u32,
    #[serde(rename = "corpusSize")]
    pub corpus_size: u32,
    #[serde(rename = "randomBytes", default, skip_serializing_if = "Option::is_none")]
    pub random_bytes: Option<Vec<String>>,
}

impl Input {
    /// Concatenates the `randomBytes` hex strings into one byte buffer, if
    /// present.
    pub fn random_bytes(&self) -> Result<Option<Vec<u8>>> {
        match &self.random_bytes {
            None => Ok(None),
            Some(parts) => {
                let mut out = Vec::new();
                for part in parts {
                    out.extend(parse_hex_bytes(part)?);
                }
                Ok(Some(out))
            }
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| FuzzyVaultError::input_shape(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| FuzzyVaultError::input_shape(e.to_string()))
    }
}

/// `{setSize, correctThreshold, corpusSize, prime, extractor, salt}`
/// (spec §3, §6.2). A pure function of `Input` and the supplied
/// randomness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    #[serde(rename = "setSize")]
    pub set_size: u32,
    #[serde(rename = "correctThreshold")]
    pub correct_threshold: u32,
    #[serde(rename = "corpusSize")]
    pub corpus_size: u32,
    pub prime: u32,
    pub extractor: Vec<u32>,
    #[serde(with = "hex_bytes")]
    pub salt: Vec<u8>,
}

impl Params {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| FuzzyVaultError::input_shape(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| FuzzyVaultError::input_shape(e.to_string()))
    }
}

/// `Params` plus `{sketch, hash}` (spec §3, §6.2). Safe to publish: does
/// not reveal the original words. Unlike `Input`/`Params`, unknown fields
/// are ignored and missing fields default to zero/empty rather than
/// erroring, mirroring the original implementation's lenient parser.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Secret {
    #[serde(rename = "setSize", default)]
    pub set_size: u32,
    #[serde(rename = "correctThreshold", default)]
    pub correct_threshold: u32,
    #[serde(rename = "corpusSize", default)]
    pub corpus_size: u32,
    #[serde(default)]
    pub prime: u32,
    #[serde(default)]
    pub extractor: Vec<u32>,
    #[serde(with = "hex_bytes", default)]
    pub salt: Vec<u8>,
    #[serde(default)]
    pub sketch: Vec<u32>,
    #[serde(with = "hex_bytes", default)]
    pub hash: Vec<u8>,
}

impl Secret {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| FuzzyVaultError::input_shape(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| FuzzyVaultError::input_shape(e.to_string()))
    }
}

/// Parses a JSON array of integers (the wire format for word lists,
/// spec §6.1).
pub fn parse_words(s: &str) -> Result<Vec<i64>> {
    serde_json::from_str(s).map_err(|e| FuzzyVaultError::input_shape(e.to_string()))
}

pub fn words_to_json(words: &[i64]) -> Result<String> {
    serde_json::to_string(words).map_err(|e| FuzzyVaultError::input_shape(e.to_string()))
}

/// Renders a list of keys as the JSON array of uppercase hex strings
/// (spec §6.1): `[]` when empty.
pub fn keys_to_json(keys: &[[u8; 64]]) -> Result<String> {
    let hex_keys: Vec<String> = keys.iter().map(|k| hex::encode_upper(k)).collect();
    serde_json::to_string_pretty(&hex_keys).map_err(|e| FuzzyVaultError::input_shape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_round_trips() {
        let json = r#"{"setSize":9,"correctThreshold":6,"corpusSize":7776}"#;
        let input = Input::from_json(json).unwrap();
        assert_eq!(input.set_size, 9);
        assert!(input.random_bytes().unwrap().is_none());
    }

    #[test]
    fn input_rejects_unknown_fields() {
        let json = r#"{"setSize":9,"correctThreshold":6,"corpusSize":7776,"bogus":1}"#;
        assert!(Input::from_json(json).is_err());
    }

    #[test]
    fn input_rejects_missing_fields() {
        let json = r#"{"setSize":9,"correctThreshold":6}"#;
        assert!(Input::from_json(json).is_err());
    }

    #[test]
    fn input_parses_random_bytes_array() {
        let json = r#"{"setSize":9,"correctThreshold":6,"corpusSize":7776,"randomBytes":["DEAD","BEEF"]}"#;
        let input = Input::from_json(json).unwrap();
        assert_eq!(input.random_bytes().unwrap().unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn secret_ignores_unknown_fields() {
        let json = r#"{"setSize":9,"bogus":"ignored"}"#;
        let secret = Secret::from_json(json).unwrap();
        assert_eq!(secret.set_size, 9);
        assert_eq!(secret.correct_threshold, 0);
    }

    #[test]
    fn params_rejects_unknown_fields() {
        let json = r#"{"setSize":9,"correctThreshold":6,"corpusSize":7776,"prime":7789,"extractor":[1,2,3],"salt":"AA","extra":1}"#;
        assert!(Params::from_json(json).is_err());
    }
}
