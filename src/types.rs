// src/types.rs
use crate::miner::nonce;
use crate::utils::error::MinerError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candidate block as exchanged with the node
///
/// Field order matches the canonical (lexicographically sorted) JSON
/// encoding, so `serde_json` output is the exact byte string that gets
/// hashed. Only `nonce` is touched by the miner; everything else is echoed
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    /// Protocol discriminator (the node's own target field)
    #[serde(rename = "T")]
    pub t: String,
    /// Creation timestamp, kept as the exact number the node sent
    pub created: serde_json::Number,
    /// Miner identity
    pub miner: String,
    /// 64 lower-case hex characters: fixed prefix + counter suffix
    pub nonce: String,
    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Predecessor block id; must be present, may be null
    #[serde(deserialize_with = "Option::deserialize")]
    pub previd: Option<String>,
    /// Author identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studentids: Option<Vec<String>>,
    /// Transaction ids
    pub txids: Vec<String>,
    /// Object type
    #[serde(rename = "type")]
    pub kind: String,
}

impl Block {
    /// Decodes one wire message into a block template
    ///
    /// # Errors
    /// Returns `MinerError::DecodeError` if the bytes are not a block object,
    /// carry unknown or missing fields, or the nonce is not 64 lower-case
    /// hex characters.
    pub fn decode(bytes: &[u8]) -> Result<Self, MinerError> {
        let block: Block = serde_json::from_slice(bytes)
            .map_err(|e| MinerError::DecodeError(format!("Invalid block template: {}", e)))?;
        nonce::split(&block.nonce)?;
        Ok(block)
    }

    /// Canonical byte encoding used both for hashing and for submission
    pub fn encode(&self) -> Result<Vec<u8>, MinerError> {
        serde_json::to_vec(self)
            .map_err(|e| MinerError::InputError(format!("Failed to encode block: {}", e)))
    }

    /// The chain's genesis block
    ///
    /// Its encoding hashes to
    /// `0000000052a0e645eca917ae1c196e0d0a4fb756747f29ef52594d68484bb5e2`.
    /// Used as the synthetic template for benchmarks.
    pub fn genesis() -> Self {
        Block {
            t: "00000000abc00000000000000000000000000000000000000000000000000000".into(),
            created: 1671062400u64.into(),
            miner: "Marabu".into(),
            nonce: "000000000000000000000000000000000000000000000000000000021bea03ed".into(),
            note: Some(
                "The New York Times 2022-12-13: Scientists Achieve Nuclear Fusion \
                 Breakthrough With Blast of 192 Lasers"
                    .into(),
            ),
            previd: None,
            studentids: None,
            txids: Vec::new(),
            kind: "block".into(),
        }
    }
}

/// What a Miner does after submitting a solution
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolvePolicy {
    /// Keep searching the same template and submit every further hit
    #[value(name = "continue")]
    Continue,

    /// Stop hashing until the node sends a new template
    #[default]
    #[value(name = "await-template")]
    AwaitTemplate,
}

impl fmt::Display for SolvePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolvePolicy::Continue => write!(f, "continue"),
            SolvePolicy::AwaitTemplate => write!(f, "await-template"),
        }
    }
}

impl FromStr for SolvePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continue" => Ok(SolvePolicy::Continue),
            "await-template" | "await" => Ok(SolvePolicy::AwaitTemplate),
            _ => Err(format!("Unknown solve policy: {}", s)),
        }
    }
}

/// How the Listener treats a message that does not decode
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodePolicy {
    /// Log and drop the message, keep mining the previous template
    #[default]
    #[value(name = "skip")]
    Skip,

    /// End the worker pair
    #[value(name = "fatal")]
    Fatal,
}

impl fmt::Display for DecodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodePolicy::Skip => write!(f, "skip"),
            DecodePolicy::Fatal => write!(f, "fatal"),
        }
    }
}

impl FromStr for DecodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(DecodePolicy::Skip),
            "fatal" => Ok(DecodePolicy::Fatal),
            _ => Err(format!("Unknown decode policy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"{"T":"00000000abc00000000000000000000000000000000000000000000000000000","created":1671148801,"miner":"DEFINITELY_HONEST","nonce":"0000000000000000000000000000000000000000000000000000000000000000","note":"Our first block!","previd":"0000000052a0e645eca917ae1c196e0d0a4fb756747f29ef52594d68484bb5e2","studentids":["alice","bob"],"txids":["8265faf623dfbcb17528fcd2e67fdf78de791ed4c7c60480e8cd21c6cdc8bcd4"],"type":"block"}"#;

    #[test]
    fn test_decode_then_encode_is_byte_identical() {
        let block = Block::decode(TEMPLATE.as_bytes()).unwrap();
        assert_eq!(block.miner, "DEFINITELY_HONEST");
        assert_eq!(block.studentids.as_deref().map(|s| s.len()), Some(2));
        assert_eq!(block.encode().unwrap(), TEMPLATE.as_bytes());
    }

    #[test]
    fn test_null_previd_is_echoed_as_null() {
        let encoded = String::from_utf8(Block::genesis().encode().unwrap()).unwrap();
        assert!(encoded.contains(r#""previd":null"#));
        assert!(!encoded.contains("studentids"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let with_extra = TEMPLATE.replacen(r#""miner""#, r#""height":7,"miner""#, 1);
        assert!(matches!(
            Block::decode(with_extra.as_bytes()),
            Err(MinerError::DecodeError(_))
        ));
    }

    #[test]
    fn test_missing_previd_is_rejected() {
        let without = TEMPLATE.replacen(
            r#""previd":"0000000052a0e645eca917ae1c196e0d0a4fb756747f29ef52594d68484bb5e2","#,
            "",
            1,
        );
        assert!(matches!(
            Block::decode(without.as_bytes()),
            Err(MinerError::DecodeError(_))
        ));
    }

    #[test]
    fn test_malformed_nonce_is_rejected() {
        let short = TEMPLATE.replacen(
            "0000000000000000000000000000000000000000000000000000000000000000",
            "00ff",
            1,
        );
        assert!(matches!(
            Block::decode(short.as_bytes()),
            Err(MinerError::DecodeError(_))
        ));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("continue".parse::<SolvePolicy>(), Ok(SolvePolicy::Continue));
        assert_eq!(
            "Await-Template".parse::<SolvePolicy>(),
            Ok(SolvePolicy::AwaitTemplate)
        );
        assert_eq!("fatal".parse::<DecodePolicy>(), Ok(DecodePolicy::Fatal));
        assert!("sometimes".parse::<DecodePolicy>().is_err());
        assert_eq!(SolvePolicy::default().to_string(), "await-template");
    }
}
