use std::sync::Arc;

use bsv::{OpCodes, Transaction};
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::{serde_as, skip_serializing_none};

use crate::{Cell, Result, TransformError};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
/// - With `Include::Left`, the delimiter closes the current tape as its last cell
/// - With `Include::Right`, the delimiter gets a single-cell tape of its own after the current one
/// - With `Include::Center`, the current tape is sealed and the delimiter is dropped
pub enum Include {
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "c")]
    Center,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
/// The Cell we want to split on (w/o index)
pub struct Token {
    pub op: Option<u8>,
    pub ops: Option<String>,
    #[serde_as(as = "Option<Base64>")]
    pub b: Option<Vec<u8>>,
    pub s: Option<String>,
}

impl Token {
    pub fn op(code: OpCodes) -> Self {
        Self {
            op: Some(code as u8),
            ..Default::default()
        }
    }

    pub fn ops(name: impl Into<String>) -> Self {
        Self {
            ops: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn s(s: impl Into<String>) -> Self {
        Self {
            s: Some(s.into()),
            ..Default::default()
        }
    }

    pub fn b(b: impl Into<Vec<u8>>) -> Self {
        Self {
            b: Some(b.into()),
            ..Default::default()
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    /// The tokens we wish to split off from the main sequence of parts
    pub token: Token,
    /// How the delimiter is kept. `None` drops it.
    pub include: Option<Include>,
    /// Only split once this opcode has been seen earlier in the script
    pub require: Option<u8>,
}

impl SplitConfig {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            include: None,
            require: None,
        }
    }

    pub fn include(mut self, include: Include) -> Self {
        self.include = Some(include);
        self
    }

    pub fn require(mut self, code: OpCodes) -> Self {
        self.require = Some(code as u8);
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Evaluate every part regardless of quantity
    #[default]
    Deep,
    /// Only evaluate the first and last 128 parts of scripts with more than 255
    Shallow,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// What to do with a script whose first part is an unassigned opcode byte
pub enum InvalidOpcodePolicy {
    #[default]
    Allow,
    Reject,
}

/// Rewrites a retained cell. Receives the cell and the hex of the chunk's bytes.
pub type Transform =
    Arc<dyn Fn(Cell, &str) -> std::result::Result<Cell, TransformError> + Send + Sync>;

#[derive(Default)]
pub struct ParseConfig {
    pub tx: Option<Transaction>,
    pub raw_tx: Option<String>,
    pub split: Vec<SplitConfig>,
    pub transform: Option<Transform>,
    pub mode: Mode,
    pub invalid_opcode: InvalidOpcodePolicy,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParseConfigFile {
    raw_tx: Option<String>,
    #[serde(default)]
    split: Vec<SplitConfig>,
    #[serde(default)]
    mode: Mode,
    #[serde(default)]
    invalid_opcode: InvalidOpcodePolicy,
}

impl ParseConfig {
    pub fn new(split: Vec<SplitConfig>) -> Self {
        Self {
            split,
            ..Default::default()
        }
    }

    /// Reads `{ "rawTx", "split", "mode", "invalidOpcode" }`, all optional.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ParseConfigFile = serde_json::from_str(json)?;
        Ok(Self {
            raw_tx: file.raw_tx,
            split: file.split,
            mode: file.mode,
            invalid_opcode: file.invalid_opcode,
            ..Default::default()
        })
    }

    pub fn with_raw_tx(mut self, raw_tx: impl Into<String>) -> Self {
        self.raw_tx = Some(raw_tx.into());
        self
    }

    pub fn with_tx(mut self, tx: Transaction) -> Self {
        self.tx = Some(tx);
        self
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Cell, &str) -> std::result::Result<Cell, TransformError> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_invalid_opcode(mut self, policy: InvalidOpcodePolicy) -> Self {
        self.invalid_opcode = policy;
        self
    }
}

impl std::fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseConfig")
            .field("tx", &self.tx.is_some())
            .field("raw_tx", &self.raw_tx)
            .field("split", &self.split)
            .field("transform", &self.transform.is_some())
            .field("mode", &self.mode)
            .field("invalid_opcode", &self.invalid_opcode)
            .finish()
    }
}
