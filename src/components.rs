use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::{serde_as, skip_serializing_none};

use thiserror::Error;

use crate::ScriptError;

/// Error returned by a caller-supplied cell transform.
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum BpuError {
    #[error("raw tx must be set")]
    MissingSource,

    #[error("BSV lib error: {0}")]
    Bsv(#[from] bsv::BSVErrors),

    #[error("failed to decode {kind} script {index}: {source}")]
    Script {
        kind: XPutKind,
        index: usize,
        #[source]
        source: ScriptError,
    },

    #[error("transform failed at chunk {chunk_index}: {source}")]
    Transform {
        chunk_index: usize,
        #[source]
        source: TransformError,
    },

    #[error("failed to derive address for input {index}: {source}")]
    Address {
        index: usize,
        #[source]
        source: bsv::BSVErrors,
    },

    #[error("invalid parse config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BpuError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XPutKind {
    Input,
    Output,
}

impl std::fmt::Display for XPutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XPutKind::Input => f.write_str("input"),
            XPutKind::Output => f.write_str("output"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Tx {
    /// txid
    pub h: String,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq)]
/// Block Info (height, timestamp), supplied by whoever found the tx in a block
pub struct Block {
    pub i: u32,
    pub t: u32,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Tape {
    pub cell: Vec<Cell>,
    pub i: usize,
}

impl Tape {
    pub fn new(i: usize) -> Self {
        Self { cell: vec![], i }
    }
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
/// One classified script chunk.
///
/// Data chunks carry `h`/`b`/`s`. Opcode chunks carry `op`/`ops`, and also the data
/// views when the opcode byte is a printable character. `lb`/`ls` are only ever
/// filled in by a transform.
pub struct Cell {
    pub h: Option<String>,
    #[serde_as(as = "Option<Base64>")]
    pub b: Option<Vec<u8>>,
    #[serde_as(as = "Option<Base64>")]
    pub lb: Option<Vec<u8>>,
    pub s: Option<String>,
    pub ls: Option<String>,
    pub i: usize,
    pub ii: usize,
    pub op: Option<u8>,
    pub ops: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
/// Economic metadata of an input or output.
pub struct SendRecv {
    /// address
    pub a: Option<String>,
    /// satoshis
    pub v: Option<u64>,
    /// output index (for inputs: the spent output's index)
    pub i: u32,
    /// spent txid, inputs only
    pub h: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
/// Transaction Input/Output Object
pub struct XPut {
    pub i: usize,
    pub tape: Vec<Tape>,
    pub e: SendRecv,
    pub seq: Option<u32>,
}

impl XPut {
    pub fn new(tx_index: usize) -> Self {
        Self {
            i: tx_index,
            ..Default::default()
        }
    }

    /// All cells of every tape, in chunk order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.tape.iter().flat_map(|t| t.cell.iter())
    }
}

#[derive(Debug, Default)]
/// Running position of the splitter inside one script.
pub struct IndexCounter {
    pub tape_index: usize,
    pub cell_index: usize,
    pub chunk_index: usize,
    pub prev_splitter: bool,
}
