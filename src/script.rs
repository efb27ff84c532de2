use std::borrow::Cow;

use bsv::{OpCodes, P2PKHAddress, PublicKey, Script, ScriptBit};
use thiserror::Error;

use crate::opcodes::is_unassigned;
use crate::InvalidOpcodePolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("script begins with invalid opcode: {0:#04x}")]
    InvalidLeadingOpcode(u8),
}

#[derive(Debug, Clone, PartialEq)]
/// A flattened script chunk: a bare opcode, or a push with its data.
pub enum Part {
    Op(OpCodes),
    /// `op` is the byte that pushed `data`: its length, or an OP_PUSHDATAn.
    Push { op: u8, data: Vec<u8> },
}

impl Part {
    /// A push of `data` using the smallest push opcode that fits.
    ///
    /// An empty push uses OP_PUSHDATA1 so that it is not mistaken for OP_0.
    pub fn push(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let op = match data.len() {
            len @ 1..=0x4b => len as u8,
            0 | 0x4c..=0xff => OpCodes::OP_PUSHDATA1 as u8,
            0x100..=0xffff => OpCodes::OP_PUSHDATA2 as u8,
            _ => OpCodes::OP_PUSHDATA4 as u8,
        };
        Part::Push { op, data }
    }

    /// The opcode byte: the opcode itself, or the push opcode for data.
    pub fn op_byte(&self) -> u8 {
        match self {
            Part::Op(code) => *code as u8,
            Part::Push { op, .. } => *op,
        }
    }

    pub fn is_push(&self) -> bool {
        matches!(self, Part::Push { .. })
    }

    /// The pushed data, or the opcode byte itself for a bare opcode.
    pub fn bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Part::Op(code) => Cow::Owned(vec![*code as u8]),
            Part::Push { data, .. } => Cow::Borrowed(data),
        }
    }
}

/// The parts of a decoded script, in script order.
pub fn script_parts(script: &Script) -> Vec<Part> {
    let mut parts = Vec::new();
    flatten_script_bits(script.iter(), &mut parts);
    parts
}

/// Unrolls `If` blocks into their OP_IF/OP_ELSE/OP_ENDIF opcodes and branch parts.
fn flatten_script_bits<'a>(
    bits: impl IntoIterator<Item = &'a ScriptBit>,
    parts: &mut Vec<Part>,
) {
    for bit in bits {
        match bit {
            ScriptBit::OpCode(code) => parts.push(Part::Op(*code)),
            ScriptBit::PushData(code, data) => parts.push(Part::Push {
                op: *code as u8,
                data: data.clone(),
            }),
            ScriptBit::If { code, pass, fail } => {
                parts.push(Part::Op(*code));
                flatten_script_bits(pass.iter(), parts);

                if let Some(fail) = fail {
                    parts.push(Part::Op(OpCodes::OP_ELSE));
                    flatten_script_bits(fail.iter(), parts);
                }
                parts.push(Part::Op(OpCodes::OP_ENDIF));
            }
            // direct pushes and coinbase data
            other => {
                if let Some(data) = other.inner() {
                    parts.push(Part::push(data));
                }
            }
        }
    }
}

pub fn check_leading_opcode(
    parts: &[Part],
    policy: InvalidOpcodePolicy,
) -> Result<(), ScriptError> {
    match (policy, parts.first()) {
        (InvalidOpcodePolicy::Reject, Some(Part::Op(code))) if is_unassigned(*code as u8) => {
            Err(ScriptError::InvalidLeadingOpcode(*code as u8))
        }
        _ => Ok(()),
    }
}

/// Derives the P2PKH address for a serialized public key.
pub fn address_from_pubkey(bytes: &[u8]) -> Result<String, bsv::BSVErrors> {
    PublicKey::from_bytes(bytes)?.to_p2pkh_address()?.to_string()
}

/// Addresses a locking script pays to. Unrecognized templates yield none.
pub fn script_addresses(parts: &[Part]) -> Vec<String> {
    let address = match parts {
        [
            Part::Op(OpCodes::OP_DUP),
            Part::Op(OpCodes::OP_HASH160),
            Part::Push { data: hash, .. },
            Part::Op(OpCodes::OP_EQUALVERIFY),
            Part::Op(OpCodes::OP_CHECKSIG),
        ] if hash.len() == 20 => {
            P2PKHAddress::from_pubkey_hash(hash).and_then(|a| a.to_string())
        }
        [Part::Push { data: key, .. }, Part::Op(OpCodes::OP_CHECKSIG)]
            if key.len() == 33 || key.len() == 65 =>
        {
            address_from_pubkey(key)
        }
        _ => return vec![],
    };

    address.into_iter().collect()
}
