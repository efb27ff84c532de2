use std::borrow::Cow;

use crate::opcodes::{alias_byte, is_printable};
use crate::{Cell, Include, Part, SplitConfig};

#[derive(Debug, Clone, PartialEq)]
/// A script part with its opcode identity and data views worked out.
pub struct Classified<'a> {
    pub part: &'a Part,
    /// Byte and mnemonic, set for bare opcodes
    pub op: Option<(u8, String)>,
    /// `bytes` as a lossy UTF-8 string, set unless the part is a non-printable opcode
    pub s: Option<String>,
    /// hex of the part bytes, always set since it is also handed to the transform
    pub hex: String,
}

impl<'a> Classified<'a> {
    pub fn bytes(&self) -> Cow<'a, [u8]> {
        self.part.bytes()
    }

    /// Whether the hex/base64/string views belong on the cell.
    pub fn has_data_views(&self) -> bool {
        self.s.is_some()
    }

    pub fn to_cell(&self, cell_index: usize, chunk_index: usize) -> Cell {
        let mut cell = Cell {
            i: cell_index,
            ii: chunk_index,
            ..Default::default()
        };
        if let Some((op, name)) = &self.op {
            cell.op = Some(*op);
            cell.ops = Some(name.clone());
        }
        if self.has_data_views() {
            cell.h = Some(self.hex.clone());
            cell.b = Some(self.bytes().into_owned());
            cell.s = self.s.clone();
        }
        cell
    }
}

pub fn classify(part: &Part) -> Classified<'_> {
    let op = match part {
        Part::Op(code) => Some((*code as u8, code.to_string())),
        Part::Push { .. } => None,
    };
    let printable = match &op {
        Some((op, _)) => is_printable(*op),
        None => true,
    };
    let bytes = part.bytes();

    Classified {
        part,
        op,
        s: printable.then(|| String::from_utf8_lossy(&bytes).into_owned()),
        hex: hex::encode(&bytes),
    }
}

fn token_matches(setting: &SplitConfig, part: &Classified) -> bool {
    let token = &setting.token;
    match &part.op {
        Some((op, name)) => {
            token.op == Some(*op)
                || token
                    .ops
                    .as_deref()
                    .is_some_and(|ops| ops == name || alias_byte(ops) == Some(*op))
                // a literal separator that happens to be an opcode byte
                || token
                    .s
                    .as_deref()
                    .is_some_and(|s| s.as_bytes() == [*op].as_slice())
        }
        None => {
            let bytes = part.bytes();
            token.s.as_deref().is_some_and(|s| s.as_bytes() == &*bytes)
                || token.b.as_deref().is_some_and(|b| b == &*bytes)
        }
    }
}

/// Finds the split rule `part` matches, if any.
///
/// `require_met[i]` tells whether rule `i`'s precondition holds at this chunk. When
/// several rules match, the last one wins. Returns `Some(include)` for a delimiter.
pub fn match_rules(
    part: &Classified,
    settings: &[SplitConfig],
    require_met: &[bool],
) -> Option<Option<Include>> {
    let mut splitter = None;
    for (setting, met) in settings.iter().zip(require_met) {
        if *met && token_matches(setting, part) {
            splitter = Some(setting.include);
        }
    }
    splitter
}
