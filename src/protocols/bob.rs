use bsv::OpCodes::OP_RETURN;

use crate::Cell;
use crate::Include;
use crate::ParseConfig;
use crate::Result;
use crate::SplitConfig;
use crate::Token;
use crate::TransformError;
use crate::BPU;

/// Pushes longer than this are moved to the `ls`/`lb` fields
pub const LONG_CELL_BYTES: usize = 512;

pub struct BOB;

impl BOB {
    /// OP_RETURN closes the leading tape, then every `|` after it starts a new one.
    pub fn split_config() -> Vec<SplitConfig> {
        vec![
            SplitConfig::new(Token::op(OP_RETURN)).include(Include::Left),
            SplitConfig::new(Token::s("|")).require(OP_RETURN),
        ]
    }

    pub fn parse_config() -> ParseConfig {
        ParseConfig::new(Self::split_config()).with_transform(promote_large_cells)
    }

    pub fn from_raw_tx(hex: &str) -> Result<BPU> {
        BPU::from_raw_tx(hex, &Self::parse_config())
    }
}

/// Moves oversized payloads into the long fields so that short-field indexes stay small.
pub fn promote_large_cells(
    mut cell: Cell,
    hex: &str,
) -> std::result::Result<Cell, TransformError> {
    if hex.len() / 2 > LONG_CELL_BYTES {
        cell.ls = cell.s.take();
        cell.lb = cell.b.take();
    }
    Ok(cell)
}
