use std::borrow::Cow;

use tracing::{debug, trace};

use crate::classify::{classify, match_rules, Classified};
use crate::{
    BpuError, Cell, Include, IndexCounter, Mode, Part, Result, SplitConfig, Tape, Transform,
};

/// Scripts with more parts than this are truncated in shallow mode
pub const SHALLOW_MAX_PARTS: usize = 255;
/// Parts kept from each end of a truncated script
pub const SHALLOW_WINDOW: usize = 128;

/// Applies the truncation policy of `mode`.
///
/// Shallow mode keeps the head and tail of oversized scripts, which is where address
/// templates and protocol prefixes live. Chunk indices downstream refer to the
/// truncated sequence.
pub fn truncate(parts: &[Part], mode: Mode) -> Cow<'_, [Part]> {
    if mode != Mode::Shallow || parts.len() <= SHALLOW_MAX_PARTS {
        return Cow::Borrowed(parts);
    }

    debug!(
        parts = parts.len(),
        kept = 2 * SHALLOW_WINDOW,
        "truncating script in shallow mode"
    );
    let mut window = parts[..SHALLOW_WINDOW].to_vec();
    window.extend_from_slice(&parts[parts.len() - SHALLOW_WINDOW..]);
    Cow::Owned(window)
}

pub fn maybe_transform(
    cell: Cell,
    hex: &str,
    chunk_index: usize,
    transform: Option<&Transform>,
) -> Result<Cell> {
    match transform {
        Some(f) => f(cell, hex).map_err(|source| BpuError::Transform {
            chunk_index,
            source,
        }),
        None => Ok(cell),
    }
}

/// Splits the parts of one script into tapes.
///
/// All state lives in this call; nothing carries over between scripts.
pub fn split_parts(
    parts: &[Part],
    settings: &[SplitConfig],
    transform: Option<&Transform>,
) -> Result<Vec<Tape>> {
    let mut tapes: Vec<Tape> = vec![];
    let mut counter = IndexCounter::default();
    // single-byte parts seen so far, for `require`
    let mut seen = [false; 256];
    let mut require_met = vec![false; settings.len()];

    for (chunk_index, part) in parts.iter().enumerate() {
        counter.chunk_index = chunk_index;

        for (met, setting) in require_met.iter_mut().zip(settings) {
            *met = setting.require.map_or(true, |op| seen[op as usize]);
        }

        if counter.prev_splitter {
            counter.cell_index = 0;
            // consecutive splitters must not skip a tape index
            if tapes.len() > counter.tape_index {
                counter.tape_index += 1;
            }
        }

        let is_splitter = extract_cell(
            &mut tapes,
            &mut counter,
            &classify(part),
            settings,
            &require_met,
            transform,
        )?;
        counter.prev_splitter = is_splitter;

        if let [byte] = &*part.bytes() {
            seen[*byte as usize] = true;
        }
    }

    Ok(tapes)
}

/// The tape at `tape_index`, created empty if the script has not reached it yet.
///
/// `tapes.len()` is always `tape_index` or `tape_index + 1`, so this is the last tape.
fn current_tape(tapes: &mut Vec<Tape>, tape_index: usize) -> &mut Tape {
    if tapes.len() == tape_index {
        tapes.push(Tape::new(tape_index));
    }
    &mut tapes[tape_index]
}

/// Places one classified chunk. Returns whether it was a splitter.
fn extract_cell(
    tapes: &mut Vec<Tape>,
    counter: &mut IndexCounter,
    chunk: &Classified,
    settings: &[SplitConfig],
    require_met: &[bool],
    transform: Option<&Transform>,
) -> Result<bool> {
    let Some(splitter) = match_rules(chunk, settings, require_met) else {
        let item = maybe_transform(
            chunk.to_cell(counter.cell_index, counter.chunk_index),
            &chunk.hex,
            counter.chunk_index,
            transform,
        )?;
        current_tape(tapes, counter.tape_index).cell.push(item);
        counter.cell_index += 1;
        return Ok(false);
    };

    trace!(
        chunk_index = counter.chunk_index,
        tape_index = counter.tape_index,
        ?splitter,
        "splitter"
    );

    match splitter {
        None => {
            counter.cell_index = 0;
        }
        Some(Include::Left) => {
            // closes whichever tape was filled last
            let last = tapes.len().saturating_sub(1);
            let tape = current_tape(tapes, last);
            let item = maybe_transform(
                chunk.to_cell(tape.cell.len(), counter.chunk_index),
                &chunk.hex,
                counter.chunk_index,
                transform,
            )?;
            tape.cell.push(item);
            counter.cell_index = 0;
        }
        Some(Include::Center) => {
            current_tape(tapes, counter.tape_index);
            counter.cell_index = 1;
        }
        Some(Include::Right) => {
            current_tape(tapes, counter.tape_index);
            let item = maybe_transform(
                chunk.to_cell(0, counter.chunk_index),
                &chunk.hex,
                counter.chunk_index,
                transform,
            )?;
            counter.tape_index += 1;
            tapes.push(Tape {
                cell: vec![item],
                i: counter.tape_index,
            });
            counter.cell_index = 0;
        }
    }

    Ok(true)
}
