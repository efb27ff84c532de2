use crate::components::*;
use crate::script::{address_from_pubkey, check_leading_opcode, script_addresses, script_parts};
use crate::split::{split_parts, truncate};
use crate::{ParseConfig, Part};
use bsv::{Script, Transaction, TxIn, TxOut};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::debug;

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
/// Bitcoin Processing Unit
pub struct BPU {
    pub r#in: Vec<XPut>,
    pub r#out: Vec<XPut>,
    pub tx: Tx,
    pub blk: Option<Block>,
    pub lock: u32,
}

impl std::fmt::Display for BPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

impl BPU {
    /// Parses the transaction named by `config`, preferring an already decoded `tx`
    /// over `raw_tx`.
    pub fn parse(config: ParseConfig) -> Result<BPU> {
        if let Some(tx) = &config.tx {
            return Self::collect(tx, &config);
        }

        match config.raw_tx.as_deref() {
            Some(raw_tx) if !raw_tx.is_empty() => Self::from_raw_tx(raw_tx, &config),
            _ => Err(BpuError::MissingSource),
        }
    }

    pub fn from_raw_tx(raw_tx: &str, parse_config: &ParseConfig) -> Result<BPU> {
        let gene = Transaction::from_hex(raw_tx)?;
        Self::collect(&gene, parse_config)
    }

    /// Splits every input and output script and attaches their economic metadata
    pub fn collect(tx: &Transaction, parse_config: &ParseConfig) -> Result<BPU> {
        let txid = tx.get_id_hex()?;

        let inputs: Vec<TxIn> = (0..tx.get_ninputs())
            .filter_map(|e| tx.get_input(e))
            .collect();

        let outputs: Vec<TxOut> = (0..tx.get_noutputs())
            .filter_map(|e| tx.get_output(e))
            .collect();

        debug!(
            %txid,
            inputs = inputs.len(),
            outputs = outputs.len(),
            mode = ?parse_config.mode,
            "collecting tx"
        );

        let mut results = BPU {
            tx: Tx { h: txid },
            lock: tx.get_n_locktime(),
            ..Default::default()
        };

        for (i, input) in inputs.iter().enumerate() {
            let script = input.get_unlocking_script();
            let parts = Self::decode(&script, XPutKind::Input, i, parse_config)?;

            let mut limb = Self::limb(i, &parts, parse_config)?;
            limb.e = SendRecv {
                a: input_address(&parts)
                    .map_err(|source| BpuError::Address { index: i, source })?,
                v: input.get_satoshis(),
                i: input.get_vout(),
                h: Some(input.get_prev_tx_id_hex(None)),
            };
            limb.seq = Some(input.get_sequence());

            results.r#in.push(limb);
        }

        for (i, output) in outputs.iter().enumerate() {
            let script = output.get_script_pub_key();
            let parts = Self::decode(&script, XPutKind::Output, i, parse_config)?;

            let mut limb = Self::limb(i, &parts, parse_config)?;
            limb.e = SendRecv {
                a: script_addresses(&parts).into_iter().next(),
                v: Some(output.get_satoshis()),
                i: i as u32,
                h: None,
            };

            results.r#out.push(limb);
        }

        Ok(results)
    }

    /// Attaches the block the transaction was mined in
    pub fn with_block(mut self, i: u32, t: u32) -> Self {
        self.blk = Some(Block { i, t });
        self
    }

    /// Flattens a script and applies the leading opcode policy.
    fn decode(
        script: &Script,
        kind: XPutKind,
        index: usize,
        parse_config: &ParseConfig,
    ) -> Result<Vec<Part>> {
        let parts = script_parts(script);
        check_leading_opcode(&parts, parse_config.invalid_opcode).map_err(|source| {
            BpuError::Script {
                kind,
                index,
                source,
            }
        })?;
        Ok(parts)
    }

    /// Builds the tapes of one input or output
    fn limb(index: usize, parts: &[Part], parse_config: &ParseConfig) -> Result<XPut> {
        let window = truncate(parts, parse_config.mode);

        let mut limb = XPut::new(index);
        limb.tape = split_parts(
            &window,
            &parse_config.split,
            parse_config.transform.as_ref(),
        )?;
        Ok(limb)
    }
}

/// Address of the key revealed by a `<sig> <pubkey>` style unlocking script.
///
/// Only scripts of exactly two parts, or longer ones whose second part is 33 bytes,
/// are treated as carrying a public key. Anything else has no address.
fn input_address(parts: &[Part]) -> std::result::Result<Option<String>, bsv::BSVErrors> {
    match parts {
        [_, key] => address_from_pubkey(&key.bytes()).map(Some),
        [_, key, ..] if key.bytes().len() == 33 => address_from_pubkey(&key.bytes()).map(Some),
        _ => Ok(None),
    }
}
