//! Opcode byte helpers on top of `bsv::OpCodes`.
//!
//! Mnemonics come from the `OpCodes` Display impl. The alias table covers the names
//! that share a byte with the mnemonic `OpCodes` prints, so split rules may use
//! either spelling.

/// Alternate mnemonics, resolved to their opcode byte.
const ALIASES: [(&str, u8); 8] = [
    ("OP_FALSE", 0x00),
    ("OP_0", 0x00),
    ("OP_TRUE", 0x51),
    ("OP_1", 0x51),
    ("OP_NOP2", 0xb1),
    ("OP_CHECKLOCKTIMEVERIFY", 0xb1),
    ("OP_NOP3", 0xb2),
    ("OP_CHECKSEQUENCEVERIFY", 0xb2),
];

/// Resolves an alternate mnemonic to its opcode byte.
pub fn alias_byte(name: &str) -> Option<u8> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, op)| *op)
}

/// Bytes with no assigned meaning in the opcode set.
pub fn is_unassigned(op: u8) -> bool {
    matches!(op, 0xba..=0xf9 | 0xfc | 0xff)
}

/// Whether `op`, read as a Unicode code point, is a printable character.
///
/// Graphic characters plus the ASCII space: everything in Latin-1 except the C0/C1
/// controls, DEL, the no-break space and the soft hyphen.
pub fn is_printable(op: u8) -> bool {
    matches!(op, 0x20..=0x7e | 0xa1..=0xac | 0xae..=0xff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsv::OpCodes;

    #[test]
    fn test_aliases() {
        assert_eq!(alias_byte("OP_FALSE"), Some(OpCodes::OP_0 as u8));
        assert_eq!(alias_byte("OP_TRUE"), Some(OpCodes::OP_1 as u8));
        assert_eq!(alias_byte("OP_CHECKLOCKTIMEVERIFY"), Some(0xb1));
        assert_eq!(alias_byte("OP_RETURN"), None);
    }

    #[test]
    fn test_names_come_from_bsv() {
        assert_eq!(OpCodes::OP_RETURN.to_string(), "OP_RETURN");
        assert_eq!(OpCodes::OP_0.to_string(), "OP_0");
        assert_eq!(OpCodes::OP_CHECKSIG.to_string(), "OP_CHECKSIG");
    }

    #[test]
    fn test_printable() {
        assert!(is_printable(OpCodes::OP_RETURN as u8)); // 'j'
        assert!(is_printable(b'|'));
        assert!(!is_printable(OpCodes::OP_0 as u8));
        assert!(!is_printable(0x7f));
        assert!(!is_printable(0xa0));
        assert!(!is_printable(0xad));
        assert!(is_printable(0xe4));
    }

    #[test]
    fn test_unassigned() {
        assert!(is_unassigned(OpCodes::OP_INVALIDOPCODE as u8));
        assert!(is_unassigned(0xba));
        assert!(!is_unassigned(OpCodes::OP_RETURN as u8));
        assert!(!is_unassigned(0xfa));
    }
}
