use core::fmt;

/// Number of bits in a CCIR-476 character
pub const CODE_WORD_BITS: usize = 7;

/// Number of 1-bits in every valid CCIR-476 character
pub const CODE_WORD_WEIGHT: u32 = 4;

/// A 7-bit CCIR-476 character in canonical orientation.
///
/// Characters arrive on the wire in reversed order. The table and the ALPHA/RC
/// constants are all defined in the canonical orientation, so a wire group must go
/// through [`CodeWord::from_wire`] before being compared or looked up.
/// Bit 6 of the inner value is the first canonical bit (the last bit received).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CodeWord(u8);

/// Phasing signal 1
pub const ALPHA: CodeWord = CodeWord(0b000_1111);
/// Phasing signal 2, also sent in reply to ALPHA when the RX/DX order is reversed
pub const RC: CodeWord = CodeWord(0b110_0110);

impl CodeWord {
    /// Construct from a raw canonical value. Panics if more than 7 bits are set.
    pub const fn from_raw(value: u8) -> Self {
        assert!(value < 0x80, "CodeWord::from_raw: value exceeds 7 bits");
        CodeWord(value)
    }

    pub const fn into_raw(self) -> u8 {
        self.0
    }

    /// Build from a group of 7 bits in arrival order, reversing them.
    /// Any non-zero byte counts as a 1-bit.
    pub fn from_wire(bits: &[u8]) -> Self {
        assert_eq!(bits.len(), CODE_WORD_BITS, "from_wire: need exactly 7 bits");
        let value = bits
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &b)| acc | (((b != 0) as u8) << i));
        CodeWord(value)
    }

    /// Inverse of `from_wire`: the 7 bits in the order they are transmitted.
    pub fn to_wire(self) -> [u8; CODE_WORD_BITS] {
        let mut bits = [0u8; CODE_WORD_BITS];
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = (self.0 >> i) & 1;
        }
        bits
    }

    /// Construct from a string of '0'/'1' characters in canonical orientation.
    /// Panics if any other character is encountered or the length is not 7.
    pub fn from_bitstr(bitstr: &str) -> Self {
        assert_eq!(bitstr.len(), CODE_WORD_BITS, "from_bitstr: need exactly 7 characters");
        let mut value = 0u8;
        for c in bitstr.chars() {
            value <<= 1;
            match c {
                '0' => {}
                '1' => value |= 1,
                other => panic!("from_bitstr: invalid character `{}`; only '0' or '1' allowed", other),
            }
        }
        CodeWord(value)
    }

    /// Canonical '0'/'1' string, first canonical bit first
    pub fn to_bitstr(self) -> String {
        (0..CODE_WORD_BITS)
            .rev()
            .map(|i| if (self.0 >> i) & 1 == 1 { '1' } else { '0' })
            .collect()
    }

    pub fn weight(self) -> u32 {
        self.0.count_ones()
    }

    /// Structural check: exactly four 1-bits
    pub fn is_valid(self) -> bool {
        self.weight() == CODE_WORD_WEIGHT
    }

    /// True if `self`, received as the repeat, is an acceptable answer to `original`.
    /// Either both are identical, or `self` is RC sent in reply to ALPHA.
    /// The reverse (ALPHA in reply to RC) is not accepted.
    pub fn is_valid_response_to(self, original: CodeWord) -> bool {
        self == original || (self == RC && original == ALPHA)
    }
}

impl fmt::Display for CodeWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bitstr())
    }
}

/// Free-function form of [`CodeWord::is_valid_response_to`]: `response` answers `original`
pub fn is_valid_response(response: CodeWord, original: CodeWord) -> bool {
    response.is_valid_response_to(original)
}
