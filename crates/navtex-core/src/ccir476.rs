//! CCIR-476 character set
//!
//! Source: ITU-R Recommendation 476, as used by NAVTEX / SITOR-B.
//! All code words are in canonical orientation (see [`CodeWord::from_wire`]).

use core::fmt;

use crate::code_word::CodeWord;

/// Non-printing signalling characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlGlyph {
    Alpha,
    Beta,
    Rc,
    Ch32,
}

impl ControlGlyph {
    pub fn marker(self) -> &'static str {
        match self {
            ControlGlyph::Alpha => "<ALPHA>",
            ControlGlyph::Beta => "<BETA>",
            ControlGlyph::Rc => "<RC>",
            ControlGlyph::Ch32 => "<CH32>",
        }
    }
}

/// What a code word means in one of the two shift tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Printable character, including space and BELL
    Char(char),
    /// Switch to the letters table
    Letters,
    /// Switch to the figures table
    Figures,
    Control(ControlGlyph),
    CarriageReturn,
    LineFeed,
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Glyph::Char(c) => write!(f, "{}", c.escape_debug()),
            Glyph::Letters => write!(f, "<LTRS>"),
            Glyph::Figures => write!(f, "<FIGS>"),
            Glyph::Control(ctrl) => write!(f, "{}", ctrl.marker()),
            Glyph::CarriageReturn => write!(f, "<CR>"),
            Glyph::LineFeed => write!(f, "<LF>"),
        }
    }
}

/// Table entry: code word and its (letters, figures) glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ccir476Entry {
    pub code: CodeWord,
    pub letters: Glyph,
    pub figures: Glyph,
}

const fn entry(code: u8, letters: Glyph, figures: Glyph) -> Ccir476Entry {
    Ccir476Entry { code: CodeWord::from_raw(code), letters, figures }
}

const fn ch(letters: char, figures: char) -> (Glyph, Glyph) {
    (Glyph::Char(letters), Glyph::Char(figures))
}

const fn both(g: Glyph) -> (Glyph, Glyph) {
    (g, g)
}

macro_rules! table {
    ( $( $code:literal => $pair:expr ),* $(,)? ) => {
        [ $( { let (l, f) = $pair; entry($code, l, f) } ),* ]
    };
}

const BELL: char = '\x07';

/// The complete alphabet: every weight-4 code word has an entry.
pub const CCIR476_TABLE: [Ccir476Entry; 35] = table![
    0b000_1111 => both(Glyph::Control(ControlGlyph::Alpha)),

    0b001_0111 => ch('J', BELL),
    0b001_1011 => ch('F', '!'),
    0b001_1101 => ch('C', ':'),
    0b001_1110 => ch('K', '('),

    0b010_0111 => ch('W', '2'),
    0b010_1011 => ch('Y', '6'),
    0b010_1101 => ch('P', '0'),
    0b010_1110 => ch('Q', '1'),

    0b011_0011 => both(Glyph::Control(ControlGlyph::Beta)),
    0b011_0101 => ch('G', '&'),
    0b011_0110 => both(Glyph::Figures),
    0b011_1001 => ch('M', '.'),
    0b011_1010 => ch('X', '/'),
    0b011_1100 => ch('V', '='),

    0b100_0111 => ch('A', '-'),
    0b100_1011 => ch('S', '\''),
    0b100_1101 => ch('I', '8'),
    0b100_1110 => ch('U', '7'),

    0b101_0011 => ch('D', '$'),
    0b101_0101 => ch('R', '4'),
    0b101_0110 => ch('E', '3'),
    0b101_1001 => ch('N', ','),
    0b101_1010 => both(Glyph::Letters),
    0b101_1100 => ch(' ', ' '),

    0b110_0011 => ch('Z', '+'),
    0b110_0101 => ch('L', ')'),
    0b110_0110 => both(Glyph::Control(ControlGlyph::Rc)),
    0b110_1001 => ch('H', '#'),
    0b110_1010 => both(Glyph::Control(ControlGlyph::Ch32)),
    0b110_1100 => both(Glyph::CarriageReturn),

    0b111_0001 => ch('O', '9'),
    0b111_0010 => ch('B', '?'),
    0b111_0100 => ch('T', '5'),
    0b111_1000 => both(Glyph::LineFeed),
];

/// Lookup table indexed by raw code word value, built at compile time
const INDEX: [Option<u8>; 128] = {
    let mut idx = [None; 128];
    let mut i = 0;
    while i < CCIR476_TABLE.len() {
        idx[CCIR476_TABLE[i].code.into_raw() as usize] = Some(i as u8);
        i += 1;
    }
    idx
};

/// Find the table entry for a canonical code word
pub fn lookup(code: CodeWord) -> Option<&'static Ccir476Entry> {
    INDEX[code.into_raw() as usize].map(|i| &CCIR476_TABLE[i as usize])
}

/// Reverse lookup: code word whose letters or figures glyph is `glyph`.
/// Letters table is searched first.
pub fn encode(glyph: Glyph) -> Option<CodeWord> {
    CCIR476_TABLE
        .iter()
        .find(|e| e.letters == glyph)
        .or_else(|| CCIR476_TABLE.iter().find(|e| e.figures == glyph))
        .map(|e| e.code)
}
