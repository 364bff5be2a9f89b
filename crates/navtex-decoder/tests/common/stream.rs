use navtex_core::ccir476::{encode, CCIR476_TABLE};
use navtex_core::{CodeWord, ControlGlyph, Glyph, ALPHA};

/// Weight 7, never a valid character
pub const INVALID: CodeWord = CodeWord::from_raw(0b111_1111);

fn code(glyph: Glyph) -> CodeWord {
    encode(glyph).unwrap()
}

/// Phasing characters a station sends ahead of a message: LTRS, ALPHA, BETA.
/// None of them prints.
pub fn preamble() -> Vec<CodeWord> {
    vec![code(Glyph::Letters), ALPHA, code(Glyph::Control(ControlGlyph::Beta))]
}

/// Encode text as CCIR-476 characters, inserting LTRS/FIGS shifts where needed.
/// The encoder starts in letters shift.
pub fn encode_text(text: &str) -> Vec<CodeWord> {
    let mut out = vec![];
    let mut figures = false;
    for c in text.chars() {
        let glyph = if c == '\n' { Glyph::LineFeed } else { Glyph::Char(c) };
        let in_letters = CCIR476_TABLE.iter().find(|e| e.letters == glyph);
        let in_figures = CCIR476_TABLE.iter().find(|e| e.figures == glyph);
        let (entry, wants_figures) = match (in_letters, in_figures) {
            (Some(e), Some(_)) => (e, figures),
            (Some(e), None) => (e, false),
            (None, Some(e)) => (e, true),
            (None, None) => panic!("no CCIR-476 code for {:?}", c),
        };
        if wants_figures != figures {
            out.push(code(if wants_figures { Glyph::Figures } else { Glyph::Letters }));
            figures = wants_figures;
        }
        out.push(entry.code);
    }
    out
}

/// Interleave characters the way the transmitter does: every DX character is followed
/// by the RX repeat of the character sent two DX slots earlier. The first two RX slots
/// carry ALPHA.
pub fn diversity_groups(chars: &[CodeWord]) -> Vec<CodeWord> {
    let mut groups = Vec::with_capacity(chars.len() * 2);
    for (k, &c) in chars.iter().enumerate() {
        groups.push(c);
        groups.push(if k >= 2 { chars[k - 2] } else { ALPHA });
    }
    groups
}

/// Groups to wire bits, one bit per byte
pub fn groups_to_bits(groups: &[CodeWord]) -> Vec<u8> {
    groups.iter().flat_map(|g| g.to_wire()).collect()
}
