use std::io::{self, Write};

use navtex_core::ccir476;
use navtex_core::{CodeWord, ControlGlyph, Glyph};

use crate::output::TextSink;

/// Printed in place of a character that could not be recovered
pub const ERROR_MARKER: char = '*';

/// Which half of the CCIR-476 table is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftState {
    #[default]
    Letters,
    Figures,
}

/// What the synchronizer or FEC decoder hands to the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    Code(CodeWord),
    ErrorMarker,
}

/// Result of mapping one emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapped {
    /// Goes to the output text
    Text(char),
    /// Shift table switched; nothing printed
    ShiftChanged(ShiftState),
    /// Signalling character; nothing printed
    Control(ControlGlyph),
    /// Never printed, line feed is the newline
    CarriageReturn,
    /// Code word without table entry
    Unknown(CodeWord),
}

/// Maps resolved code words to text and owns the letters/figures state.
/// The shift state outlives resynchronisation.
#[derive(Debug, Clone)]
pub struct CharMapper {
    shift: ShiftState,
    /// Echo shift and control markers to the sink
    echo_controls: bool,
}

impl CharMapper {
    pub fn new(echo_controls: bool) -> Self {
        Self {
            shift: ShiftState::Letters,
            echo_controls,
        }
    }

    pub fn shift(&self) -> ShiftState {
        self.shift
    }

    /// Map one emission, updating the shift state. Does not write anything.
    pub fn resolve(&mut self, emission: Emission) -> Mapped {
        let code = match emission {
            Emission::ErrorMarker => return Mapped::Text(ERROR_MARKER),
            Emission::Code(code) => code,
        };
        let Some(entry) = ccir476::lookup(code) else {
            return Mapped::Unknown(code);
        };
        let glyph = match self.shift {
            ShiftState::Letters => entry.letters,
            ShiftState::Figures => entry.figures,
        };

        match glyph {
            Glyph::Letters => {
                self.shift = ShiftState::Letters;
                Mapped::ShiftChanged(ShiftState::Letters)
            }
            Glyph::Figures => {
                self.shift = ShiftState::Figures;
                Mapped::ShiftChanged(ShiftState::Figures)
            }
            Glyph::Control(ctrl) => Mapped::Control(ctrl),
            Glyph::CarriageReturn => Mapped::CarriageReturn,
            Glyph::LineFeed => Mapped::Text('\n'),
            Glyph::Char(c) => Mapped::Text(c),
        }
    }

    /// Map one emission and write the outcome to `sink`
    pub fn emit<W: Write>(&mut self, emission: Emission, sink: &mut TextSink<W>) -> io::Result<Mapped> {
        let mapped = self.resolve(emission);
        tracing::trace!("emit {:?} -> {:?}", emission, mapped);

        match mapped {
            Mapped::Text(c) => sink.put_char(c)?,
            Mapped::ShiftChanged(ShiftState::Letters) if self.echo_controls => sink.put_marker("<LTRS>")?,
            Mapped::ShiftChanged(ShiftState::Figures) if self.echo_controls => sink.put_marker("<FIGS>")?,
            Mapped::Control(ctrl) if self.echo_controls => sink.put_marker(ctrl.marker())?,
            Mapped::ShiftChanged(_) | Mapped::Control(_) | Mapped::CarriageReturn => {}
            Mapped::Unknown(code) => {
                // Only weight-4 code words are ever emitted, and all of them are in the table
                tracing::warn!("no CCIR-476 entry for code word {}", code);
                debug_assert!(false, "code word {} has no CCIR-476 entry", code);
                sink.put_marker(&code.to_bitstr())?;
            }
        }
        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtex_config::FlushPolicy;
    use navtex_core::ccir476::encode;
    use navtex_core::{ALPHA, RC};

    fn code(g: Glyph) -> Emission {
        Emission::Code(encode(g).unwrap())
    }

    fn run(mapper: &mut CharMapper, emissions: &[Emission]) -> String {
        let mut sink = TextSink::new(Vec::new(), FlushPolicy::Never);
        for e in emissions {
            mapper.emit(*e, &mut sink).unwrap();
        }
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_letters_and_figures() {
        let mut m = CharMapper::new(false);
        // "A", FIGS, same code word now reads '-', LTRS, back to "A"
        let out = run(
            &mut m,
            &[code(Glyph::Char('A')), code(Glyph::Figures), code(Glyph::Char('A')), code(Glyph::Letters), code(Glyph::Char('A'))],
        );
        assert_eq!(out, "A-A");
        assert_eq!(m.shift(), ShiftState::Letters);
    }

    #[test]
    fn test_shift_persists() {
        let mut m = CharMapper::new(false);
        run(&mut m, &[code(Glyph::Figures)]);
        assert_eq!(m.shift(), ShiftState::Figures);
        assert_eq!(run(&mut m, &[code(Glyph::Char('Q'))]), "1");
    }

    #[test]
    fn test_error_marker_verbatim() {
        let mut m = CharMapper::new(false);
        assert_eq!(run(&mut m, &[Emission::ErrorMarker]), "*");
        m.resolve(code(Glyph::Figures));
        assert_eq!(m.resolve(Emission::ErrorMarker), Mapped::Text('*'));
    }

    #[test]
    fn test_cr_suppressed_lf_printed() {
        let mut m = CharMapper::new(true);
        let cr = Emission::Code(CodeWord::from_bitstr("1101100"));
        let lf = Emission::Code(CodeWord::from_bitstr("1111000"));
        assert_eq!(run(&mut m, &[cr, lf]), "\n");
        // Same in the figures table
        run(&mut m, &[code(Glyph::Figures)]);
        assert_eq!(m.resolve(cr), Mapped::CarriageReturn);
        assert_eq!(m.resolve(lf), Mapped::Text('\n'));
    }

    #[test]
    fn test_controls_suppressed() {
        let mut m = CharMapper::new(false);
        let beta = code(Glyph::Control(ControlGlyph::Beta));
        let ch32 = code(Glyph::Control(ControlGlyph::Ch32));
        let out = run(&mut m, &[Emission::Code(ALPHA), beta, Emission::Code(RC), ch32, code(Glyph::Figures)]);
        assert_eq!(out, "");
    }

    #[test]
    fn test_diagnostic_echo() {
        let mut m = CharMapper::new(true);
        let out = run(
            &mut m,
            &[Emission::Code(ALPHA), code(Glyph::Figures), code(Glyph::Char('T')), code(Glyph::Letters), Emission::Code(RC)],
        );
        assert_eq!(out, "<ALPHA><FIGS>5<LTRS><RC>");
    }

    #[test]
    fn test_unknown_code_word() {
        let mut m = CharMapper::new(false);
        let bad = CodeWord::from_bitstr("1110110");
        assert_eq!(m.resolve(Emission::Code(bad)), Mapped::Unknown(bad));
    }
}
