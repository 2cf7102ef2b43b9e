use braille_core::{Cell, DotMask};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::table::{BrailleTable, Symbol};

/// Character emitted for patterns the table leaves unmapped.
pub const DEFAULT_PLACEHOLDER: char = '\u{FFFD}';

/// Decoder configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderParams {
    pub table: BrailleTable,
    pub placeholder: char,
}

impl Default for DecoderParams {
    fn default() -> Self {
        Self {
            table: BrailleTable::default(),
            placeholder: DEFAULT_PLACEHOLDER,
        }
    }
}

/// One entry of the decoded buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextUnit {
    Char(char),
    Space,
    LineBreak,
    /// A pattern without a meaning in the active table.
    Unmapped(DotMask),
    /// A number or capital sign; changes how later cells read, prints nothing.
    Indicator(DotMask),
}

/// Accumulates decoded cells into text.
///
/// Each pushed cell adds one unit; a change of line between consecutive
/// pushes adds a line break before it. A number sign switches a–j to
/// digits until the next space, line break or other letter. A capital
/// sign uppercases the next letter.
#[derive(Clone, Debug)]
pub struct BrailleDecoder {
    params: DecoderParams,
    units: Vec<TextUnit>,
    line: Option<usize>,
    numeric: bool,
    capital: bool,
}

impl Default for BrailleDecoder {
    fn default() -> Self {
        Self::new(DecoderParams::default())
    }
}

impl BrailleDecoder {
    pub fn new(params: DecoderParams) -> Self {
        Self {
            params,
            units: Vec::new(),
            line: None,
            numeric: false,
            capital: false,
        }
    }

    pub fn params(&self) -> &DecoderParams {
        &self.params
    }

    /// Decode one cell. Blank cells become spaces.
    pub fn push(&mut self, cell: &Cell) {
        let mask = if cell.is_blank() {
            DotMask::EMPTY
        } else {
            cell.mask
        };
        self.push_mask(cell.line, mask);
    }

    /// Decode a raw pattern read on `line`.
    pub fn push_mask(&mut self, line: usize, mask: DotMask) {
        if self.line.is_some_and(|prev| prev != line) {
            self.units.push(TextUnit::LineBreak);
            self.reset_modes();
        }
        self.line = Some(line);

        let unit = self.decode(mask);
        trace!("line {line} mask {mask} -> {unit:?}");
        self.units.push(unit);
    }

    fn decode(&mut self, mask: DotMask) -> TextUnit {
        if mask.is_empty() {
            self.reset_modes();
            return TextUnit::Space;
        }

        match self.params.table.lookup(mask) {
            None => {
                self.capital = false;
                TextUnit::Unmapped(mask)
            }
            Some(Symbol::NumberSign) => {
                self.numeric = true;
                TextUnit::Indicator(mask)
            }
            Some(Symbol::CapitalSign) => {
                self.capital = true;
                TextUnit::Indicator(mask)
            }
            Some(Symbol::Char(c)) => {
                let c = if self.numeric {
                    match letter_digit(c) {
                        Some(d) => d,
                        None => {
                            if c.is_alphabetic() {
                                self.numeric = false;
                            }
                            c
                        }
                    }
                } else {
                    c
                };
                let c = if self.capital && c.is_alphabetic() {
                    c.to_uppercase().next().unwrap_or(c)
                } else {
                    c
                };
                self.capital = false;
                TextUnit::Char(c)
            }
        }
    }

    fn reset_modes(&mut self) {
        self.numeric = false;
        self.capital = false;
    }

    /// Text decoded so far. Repeatable; does not consume the buffer.
    pub fn digest(&self) -> String {
        let mut out = String::with_capacity(self.units.len());
        for unit in &self.units {
            match *unit {
                TextUnit::Char(c) => out.push(c),
                TextUnit::Space => out.push(' '),
                TextUnit::LineBreak => out.push('\n'),
                TextUnit::Unmapped(_) => out.push(self.params.placeholder),
                TextUnit::Indicator(_) => {}
            }
        }
        out
    }

    pub fn units(&self) -> &[TextUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Drop all decoded text and modes; the table stays.
    pub fn clear(&mut self) {
        self.units.clear();
        self.line = None;
        self.reset_modes();
    }
}

/// Digit written with letters a–j after a number sign.
fn letter_digit(c: char) -> Option<char> {
    match c {
        'a'..='i' => char::from_digit(c as u32 - 'a' as u32 + 1, 10),
        'j' => Some('0'),
        _ => None,
    }
}
