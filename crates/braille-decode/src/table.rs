//! Fixed dot-pattern tables.
//!
//! Tables are plain `static` arrays indexed by the 6-bit mask, built at
//! compile time from position lists.

use braille_core::DotMask;
use serde::{Deserialize, Serialize};

/// What a single cell means under a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Char(char),
    /// Following a–j cells read as digits 1–9, 0.
    NumberSign,
    /// The following letter is uppercase.
    CapitalSign,
}

/// Built-in Braille tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrailleTable {
    /// Basic international letters, number and capital signs, common
    /// punctuation. Other patterns are unmapped.
    #[default]
    International,
    /// Six-dot North American Braille ASCII: every pattern has a character.
    NorthAmericanAscii,
    /// Characters from the Unicode Braille Patterns block.
    Unicode,
}

impl BrailleTable {
    pub const ALL: [BrailleTable; 3] = [
        BrailleTable::International,
        BrailleTable::NorthAmericanAscii,
        BrailleTable::Unicode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BrailleTable::International => "international",
            BrailleTable::NorthAmericanAscii => "north_american_ascii",
            BrailleTable::Unicode => "unicode",
        }
    }

    /// Symbol for `mask`; `None` when the table leaves the pattern unmapped.
    pub fn lookup(self, mask: DotMask) -> Option<Symbol> {
        let idx = mask.bits() as usize;
        match self {
            BrailleTable::International => INTERNATIONAL[idx],
            BrailleTable::NorthAmericanAscii => Some(Symbol::Char(NORTH_AMERICAN_ASCII[idx])),
            BrailleTable::Unicode => Some(Symbol::Char(mask.to_unicode())),
        }
    }

    /// Number of patterns with a meaning, the empty cell included.
    pub fn coverage(self) -> usize {
        (0..64u8)
            .filter_map(DotMask::new)
            .filter(|&m| self.lookup(m).is_some())
            .count()
    }
}

impl std::fmt::Display for BrailleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BrailleTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_ascii_lowercase().replace('-', "_");
        BrailleTable::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| format!("unknown braille table '{s}'"))
    }
}

const fn dots(positions: &[u8]) -> usize {
    let mut bits = 0usize;
    let mut i = 0;
    while i < positions.len() {
        bits |= 1 << (positions[i] - 1);
        i += 1;
    }
    bits
}

const INTERNATIONAL_ENTRIES: [(&[u8], Symbol); 40] = [
    (&[1], Symbol::Char('a')),
    (&[1, 2], Symbol::Char('b')),
    (&[1, 4], Symbol::Char('c')),
    (&[1, 4, 5], Symbol::Char('d')),
    (&[1, 5], Symbol::Char('e')),
    (&[1, 2, 4], Symbol::Char('f')),
    (&[1, 2, 4, 5], Symbol::Char('g')),
    (&[1, 2, 5], Symbol::Char('h')),
    (&[2, 4], Symbol::Char('i')),
    (&[2, 4, 5], Symbol::Char('j')),
    (&[1, 3], Symbol::Char('k')),
    (&[1, 2, 3], Symbol::Char('l')),
    (&[1, 3, 4], Symbol::Char('m')),
    (&[1, 3, 4, 5], Symbol::Char('n')),
    (&[1, 3, 5], Symbol::Char('o')),
    (&[1, 2, 3, 4], Symbol::Char('p')),
    (&[1, 2, 3, 4, 5], Symbol::Char('q')),
    (&[1, 2, 3, 5], Symbol::Char('r')),
    (&[2, 3, 4], Symbol::Char('s')),
    (&[2, 3, 4, 5], Symbol::Char('t')),
    (&[1, 3, 6], Symbol::Char('u')),
    (&[1, 2, 3, 6], Symbol::Char('v')),
    (&[2, 4, 5, 6], Symbol::Char('w')),
    (&[1, 3, 4, 6], Symbol::Char('x')),
    (&[1, 3, 4, 5, 6], Symbol::Char('y')),
    (&[1, 3, 5, 6], Symbol::Char('z')),
    (&[1, 2, 3, 4, 5, 6], Symbol::Char('é')),
    (&[2], Symbol::Char(',')),
    (&[2, 3], Symbol::Char(';')),
    (&[2, 5], Symbol::Char(':')),
    (&[2, 5, 6], Symbol::Char('.')),
    (&[2, 3, 5], Symbol::Char('!')),
    (&[2, 3, 5, 6], Symbol::Char('(')),
    (&[2, 3, 6], Symbol::Char('?')),
    (&[3, 5, 6], Symbol::Char('"')),
    (&[3], Symbol::Char('\'')),
    (&[3, 6], Symbol::Char('-')),
    (&[3, 4], Symbol::Char('/')),
    (&[3, 4, 5, 6], Symbol::NumberSign),
    (&[6], Symbol::CapitalSign),
];

const fn build_international() -> [Option<Symbol>; 64] {
    let mut table = [None; 64];
    table[0] = Some(Symbol::Char(' '));
    let mut i = 0;
    while i < INTERNATIONAL_ENTRIES.len() {
        let (positions, symbol) = INTERNATIONAL_ENTRIES[i];
        table[dots(positions)] = Some(symbol);
        i += 1;
    }
    table
}

static INTERNATIONAL: [Option<Symbol>; 64] = build_international();

const fn build_ascii(chars: &[u8; 64]) -> [char; 64] {
    let mut table = [' '; 64];
    let mut i = 0;
    while i < 64 {
        table[i] = chars[i] as char;
        i += 1;
    }
    table
}

static NORTH_AMERICAN_ASCII: [char; 64] =
    build_ascii(b" A1B'K2L@CIF/MSP\"E3H9O6R^DJG>NTQ,*5<-U8V.%[$+X!&;:4\\0Z7(_?W]#Y)=");
