//! The pull-based character stream the scanner consumes.

use crate::buffer::XmlString;
use crate::chars;

/// How a call to [`CharSource::scan_data`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRun {
    /// The delimiter was found and consumed.
    Delimiter,
    /// The run stopped before a unit the caller has to look at.
    Interrupted,
    /// Input ran out before the delimiter.
    Eof,
}

/// A stream of UTF-16 code units with one unit of lookahead.
///
/// `None` stands for end of input wherever a unit is returned.
pub trait CharSource {
    fn peek(&mut self) -> Option<u16>;

    fn consume(&mut self) -> Option<u16>;

    /// Skips `S`, returning true if at least one space was skipped.
    fn skip_spaces(&mut self) -> bool;

    /// Consumes `unit` if it is next.
    fn skip_char(&mut self, unit: u16) -> bool;

    /// Consumes `literal` if the input continues with exactly that text.
    fn skip_string(&mut self, literal: &str) -> bool;

    fn scan_name(&mut self) -> Option<String>;

    /// Replaces `out` with literal text up to (not including) the first
    /// `quote`, `&`, `%`, `<`, `]` or invalid unit, returning that unit
    /// unconsumed, or `None` at end of input.
    fn scan_literal(&mut self, quote: u16, out: &mut XmlString) -> Option<u16>;

    /// Replaces `out` with text up to `delimiter`.
    ///
    /// The run may stop early at a unit the caller must inspect; the caller
    /// keeps calling until it sees [`DataRun::Delimiter`].
    fn scan_data(&mut self, delimiter: &str, out: &mut XmlString) -> DataRun;
}

/// An in-memory [`CharSource`] over the UTF-16 encoding of a string.
pub struct StrSource {
    units: Vec<u16>,
    pos: usize,
}

impl StrSource {
    pub fn new(text: &str) -> StrSource {
        StrSource {
            units: text.encode_utf16().collect(),
            pos: 0,
        }
    }

    pub fn from_units(units: Vec<u16>) -> StrSource {
        StrSource { units, pos: 0 }
    }

    /// Current position, in UTF-16 units.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Current position as a byte offset into the UTF-8 form of the input.
    pub fn byte_offset(&self) -> usize {
        char::decode_utf16(self.units[..self.pos].iter().copied())
            .map(|c| c.map(char::len_utf8).unwrap_or(3))
            .sum()
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.units.len()
    }

    /// The code point starting at `pos` and how many units it spans. A lone
    /// surrogate is returned as itself.
    fn code_point_at(&self, pos: usize) -> Option<(u32, usize)> {
        let unit = *self.units.get(pos)?;
        if chars::is_high_surrogate(unit) {
            if let Some(&low) = self.units.get(pos + 1) {
                if chars::is_low_surrogate(low) {
                    return Some((chars::supplemental(unit, low), 2));
                }
            }
        }
        Some((unit as u32, 1))
    }

    fn starts_with(&self, pos: usize, literal: &[u16]) -> bool {
        self.units[pos..].starts_with(literal)
    }
}

impl CharSource for StrSource {
    fn peek(&mut self) -> Option<u16> {
        self.units.get(self.pos).copied()
    }

    fn consume(&mut self) -> Option<u16> {
        let unit = self.units.get(self.pos).copied();
        if unit.is_some() {
            self.pos += 1;
        }
        unit
    }

    fn skip_spaces(&mut self) -> bool {
        let start = self.pos;
        while self.units.get(self.pos).is_some_and(|&u| chars::is_space(u)) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn skip_char(&mut self, unit: u16) -> bool {
        if self.units.get(self.pos) == Some(&unit) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_string(&mut self, literal: &str) -> bool {
        let literal: Vec<u16> = literal.encode_utf16().collect();
        if self.starts_with(self.pos, &literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn scan_name(&mut self) -> Option<String> {
        let start = self.pos;
        let (c, len) = self.code_point_at(self.pos)?;
        if !chars::is_name_start(c) {
            return None;
        }
        let mut end = start + len;
        while let Some((c, len)) = self.code_point_at(end) {
            if !chars::is_name(c) {
                break;
            }
            end += len;
        }
        self.pos = end;
        Some(String::from_utf16_lossy(&self.units[start..end]))
    }

    fn scan_literal(&mut self, quote: u16, out: &mut XmlString) -> Option<u16> {
        out.clear();
        let start = self.pos;
        let mut end = start;
        let stop = loop {
            let Some((c, len)) = self.code_point_at(end) else {
                break None;
            };
            let unit = self.units[end];
            if unit == quote
                || matches!(unit, 0x26 /* & */ | 0x25 /* % */ | 0x3C /* < */ | 0x5D /* ] */)
                || !chars::is_valid(c)
            {
                break Some(unit);
            }
            end += len;
        };
        out.extend_from_slice(&self.units[start..end]);
        self.pos = end;
        stop
    }

    fn scan_data(&mut self, delimiter: &str, out: &mut XmlString) -> DataRun {
        out.clear();
        let delimiter: Vec<u16> = delimiter.encode_utf16().collect();
        let start = self.pos;
        let mut end = start;
        let run = loop {
            if self.starts_with(end, &delimiter) {
                break DataRun::Delimiter;
            }
            match self.code_point_at(end) {
                None => break DataRun::Eof,
                Some((c, _)) if !chars::is_valid(c) => break DataRun::Interrupted,
                Some((_, len)) => end += len,
            }
        };
        out.extend_from_slice(&self.units[start..end]);
        self.pos = end;
        if run == DataRun::Delimiter {
            self.pos += delimiter.len();
        }
        run
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_stops_at_markers() {
        let mut src = StrSource::new("abc&def'");
        let mut out = XmlString::new();
        assert_eq!(src.scan_literal(b'\'' as u16, &mut out), Some(b'&' as u16));
        assert_eq!(out, "abc");
        src.consume();
        assert_eq!(src.scan_literal(b'\'' as u16, &mut out), Some(b'\'' as u16));
        assert_eq!(out, "def");
    }

    #[test]
    fn data_keeps_single_dash() {
        let mut src = StrSource::new("a-b--c");
        let mut out = XmlString::new();
        assert_eq!(src.scan_data("--", &mut out), DataRun::Delimiter);
        assert_eq!(out, "a-b");
        assert_eq!(src.peek(), Some(b'c' as u16));
    }

    #[test]
    fn data_passes_surrogate_pairs() {
        let mut src = StrSource::new("x\u{1F600}y?>");
        let mut out = XmlString::new();
        assert_eq!(src.scan_data("?>", &mut out), DataRun::Delimiter);
        assert_eq!(out, "x\u{1F600}y");
        assert!(src.is_at_end());
    }

    #[test]
    fn data_interrupts_on_invalid_unit() {
        let mut src = StrSource::new("ab\u{1}c");
        let mut out = XmlString::new();
        assert_eq!(src.scan_data("--", &mut out), DataRun::Interrupted);
        assert_eq!(out, "ab");
        assert_eq!(src.peek(), Some(1));
    }

    #[test]
    fn byte_offset_counts_utf8() {
        let mut src = StrSource::new("é\u{1F600}z");
        src.consume();
        assert_eq!(src.byte_offset(), 2);
        src.consume();
        src.consume();
        assert_eq!(src.byte_offset(), 6);
    }

    #[test]
    fn names() {
        let mut src = StrSource::new("xml-stylesheet href");
        assert_eq!(src.scan_name().as_deref(), Some("xml-stylesheet"));
        assert!(src.skip_spaces());
        assert_eq!(src.scan_name().as_deref(), Some("href"));
        assert_eq!(src.scan_name(), None);
        let mut src = StrSource::new("1abc");
        assert_eq!(src.scan_name(), None);
        assert_eq!(src.offset(), 0);
    }
}
