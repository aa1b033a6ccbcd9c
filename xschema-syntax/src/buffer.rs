use std::fmt;

/// A growable run of UTF-16 code units.
///
/// The scanner owns its buffers and clears them at the start of each
/// operation. Anything it hands out is a borrow of one of these, so a caller
/// has to copy the contents out (`to_string()`) before the next scan call.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct XmlString {
    units: Vec<u16>,
}

impl XmlString {
    pub fn new() -> XmlString {
        XmlString::default()
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }

    pub fn push(&mut self, unit: u16) {
        self.units.push(unit);
    }

    pub fn append(&mut self, other: &XmlString) {
        self.units.extend_from_slice(&other.units);
    }

    pub fn extend_from_slice(&mut self, units: &[u16]) {
        self.units.extend_from_slice(units);
    }

    /// Replace the contents with those of `other`.
    pub fn set(&mut self, other: &XmlString) {
        self.units.clear();
        self.units.extend_from_slice(&other.units);
    }

    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl fmt::Display for XmlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in char::decode_utf16(self.units.iter().copied()) {
            f.write_fmt(format_args!("{}", c.unwrap_or(char::REPLACEMENT_CHARACTER)))?;
        }
        Ok(())
    }
}

impl fmt::Debug for XmlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("XmlString").field(&self.to_string()).finish()
    }
}

impl From<&str> for XmlString {
    fn from(s: &str) -> Self {
        XmlString {
            units: s.encode_utf16().collect(),
        }
    }
}

impl PartialEq<str> for XmlString {
    fn eq(&self, other: &str) -> bool {
        self.units.iter().copied().eq(other.encode_utf16())
    }
}

impl PartialEq<&str> for XmlString {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
