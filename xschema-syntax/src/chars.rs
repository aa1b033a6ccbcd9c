//! XML 1.0 character classes, over UTF-16 code units and code points.
//!
//! Reference: <https://www.w3.org/TR/xml/#charsets>

/// `[2] Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
#[inline]
pub fn is_valid(c: u32) -> bool {
    matches!(c,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// A single UTF-16 unit that can not appear in a document on its own.
///
/// Surrogate halves count as invalid here; callers that walk a UTF-16 stream
/// are expected to handle well formed pairs before asking.
#[inline]
pub fn is_invalid(unit: u16) -> bool {
    !is_valid(unit as u32)
}

/// `[3] S ::= (#x20 | #x9 | #xD | #xA)+`
#[inline]
pub fn is_space(unit: u16) -> bool {
    matches!(unit, 0x20 | 0x9 | 0xD | 0xA)
}

#[inline]
pub fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

#[inline]
pub fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Code points that need a surrogate pair in UTF-16.
#[inline]
pub fn is_supplemental(c: u32) -> bool {
    (0x10000..=0x10FFFF).contains(&c)
}

#[inline]
pub fn high_surrogate(c: u32) -> u16 {
    (((c - 0x10000) >> 10) + 0xD800) as u16
}

#[inline]
pub fn low_surrogate(c: u32) -> u16 {
    (((c - 0x10000) & 0x3FF) + 0xDC00) as u16
}

/// Joins a surrogate pair back into its code point.
#[inline]
pub fn supplemental(high: u16, low: u16) -> u32 {
    (((high as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00) + 0x10000
}

/// `[4] NameStartChar`
pub fn is_name_start(c: u32) -> bool {
    matches!(c,
        0x3A /* : */ | 0x41..=0x5A | 0x5F /* _ */ | 0x61..=0x7A |
        0xC0..=0xD6 |
        0xD8..=0xF6 |
        0xF8..=0x2FF |
        0x370..=0x37D |
        0x37F..=0x1FFF |
        0x200C..=0x200D |
        0x2070..=0x218F |
        0x2C00..=0x2FEF |
        0x3001..=0xD7FF |
        0xF900..=0xFDCF |
        0xFDF0..=0xFFFD |
        0x10000..=0xEFFFF
    )
}

/// `[4a] NameChar`
pub fn is_name(c: u32) -> bool {
    is_name_start(c)
        || matches!(c,
            0x2D /* - */ | 0x2E /* . */ | 0x30..=0x39 |
            0xB7 |
            0x300..=0x36F |
            0x203F..=0x2040
        )
}

/// Name characters minus the colon, as used by Namespaces in XML.
pub fn is_ncname_start(c: char) -> bool {
    c != ':' && is_name_start(c as u32)
}

pub fn is_ncname(c: char) -> bool {
    c != ':' && is_name(c as u32)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn surrogate_split_and_join() {
        let c = 0x1F600;
        let (h, l) = (high_surrogate(c), low_surrogate(c));
        assert!(is_high_surrogate(h));
        assert!(is_low_surrogate(l));
        assert_eq!(supplemental(h, l), c);
        let mut units = [0u16; 2];
        char::from_u32(c).unwrap().encode_utf16(&mut units);
        assert_eq!(units, [h, l]);
    }

    #[test]
    fn lone_surrogates_are_invalid() {
        assert!(!is_valid(0xD800));
        assert!(is_invalid(0xDC00));
        assert!(is_invalid(0xFFFE));
        assert!(!is_invalid(b'a' as u16));
        assert!(!is_invalid(0x9));
        assert!(is_invalid(0x1));
    }
}
