use super::facets::{FacetData, FacetKind, Value};
use super::{Datatype, Lexical, Primitive, factory};
use crate::qname::{self, QName};
use fnv::FnvHashMap;
use lazy_static::lazy_static;
use std::rc::Rc;
use std::str::FromStr;
use xschema_syntax::chars;

lazy_static! {
    static ref DECIMAL_RE: regex::Regex = regex::Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").unwrap();
    static ref INTEGER_RE: regex::Regex = regex::Regex::new(r"^[+-]?\d+$").unwrap();
    static ref FLOAT_RE: regex::Regex =
        regex::Regex::new(r"^([+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?|-?INF|NaN)$").unwrap();
    static ref DURATION_RE: regex::Regex =
        regex::Regex::new(r"^-?P(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?$").unwrap();
    static ref DATETIME_RE: regex::Regex = regex::Regex::new(
        r"^-?\d{4,}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$"
    )
    .unwrap();
    static ref DATE_RE: regex::Regex = regex::Regex::new(r"^-?\d{4,}-\d{2}-\d{2}(Z|[+-]\d{2}:\d{2})?$").unwrap();
    static ref TIME_RE: regex::Regex = regex::Regex::new(r"^\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap();
    static ref GYEAR_RE: regex::Regex = regex::Regex::new(r"^-?\d{4,}(Z|[+-]\d{2}:\d{2})?$").unwrap();
    static ref GYEARMONTH_RE: regex::Regex = regex::Regex::new(r"^-?\d{4,}-\d{2}(Z|[+-]\d{2}:\d{2})?$").unwrap();
    static ref GMONTH_RE: regex::Regex = regex::Regex::new(r"^--\d{2}(Z|[+-]\d{2}:\d{2})?$").unwrap();
    static ref GMONTHDAY_RE: regex::Regex = regex::Regex::new(r"^--\d{2}-\d{2}(Z|[+-]\d{2}:\d{2})?$").unwrap();
    static ref GDAY_RE: regex::Regex = regex::Regex::new(r"^---\d{2}(Z|[+-]\d{2}:\d{2})?$").unwrap();
    static ref BASE64_RE: regex::Regex =
        regex::Regex::new(r"^([A-Za-z0-9+/]{4})*([A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$").unwrap();
    static ref HEXBINARY_RE: regex::Regex = regex::Regex::new(r"^([0-9A-Fa-f]{2})*$").unwrap();
    static ref LANG_RE: regex::Regex = regex::Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").unwrap();
}

fn is_valid_name(value: &str) -> bool {
    let mut cs = value.chars();
    cs.next().is_some_and(|c| chars::is_name_start(c as u32)) && cs.all(|c| chars::is_name(c as u32))
}

fn is_valid_nmtoken(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| chars::is_name(c as u32))
}

/// True when `value` starts with a plain four digit year, the only form the
/// calendar checks below understand.
fn four_digit_year(value: &str) -> bool {
    let b = value.as_bytes();
    b.len() > 4 && b[..4].iter().all(u8::is_ascii_digit) && b[4] == b'-'
}

fn is_valid_primitive(p: Primitive, value: &str) -> bool {
    match p {
        Primitive::AnySimpleType | Primitive::String | Primitive::AnyUri => {
            value.chars().all(|c| chars::is_valid(c as u32))
        }
        Primitive::Boolean => matches!(value, "true" | "false" | "1" | "0"),
        Primitive::Decimal => DECIMAL_RE.is_match(value),
        Primitive::Float | Primitive::Double => FLOAT_RE.is_match(value),
        Primitive::Duration => {
            DURATION_RE.is_match(value) && !value.ends_with('P') && !value.ends_with('T')
        }
        Primitive::DateTime => {
            DATETIME_RE.is_match(value) && (!four_digit_year(value) || parse_value(p, value).is_some())
        }
        Primitive::Date => {
            DATE_RE.is_match(value) && (!four_digit_year(value) || parse_value(p, value).is_some())
        }
        Primitive::Time => TIME_RE.is_match(value) && parse_value(p, value).is_some(),
        Primitive::GYearMonth => GYEARMONTH_RE.is_match(value),
        Primitive::GYear => GYEAR_RE.is_match(value),
        Primitive::GMonthDay => GMONTHDAY_RE.is_match(value),
        Primitive::GDay => GDAY_RE.is_match(value),
        Primitive::GMonth => GMONTH_RE.is_match(value),
        Primitive::HexBinary => HEXBINARY_RE.is_match(value),
        Primitive::Base64Binary => {
            let compact: String = value.chars().filter(|c| *c != ' ').collect();
            BASE64_RE.is_match(&compact)
        }
        // prefixes can not be checked without the instance's namespace context
        Primitive::QName | Primitive::Notation => qname::parse_qname(value).is_some(),
    }
}

/// Checks `value`, already whitespace-normalised, against a primitive and
/// an optional extra lexical rule.
pub fn is_valid_lexical(p: Primitive, lexical: Option<Lexical>, value: &str) -> bool {
    if !is_valid_primitive(p, value) {
        return false;
    }
    match lexical {
        None => true,
        Some(Lexical::Language) => LANG_RE.is_match(value),
        Some(Lexical::NmToken) => is_valid_nmtoken(value),
        Some(Lexical::Name) => is_valid_name(value),
        Some(Lexical::NcName) => qname::is_ncname(value),
        Some(Lexical::Integer) => INTEGER_RE.is_match(value),
    }
}

/// Splits a trailing timezone off, returning its offset in seconds east of
/// UTC.
fn split_timezone(value: &str) -> (&str, Option<i32>) {
    if let Some(rest) = value.strip_suffix('Z') {
        return (rest, Some(0));
    }
    let b = value.as_bytes();
    if b.len() >= 6 && matches!(b[b.len() - 6], b'+' | b'-') && b[b.len() - 3] == b':' {
        let (rest, tz) = value.split_at(value.len() - 6);
        let hours: i32 = tz[1..3].parse().unwrap_or(0);
        let minutes: i32 = tz[4..6].parse().unwrap_or(0);
        let offset = (hours * 60 + minutes) * 60;
        return (rest, Some(if tz.starts_with('-') { -offset } else { offset }));
    }
    (value, None)
}

fn decimal_text(value: &str) -> String {
    let (sign, digits) = match value.as_bytes().first() {
        Some(b'-') => ("-", &value[1..]),
        Some(b'+') => ("", &value[1..]),
        _ => ("", value),
    };
    let mut text = String::from(sign);
    if digits.starts_with('.') {
        text.push('0');
    }
    text.push_str(digits);
    if text.ends_with('.') {
        text.push('0');
    }
    text
}

/// The value of an ordered primitive, for bounds and equality. Dates and
/// times with a timezone are moved to UTC; those without are taken as they
/// are.
pub fn parse_value(p: Primitive, value: &str) -> Option<Value> {
    match p {
        Primitive::Decimal => bigdecimal::BigDecimal::from_str(&decimal_text(value))
            .ok()
            .map(Value::Decimal),
        Primitive::Float | Primitive::Double => match value {
            "INF" => Some(Value::Double(f64::INFINITY)),
            "-INF" => Some(Value::Double(f64::NEG_INFINITY)),
            "NaN" => Some(Value::Double(f64::NAN)),
            _ if FLOAT_RE.is_match(value) => value.parse().ok().map(Value::Double),
            _ => None,
        },
        Primitive::DateTime => {
            let (text, tz) = split_timezone(value);
            let dt = chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
            let utc = dt.checked_sub_signed(chrono::Duration::seconds(tz.unwrap_or(0) as i64))?;
            Some(Value::DateTime(utc))
        }
        Primitive::Date => {
            let (text, _) = split_timezone(value);
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(Value::Date)
        }
        Primitive::Time => {
            let (text, tz) = split_timezone(value);
            let t = chrono::NaiveTime::parse_from_str(text, "%H:%M:%S%.f").ok()?;
            let (utc, _) = t.overflowing_sub_signed(chrono::Duration::seconds(tz.unwrap_or(0) as i64));
            Some(Value::Time(utc))
        }
        _ => None,
    }
}

/// The quantity the length facets measure, for primitives that have one.
pub fn length_units(p: Primitive, value: &str) -> Option<usize> {
    match p {
        Primitive::String | Primitive::AnyUri | Primitive::QName | Primitive::Notation => {
            Some(value.chars().count())
        }
        Primitive::HexBinary => Some(value.len() / 2),
        Primitive::Base64Binary => {
            let sextets = value.chars().filter(|c| *c != ' ' && *c != '=').count();
            Some(sextets * 6 / 8)
        }
        _ => None,
    }
}

/// Total and fraction digit counts of a decimal literal, ignoring leading
/// and trailing zeros.
pub fn digits(value: &str) -> (u32, u32) {
    let unsigned = value.trim_start_matches(['+', '-']);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let int = int.trim_start_matches('0');
    let frac = frac.trim_end_matches('0');
    let fraction = frac.len() as u32;
    (int.len() as u32 + fraction, fraction)
}

struct Builtins {
    types: Vec<Rc<Datatype>>,
    by_name: FnvHashMap<&'static str, Rc<Datatype>>,
}

impl Builtins {
    fn add(&mut self, local: &'static str, datatype: Datatype) {
        let named = Rc::new(datatype.finish(QName::xsd(local), false, Default::default()));
        self.by_name.insert(local, named.clone());
        self.types.push(named);
    }

    fn get(&self, local: &str) -> Rc<Datatype> {
        self.by_name[local].clone()
    }

    fn restrict(&mut self, local: &'static str, base: &str, lexical: Option<Lexical>, data: FacetData) {
        let base = self.get(base);
        let mut datatype = factory::restrict(&base, &data).expect("built-in facet values");
        if lexical.is_some() {
            datatype.lexical = lexical;
        }
        self.add(local, datatype);
    }

    fn list(&mut self, local: &'static str, item: &str) {
        let item = self.get(item);
        let data = FacetData::new().with(FacetKind::MinLength, "1");
        let datatype = factory::list(&item, &data).expect("built-in facet values");
        self.add(local, datatype);
    }
}

/// Every built-in simple type, bases before the types derived from them.
pub(crate) fn builtins() -> Vec<Rc<Datatype>> {
    use FacetKind::*;
    let mut b = Builtins {
        types: Vec::new(),
        by_name: FnvHashMap::default(),
    };
    b.add("anySimpleType", factory::any_simple_type());
    let any = b.get("anySimpleType");
    for p in &Primitive::ALL[1..] {
        b.add(p.name(), factory::primitive(*p, &any));
    }

    let data = FacetData::new;
    b.restrict("normalizedString", "string", None, data().with(WhiteSpace, "replace"));
    b.restrict("token", "normalizedString", None, data().with(WhiteSpace, "collapse"));
    b.restrict("language", "token", Some(Lexical::Language), data());
    b.restrict("NMTOKEN", "token", Some(Lexical::NmToken), data());
    b.restrict("Name", "token", Some(Lexical::Name), data());
    b.restrict("NCName", "Name", Some(Lexical::NcName), data());
    for local in ["ID", "IDREF", "ENTITY"] {
        b.restrict(local, "NCName", None, data());
    }
    b.list("NMTOKENS", "NMTOKEN");
    b.list("IDREFS", "IDREF");
    b.list("ENTITIES", "ENTITY");

    b.restrict(
        "integer",
        "decimal",
        Some(Lexical::Integer),
        data().with(FractionDigits, "0").fixed(FractionDigits),
    );
    b.restrict("nonPositiveInteger", "integer", None, data().with(MaxInclusive, "0"));
    b.restrict("negativeInteger", "nonPositiveInteger", None, data().with(MaxInclusive, "-1"));
    let signed = [
        ("long", "integer", "-9223372036854775808", "9223372036854775807"),
        ("int", "long", "-2147483648", "2147483647"),
        ("short", "int", "-32768", "32767"),
        ("byte", "short", "-128", "127"),
    ];
    for (local, base, min, max) in signed {
        b.restrict(local, base, None, data().with(MinInclusive, min).with(MaxInclusive, max));
    }
    b.restrict("nonNegativeInteger", "integer", None, data().with(MinInclusive, "0"));
    let unsigned = [
        ("unsignedLong", "nonNegativeInteger", "18446744073709551615"),
        ("unsignedInt", "unsignedLong", "4294967295"),
        ("unsignedShort", "unsignedInt", "65535"),
        ("unsignedByte", "unsignedShort", "255"),
    ];
    for (local, base, max) in unsigned {
        b.restrict(local, base, None, data().with(MaxInclusive, max));
    }
    b.restrict("positiveInteger", "nonNegativeInteger", None, data().with(MinInclusive, "1"));
    b.types
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lexical_forms() {
        assert!(is_valid_lexical(Primitive::Decimal, None, "-1.50"));
        assert!(is_valid_lexical(Primitive::Decimal, None, ".5"));
        assert!(!is_valid_lexical(Primitive::Decimal, None, "1e3"));
        assert!(is_valid_lexical(Primitive::Double, None, "1e3"));
        assert!(is_valid_lexical(Primitive::Float, None, "-INF"));
        assert!(!is_valid_lexical(Primitive::Float, None, "inf"));
        assert!(is_valid_lexical(Primitive::Duration, None, "P1Y2MT3H"));
        assert!(!is_valid_lexical(Primitive::Duration, None, "P"));
        assert!(!is_valid_lexical(Primitive::Duration, None, "P1DT"));
        assert!(is_valid_lexical(Primitive::Date, None, "2024-02-29Z"));
        assert!(!is_valid_lexical(Primitive::Date, None, "2023-02-29"));
        assert!(is_valid_lexical(Primitive::DateTime, None, "2024-01-01T10:00:00+02:00"));
        assert!(is_valid_lexical(Primitive::Base64Binary, None, "SGVs bG8="));
        assert!(!is_valid_lexical(Primitive::Base64Binary, None, "SGV"));
        assert!(!is_valid_lexical(Primitive::HexBinary, None, "ABC"));
        assert!(is_valid_lexical(Primitive::String, Some(Lexical::Language), "en-GB"));
        assert!(!is_valid_lexical(Primitive::String, Some(Lexical::NcName), "a:b"));
        assert!(is_valid_lexical(Primitive::String, Some(Lexical::Name), "a:b"));
        assert!(is_valid_lexical(Primitive::QName, None, "p:q"));
    }

    #[test]
    fn timezones_move_to_utc() {
        let a = parse_value(Primitive::DateTime, "2024-01-01T10:00:00+02:00");
        let b = parse_value(Primitive::DateTime, "2024-01-01T08:00:00Z");
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(
            parse_value(Primitive::Time, "00:30:00+01:00"),
            parse_value(Primitive::Time, "23:30:00")
        );
    }

    #[test]
    fn digit_counts() {
        assert_eq!(digits("0012.3400"), (4, 2));
        assert_eq!(digits("-0.5"), (1, 1));
        assert_eq!(digits("100"), (3, 0));
    }

    #[test]
    fn lengths() {
        assert_eq!(length_units(Primitive::HexBinary, "0A0B"), Some(2));
        assert_eq!(length_units(Primitive::Base64Binary, "SGVsbG8="), Some(5));
        assert_eq!(length_units(Primitive::String, "é!"), Some(2));
        assert_eq!(length_units(Primitive::Decimal, "1"), None);
    }

    #[test]
    fn registration_order() {
        let types = builtins();
        let names: Vec<String> = types.iter().map(|t| t.name().local.clone()).collect();
        let pos = |n: &str| names.iter().position(|x| x == n).unwrap();
        assert_eq!(pos("anySimpleType"), 0);
        assert!(pos("integer") < pos("long"));
        assert!(pos("NMTOKEN") < pos("NMTOKENS"));
        assert_eq!(names.len(), 20 + 12 + 13);
    }
}
