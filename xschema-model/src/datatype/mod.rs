//! Simple-type validators: one [`Datatype`] per atomic, list or union type,
//! sharing their bases through `Rc`.

pub mod builtin;
pub mod facets;
pub mod factory;

use crate::qname::QName;
use facets::{FacetKind, Facets, InvalidFacetValue, WhiteSpace};
use std::fmt;
use std::ops::BitOr;
use std::rc::Rc;

/// The primitive a validator's value space comes from.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Primitive {
    AnySimpleType,
    String,
    Boolean,
    Decimal,
    Float,
    Double,
    Duration,
    DateTime,
    Time,
    Date,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
    HexBinary,
    Base64Binary,
    AnyUri,
    QName,
    Notation,
}

impl Primitive {
    pub const ALL: [Primitive; 20] = [
        Primitive::AnySimpleType,
        Primitive::String,
        Primitive::Boolean,
        Primitive::Decimal,
        Primitive::Float,
        Primitive::Double,
        Primitive::Duration,
        Primitive::DateTime,
        Primitive::Time,
        Primitive::Date,
        Primitive::GYearMonth,
        Primitive::GYear,
        Primitive::GMonthDay,
        Primitive::GDay,
        Primitive::GMonth,
        Primitive::HexBinary,
        Primitive::Base64Binary,
        Primitive::AnyUri,
        Primitive::QName,
        Primitive::Notation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::AnySimpleType => "anySimpleType",
            Primitive::String => "string",
            Primitive::Boolean => "boolean",
            Primitive::Decimal => "decimal",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Duration => "duration",
            Primitive::DateTime => "dateTime",
            Primitive::Time => "time",
            Primitive::Date => "date",
            Primitive::GYearMonth => "gYearMonth",
            Primitive::GYear => "gYear",
            Primitive::GMonthDay => "gMonthDay",
            Primitive::GDay => "gDay",
            Primitive::GMonth => "gMonth",
            Primitive::HexBinary => "hexBinary",
            Primitive::Base64Binary => "base64Binary",
            Primitive::AnyUri => "anyURI",
            Primitive::QName => "QName",
            Primitive::Notation => "NOTATION",
        }
    }

    /// Whether a restriction of this primitive may use `kind`.
    pub fn applicable(self, kind: FacetKind) -> bool {
        use FacetKind::*;
        let common = matches!(kind, Pattern | Enumeration | WhiteSpace);
        let bounds = matches!(kind, MaxInclusive | MaxExclusive | MinInclusive | MinExclusive);
        let lengths = matches!(kind, Length | MinLength | MaxLength);
        match self {
            Primitive::AnySimpleType => common,
            Primitive::String
            | Primitive::AnyUri
            | Primitive::HexBinary
            | Primitive::Base64Binary
            | Primitive::QName
            | Primitive::Notation => common || lengths,
            Primitive::Boolean => matches!(kind, Pattern | WhiteSpace),
            Primitive::Decimal => common || bounds || matches!(kind, TotalDigits | FractionDigits),
            Primitive::Float
            | Primitive::Double
            | Primitive::DateTime
            | Primitive::Time
            | Primitive::Date => common || bounds,
            // no ordered value space is implemented for these
            Primitive::Duration
            | Primitive::GYearMonth
            | Primitive::GYear
            | Primitive::GMonthDay
            | Primitive::GDay
            | Primitive::GMonth => common,
        }
    }
}

/// Extra lexical constraints that derived built-ins put on top of their
/// primitive.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Lexical {
    Language,
    NmToken,
    Name,
    NcName,
    Integer,
}

#[derive(Clone, Debug)]
pub enum Variety {
    Atomic(Primitive),
    List(Rc<Datatype>),
    Union(Vec<Rc<Datatype>>),
}

/// A set of derivation methods, as used by `final`.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Default, Debug)]
pub struct DerivationSet(u8);

impl DerivationSet {
    pub const EMPTY: DerivationSet = DerivationSet(0);
    pub const EXTENSION: DerivationSet = DerivationSet(1);
    pub const RESTRICTION: DerivationSet = DerivationSet(2);
    pub const UNION: DerivationSet = DerivationSet(4);
    pub const LIST: DerivationSet = DerivationSet(8);
    /// `#all` as it applies to simple types.
    pub const ALL: DerivationSet = DerivationSet(2 | 4 | 8);

    pub fn contains(self, other: DerivationSet) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: DerivationSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for DerivationSet {
    type Output = DerivationSet;

    fn bitor(self, rhs: DerivationSet) -> DerivationSet {
        DerivationSet(self.0 | rhs.0)
    }
}

impl fmt::Display for DerivationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (DerivationSet::EXTENSION, "extension"),
            (DerivationSet::RESTRICTION, "restriction"),
            (DerivationSet::LIST, "list"),
            (DerivationSet::UNION, "union"),
        ];
        let present: Vec<&str> = names
            .iter()
            .filter(|(set, _)| self.contains(*set))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&present.join(" "))
    }
}

/// Why a lexical value is not in a type's value space.
#[derive(PartialEq, Eq, Debug)]
pub enum InvalidValue {
    Lexical { type_name: String, value: String },
    Facet { facet: FacetKind, value: String },
    Item { index: usize, source: Box<InvalidValue> },
    NoMatchingMember { value: String },
}

impl From<InvalidFacetValue> for InvalidValue {
    fn from(e: InvalidFacetValue) -> Self {
        InvalidValue::Facet {
            facet: e.0,
            value: e.1,
        }
    }
}

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidValue::Lexical { type_name, value } => {
                write!(f, "'{value}' is not a valid value for '{type_name}'")
            }
            InvalidValue::Facet { facet, value } => {
                write!(f, "'{value}' does not satisfy facet '{facet}'")
            }
            InvalidValue::Item { index, source } => write!(f, "list item {index}: {source}"),
            InvalidValue::NoMatchingMember { value } => {
                write!(f, "'{value}' is not valid for any member of the union")
            }
        }
    }
}

impl std::error::Error for InvalidValue {}

/// One simple type.
#[derive(Clone, Debug)]
pub struct Datatype {
    name: QName,
    anonymous: bool,
    variety: Variety,
    lexical: Option<Lexical>,
    base: Option<Rc<Datatype>>,
    facets: Facets,
    final_set: DerivationSet,
}

impl Datatype {
    pub(crate) fn new(
        variety: Variety,
        lexical: Option<Lexical>,
        base: Option<Rc<Datatype>>,
        facets: Facets,
    ) -> Datatype {
        Datatype {
            name: QName::default(),
            anonymous: true,
            variety,
            lexical,
            base,
            facets,
            final_set: DerivationSet::EMPTY,
        }
    }

    /// Attaches the name and `final` set. Called once, right after
    /// construction and before the type is shared.
    pub fn finish(mut self, name: QName, anonymous: bool, final_set: DerivationSet) -> Datatype {
        self.name = name;
        self.anonymous = anonymous;
        self.final_set = final_set;
        self
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn variety(&self) -> &Variety {
        &self.variety
    }

    pub fn base(&self) -> Option<&Rc<Datatype>> {
        self.base.as_ref()
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn final_set(&self) -> DerivationSet {
        self.final_set
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self.variety {
            Variety::Atomic(p) => Some(p),
            _ => None,
        }
    }

    pub fn item_type(&self) -> Option<&Rc<Datatype>> {
        match &self.variety {
            Variety::List(item) => Some(item),
            _ => None,
        }
    }

    pub fn member_types(&self) -> &[Rc<Datatype>] {
        match &self.variety {
            Variety::Union(members) => members,
            _ => &[],
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.variety, Variety::List(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self.variety, Variety::Union(_))
    }

    pub fn white_space(&self) -> Option<WhiteSpace> {
        match self.variety {
            Variety::Atomic(_) => self.facets.white_space,
            Variety::List(_) => Some(WhiteSpace::Collapse),
            Variety::Union(_) => None,
        }
    }

    fn normalize<'v>(&self, value: &'v str) -> std::borrow::Cow<'v, str> {
        self.white_space()
            .unwrap_or(WhiteSpace::Preserve)
            .normalize(value)
    }

    /// Checks a lexical value against this type and all of its inherited
    /// facets.
    pub fn validate(&self, value: &str) -> Result<(), InvalidValue> {
        match &self.variety {
            Variety::Atomic(p) => self.validate_atomic(*p, value),
            Variety::List(item) => {
                let normalized = self.normalize(value);
                let items: Vec<&str> = if normalized.is_empty() {
                    Vec::new()
                } else {
                    normalized.split(' ').collect()
                };
                for (index, item_value) in items.iter().enumerate() {
                    item.validate(item_value)
                        .map_err(|e| InvalidValue::Item {
                            index,
                            source: Box::new(e),
                        })?;
                }
                self.facets.check_length(items.len(), &normalized)?;
                self.facets.check_patterns(&normalized)?;
                self.check_enumeration(&normalized)
            }
            Variety::Union(members) => {
                let member = members
                    .iter()
                    .find(|m| m.validate(value).is_ok())
                    .ok_or_else(|| InvalidValue::NoMatchingMember {
                        value: value.to_string(),
                    })?;
                let normalized = member.normalize(value);
                self.facets.check_patterns(&normalized)?;
                self.check_enumeration(&normalized)
            }
        }
    }

    fn validate_atomic(&self, p: Primitive, value: &str) -> Result<(), InvalidValue> {
        let normalized = self.normalize(value);
        if !builtin::is_valid_lexical(p, self.lexical, &normalized) {
            return Err(InvalidValue::Lexical {
                type_name: self.type_name(),
                value: normalized.into_owned(),
            });
        }
        if let Some(units) = builtin::length_units(p, &normalized) {
            self.facets.check_length(units, &normalized)?;
        }
        self.facets.check_patterns(&normalized)?;
        if p != Primitive::Notation {
            self.check_enumeration(&normalized)?;
        }
        if self.facets.min.is_some() || self.facets.max.is_some() {
            if let Some(v) = builtin::parse_value(p, &normalized) {
                self.facets.check_bounds(&v, &normalized)?;
            }
        }
        if p == Primitive::Decimal {
            self.facets.check_digits(&normalized)?;
        }
        Ok(())
    }

    fn check_enumeration(&self, normalized: &str) -> Result<(), InvalidValue> {
        match &self.facets.enumeration {
            Some(literals) if !literals.iter().any(|l| self.is_equal(l, normalized)) => {
                Err(InvalidValue::Facet {
                    facet: FacetKind::Enumeration,
                    value: normalized.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// The name used in messages: the QName, or the nearest named ancestor
    /// for anonymous types.
    fn type_name(&self) -> String {
        if !self.anonymous {
            return self.name.local.clone();
        }
        match &self.base {
            Some(base) => base.type_name(),
            None => self.primitive().map(Primitive::name).unwrap_or("").to_string(),
        }
    }

    /// Whether two lexical values denote the same value of this type.
    pub fn is_equal(&self, a: &str, b: &str) -> bool {
        let (a, b) = (self.normalize(a), self.normalize(b));
        match &self.variety {
            Variety::Atomic(p) => {
                match (builtin::parse_value(*p, &a), builtin::parse_value(*p, &b)) {
                    (Some(x), Some(y)) => x == y,
                    _ => a == b,
                }
            }
            Variety::List(item) => {
                let (xs, ys): (Vec<&str>, Vec<&str>) = (a.split(' ').collect(), b.split(' ').collect());
                xs.len() == ys.len() && xs.iter().zip(&ys).all(|(x, y)| item.is_equal(x, y))
            }
            Variety::Union(members) => {
                a == b
                    || members.iter().any(|m| {
                        m.validate(&a).is_ok() && m.validate(&b).is_ok() && m.is_equal(&a, &b)
                    })
            }
        }
    }

    /// Whether this type is `other` or derived from it by restriction.
    pub fn derived_from(&self, other: &Datatype) -> bool {
        let mut current = Some(self);
        while let Some(t) = current {
            if std::ptr::eq(t, other) || (!t.anonymous && !other.anonymous && t.name == other.name) {
                return true;
            }
            current = t.base.as_deref();
        }
        false
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.anonymous {
            write!(f, "(anonymous {})", self.type_name())
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::{Grammar, TypeRegistry};
    use assert_matches::assert_matches;

    fn builtin(grammar: &Grammar, local: &str) -> Rc<Datatype> {
        let index = grammar.resolve_global(&QName::xsd(local)).unwrap();
        grammar.get(index).clone()
    }

    #[test]
    fn derivation_sets() {
        let set = DerivationSet::RESTRICTION | DerivationSet::LIST;
        assert!(set.contains(DerivationSet::LIST));
        assert!(!set.contains(DerivationSet::UNION));
        assert!(DerivationSet::ALL.contains(set));
        assert!(!DerivationSet::EMPTY.contains(DerivationSet::EMPTY));
        assert_eq!(set.to_string(), "restriction list");
    }

    #[test]
    fn integer_family() {
        let grammar = Grammar::new();
        let byte = builtin(&grammar, "byte");
        assert!(byte.validate(" 127 ").is_ok());
        assert_matches!(
            byte.validate("128"),
            Err(InvalidValue::Facet { facet: FacetKind::MaxInclusive, .. })
        );
        assert_matches!(byte.validate("1.5"), Err(InvalidValue::Lexical { .. }));
        let positive = builtin(&grammar, "positiveInteger");
        assert!(positive.validate("1").is_ok());
        assert_matches!(
            positive.validate("0"),
            Err(InvalidValue::Facet { facet: FacetKind::MinInclusive, .. })
        );
        let int = builtin(&grammar, "int");
        assert!(int.derived_from(&builtin(&grammar, "decimal")));
        assert!(!int.derived_from(&builtin(&grammar, "short")));
    }

    #[test]
    fn nmtokens_count_items() {
        let grammar = Grammar::new();
        let nmtokens = builtin(&grammar, "NMTOKENS");
        assert!(nmtokens.is_list());
        assert!(nmtokens.validate("a b\tc").is_ok());
        assert_matches!(
            nmtokens.validate("   "),
            Err(InvalidValue::Facet { facet: FacetKind::MinLength, .. })
        );
        assert_matches!(
            nmtokens.validate("ok b@d"),
            Err(InvalidValue::Item { index: 1, .. })
        );
    }

    #[test]
    fn value_equality() {
        let grammar = Grammar::new();
        let decimal = builtin(&grammar, "decimal");
        assert!(decimal.is_equal("1.0", "1"));
        assert!(decimal.is_equal("+.5", "0.50"));
        let string = builtin(&grammar, "string");
        assert!(!string.is_equal("a ", "a"));
        let token = builtin(&grammar, "token");
        assert!(token.is_equal("a  b", " a b"));
    }

    #[test]
    fn strings_reject_non_chars() {
        let grammar = Grammar::new();
        let string = builtin(&grammar, "string");
        assert!(string.validate("tab\tok").is_ok());
        assert_matches!(string.validate("bell\u{7}"), Err(InvalidValue::Lexical { .. }));
    }
}
