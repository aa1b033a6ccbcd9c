use super::{Datatype, Primitive, Variety, builtin};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone, Debug)]
pub enum FacetKind {
    Length,
    MinLength,
    MaxLength,
    Pattern,
    Enumeration,
    WhiteSpace,
    MaxInclusive,
    MaxExclusive,
    MinExclusive,
    MinInclusive,
    TotalDigits,
    FractionDigits,
}

impl FacetKind {
    pub const ALL: [FacetKind; 12] = [
        FacetKind::Length,
        FacetKind::MinLength,
        FacetKind::MaxLength,
        FacetKind::Pattern,
        FacetKind::Enumeration,
        FacetKind::WhiteSpace,
        FacetKind::MaxInclusive,
        FacetKind::MaxExclusive,
        FacetKind::MinExclusive,
        FacetKind::MinInclusive,
        FacetKind::TotalDigits,
        FacetKind::FractionDigits,
    ];

    pub fn from_local_name(name: &str) -> Option<FacetKind> {
        FacetKind::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            FacetKind::Length => "length",
            FacetKind::MinLength => "minLength",
            FacetKind::MaxLength => "maxLength",
            FacetKind::Pattern => "pattern",
            FacetKind::Enumeration => "enumeration",
            FacetKind::WhiteSpace => "whiteSpace",
            FacetKind::MaxInclusive => "maxInclusive",
            FacetKind::MaxExclusive => "maxExclusive",
            FacetKind::MinExclusive => "minExclusive",
            FacetKind::MinInclusive => "minInclusive",
            FacetKind::TotalDigits => "totalDigits",
            FacetKind::FractionDigits => "fractionDigits",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of facet kinds, used for the facets marked `fixed`.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Default, Debug)]
pub struct FacetSet(u16);

impl FacetSet {
    pub const EMPTY: FacetSet = FacetSet(0);

    pub fn contains(self, kind: FacetKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: FacetKind) {
        self.0 |= kind.bit();
    }

    pub fn union(self, other: FacetSet) -> FacetSet {
        FacetSet(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn iter(self) -> impl Iterator<Item = FacetKind> {
        FacetKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<FacetKind> for FacetSet {
    fn from_iter<T: IntoIterator<Item = FacetKind>>(iter: T) -> Self {
        let mut set = FacetSet::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Debug)]
pub enum WhiteSpace {
    Preserve,
    Replace,
    Collapse,
}

impl WhiteSpace {
    pub fn parse(value: &str) -> Option<WhiteSpace> {
        match value {
            "preserve" => Some(WhiteSpace::Preserve),
            "replace" => Some(WhiteSpace::Replace),
            "collapse" => Some(WhiteSpace::Collapse),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WhiteSpace::Preserve => "preserve",
            WhiteSpace::Replace => "replace",
            WhiteSpace::Collapse => "collapse",
        }
    }

    pub fn normalize(self, value: &str) -> Cow<'_, str> {
        let is_space = |c: char| matches!(c, ' ' | '\t' | '\n' | '\r');
        match self {
            WhiteSpace::Preserve => Cow::Borrowed(value),
            WhiteSpace::Replace if !value.contains(['\t', '\n', '\r']) => Cow::Borrowed(value),
            WhiteSpace::Replace => Cow::Owned(value.replace(['\t', '\n', '\r'], " ")),
            WhiteSpace::Collapse => {
                let parts: Vec<&str> = value.split(is_space).filter(|s| !s.is_empty()).collect();
                Cow::Owned(parts.join(" "))
            }
        }
    }
}

/// A value in the value space of an ordered primitive.
#[derive(PartialEq, Clone, Debug)]
pub enum Value {
    Decimal(bigdecimal::BigDecimal),
    Double(f64),
    DateTime(chrono::NaiveDateTime),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::Time(a), Value::Time(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum Bound {
    Inclusive(Value),
    Exclusive(Value),
}

impl Bound {
    pub fn value(&self) -> &Value {
        match self {
            Bound::Inclusive(v) | Bound::Exclusive(v) => v,
        }
    }

    fn admits_above(&self, v: &Value) -> bool {
        match self {
            Bound::Inclusive(min) => matches!(v.partial_cmp(min), Some(Ordering::Greater | Ordering::Equal)),
            Bound::Exclusive(min) => v.partial_cmp(min) == Some(Ordering::Greater),
        }
    }

    fn admits_below(&self, v: &Value) -> bool {
        match self {
            Bound::Inclusive(max) => matches!(v.partial_cmp(max), Some(Ordering::Less | Ordering::Equal)),
            Bound::Exclusive(max) => v.partial_cmp(max) == Some(Ordering::Less),
        }
    }
}

/// A compiled `pattern` facet. The regex is anchored, since a pattern has to
/// match the whole lexical value.
#[derive(Clone)]
pub struct PatternFacet(String, regex::Regex);

impl PatternFacet {
    pub fn new(raw: &str) -> Result<PatternFacet, FacetError> {
        let anchored = format!("^(?:{raw})$");
        regex::Regex::new(&anchored)
            .map(|re| PatternFacet(raw.to_string(), re))
            .map_err(|e| FacetError::InvalidPattern(raw.to_string(), e))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self, value: &str) -> bool {
        self.1.is_match(value)
    }
}

impl PartialEq for PatternFacet {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Debug for PatternFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("PatternFacet").field(&self.0).finish()
    }
}

/// The facets given on one `restriction`, as harvested from the schema
/// document before any of them has been checked.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct FacetData {
    /// Single-valued facets by kind. `pattern` and `enumeration` are kept
    /// in their own fields.
    pub values: BTreeMap<FacetKind, String>,
    pub enumeration: Vec<String>,
    /// All `pattern` values of the step joined with `|`.
    pub pattern: Option<String>,
    pub fixed: FacetSet,
    /// Facet element names that are not facets at all.
    pub unknown: Vec<String>,
}

impl FacetData {
    pub fn new() -> FacetData {
        FacetData::default()
    }

    pub fn with(mut self, kind: FacetKind, value: &str) -> FacetData {
        self.values.insert(kind, value.to_string());
        self
    }

    pub fn fixed(mut self, kind: FacetKind) -> FacetData {
        self.fixed.insert(kind);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
            && self.enumeration.is_empty()
            && self.pattern.is_none()
            && self.unknown.is_empty()
    }
}

#[derive(Debug)]
pub enum FacetError {
    ConflictingFacet(&'static str),
    NotApplicable(FacetKind),
    UnknownFacet(String),
    InvalidInt(FacetKind, String),
    InvalidFacet(FacetKind, String),
    InvalidPattern(String, regex::Error),
    InvalidEnumeration(String),
    FixedFacet(FacetKind),
    NotNarrower(FacetKind),
}

impl fmt::Display for FacetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetError::ConflictingFacet(what) => write!(f, "conflicting facets: {what}"),
            FacetError::NotApplicable(kind) => {
                write!(f, "facet '{kind}' is not applicable to the base type")
            }
            FacetError::UnknownFacet(name) => write!(f, "'{name}' is not a facet"),
            FacetError::InvalidInt(kind, value) => {
                write!(f, "value '{value}' of facet '{kind}' is not a non-negative integer")
            }
            FacetError::InvalidFacet(kind, value) => {
                write!(f, "value '{value}' is not valid for facet '{kind}'")
            }
            FacetError::InvalidPattern(raw, e) => write!(f, "invalid pattern '{raw}': {e}"),
            FacetError::InvalidEnumeration(value) => {
                write!(f, "enumeration value '{value}' is not valid for the base type")
            }
            FacetError::FixedFacet(kind) => {
                write!(f, "facet '{kind}' is fixed in the base type and can not be changed")
            }
            FacetError::NotNarrower(kind) => {
                write!(f, "facet '{kind}' would widen the value space of the base type")
            }
        }
    }
}

impl std::error::Error for FacetError {}

/// The effective facets of a type: its base's facets narrowed by its own.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct Facets {
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// One entry per derivation step; a value has to match all of them.
    pub patterns: Vec<PatternFacet>,
    pub enumeration: Option<Vec<String>>,
    pub white_space: Option<WhiteSpace>,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    pub total_digits: Option<u32>,
    pub fraction_digits: Option<u32>,
    pub fixed: FacetSet,
}

fn parse_usize(kind: FacetKind, value: &str) -> Result<usize, FacetError> {
    value
        .trim()
        .parse()
        .map_err(|_| FacetError::InvalidInt(kind, value.to_string()))
}

fn parse_digits(kind: FacetKind, value: &str) -> Result<u32, FacetError> {
    value
        .trim()
        .parse()
        .map_err(|_| FacetError::InvalidInt(kind, value.to_string()))
}

fn unchanged_if_fixed<T: PartialEq>(
    inherited: &Facets,
    kind: FacetKind,
    old: &Option<T>,
    new: &T,
) -> Result<(), FacetError> {
    if inherited.fixed.contains(kind) && old.as_ref() != Some(new) {
        return Err(FacetError::FixedFacet(kind));
    }
    Ok(())
}

fn max_within(new: &Bound, old: &Bound) -> bool {
    match (new, old) {
        (Bound::Inclusive(v), Bound::Exclusive(m)) => v.partial_cmp(m) == Some(Ordering::Less),
        (Bound::Inclusive(v) | Bound::Exclusive(v), Bound::Inclusive(m) | Bound::Exclusive(m)) => {
            matches!(v.partial_cmp(m), Some(Ordering::Less | Ordering::Equal))
        }
    }
}

fn min_within(new: &Bound, old: &Bound) -> bool {
    match (new, old) {
        (Bound::Inclusive(v), Bound::Exclusive(m)) => v.partial_cmp(m) == Some(Ordering::Greater),
        (Bound::Inclusive(v) | Bound::Exclusive(v), Bound::Inclusive(m) | Bound::Exclusive(m)) => {
            matches!(v.partial_cmp(m), Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

fn bounds_consistent(min: &Bound, max: &Bound) -> bool {
    match min.value().partial_cmp(max.value()) {
        None => true,
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => {
            matches!((min, max), (Bound::Inclusive(_), Bound::Inclusive(_)))
        }
        Some(Ordering::Greater) => false,
    }
}

fn applicable(base: &Datatype, kind: FacetKind) -> bool {
    use FacetKind::*;
    match base.variety() {
        Variety::List(_) => matches!(
            kind,
            Length | MinLength | MaxLength | Pattern | Enumeration | WhiteSpace
        ),
        Variety::Union(_) => matches!(kind, Pattern | Enumeration),
        Variety::Atomic(p) => p.applicable(kind),
    }
}

fn bound_value(base: &Datatype, kind: FacetKind, value: &str) -> Result<Value, FacetError> {
    let lexical = WhiteSpace::Collapse.normalize(value);
    let parsed = match base.variety() {
        Variety::Atomic(p) if builtin::is_valid_lexical(*p, base.lexical, &lexical) => {
            builtin::parse_value(*p, &lexical)
        }
        _ => None,
    };
    parsed.ok_or_else(|| FacetError::InvalidFacet(kind, value.to_string()))
}

impl Facets {
    /// The starting point for list types, whose whitespace is always
    /// collapsed.
    pub(crate) fn collapsed() -> Facets {
        let mut facets = Facets {
            white_space: Some(WhiteSpace::Collapse),
            ..Facets::default()
        };
        facets.fixed.insert(FacetKind::WhiteSpace);
        facets
    }

    /// Narrows `base`'s effective facets by those of one restriction step.
    pub(crate) fn derive(base: &Datatype, data: &FacetData) -> Result<Facets, FacetError> {
        if let Some(name) = data.unknown.first() {
            return Err(FacetError::UnknownFacet(name.clone()));
        }
        let has = |kind| data.values.contains_key(&kind);
        if has(FacetKind::MaxInclusive) && has(FacetKind::MaxExclusive) {
            return Err(FacetError::ConflictingFacet(
                "maxInclusive and maxExclusive in the same step",
            ));
        }
        if has(FacetKind::MinInclusive) && has(FacetKind::MinExclusive) {
            return Err(FacetError::ConflictingFacet(
                "minInclusive and minExclusive in the same step",
            ));
        }
        if has(FacetKind::Length) && (has(FacetKind::MinLength) || has(FacetKind::MaxLength)) {
            return Err(FacetError::ConflictingFacet(
                "length together with minLength or maxLength",
            ));
        }

        let inherited = base.facets();
        let mut facets = inherited.clone();
        facets.fixed = inherited.fixed.union(data.fixed);

        for (&kind, value) in &data.values {
            if !applicable(base, kind) {
                return Err(FacetError::NotApplicable(kind));
            }
            match kind {
                FacetKind::Length => {
                    let n = parse_usize(kind, value)?;
                    if inherited.length.is_some_and(|l| l != n) {
                        return Err(FacetError::ConflictingFacet("length can not be changed"));
                    }
                    facets.length = Some(n);
                }
                FacetKind::MinLength => {
                    let n = parse_usize(kind, value)?;
                    unchanged_if_fixed(inherited, kind, &inherited.min_length, &n)?;
                    if inherited.min_length.is_some_and(|m| n < m) {
                        return Err(FacetError::NotNarrower(kind));
                    }
                    facets.min_length = Some(n);
                }
                FacetKind::MaxLength => {
                    let n = parse_usize(kind, value)?;
                    unchanged_if_fixed(inherited, kind, &inherited.max_length, &n)?;
                    if inherited.max_length.is_some_and(|m| n > m) {
                        return Err(FacetError::NotNarrower(kind));
                    }
                    facets.max_length = Some(n);
                }
                FacetKind::WhiteSpace => {
                    let ws = WhiteSpace::parse(value.trim())
                        .ok_or_else(|| FacetError::InvalidFacet(kind, value.clone()))?;
                    unchanged_if_fixed(inherited, kind, &inherited.white_space, &ws)?;
                    if inherited.white_space.is_some_and(|w| ws < w) {
                        return Err(FacetError::NotNarrower(kind));
                    }
                    facets.white_space = Some(ws);
                }
                FacetKind::TotalDigits => {
                    let n = parse_digits(kind, value)?;
                    if n == 0 {
                        return Err(FacetError::InvalidFacet(kind, value.clone()));
                    }
                    unchanged_if_fixed(inherited, kind, &inherited.total_digits, &n)?;
                    if inherited.total_digits.is_some_and(|t| n > t) {
                        return Err(FacetError::NotNarrower(kind));
                    }
                    facets.total_digits = Some(n);
                }
                FacetKind::FractionDigits => {
                    let n = parse_digits(kind, value)?;
                    unchanged_if_fixed(inherited, kind, &inherited.fraction_digits, &n)?;
                    if inherited.fraction_digits.is_some_and(|d| n > d) {
                        return Err(FacetError::NotNarrower(kind));
                    }
                    facets.fraction_digits = Some(n);
                }
                FacetKind::MaxInclusive | FacetKind::MaxExclusive => {
                    let v = bound_value(base, kind, value)?;
                    let bound = if kind == FacetKind::MaxInclusive {
                        Bound::Inclusive(v)
                    } else {
                        Bound::Exclusive(v)
                    };
                    if inherited.fixed.contains(kind) && inherited.max.as_ref() != Some(&bound) {
                        return Err(FacetError::FixedFacet(kind));
                    }
                    if inherited.max.as_ref().is_some_and(|old| !max_within(&bound, old)) {
                        return Err(FacetError::NotNarrower(kind));
                    }
                    facets.max = Some(bound);
                }
                FacetKind::MinInclusive | FacetKind::MinExclusive => {
                    let v = bound_value(base, kind, value)?;
                    let bound = if kind == FacetKind::MinInclusive {
                        Bound::Inclusive(v)
                    } else {
                        Bound::Exclusive(v)
                    };
                    if inherited.fixed.contains(kind) && inherited.min.as_ref() != Some(&bound) {
                        return Err(FacetError::FixedFacet(kind));
                    }
                    if inherited.min.as_ref().is_some_and(|old| !min_within(&bound, old)) {
                        return Err(FacetError::NotNarrower(kind));
                    }
                    facets.min = Some(bound);
                }
                // held outside the map
                FacetKind::Pattern | FacetKind::Enumeration => {}
            }
        }

        if let Some(raw) = &data.pattern {
            if !applicable(base, FacetKind::Pattern) {
                return Err(FacetError::NotApplicable(FacetKind::Pattern));
            }
            facets.patterns.push(PatternFacet::new(raw)?);
        }

        if !data.enumeration.is_empty() {
            if !applicable(base, FacetKind::Enumeration) {
                return Err(FacetError::NotApplicable(FacetKind::Enumeration));
            }
            let notation = base.primitive() == Some(Primitive::Notation);
            let ws = facets.white_space.unwrap_or(WhiteSpace::Preserve);
            let mut literals = Vec::with_capacity(data.enumeration.len());
            for literal in &data.enumeration {
                // notation literals have already been resolved to uri:local keys
                if !notation && base.validate(literal).is_err() {
                    return Err(FacetError::InvalidEnumeration(literal.clone()));
                }
                literals.push(ws.normalize(literal).into_owned());
            }
            facets.enumeration = Some(literals);
        }

        if let (Some(min), Some(max)) = (facets.min_length, facets.max_length) {
            if min > max {
                return Err(FacetError::ConflictingFacet(
                    "minLength greater than maxLength",
                ));
            }
        }
        if let Some(len) = facets.length {
            if facets.min_length.is_some_and(|m| m > len) || facets.max_length.is_some_and(|m| m < len) {
                return Err(FacetError::ConflictingFacet(
                    "length outside of minLength and maxLength",
                ));
            }
        }
        if let (Some(min), Some(max)) = (&facets.min, &facets.max) {
            if !bounds_consistent(min, max) {
                return Err(FacetError::ConflictingFacet(
                    "lower bound greater than upper bound",
                ));
            }
        }
        if let (Some(total), Some(fraction)) = (facets.total_digits, facets.fraction_digits) {
            if fraction > total {
                return Err(FacetError::ConflictingFacet(
                    "fractionDigits greater than totalDigits",
                ));
            }
        }
        Ok(facets)
    }

    /// Which facets this type constrains.
    pub fn defined(&self) -> FacetSet {
        let mut set = FacetSet::EMPTY;
        let mut mark = |present: bool, kind| {
            if present {
                set.insert(kind);
            }
        };
        mark(self.length.is_some(), FacetKind::Length);
        mark(self.min_length.is_some(), FacetKind::MinLength);
        mark(self.max_length.is_some(), FacetKind::MaxLength);
        mark(!self.patterns.is_empty(), FacetKind::Pattern);
        mark(self.enumeration.is_some(), FacetKind::Enumeration);
        mark(self.white_space.is_some(), FacetKind::WhiteSpace);
        mark(
            matches!(self.max, Some(Bound::Inclusive(_))),
            FacetKind::MaxInclusive,
        );
        mark(
            matches!(self.max, Some(Bound::Exclusive(_))),
            FacetKind::MaxExclusive,
        );
        mark(
            matches!(self.min, Some(Bound::Inclusive(_))),
            FacetKind::MinInclusive,
        );
        mark(
            matches!(self.min, Some(Bound::Exclusive(_))),
            FacetKind::MinExclusive,
        );
        mark(self.total_digits.is_some(), FacetKind::TotalDigits);
        mark(self.fraction_digits.is_some(), FacetKind::FractionDigits);
        set
    }

    pub(crate) fn check_length(&self, units: usize, value: &str) -> Result<(), InvalidFacetValue> {
        let fail = |facet| Err(InvalidFacetValue(facet, value.to_string()));
        if self.length.is_some_and(|l| units != l) {
            return fail(FacetKind::Length);
        }
        if self.min_length.is_some_and(|m| units < m) {
            return fail(FacetKind::MinLength);
        }
        if self.max_length.is_some_and(|m| units > m) {
            return fail(FacetKind::MaxLength);
        }
        Ok(())
    }

    pub(crate) fn check_patterns(&self, value: &str) -> Result<(), InvalidFacetValue> {
        if self.patterns.iter().all(|p| p.is_valid(value)) {
            Ok(())
        } else {
            Err(InvalidFacetValue(FacetKind::Pattern, value.to_string()))
        }
    }

    pub(crate) fn check_bounds(&self, v: &Value, value: &str) -> Result<(), InvalidFacetValue> {
        if let Some(min) = &self.min {
            if !min.admits_above(v) {
                let kind = match min {
                    Bound::Inclusive(_) => FacetKind::MinInclusive,
                    Bound::Exclusive(_) => FacetKind::MinExclusive,
                };
                return Err(InvalidFacetValue(kind, value.to_string()));
            }
        }
        if let Some(max) = &self.max {
            if !max.admits_below(v) {
                let kind = match max {
                    Bound::Inclusive(_) => FacetKind::MaxInclusive,
                    Bound::Exclusive(_) => FacetKind::MaxExclusive,
                };
                return Err(InvalidFacetValue(kind, value.to_string()));
            }
        }
        Ok(())
    }

    pub(crate) fn check_digits(&self, value: &str) -> Result<(), InvalidFacetValue> {
        let (total, fraction) = builtin::digits(value);
        if self.total_digits.is_some_and(|t| total > t) {
            return Err(InvalidFacetValue(FacetKind::TotalDigits, value.to_string()));
        }
        if self.fraction_digits.is_some_and(|f| fraction > f) {
            return Err(InvalidFacetValue(FacetKind::FractionDigits, value.to_string()));
        }
        Ok(())
    }
}

/// A value that is lexically fine but violates the named facet.
#[derive(PartialEq, Eq, Debug)]
pub struct InvalidFacetValue(pub FacetKind, pub String);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn whitespace_normalisation() {
        assert_eq!(WhiteSpace::Preserve.normalize(" a\tb "), " a\tb ");
        assert_eq!(WhiteSpace::Replace.normalize(" a\tb\r\n"), " a b  ");
        assert_eq!(WhiteSpace::Collapse.normalize("  a \t\n b  "), "a b");
        assert!(WhiteSpace::Replace < WhiteSpace::Collapse);
    }

    #[test]
    fn facet_names() {
        for kind in FacetKind::ALL {
            assert_eq!(FacetKind::from_local_name(kind.name()), Some(kind));
        }
        assert_eq!(FacetKind::from_local_name("maxSize"), None);
    }

    #[test]
    fn facet_sets() {
        let mut set = FacetSet::EMPTY;
        set.insert(FacetKind::MaxLength);
        set.insert(FacetKind::TotalDigits);
        assert!(set.contains(FacetKind::MaxLength));
        assert!(!set.contains(FacetKind::MinLength));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![FacetKind::MaxLength, FacetKind::TotalDigits]
        );
    }

    #[test]
    fn patterns_are_anchored() {
        let p = PatternFacet::new("[a-z]+|[0-9]+").unwrap();
        assert!(p.is_valid("abc"));
        assert!(p.is_valid("123"));
        assert!(!p.is_valid("abc123"));
        assert!(PatternFacet::new("(").is_err());
    }

    #[test]
    fn bound_narrowing() {
        let d = |n: i32| Value::Decimal(n.into());
        assert!(max_within(&Bound::Inclusive(d(5)), &Bound::Inclusive(d(5))));
        assert!(!max_within(&Bound::Inclusive(d(5)), &Bound::Exclusive(d(5))));
        assert!(max_within(&Bound::Exclusive(d(5)), &Bound::Exclusive(d(5))));
        assert!(min_within(&Bound::Exclusive(d(0)), &Bound::Inclusive(d(0))));
        assert!(!min_within(&Bound::Inclusive(d(-1)), &Bound::Inclusive(d(0))));
        assert!(bounds_consistent(&Bound::Inclusive(d(1)), &Bound::Inclusive(d(1))));
        assert!(!bounds_consistent(&Bound::Exclusive(d(1)), &Bound::Inclusive(d(1))));
    }
}
