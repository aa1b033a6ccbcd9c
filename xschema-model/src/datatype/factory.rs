//! Construction of new validators from existing ones.
//!
//! A restriction yields a validator of the same kind as its base, chosen by
//! matching on the base's [`Variety`] rather than by any kind of runtime
//! type lookup.

use super::facets::{FacetData, FacetError, Facets, WhiteSpace};
use super::{Datatype, Primitive, Variety};
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
pub enum ConstructError {
    /// The base has no constructor for derived validators.
    Unavailable,
    Facet(FacetError),
}

impl From<FacetError> for ConstructError {
    fn from(e: FacetError) -> Self {
        ConstructError::Facet(e)
    }
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructError::Unavailable => f.write_str("no validator can be derived from this base"),
            ConstructError::Facet(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConstructError {}

pub(crate) fn any_simple_type() -> Datatype {
    Datatype::new(Variety::Atomic(Primitive::AnySimpleType), None, None, Facets::default())
}

pub(crate) fn primitive(p: Primitive, any: &Rc<Datatype>) -> Datatype {
    let facets = if p == Primitive::String {
        Facets {
            white_space: Some(WhiteSpace::Preserve),
            ..Facets::default()
        }
    } else {
        Facets::collapsed()
    };
    Datatype::new(Variety::Atomic(p), None, Some(any.clone()), facets)
}

/// Derives a new validator of `base`'s kind, narrowed by `data`.
pub fn restrict(base: &Rc<Datatype>, data: &FacetData) -> Result<Datatype, ConstructError> {
    let variety = match base.variety() {
        Variety::Atomic(Primitive::AnySimpleType) => return Err(ConstructError::Unavailable),
        Variety::Atomic(p) => Variety::Atomic(*p),
        Variety::List(item) => Variety::List(item.clone()),
        Variety::Union(members) => Variety::Union(members.clone()),
    };
    let facets = Facets::derive(base, data)?;
    Ok(Datatype::new(variety, base.lexical, Some(base.clone()), facets))
}

/// A list of `item`, narrowed by `data`.
pub fn list(item: &Rc<Datatype>, data: &FacetData) -> Result<Datatype, FacetError> {
    let proto = Datatype::new(Variety::List(item.clone()), None, None, Facets::collapsed());
    if data.is_empty() {
        return Ok(proto);
    }
    let facets = Facets::derive(&proto, data)?;
    Ok(Datatype::new(Variety::List(item.clone()), None, None, facets))
}

pub fn union(members: Vec<Rc<Datatype>>) -> Datatype {
    Datatype::new(Variety::Union(members), None, None, Facets::default())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatype::InvalidValue;
    use crate::datatype::facets::FacetKind;
    use crate::qname::QName;
    use crate::registry::{Grammar, TypeRegistry};
    use assert_matches::assert_matches;

    fn builtin(grammar: &Grammar, local: &str) -> Rc<Datatype> {
        let index = grammar.resolve_global(&QName::xsd(local)).unwrap();
        grammar.get(index).clone()
    }

    #[test]
    fn any_simple_type_has_no_constructor() {
        let grammar = Grammar::new();
        let any = builtin(&grammar, "anySimpleType");
        assert_matches!(
            restrict(&any, &FacetData::new()),
            Err(ConstructError::Unavailable)
        );
    }

    #[test]
    fn restriction_keeps_kind() {
        let grammar = Grammar::new();
        let nmtokens = builtin(&grammar, "NMTOKENS");
        let data = FacetData::new().with(FacetKind::MaxLength, "2");
        let short_list = restrict(&nmtokens, &data).unwrap();
        assert!(short_list.is_list());
        assert!(short_list.validate("a b").is_ok());
        assert_matches!(
            short_list.validate("a b c"),
            Err(InvalidValue::Facet { facet: FacetKind::MaxLength, .. })
        );
        // the inherited minLength still applies
        assert_matches!(
            short_list.validate(""),
            Err(InvalidValue::Facet { facet: FacetKind::MinLength, .. })
        );
    }

    #[test]
    fn fixed_and_narrowing() {
        let grammar = Grammar::new();
        let integer = builtin(&grammar, "integer");
        let widen = FacetData::new().with(FacetKind::FractionDigits, "2");
        assert_matches!(
            restrict(&integer, &widen),
            Err(ConstructError::Facet(FacetError::FixedFacet(FacetKind::FractionDigits)))
        );
        let byte = builtin(&grammar, "byte");
        let wider = FacetData::new().with(FacetKind::MaxInclusive, "200");
        assert_matches!(
            restrict(&byte, &wider),
            Err(ConstructError::Facet(FacetError::NotNarrower(FacetKind::MaxInclusive)))
        );
        let token = builtin(&grammar, "token");
        let looser = FacetData::new().with(FacetKind::WhiteSpace, "preserve");
        assert_matches!(
            restrict(&token, &looser),
            Err(ConstructError::Facet(FacetError::NotNarrower(FacetKind::WhiteSpace)))
        );
    }

    #[test]
    fn facet_conflicts() {
        let grammar = Grammar::new();
        let decimal = builtin(&grammar, "decimal");
        let both = FacetData::new()
            .with(FacetKind::MaxInclusive, "5")
            .with(FacetKind::MaxExclusive, "6");
        assert_matches!(
            restrict(&decimal, &both),
            Err(ConstructError::Facet(FacetError::ConflictingFacet(_)))
        );
        let inverted = FacetData::new()
            .with(FacetKind::MinInclusive, "5")
            .with(FacetKind::MaxInclusive, "1");
        assert_matches!(
            restrict(&decimal, &inverted),
            Err(ConstructError::Facet(FacetError::ConflictingFacet(_)))
        );
        let string = builtin(&grammar, "string");
        let digits = FacetData::new().with(FacetKind::TotalDigits, "3");
        assert_matches!(
            restrict(&string, &digits),
            Err(ConstructError::Facet(FacetError::NotApplicable(FacetKind::TotalDigits)))
        );
        let lengths = FacetData::new()
            .with(FacetKind::MinLength, "4")
            .with(FacetKind::MaxLength, "2");
        assert_matches!(
            restrict(&string, &lengths),
            Err(ConstructError::Facet(FacetError::ConflictingFacet(_)))
        );
    }

    #[test]
    fn enumeration_literals_follow_the_base() {
        let grammar = Grammar::new();
        let int = builtin(&grammar, "int");
        let mut data = FacetData::new();
        data.enumeration = vec!["1".into(), "x".into()];
        assert_matches!(
            restrict(&int, &data),
            Err(ConstructError::Facet(FacetError::InvalidEnumeration(v))) if v == "x"
        );
        data.enumeration = vec!["1".into(), "02".into()];
        let small = restrict(&int, &data).unwrap();
        assert!(small.validate("2").is_ok());
        assert!(small.validate("+1").is_ok());
        assert_matches!(
            small.validate("3"),
            Err(InvalidValue::Facet { facet: FacetKind::Enumeration, .. })
        );
    }

    #[test]
    fn patterns_accumulate() {
        let grammar = Grammar::new();
        let string = Rc::new(
            restrict(&builtin(&grammar, "string"), &FacetData {
                pattern: Some("[a-z]+".into()),
                ..FacetData::new()
            })
            .unwrap(),
        );
        let short = restrict(&string, &FacetData {
            pattern: Some(".{1,3}".into()),
            ..FacetData::new()
        })
        .unwrap();
        assert_eq!(short.facets().patterns.len(), 2);
        assert!(short.validate("abc").is_ok());
        assert!(short.validate("abcd").is_err());
        assert!(short.validate("AB").is_err());
    }

    #[test]
    fn list_facets() {
        let grammar = Grammar::new();
        let int = builtin(&grammar, "int");
        let data = FacetData::new().with(FacetKind::MaxInclusive, "3");
        assert_matches!(
            list(&int, &data),
            Err(FacetError::NotApplicable(FacetKind::MaxInclusive))
        );
        let pair = list(&int, &FacetData::new().with(FacetKind::Length, "2")).unwrap();
        assert!(pair.validate(" 1\n 2 ").is_ok());
        assert_matches!(pair.validate("1 x"), Err(InvalidValue::Item { index: 1, .. }));
    }

    #[test]
    fn unions_take_the_first_member() {
        let grammar = Grammar::new();
        let u = union(vec![builtin(&grammar, "int"), builtin(&grammar, "boolean")]);
        assert!(u.validate("12").is_ok());
        assert!(u.validate("true").is_ok());
        assert_matches!(u.validate("maybe"), Err(InvalidValue::NoMatchingMember { .. }));
    }
}
