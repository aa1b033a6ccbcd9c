//! A read-only view of a simple type definition, and a wrapper that forwards
//! it to an inner implementation.

use crate::datatype::facets::{FacetKind, FacetSet, Facets, WhiteSpace};
use crate::datatype::{Datatype, DerivationSet, InvalidValue, Primitive, Variety};
use crate::qname::QName;
use std::rc::Rc;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum VarietyTag {
    Atomic,
    List,
    Union,
}

pub trait SimpleTypeDefinition {
    fn name(&self) -> &QName;
    fn is_anonymous(&self) -> bool;
    fn variety(&self) -> VarietyTag;
    fn primitive(&self) -> Option<Primitive>;
    fn base_type(&self) -> Option<&Rc<Datatype>>;
    fn item_type(&self) -> Option<&Rc<Datatype>>;
    fn member_types(&self) -> &[Rc<Datatype>];
    fn facets(&self) -> &Facets;
    fn defined_facets(&self) -> FacetSet;
    fn fixed_facets(&self) -> FacetSet;
    fn is_defined_facet(&self, kind: FacetKind) -> bool;
    fn lexical_enumeration(&self) -> &[String];
    fn lexical_patterns(&self) -> Vec<&str>;
    fn white_space(&self) -> Option<WhiteSpace>;
    fn final_set(&self) -> DerivationSet;
    fn is_final(&self, method: DerivationSet) -> bool;
    fn derived_from(&self, other: &Datatype) -> bool;
    fn validate(&self, value: &str) -> Result<(), InvalidValue>;
    fn is_equal(&self, a: &str, b: &str) -> bool;
}

impl SimpleTypeDefinition for Datatype {
    fn name(&self) -> &QName {
        Datatype::name(self)
    }

    fn is_anonymous(&self) -> bool {
        Datatype::is_anonymous(self)
    }

    fn variety(&self) -> VarietyTag {
        match Datatype::variety(self) {
            Variety::Atomic(_) => VarietyTag::Atomic,
            Variety::List(_) => VarietyTag::List,
            Variety::Union(_) => VarietyTag::Union,
        }
    }

    fn primitive(&self) -> Option<Primitive> {
        Datatype::primitive(self)
    }

    fn base_type(&self) -> Option<&Rc<Datatype>> {
        self.base()
    }

    fn item_type(&self) -> Option<&Rc<Datatype>> {
        Datatype::item_type(self)
    }

    fn member_types(&self) -> &[Rc<Datatype>] {
        Datatype::member_types(self)
    }

    fn facets(&self) -> &Facets {
        Datatype::facets(self)
    }

    fn defined_facets(&self) -> FacetSet {
        Datatype::facets(self).defined()
    }

    fn fixed_facets(&self) -> FacetSet {
        Datatype::facets(self).fixed
    }

    fn is_defined_facet(&self, kind: FacetKind) -> bool {
        self.defined_facets().contains(kind)
    }

    fn lexical_enumeration(&self) -> &[String] {
        Datatype::facets(self).enumeration.as_deref().unwrap_or(&[])
    }

    fn lexical_patterns(&self) -> Vec<&str> {
        Datatype::facets(self)
            .patterns
            .iter()
            .map(|p| p.as_str())
            .collect()
    }

    fn white_space(&self) -> Option<WhiteSpace> {
        Datatype::white_space(self)
    }

    fn final_set(&self) -> DerivationSet {
        Datatype::final_set(self)
    }

    fn is_final(&self, method: DerivationSet) -> bool {
        Datatype::final_set(self).contains(method)
    }

    fn derived_from(&self, other: &Datatype) -> bool {
        Datatype::derived_from(self, other)
    }

    fn validate(&self, value: &str) -> Result<(), InvalidValue> {
        Datatype::validate(self, value)
    }

    fn is_equal(&self, a: &str, b: &str) -> bool {
        Datatype::is_equal(self, a, b)
    }
}

macro_rules! forward {
    ($( fn $name:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty; )*) => {
        $(
            fn $name(&self $(, $arg: $ty)*) -> $ret {
                self.inner.$name($($arg),*)
            }
        )*
    };
}

/// Owns a definition and exposes it unchanged.
#[derive(Clone, Debug)]
pub struct SimpleTypeDelegate<T> {
    inner: T,
}

impl<T: SimpleTypeDefinition> SimpleTypeDelegate<T> {
    pub fn new(inner: T) -> Self {
        SimpleTypeDelegate { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: SimpleTypeDefinition> SimpleTypeDefinition for SimpleTypeDelegate<T> {
    forward! {
        fn name(&self) -> &QName;
        fn is_anonymous(&self) -> bool;
        fn variety(&self) -> VarietyTag;
        fn primitive(&self) -> Option<Primitive>;
        fn base_type(&self) -> Option<&Rc<Datatype>>;
        fn item_type(&self) -> Option<&Rc<Datatype>>;
        fn member_types(&self) -> &[Rc<Datatype>];
        fn facets(&self) -> &Facets;
        fn defined_facets(&self) -> FacetSet;
        fn fixed_facets(&self) -> FacetSet;
        fn is_defined_facet(&self, kind: FacetKind) -> bool;
        fn lexical_enumeration(&self) -> &[String];
        fn lexical_patterns(&self) -> Vec<&str>;
        fn white_space(&self) -> Option<WhiteSpace>;
        fn final_set(&self) -> DerivationSet;
        fn is_final(&self, method: DerivationSet) -> bool;
        fn derived_from(&self, other: &Datatype) -> bool;
        fn validate(&self, value: &str) -> Result<(), InvalidValue>;
        fn is_equal(&self, a: &str, b: &str) -> bool;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatype::facets::FacetData;
    use crate::datatype::factory;
    use crate::registry::Grammar;

    #[test]
    fn delegate_answers_like_the_inner_type() {
        let grammar = Grammar::new();
        let token = grammar.lookup(&QName::xsd("token")).unwrap().clone();
        let data = FacetData {
            enumeration: vec!["a".into(), "b".into()],
            ..FacetData::new().with(FacetKind::MaxLength, "1").fixed(FacetKind::MaxLength)
        };
        let ab = factory::restrict(&token, &data)
            .unwrap()
            .finish(QName::new("urn:t", "ab"), false, DerivationSet::LIST);
        let delegate = SimpleTypeDelegate::new(ab);
        assert_eq!(delegate.name().local, "ab");
        assert_eq!(delegate.variety(), VarietyTag::Atomic);
        assert_eq!(delegate.primitive(), Some(Primitive::String));
        assert_eq!(delegate.lexical_enumeration(), ["a", "b"]);
        assert!(delegate.is_defined_facet(FacetKind::MaxLength));
        assert!(delegate.fixed_facets().contains(FacetKind::MaxLength));
        assert!(delegate.is_final(DerivationSet::LIST));
        assert!(!delegate.is_final(DerivationSet::UNION));
        assert_eq!(delegate.white_space(), Some(WhiteSpace::Collapse));
        assert!(delegate.derived_from(&token));
        assert!(delegate.validate(" a ").is_ok());
        assert!(delegate.validate("c").is_err());
        assert!(delegate.is_equal("a", "a "));
    }
}
