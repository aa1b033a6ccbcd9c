//! Checks made whenever one simple type is used to build another.
//!
//! A referenced base may forbid the requested kind of derivation through its
//! `final` set, and the item type of a list may not itself be a list, either
//! directly or through the members of a union.
//!
//! Reference: <https://www.w3.org/TR/xmlschema-1/#cos-st-restricts>

use crate::datatype::{Datatype, DerivationSet, Variety};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug)]
pub enum ConstraintError {
    ListOfList,
    /// A union reachable from the item type has a list member.
    ListInUnion,
    Final {
        base: String,
        method: DerivationSet,
    },
}

impl fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintError::ListOfList => f.write_str("the item type of a list may not be a list"),
            ConstraintError::ListInUnion => {
                f.write_str("the item type of a list may not be a union with list members")
            }
            ConstraintError::Final { base, method } => {
                write!(f, "type '{base}' does not permit derivation by {method}")
            }
        }
    }
}

impl std::error::Error for ConstraintError {}

/// Whether `datatype` is a list, or a union with a list member at any depth.
pub fn contains_list(datatype: &Datatype) -> bool {
    let mut seen = HashSet::new();
    walk_for_list(datatype, &mut seen)
}

fn walk_for_list(datatype: &Datatype, seen: &mut HashSet<usize>) -> bool {
    let ptr = datatype as *const Datatype as usize;
    if !seen.insert(ptr) {
        return false;
    }
    match datatype.variety() {
        Variety::List(_) => true,
        Variety::Atomic(_) => false,
        Variety::Union(members) => members.iter().any(|m| walk_for_list(m, seen)),
    }
}

/// Checks that `item` may serve as the item type of a list.
pub fn check_list_item(item: &Datatype) -> Result<(), ConstraintError> {
    match item.variety() {
        Variety::List(_) => Err(ConstraintError::ListOfList),
        Variety::Union(_) if contains_list(item) => Err(ConstraintError::ListInUnion),
        _ => Ok(()),
    }
}

/// Checks that `base` does not forbid derivation by `method`.
pub fn check_final(base: &Datatype, method: DerivationSet) -> Result<(), ConstraintError> {
    if base.final_set().contains(method) {
        Err(ConstraintError::Final {
            base: base.name().local.clone(),
            method,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatype::factory;
    use crate::datatype::facets::FacetData;
    use crate::qname::QName;
    use crate::registry::{Grammar, TypeRegistry};
    use assert_matches::assert_matches;
    use std::rc::Rc;

    fn builtin(grammar: &Grammar, local: &str) -> Rc<Datatype> {
        grammar.get(grammar.resolve_global(&QName::xsd(local)).unwrap()).clone()
    }

    #[test]
    fn lists_inside_unions() {
        let grammar = Grammar::new();
        let int = builtin(&grammar, "int");
        let ints = Rc::new(factory::list(&int, &FacetData::new()).unwrap());
        let inner = Rc::new(factory::union(vec![int.clone(), ints.clone()]));
        let outer = factory::union(vec![builtin(&grammar, "string"), inner]);
        assert!(contains_list(&outer));
        assert_matches!(check_list_item(&outer), Err(ConstraintError::ListInUnion));
        assert_matches!(check_list_item(&ints), Err(ConstraintError::ListOfList));
        let flat = factory::union(vec![int.clone(), builtin(&grammar, "date")]);
        assert!(check_list_item(&flat).is_ok());
        assert!(check_list_item(&int).is_ok());
    }

    #[test]
    fn final_sets() {
        let grammar = Grammar::new();
        let base = factory::restrict(&builtin(&grammar, "string"), &FacetData::new())
            .unwrap()
            .finish(QName::new("urn:t", "closed"), false, DerivationSet::RESTRICTION);
        assert_matches!(
            check_final(&base, DerivationSet::RESTRICTION),
            Err(ConstraintError::Final { base, .. }) if base == "closed"
        );
        assert!(check_final(&base, DerivationSet::LIST).is_ok());
    }
}
