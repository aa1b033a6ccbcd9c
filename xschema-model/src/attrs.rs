//! Attribute checking for the elements making up a simple type.

use crate::datatype::DerivationSet;
use crate::error::{SchemaErrorCode, report};
use crate::qname::{self, QName};
use xschema_syntax::ErrorReporter;
use xschema_syntax::tree::SchemaNode;

/// The checked attributes of one element. Attributes that were missing or
/// invalid are `None`, the error having been reported already.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct AttrValues {
    pub name: Option<String>,
    pub base: Option<QName>,
    pub item_type: Option<QName>,
    pub member_types: Option<Vec<QName>>,
    /// `final`, when given.
    pub final_set: Option<DerivationSet>,
    /// The `value` of a facet.
    pub value: Option<String>,
    /// The `fixed` flag of a facet.
    pub fixed: bool,
}

pub trait AttributeChecker {
    fn check_attributes<'a, N: SchemaNode<'a>>(
        &self,
        node: N,
        is_global: bool,
        reporter: &mut dyn ErrorReporter,
    ) -> AttrValues;
}

/// Parses a `final` or `finalDefault` value.
pub fn parse_derivation_set(text: &str) -> Option<DerivationSet> {
    if text.trim() == "#all" {
        return Some(DerivationSet::ALL);
    }
    text.split_whitespace()
        .try_fold(DerivationSet::EMPTY, |set, token| match token {
            "restriction" => Some(set | DerivationSet::RESTRICTION),
            "list" => Some(set | DerivationSet::LIST),
            "union" => Some(set | DerivationSet::UNION),
            _ => None,
        })
}

/// Resolves a lexical QName against the namespaces in scope at `node`. An
/// unprefixed name takes the default namespace.
pub fn resolve_qname<'a, N: SchemaNode<'a>>(
    node: N,
    attr: &str,
    text: &str,
    reporter: &mut dyn ErrorReporter,
) -> Option<QName> {
    let Some((prefix, local)) = qname::parse_qname(text) else {
        report(
            reporter,
            node,
            SchemaErrorCode::AttInvalidValue,
            &[node.local_name().to_string(), attr.to_string(), text.to_string()],
        );
        return None;
    };
    resolve_prefixed(node, prefix, local, text, reporter)
}

fn resolve_prefixed<'a, N: SchemaNode<'a>>(
    node: N,
    prefix: Option<&str>,
    local: &str,
    text: &str,
    reporter: &mut dyn ErrorReporter,
) -> Option<QName> {
    match (prefix, node.lookup_namespace(prefix)) {
        (_, Some(ns)) => Some(QName::new(ns, local)),
        (None, None) => Some(QName::new("", local)),
        (Some(_), None) => {
            report(
                reporter,
                node,
                SchemaErrorCode::UnboundPrefix,
                &[text.trim().to_string()],
            );
            None
        }
    }
}

fn must_appear<'a, N: SchemaNode<'a>>(node: N, attr: &str, reporter: &mut dyn ErrorReporter) {
    report(
        reporter,
        node,
        SchemaErrorCode::AttMustAppear,
        &[node.local_name().to_string(), attr.to_string()],
    );
}

fn not_allowed<'a, N: SchemaNode<'a>>(node: N, attr: &str, reporter: &mut dyn ErrorReporter) {
    report(
        reporter,
        node,
        SchemaErrorCode::AttNotAllowed,
        &[node.local_name().to_string(), attr.to_string()],
    );
}

fn invalid_value<'a, N: SchemaNode<'a>>(
    node: N,
    attr: &str,
    value: &str,
    reporter: &mut dyn ErrorReporter,
) {
    report(
        reporter,
        node,
        SchemaErrorCode::AttInvalidValue,
        &[node.local_name().to_string(), attr.to_string(), value.to_string()],
    );
}

/// Checks the attributes of the XML Schema elements that define simple
/// types.
#[derive(Clone, Copy, Default, Debug)]
pub struct SchemaAttributeChecker;

impl SchemaAttributeChecker {
    fn check_simple_type<'a, N: SchemaNode<'a>>(
        &self,
        node: N,
        is_global: bool,
        reporter: &mut dyn ErrorReporter,
        values: &mut AttrValues,
    ) {
        match (node.attribute("name"), is_global) {
            (None, true) => must_appear(node, "name", reporter),
            (Some(_), false) => not_allowed(node, "name", reporter),
            (Some(name), true) if !qname::is_ncname(name.trim()) => {
                invalid_value(node, "name", name, reporter)
            }
            (Some(name), true) => values.name = Some(name.trim().to_string()),
            (None, false) => {}
        }
        match (node.attribute("final"), is_global) {
            (Some(_), false) => not_allowed(node, "final", reporter),
            (Some(text), true) => match parse_derivation_set(text) {
                Some(set) => values.final_set = Some(set),
                None => invalid_value(node, "final", text, reporter),
            },
            (None, _) => {}
        }
    }

    fn check_facet<'a, N: SchemaNode<'a>>(
        &self,
        node: N,
        reporter: &mut dyn ErrorReporter,
        values: &mut AttrValues,
    ) {
        match node.attribute("value") {
            Some(value) => values.value = Some(value.to_string()),
            None => must_appear(node, "value", reporter),
        }
        match node.attribute("fixed").map(str::trim) {
            None | Some("false") | Some("0") => {}
            Some("true") | Some("1") => values.fixed = true,
            Some(other) => invalid_value(node, "fixed", other, reporter),
        }
    }
}

impl AttributeChecker for SchemaAttributeChecker {
    fn check_attributes<'a, N: SchemaNode<'a>>(
        &self,
        node: N,
        is_global: bool,
        reporter: &mut dyn ErrorReporter,
    ) -> AttrValues {
        let mut values = AttrValues::default();
        match node.local_name() {
            "simpleType" => self.check_simple_type(node, is_global, reporter, &mut values),
            "restriction" => {
                if let Some(text) = node.attribute("base") {
                    values.base = resolve_qname(node, "base", text, reporter);
                }
            }
            "list" => {
                if let Some(text) = node.attribute("itemType") {
                    values.item_type = resolve_qname(node, "itemType", text, reporter);
                }
            }
            "union" => {
                if let Some(text) = node.attribute("memberTypes") {
                    values.member_types = match qname::parse_qname_list(text) {
                        Some(names) => Some(
                            names
                                .into_iter()
                                .filter_map(|(prefix, local)| {
                                    let text = match prefix {
                                        Some(p) => format!("{p}:{local}"),
                                        None => local.to_string(),
                                    };
                                    resolve_prefixed(node, prefix, local, &text, reporter)
                                })
                                .collect(),
                        ),
                        None => {
                            invalid_value(node, "memberTypes", text, reporter);
                            None
                        }
                    };
                }
            }
            "annotation" => {}
            _ => self.check_facet(node, reporter, &mut values),
        }
        values
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::qname::XSD_NAMESPACE;
    use xschema_syntax::Collector;

    fn first_element<'a, 'input>(doc: &'a roxmltree::Document<'input>) -> roxmltree::Node<'a, 'input> {
        doc.root_element().first_element_child().unwrap()
    }

    #[test]
    fn derivation_sets() {
        assert_eq!(parse_derivation_set("#all"), Some(DerivationSet::ALL));
        assert_eq!(
            parse_derivation_set(" list  union "),
            Some(DerivationSet::LIST | DerivationSet::UNION)
        );
        assert_eq!(parse_derivation_set(""), Some(DerivationSet::EMPTY));
        assert_eq!(parse_derivation_set("extension"), None);
    }

    #[test]
    fn global_simple_type() {
        let doc = roxmltree::Document::parse(
            "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>\
               <xs:simpleType name='t' final='list'/></xs:schema>",
        )
        .unwrap();
        let mut collector = Collector::new();
        let values = SchemaAttributeChecker.check_attributes(first_element(&doc), true, &mut collector);
        assert!(collector.is_empty());
        assert_eq!(values.name.as_deref(), Some("t"));
        assert_eq!(values.final_set, Some(DerivationSet::LIST));
    }

    #[test]
    fn name_rules() {
        let doc = roxmltree::Document::parse(
            "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>\
               <xs:simpleType name='t' final='bogus'/></xs:schema>",
        )
        .unwrap();
        let node = first_element(&doc);
        let mut collector = Collector::new();
        let values = SchemaAttributeChecker.check_attributes(node, false, &mut collector);
        assert_eq!(values.name, None);
        assert_eq!(collector.codes(), vec!["s4s-att-not-allowed", "s4s-att-not-allowed"]);

        let mut collector = Collector::new();
        SchemaAttributeChecker.check_attributes(node, true, &mut collector);
        assert_eq!(collector.codes(), vec!["s4s-att-invalid-value"]);

        let doc = roxmltree::Document::parse(
            "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'><xs:simpleType/></xs:schema>",
        )
        .unwrap();
        let mut collector = Collector::new();
        SchemaAttributeChecker.check_attributes(first_element(&doc), true, &mut collector);
        assert_eq!(collector.codes(), vec!["s4s-att-must-appear"]);
    }

    #[test]
    fn qname_resolution() {
        let doc = roxmltree::Document::parse(
            "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema' xmlns='urn:default'>\
               <xs:union memberTypes='xs:int local q:missing'/></xs:schema>",
        )
        .unwrap();
        let mut collector = Collector::new();
        let values = SchemaAttributeChecker.check_attributes(first_element(&doc), false, &mut collector);
        assert_eq!(
            values.member_types,
            Some(vec![QName::new(XSD_NAMESPACE, "int"), QName::new("urn:default", "local")])
        );
        assert_eq!(collector.codes(), vec!["src-resolve.4"]);
        assert_eq!(collector.reports()[0].args, vec!["q:missing".to_string()]);
    }

    #[test]
    fn unprefixed_without_default_namespace() {
        let doc = roxmltree::Document::parse(
            "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>\
               <xs:restriction base='mine'/></xs:schema>",
        )
        .unwrap();
        let mut collector = Collector::new();
        let values = SchemaAttributeChecker.check_attributes(first_element(&doc), false, &mut collector);
        assert_eq!(values.base, Some(QName::new("", "mine")));
    }

    #[test]
    fn facets() {
        let doc = roxmltree::Document::parse(
            "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>\
               <xs:maxLength value='3' fixed='1'/><xs:pattern fixed='yes'/></xs:schema>",
        )
        .unwrap();
        let max = first_element(&doc);
        let mut collector = Collector::new();
        let values = SchemaAttributeChecker.check_attributes(max, false, &mut collector);
        assert_eq!(values.value.as_deref(), Some("3"));
        assert!(values.fixed);
        let pattern = max.next_sibling_element().unwrap();
        let values = SchemaAttributeChecker.check_attributes(pattern, false, &mut collector);
        assert_eq!(values.value, None);
        assert!(!values.fixed);
        assert_eq!(collector.codes(), vec!["s4s-att-must-appear", "s4s-att-invalid-value"]);
    }
}
