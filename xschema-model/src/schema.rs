use crate::attrs::parse_derivation_set;
use crate::datatype::DerivationSet;
use crate::error::{SchemaErrorCode, report};
use crate::qname::{QName, XSD_NAMESPACE};
use crate::registry::{TypeIndex, TypeRegistry};
use crate::traverser::SimpleTypeTraverser;
use fnv::FnvHashMap;
use tracing::debug;
use xschema_syntax::ErrorReporter;
use xschema_syntax::tree::SchemaNode;

/// The top-level components of one `<xs:schema>` element that simple type
/// traversal needs.
pub struct SchemaDocument<'a, N> {
    root: N,
    target_namespace: &'a str,
    final_default: DerivationSet,
    globals: FnvHashMap<QName, N>,
    simple_types: Vec<N>,
}

impl<'a, N: SchemaNode<'a>> SchemaDocument<'a, N> {
    /// Indexes the global simple types below `root` and registers its
    /// notations. Returns `None` when `root` is not a schema element.
    pub fn new(
        root: N,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<SchemaDocument<'a, N>> {
        if !root.is(XSD_NAMESPACE, "schema") {
            report(
                reporter,
                root,
                SchemaErrorCode::NotASchema,
                &[root.local_name().to_string()],
            );
            return None;
        }
        let target_namespace = root.attribute("targetNamespace").unwrap_or("");
        let final_default = match root.attribute("finalDefault") {
            None => DerivationSet::EMPTY,
            Some(text) => {
                // extension does not apply to simple types
                let relevant: Vec<&str> = text.split_whitespace().filter(|t| *t != "extension").collect();
                parse_derivation_set(&relevant.join(" ")).unwrap_or_else(|| {
                    report(
                        reporter,
                        root,
                        SchemaErrorCode::AttInvalidValue,
                        &["schema".to_string(), "finalDefault".to_string(), text.to_string()],
                    );
                    DerivationSet::EMPTY
                })
            }
        };

        let mut doc = SchemaDocument {
            root,
            target_namespace,
            final_default,
            globals: FnvHashMap::default(),
            simple_types: Vec::new(),
        };
        for child in root.child_elements() {
            if child.is(XSD_NAMESPACE, "simpleType") {
                doc.simple_types.push(child);
                let Some(name) = child.attribute("name") else {
                    continue;
                };
                let qname = QName::new(target_namespace, name.trim());
                if doc.globals.contains_key(&qname) {
                    report(
                        reporter,
                        child,
                        SchemaErrorCode::DuplicateGlobal,
                        &["simpleType".to_string(), name.trim().to_string()],
                    );
                } else {
                    doc.globals.insert(qname, child);
                }
            } else if child.is(XSD_NAMESPACE, "notation") {
                if let Some(name) = child.attribute("name") {
                    registry.add_notation(format!("{}:{}", target_namespace, name.trim()));
                }
            }
        }
        debug!(
            target_namespace,
            simple_types = doc.simple_types.len(),
            "indexed schema document"
        );
        Some(doc)
    }

    pub fn root(&self) -> N {
        self.root
    }

    /// The `targetNamespace`, empty when there is none.
    pub fn target_namespace(&self) -> &'a str {
        self.target_namespace
    }

    pub fn final_default(&self) -> DerivationSet {
        self.final_default
    }

    /// The first global `simpleType` declared under `name`.
    pub fn global(&self, name: &QName) -> Option<N> {
        self.globals.get(name).copied()
    }

    /// Every top-level `simpleType`, in document order.
    pub fn simple_types(&self) -> &[N] {
        &self.simple_types
    }
}

/// Builds every global simple type of `doc` into `registry`.
pub fn traverse_schema<'a, N: SchemaNode<'a>>(
    doc: &SchemaDocument<'a, N>,
    registry: &mut dyn TypeRegistry,
    reporter: &mut dyn ErrorReporter,
) -> Vec<(QName, Option<TypeIndex>)> {
    SimpleTypeTraverser::new(doc).traverse_all(registry, reporter)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::Grammar;
    use xschema_syntax::Collector;

    #[test]
    fn rejects_other_roots() {
        let xml = roxmltree::Document::parse("<schema/>").unwrap();
        let mut collector = Collector::new();
        assert!(SchemaDocument::new(xml.root_element(), &mut Grammar::new(), &mut collector).is_none());
        assert_eq!(collector.codes(), vec!["s4s-elt-schema-ns"]);
    }

    #[test]
    fn indexes_globals() {
        let xml = roxmltree::Document::parse(
            "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema' targetNamespace='urn:t' \
               finalDefault='extension list'>\
               <xs:simpleType name='a'/><xs:notation name='gif' public='image/gif'/>\
               <xs:simpleType name='a'/><xs:simpleType/></xs:schema>",
        )
        .unwrap();
        let mut grammar = Grammar::new();
        let mut collector = Collector::new();
        let doc = SchemaDocument::new(xml.root_element(), &mut grammar, &mut collector).unwrap();
        assert_eq!(doc.root().local_name(), "schema");
        assert_eq!(doc.target_namespace(), "urn:t");
        assert_eq!(doc.final_default(), DerivationSet::LIST);
        assert_eq!(doc.simple_types().len(), 3);
        let first = doc.global(&QName::new("urn:t", "a")).unwrap();
        assert_eq!(first.position(), doc.simple_types()[0].position());
        assert!(grammar.has_notation("urn:t:gif"));
        assert_eq!(collector.codes(), vec!["sch-props-correct.2"]);
    }
}
