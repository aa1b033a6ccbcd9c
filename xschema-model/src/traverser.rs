//! Builds validators from `simpleType` elements.
//!
//! Each `simpleType` yields at most one registered [`Datatype`]. Errors come
//! in two grades: structural ones abandon the type being traversed (the
//! traversal returns `None` and the caller decides what to do), advisory ones
//! are reported and the type is still built, with `xs:string` standing in for
//! a base that can not be found.

use crate::attrs::{AttrValues, AttributeChecker, SchemaAttributeChecker};
use crate::constraints;
use crate::datatype::facets::{FacetData, FacetKind, FacetSet};
use crate::datatype::factory::{self, ConstructError};
use crate::datatype::{Datatype, DerivationSet, Primitive};
use crate::error::{SchemaErrorCode, report};
use crate::qname::{self, QName, XSD_NAMESPACE};
use crate::registry::{TypeIndex, TypeRegistry};
use crate::schema::SchemaDocument;
use fnv::{FnvHashMap, FnvHashSet};
use std::rc::Rc;
use tracing::{debug, trace};
use xschema_syntax::ErrorReporter;
use xschema_syntax::tree::SchemaNode;

/// State shared by all the types traversed from one schema document.
#[derive(Default, Debug)]
pub struct TraversalContext {
    anon_count: u32,
    /// The list type whose body is being traversed, if any.
    open_list: Option<QName>,
    in_progress: FnvHashSet<QName>,
    traversed: FnvHashMap<QName, Option<TypeIndex>>,
}

impl TraversalContext {
    pub fn new() -> TraversalContext {
        TraversalContext::default()
    }

    fn anonymous_name(&mut self, namespace: &str) -> QName {
        self.anon_count += 1;
        QName::new(namespace, format!("#S#{}", self.anon_count))
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum VarietyKind {
    Restriction,
    List,
    Union,
}

impl VarietyKind {
    fn method(self) -> DerivationSet {
        match self {
            VarietyKind::Restriction => DerivationSet::RESTRICTION,
            VarietyKind::List => DerivationSet::LIST,
            VarietyKind::Union => DerivationSet::UNION,
        }
    }
}

pub struct SimpleTypeTraverser<'d, 'a, N, C = SchemaAttributeChecker> {
    doc: &'d SchemaDocument<'a, N>,
    checker: C,
}

impl<'d, 'a, N: SchemaNode<'a>> SimpleTypeTraverser<'d, 'a, N> {
    pub fn new(doc: &'d SchemaDocument<'a, N>) -> Self {
        SimpleTypeTraverser {
            doc,
            checker: SchemaAttributeChecker,
        }
    }
}

impl<'d, 'a, N: SchemaNode<'a>, C: AttributeChecker> SimpleTypeTraverser<'d, 'a, N, C> {
    pub fn with_checker(doc: &'d SchemaDocument<'a, N>, checker: C) -> Self {
        SimpleTypeTraverser { doc, checker }
    }

    /// Traverses every top-level `simpleType` of the document, in document
    /// order, returning the outcome for each named one.
    pub fn traverse_all(
        &self,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Vec<(QName, Option<TypeIndex>)> {
        let mut ctx = TraversalContext::new();
        let mut seen = FnvHashSet::default();
        let mut results = Vec::new();
        for &node in self.doc.simple_types() {
            let result = self.traverse_global(node, &mut ctx, registry, reporter);
            if let Some(name) = self.global_name(node) {
                if seen.insert(name.clone()) {
                    results.push((name, result));
                }
            }
        }
        results
    }

    fn global_name(&self, node: N) -> Option<QName> {
        node.attribute("name")
            .map(|name| QName::new(self.doc.target_namespace(), name.trim()))
    }

    /// Traverses a top-level `simpleType`. A name already traversed in this
    /// context gives the earlier outcome.
    pub fn traverse_global(
        &self,
        node: N,
        ctx: &mut TraversalContext,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<TypeIndex> {
        if let Some(done) = self.global_name(node).and_then(|n| ctx.traversed.get(&n).copied()) {
            return done;
        }
        let attrs = self.checker.check_attributes(node, true, reporter);
        let name = QName::new(self.doc.target_namespace(), attrs.name.clone()?);
        ctx.in_progress.insert(name.clone());
        let result = self.traverse(node, attrs, true, ctx, registry, reporter);
        ctx.in_progress.remove(&name);
        ctx.traversed.insert(name, result);
        result
    }

    /// Traverses a `simpleType` nested inside another component.
    pub fn traverse_local(
        &self,
        node: N,
        ctx: &mut TraversalContext,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<TypeIndex> {
        let attrs = self.checker.check_attributes(node, false, reporter);
        self.traverse(node, attrs, false, ctx, registry, reporter)
    }

    fn traverse(
        &self,
        node: N,
        attrs: AttrValues,
        is_global: bool,
        ctx: &mut TraversalContext,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<TypeIndex> {
        let namespace = self.doc.target_namespace();
        let (name, anonymous) = match (&attrs.name, is_global) {
            (Some(local), true) => (QName::new(namespace, local.as_str()), false),
            _ => (ctx.anonymous_name(namespace), true),
        };
        let display = attrs.name.clone().unwrap_or_default();

        let content = check_content(node, node.first_child_element(), false, reporter)?;
        let kind = if content.is(XSD_NAMESPACE, "restriction") {
            VarietyKind::Restriction
        } else if content.is(XSD_NAMESPACE, "list") {
            VarietyKind::List
        } else if content.is(XSD_NAMESPACE, "union") {
            VarietyKind::Union
        } else {
            report(
                reporter,
                content,
                SchemaErrorCode::FeatureUnsupported,
                &[content.local_name().to_string()],
            );
            return None;
        };
        if let Some(extra) = content.next_sibling_element() {
            report(reporter, extra, SchemaErrorCode::ContentError, &[display.clone()]);
        }
        let content_attrs = self.checker.check_attributes(content, false, reporter);

        if kind == VarietyKind::List {
            if let Some(open) = &ctx.open_list {
                trace!(%open, list = %name, "list nested in open list");
                report(reporter, content, SchemaErrorCode::CosListOfAtomic, &[display]);
                return None;
            }
            trace!(%name, "open list");
            ctx.open_list = Some(name.clone());
        }
        let built = self.build(kind, content, &content_attrs, &display, ctx, registry, reporter);
        if kind == VarietyKind::List && ctx.open_list.as_ref() == Some(&name) {
            trace!(%name, "close list");
            ctx.open_list = None;
        }

        let final_set = if is_global {
            attrs.final_set.unwrap_or(self.doc.final_default())
        } else {
            DerivationSet::EMPTY
        };
        let datatype = built?.finish(name, anonymous, final_set);
        debug!(name = %datatype.name(), ?kind, global = is_global, "registered simple type");
        Some(registry.add_type(datatype, is_global))
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        kind: VarietyKind,
        content: N,
        attrs: &AttrValues,
        display: &str,
        ctx: &mut TraversalContext,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<Datatype> {
        if kind == VarietyKind::Union {
            return self.build_union(content, attrs, display, ctx, registry, reporter);
        }
        let named = match kind {
            VarietyKind::List => attrs.item_type.as_ref(),
            _ => attrs.base.as_ref(),
        };
        let (base, rest) = match named {
            Some(base_name) => {
                let base = self.referenced_type(base_name, kind, content, display, ctx, registry, reporter)?;
                let rest = check_content(content, content.first_child_element(), true, reporter);
                (base, rest)
            }
            None => {
                let Some(child) = check_content(content, content.first_child_element(), true, reporter)
                else {
                    report(reporter, content, SchemaErrorCode::EmptySimpleType, &[display.to_string()]);
                    return None;
                };
                let base = self.inline_type(child, display, ctx, registry, reporter)?;
                if ctx.open_list.is_some() && constraints::check_list_item(&base).is_err() {
                    report(reporter, child, SchemaErrorCode::CosListOfAtomic, &[display.to_string()]);
                    return None;
                }
                // an inline item type must be the last child of a list
                let next = child.next_sibling_element();
                let rest = match kind {
                    VarietyKind::Restriction => check_content(content, next, true, reporter),
                    _ => next,
                };
                (base, rest)
            }
        };

        if kind == VarietyKind::List {
            if let Some(extra) = rest {
                report(
                    reporter,
                    extra,
                    SchemaErrorCode::ListUnionRestrictionError,
                    &[display.to_string()],
                );
            }
            return match factory::list(&base, &FacetData::new()) {
                Ok(list) => Some(list),
                Err(e) => {
                    report(
                        reporter,
                        content,
                        SchemaErrorCode::DatatypeFacetError,
                        &[display.to_string(), e.to_string()],
                    );
                    None
                }
            };
        }

        let data = self.harvest_facets(rest, &base, display, registry, reporter);
        match factory::restrict(&base, &data) {
            Ok(datatype) => Some(datatype),
            Err(ConstructError::Unavailable) => {
                debug!(base = %base, "no validator constructed for restriction");
                None
            }
            Err(ConstructError::Facet(e)) => {
                report(
                    reporter,
                    content,
                    SchemaErrorCode::DatatypeFacetError,
                    &[display.to_string(), e.to_string()],
                );
                None
            }
        }
    }

    fn build_union(
        &self,
        content: N,
        attrs: &AttrValues,
        display: &str,
        ctx: &mut TraversalContext,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<Datatype> {
        let mut members = Vec::new();
        if let Some(names) = &attrs.member_types {
            for member_name in names {
                let member = self.referenced_type(
                    member_name,
                    VarietyKind::Union,
                    content,
                    display,
                    ctx,
                    registry,
                    reporter,
                )?;
                members.push(member);
            }
        }
        let optional = attrs.member_types.is_some();
        let mut next = check_content(content, content.first_child_element(), true, reporter);
        if next.is_none() && !optional {
            report(reporter, content, SchemaErrorCode::EmptySimpleType, &[display.to_string()]);
            return None;
        }
        while let Some(child) = next {
            let member = self.inline_type(child, display, ctx, registry, reporter)?;
            if ctx.open_list.is_some() && constraints::contains_list(&member) {
                report(reporter, child, SchemaErrorCode::CosListOfAtomic, &[display.to_string()]);
                return None;
            }
            members.push(member);
            next = child.next_sibling_element();
        }
        Some(factory::union(members))
    }

    /// Traverses an inline `simpleType` child standing for a base, item or
    /// member type.
    fn inline_type(
        &self,
        child: N,
        display: &str,
        ctx: &mut TraversalContext,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<Rc<Datatype>> {
        if !child.is(XSD_NAMESPACE, "simpleType") {
            report(
                reporter,
                child,
                SchemaErrorCode::ListUnionRestrictionError,
                &[display.to_string()],
            );
            return None;
        }
        match self.traverse_local(child, ctx, registry, reporter) {
            Some(index) => Some(registry.get(index).clone()),
            None => {
                report(
                    reporter,
                    child,
                    SchemaErrorCode::UnknownBaseDatatype,
                    &[display.to_string()],
                );
                None
            }
        }
    }

    /// Resolves a type named by `base`, `itemType` or `memberTypes` and
    /// checks that it may be used that way.
    #[allow(clippy::too_many_arguments)]
    fn referenced_type(
        &self,
        name: &QName,
        kind: VarietyKind,
        content: N,
        display: &str,
        ctx: &mut TraversalContext,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<Rc<Datatype>> {
        // the ur-type can not be restricted directly
        let found = if kind == VarietyKind::Restriction && *name == QName::xsd("anySimpleType") {
            None
        } else {
            self.find_type(name, ctx, registry, reporter)
        };
        let base = match found {
            Some(base) => base,
            None => {
                report(
                    reporter,
                    content,
                    SchemaErrorCode::BaseTypeNotFound,
                    &[name.to_string(), "type definition".to_string()],
                );
                let string = registry.resolve_global(&QName::xsd("string"))?;
                registry.get(string).clone()
            }
        };
        if let Err(e) = constraints::check_final(&base, kind.method()) {
            report(
                reporter,
                content,
                SchemaErrorCode::FinalViolation,
                &[display.to_string(), e.to_string()],
            );
        }
        if ctx.open_list.is_some() && constraints::check_list_item(&base).is_err() {
            report(reporter, content, SchemaErrorCode::CosListOfAtomic, &[display.to_string()]);
            return None;
        }
        Some(base)
    }

    /// Looks a type up by name, traversing a global of this document on
    /// demand when it has not been reached yet.
    fn find_type(
        &self,
        name: &QName,
        ctx: &mut TraversalContext,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<Rc<Datatype>> {
        if let Some(index) = registry.resolve_global(name) {
            return Some(registry.get(index).clone());
        }
        if name.namespace != self.doc.target_namespace()
            || ctx.in_progress.contains(name)
            || ctx.traversed.contains_key(name)
        {
            return None;
        }
        let node = self.doc.global(name)?;
        debug!(%name, "traversing forward reference");
        let outer = ctx.open_list.take();
        let index = self.traverse_global(node, ctx, registry, reporter);
        ctx.open_list = outer;
        index.map(|i| registry.get(i).clone())
    }

    fn harvest_facets(
        &self,
        first: Option<N>,
        base: &Datatype,
        display: &str,
        registry: &mut dyn TypeRegistry,
        reporter: &mut dyn ErrorReporter,
    ) -> FacetData {
        let notation = base.primitive() == Some(Primitive::Notation);
        let string_family = base.primitive() == Some(Primitive::String);
        let mut data = FacetData::new();
        let mut patterns = Vec::new();
        let mut seen = FacetSet::EMPTY;
        let mut next = first;
        while let Some(facet) = next {
            next = facet.next_sibling_element();
            let local = facet.local_name();
            if local == "annotation" || local == "simpleType" {
                report(
                    reporter,
                    facet,
                    SchemaErrorCode::ListUnionRestrictionError,
                    &[display.to_string()],
                );
                continue;
            }
            let attrs = self.checker.check_attributes(facet, false, reporter);
            let Some(value) = attrs.value else {
                continue;
            };
            match FacetKind::from_local_name(local) {
                Some(FacetKind::Enumeration) if notation => {
                    let Some(key) = self.notation_key(facet, &value, reporter) else {
                        continue;
                    };
                    if !registry.has_notation(&key) {
                        report(
                            reporter,
                            facet,
                            SchemaErrorCode::NotationNotFound,
                            &[value.clone(), "notation declaration".to_string()],
                        );
                    }
                    data.enumeration.push(key);
                }
                Some(FacetKind::Enumeration) => data.enumeration.push(value),
                Some(FacetKind::Pattern) => patterns.push(value),
                Some(kind) => {
                    if seen.contains(kind) {
                        report(
                            reporter,
                            facet,
                            SchemaErrorCode::DatatypeError,
                            &[format!("The facet '{local}' is defined more than once.")],
                        );
                    }
                    seen.insert(kind);
                    data.values.insert(kind, value);
                    if attrs.fixed && fixable(kind, string_family) {
                        data.fixed.insert(kind);
                    }
                }
                None => data.unknown.push(local.to_string()),
            }
        }
        if !patterns.is_empty() {
            data.pattern = Some(patterns.join("|"));
        }
        data
    }

    /// The `uri:local` key of a NOTATION enumeration literal. An unprefixed
    /// literal names a notation of this document; an unbound prefix leaves
    /// the key without a namespace.
    fn notation_key(&self, facet: N, value: &str, reporter: &mut dyn ErrorReporter) -> Option<String> {
        let Some((prefix, local)) = qname::parse_qname(value) else {
            report(
                reporter,
                facet,
                SchemaErrorCode::AttInvalidValue,
                &[facet.local_name().to_string(), "value".to_string(), value.to_string()],
            );
            return None;
        };
        let namespace = match prefix {
            None => self.doc.target_namespace(),
            Some(_) => facet.lookup_namespace(prefix).unwrap_or(""),
        };
        Some(format!("{namespace}:{local}"))
    }
}

fn fixable(kind: FacetKind, string_family: bool) -> bool {
    match kind {
        FacetKind::MinLength
        | FacetKind::MaxLength
        | FacetKind::MaxInclusive
        | FacetKind::MaxExclusive
        | FacetKind::MinInclusive
        | FacetKind::MinExclusive
        | FacetKind::TotalDigits
        | FacetKind::FractionDigits => true,
        FacetKind::WhiteSpace => string_family,
        FacetKind::Length | FacetKind::Pattern | FacetKind::Enumeration => false,
    }
}

/// Skips one leading `annotation`, returning the element after it. Missing
/// content is reported unless it is optional.
fn check_content<'a, N: SchemaNode<'a>>(
    parent: N,
    first: Option<N>,
    optional: bool,
    reporter: &mut dyn ErrorReporter,
) -> Option<N> {
    let mut content = first;
    if let Some(c) = content {
        if c.is(XSD_NAMESPACE, "annotation") {
            content = c.next_sibling_element();
        }
    }
    if content.is_none() && !optional {
        report(
            reporter,
            parent,
            SchemaErrorCode::EltMustMatch,
            &[parent.local_name().to_string()],
        );
    }
    content
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::Grammar;
    use xschema_syntax::Collector;

    fn schema(body: &str) -> String {
        format!(
            "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema' \
               xmlns='urn:t' targetNamespace='urn:t'>{body}</xs:schema>"
        )
    }

    #[test]
    fn anonymous_names_count_up() {
        let mut ctx = TraversalContext::new();
        assert_eq!(ctx.anonymous_name("urn:t").local, "#S#1");
        assert_eq!(ctx.anonymous_name("urn:t").local, "#S#2");
    }

    #[test]
    fn fixed_bits() {
        assert!(fixable(FacetKind::MaxLength, false));
        assert!(!fixable(FacetKind::Length, true));
        assert!(fixable(FacetKind::WhiteSpace, true));
        assert!(!fixable(FacetKind::WhiteSpace, false));
    }

    #[test]
    fn guard_is_cleared_after_list() {
        let text = schema(
            "<xs:simpleType name='l'><xs:list itemType='xs:int'/></xs:simpleType>\
             <xs:simpleType name='l2'><xs:list itemType='xs:date'/></xs:simpleType>",
        );
        let xml = roxmltree::Document::parse(&text).unwrap();
        let mut grammar = Grammar::new();
        let mut collector = Collector::new();
        let doc = SchemaDocument::new(xml.root_element(), &mut grammar, &mut collector).unwrap();
        let traverser = SimpleTypeTraverser::new(&doc);
        let mut ctx = TraversalContext::new();
        for &node in doc.simple_types() {
            assert!(traverser.traverse_global(node, &mut ctx, &mut grammar, &mut collector).is_some());
            assert_eq!(ctx.open_list, None);
        }
        assert!(collector.is_empty(), "{:?}", collector.reports());
    }

    struct SealEverything;

    impl AttributeChecker for SealEverything {
        fn check_attributes<'a, N: SchemaNode<'a>>(
            &self,
            node: N,
            is_global: bool,
            reporter: &mut dyn ErrorReporter,
        ) -> AttrValues {
            let mut values = SchemaAttributeChecker.check_attributes(node, is_global, reporter);
            if is_global {
                values.final_set = Some(DerivationSet::ALL);
            }
            values
        }
    }

    #[test]
    fn custom_attribute_checker() {
        let text = schema(
            "<xs:simpleType name='a'><xs:restriction base='xs:int'/></xs:simpleType>\
             <xs:simpleType name='b'><xs:restriction base='a'/></xs:simpleType>",
        );
        let xml = roxmltree::Document::parse(&text).unwrap();
        let mut grammar = Grammar::new();
        let mut collector = Collector::new();
        let doc = SchemaDocument::new(xml.root_element(), &mut grammar, &mut collector).unwrap();
        let results = SimpleTypeTraverser::with_checker(&doc, SealEverything)
            .traverse_all(&mut grammar, &mut collector);
        let a = grammar.get(results[0].1.unwrap());
        assert_eq!(a.final_set(), DerivationSet::ALL);
        assert!(results[1].1.is_some());
        assert_eq!(collector.codes(), vec!["st-props-correct.3"]);
    }

    #[test]
    fn missing_content() {
        let text = schema(
            "<xs:simpleType name='a'><xs:annotation/></xs:simpleType>\
             <xs:simpleType name='b'><xs:extension base='xs:int'/></xs:simpleType>\
             <xs:simpleType name='c'><xs:restriction/></xs:simpleType>",
        );
        let xml = roxmltree::Document::parse(&text).unwrap();
        let mut grammar = Grammar::new();
        let mut collector = Collector::new();
        let doc = SchemaDocument::new(xml.root_element(), &mut grammar, &mut collector).unwrap();
        let results = SimpleTypeTraverser::new(&doc).traverse_all(&mut grammar, &mut collector);
        assert!(results.iter().all(|(_, r)| r.is_none()));
        assert_eq!(
            collector.codes(),
            vec!["s4s-elt-must-match", "FeatureUnsupported", "EmptySimpleType"]
        );
    }
}
