//! Read-only access to the element tree of a parsed schema document.

use std::fmt;

/// An element of a parsed document. Only elements are visited; text,
/// comments and PIs between them are skipped by the navigation methods.
pub trait SchemaNode<'a>: Copy + fmt::Debug {
    fn first_child_element(self) -> Option<Self>;

    fn next_sibling_element(self) -> Option<Self>;

    fn namespace(self) -> Option<&'a str>;

    fn local_name(self) -> &'a str;

    /// Value of the unqualified attribute `name`.
    fn attribute(self, name: &str) -> Option<&'a str>;

    /// The namespace bound to `prefix` at this element, `None` prefix
    /// meaning the default namespace.
    fn lookup_namespace(self, prefix: Option<&str>) -> Option<&'a str>;

    /// Byte offset of the element's start tag in the source text.
    fn position(self) -> usize;

    fn is(self, namespace: &str, local_name: &str) -> bool {
        self.namespace() == Some(namespace) && self.local_name() == local_name
    }

    fn child_elements(self) -> ChildElements<Self> {
        ChildElements {
            next: self.first_child_element(),
        }
    }
}

pub struct ChildElements<N> {
    next: Option<N>,
}

impl<'a, N: SchemaNode<'a>> Iterator for ChildElements<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let node = self.next?;
        self.next = node.next_sibling_element();
        Some(node)
    }
}

impl<'a, 'input: 'a> SchemaNode<'a> for roxmltree::Node<'a, 'input> {
    fn first_child_element(self) -> Option<Self> {
        self.children().find(|n| n.is_element())
    }

    fn next_sibling_element(self) -> Option<Self> {
        self.next_siblings().skip(1).find(|n| n.is_element())
    }

    fn namespace(self) -> Option<&'a str> {
        self.tag_name().namespace()
    }

    fn local_name(self) -> &'a str {
        self.tag_name().name()
    }

    fn attribute(self, name: &str) -> Option<&'a str> {
        roxmltree::Node::attribute(&self, name)
    }

    fn lookup_namespace(self, prefix: Option<&str>) -> Option<&'a str> {
        self.lookup_namespace_uri(prefix)
    }

    fn position(self) -> usize {
        self.range().start
    }
}
