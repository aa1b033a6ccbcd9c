use nom::IResult;
use nom::Parser;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{all_consuming, opt, verify};
use nom::multi::separated_list1;
use nom::sequence::{delimited, terminated};
use std::fmt;
use xschema_syntax::chars;

pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// A namespace-qualified name. The empty namespace means "no namespace".
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Default, Debug)]
pub struct QName {
    pub namespace: String,
    pub local: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> QName {
        QName {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// A name in the XML Schema namespace.
    pub fn xsd(local: &str) -> QName {
        QName::new(XSD_NAMESPACE, local)
    }

    pub fn is_xsd(&self, local: &str) -> bool {
        self.namespace == XSD_NAMESPACE && self.local == local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// A lexical `prefix:local` pair, not yet resolved against any namespace
/// bindings.
pub type PrefixedName<'a> = (Option<&'a str>, &'a str);

pub fn ncname(i: &str) -> IResult<&str, &str> {
    verify(take_while1(chars::is_ncname), |s: &str| {
        s.chars().next().is_some_and(chars::is_ncname_start)
    })
    .parse(i)
}

pub fn prefixed_name(i: &str) -> IResult<&str, PrefixedName<'_>> {
    (opt(terminated(ncname, char(':'))), ncname).parse(i)
}

/// Parses a whole attribute value as one QName, allowing surrounding
/// whitespace.
pub fn parse_qname(text: &str) -> Option<PrefixedName<'_>> {
    all_consuming(delimited(multispace0, prefixed_name, multispace0))
        .parse(text)
        .ok()
        .map(|(_, name)| name)
}

/// Parses a whitespace-separated list of one or more QNames.
pub fn parse_qname_list(text: &str) -> Option<Vec<PrefixedName<'_>>> {
    all_consuming(delimited(
        multispace0,
        separated_list1(multispace1, prefixed_name),
        multispace0,
    ))
    .parse(text)
    .ok()
    .map(|(_, names)| names)
}

pub fn is_ncname(text: &str) -> bool {
    all_consuming(ncname).parse(text).is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn qnames() {
        assert_eq!(parse_qname("xs:string"), Some((Some("xs"), "string")));
        assert_eq!(parse_qname(" local "), Some((None, "local")));
        assert_eq!(parse_qname("a:b:c"), None);
        assert_eq!(parse_qname("1abc"), None);
        assert_eq!(parse_qname(""), None);
        assert_eq!(parse_qname("a b"), None);
    }

    #[test]
    fn qname_lists() {
        assert_eq!(
            parse_qname_list("  t1 p:t2\n\tt3 "),
            Some(vec![(None, "t1"), (Some("p"), "t2"), (None, "t3")])
        );
        assert_eq!(parse_qname_list(""), None);
        assert_eq!(parse_qname_list("ok :bad"), None);
    }

    #[test]
    fn ncnames() {
        assert!(is_ncname("_a-b.c"));
        assert!(!is_ncname("a:b"));
        assert!(!is_ncname("-a"));
    }

    #[test]
    fn display() {
        assert_eq!(QName::new("", "a").to_string(), "a");
        assert_eq!(QName::xsd("int").to_string(), "{http://www.w3.org/2001/XMLSchema}int");
    }
}
