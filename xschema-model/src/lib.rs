//! Simple type derivation for XML Schema documents.
//!
//! [`schema::SchemaDocument`] indexes a parsed `<xs:schema>` element and
//! [`traverser::SimpleTypeTraverser`] turns each of its `simpleType`
//! elements into a [`datatype::Datatype`] registered in a
//! [`registry::TypeRegistry`].

pub mod attrs;
pub mod constraints;
pub mod datatype;
pub mod delegate;
pub mod error;
pub mod qname;
pub mod registry;
pub mod schema;
pub mod traverser;

pub use datatype::{Datatype, DerivationSet, InvalidValue, Primitive, Variety};
pub use error::SchemaErrorCode;
pub use qname::{QName, XSD_NAMESPACE};
pub use registry::{Grammar, TypeIndex, TypeRegistry};
pub use schema::{SchemaDocument, traverse_schema};
pub use traverser::{SimpleTypeTraverser, TraversalContext};
