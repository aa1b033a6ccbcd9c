use crate::datatype::{Datatype, builtin};
use crate::qname::QName;
use fnv::{FnvHashMap, FnvHashSet};
use std::rc::Rc;

/// Position of a type in its registry.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone, Debug)]
pub struct TypeIndex(u32);

impl TypeIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Where traversed types are registered and global names are looked up.
pub trait TypeRegistry {
    fn resolve_global(&self, name: &QName) -> Option<TypeIndex>;

    fn get(&self, index: TypeIndex) -> &Rc<Datatype>;

    /// Takes ownership of a finished type. Global types become resolvable by
    /// name; an earlier global of the same name is kept.
    fn add_type(&mut self, datatype: Datatype, is_global: bool) -> TypeIndex;

    /// Whether a notation is declared under the `uri:local` key.
    fn has_notation(&self, key: &str) -> bool;

    fn add_notation(&mut self, key: String);
}

/// The default registry, preloaded with the built-in types.
pub struct Grammar {
    types: Vec<Rc<Datatype>>,
    globals: FnvHashMap<QName, TypeIndex>,
    notations: FnvHashSet<String>,
}

impl Grammar {
    pub fn new() -> Grammar {
        let mut grammar = Grammar {
            types: Vec::new(),
            globals: FnvHashMap::default(),
            notations: FnvHashSet::default(),
        };
        for datatype in builtin::builtins() {
            grammar.push(datatype, true);
        }
        grammar
    }

    fn push(&mut self, datatype: Rc<Datatype>, is_global: bool) -> TypeIndex {
        let index = TypeIndex(self.types.len() as u32);
        if is_global {
            self.globals.entry(datatype.name().clone()).or_insert(index);
        }
        self.types.push(datatype);
        index
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeIndex, &Rc<Datatype>)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeIndex(i as u32), t))
    }

    /// Looks up a global type by name.
    pub fn lookup(&self, name: &QName) -> Option<&Rc<Datatype>> {
        self.resolve_global(name).map(|i| self.get(i))
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::new()
    }
}

impl TypeRegistry for Grammar {
    fn resolve_global(&self, name: &QName) -> Option<TypeIndex> {
        self.globals.get(name).copied()
    }

    fn get(&self, index: TypeIndex) -> &Rc<Datatype> {
        &self.types[index.as_usize()]
    }

    fn add_type(&mut self, datatype: Datatype, is_global: bool) -> TypeIndex {
        self.push(Rc::new(datatype), is_global)
    }

    fn has_notation(&self, key: &str) -> bool {
        self.notations.contains(key)
    }

    fn add_notation(&mut self, key: String) {
        self.notations.insert(key);
    }
}
