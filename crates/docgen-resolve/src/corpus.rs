//! Name-location table and file partition built from the export.

use std::collections::BTreeMap;
use std::collections::btree_map;

use docgen_export::{Declaration, ModuleDoc};

use crate::ResolveError;
use crate::identifier::Identifier;
use crate::resolver::RootResolver;

/// Project sentinel for the generator's own sources.
pub const SELF_PROJECT: &str = ".";

/// Declaration name to owning module.
///
/// Every declaration, constructor and structure field is a key, plus the
/// synthesized `<name>.mk` constructor of each structure. A name seen twice
/// keeps its last owner.
#[derive(Clone, Debug, Default)]
pub struct NameTable {
    entries: BTreeMap<String, Identifier>,
}

impl NameTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as owned by `owner`, replacing any previous owner.
    pub fn insert(&mut self, name: impl Into<String>, owner: &Identifier) {
        let name = name.into();
        if let Some(previous) = self.entries.insert(name.clone(), owner.clone())
            && previous != *owner
        {
            tracing::debug!(%name, %previous, owner = %owner, "Name defined in more than one module");
        }
    }

    /// Owning module of `name`.
    pub fn get(&self, name: &str) -> Option<&Identifier> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in lexicographic order with their owners.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Identifier> {
        self.entries.iter()
    }

    /// Names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// The resolved export: who owns each name and what each module contains.
#[derive(Debug, Default)]
pub struct Corpus {
    names: NameTable,
    partition: BTreeMap<Identifier, Vec<Declaration>>,
    module_docs: BTreeMap<Identifier, Vec<ModuleDoc>>,
    by_path: BTreeMap<String, Identifier>,
}

impl Corpus {
    /// Resolve every declaration and module doc and partition them by module.
    ///
    /// Declarations and module docs belonging to `self_project` are dropped.
    /// Modules that only carry module docs still get an empty partition entry.
    /// Any filename outside all roots is an error.
    pub fn separate(
        decls: Vec<Declaration>,
        mod_docs: BTreeMap<String, Vec<ModuleDoc>>,
        resolver: &RootResolver,
        self_project: &str,
    ) -> Result<Self, ResolveError> {
        let mut corpus = Self::default();
        let mut resolved: BTreeMap<String, Identifier> = BTreeMap::new();

        for decl in decls {
            let id = match resolved.get(&decl.filename) {
                Some(id) => id.clone(),
                None => {
                    let id = resolver.resolve(&decl.filename)?;
                    resolved.insert(decl.filename.clone(), id.clone());
                    id
                }
            };
            if id.project() == self_project {
                continue;
            }

            corpus.names.insert(decl.name.as_str(), &id);
            for (name, _) in &decl.constructors {
                corpus.names.insert(name.as_str(), &id);
            }
            for (name, _) in &decl.structure_fields {
                corpus.names.insert(name.as_str(), &id);
            }
            if !decl.structure_fields.is_empty() {
                corpus.names.insert(format!("{}.mk", decl.name), &id);
            }
            corpus.by_path.insert(decl.filename.clone(), id.clone());
            corpus.partition.entry(id).or_default().push(decl);
        }

        for (filename, docs) in mod_docs {
            let id = match resolved.get(&filename) {
                Some(id) => id.clone(),
                None => resolver.resolve(&filename)?,
            };
            if id.project() == self_project {
                continue;
            }
            corpus.partition.entry(id.clone()).or_default();
            corpus.by_path.insert(filename, id.clone());
            corpus.module_docs.insert(id, docs);
        }

        tracing::info!(
            modules = corpus.partition.len(),
            names = corpus.names.len(),
            "Resolved declarations"
        );
        Ok(corpus)
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Module to its declarations, in identifier order.
    ///
    /// Declarations within a module keep export order.
    pub fn partition(&self) -> &BTreeMap<Identifier, Vec<Declaration>> {
        &self.partition
    }

    /// Module docstring blocks of a module, empty if it has none.
    pub fn module_docs(&self, id: &Identifier) -> &[ModuleDoc] {
        self.module_docs.get(id).map_or(&[], Vec::as_slice)
    }

    /// Identifiers of all modules, in order.
    pub fn modules(&self) -> impl Iterator<Item = &Identifier> {
        self.partition.keys()
    }

    /// Module resolved from an exact raw source path.
    pub fn module_by_path(&self, raw_path: &str) -> Option<&Identifier> {
        self.by_path.get(raw_path)
    }

    /// Declaration record that introduces `name`.
    ///
    /// A synthesized `x.mk` constructor falls back to the structure `x`.
    /// Returns `Ok(None)` for names outside the table; a name in the table
    /// without a matching record is an error.
    pub fn find_declaration(&self, name: &str) -> Result<Option<&Declaration>, ResolveError> {
        let Some(owner) = self.names.get(name) else {
            return Ok(None);
        };
        let decls = self.partition.get(owner).map_or(&[][..], Vec::as_slice);
        let mut wanted = name;
        loop {
            if let Some(decl) = decls.iter().find(|d| d.introduces(wanted)) {
                return Ok(Some(decl));
            }
            match wanted.strip_suffix(".mk") {
                Some(structure) => wanted = structure,
                None => {
                    return Err(ResolveError::MissingDeclaration {
                        name: name.to_owned(),
                        module: owner.to_string(),
                    });
                }
            }
        }
    }
}
