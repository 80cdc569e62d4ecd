//! The typed program: packages with syntax trees, top-level scopes and the
//! selection index produced by a type checker.
//!
//! Type checking itself happens elsewhere. A program arrives either as
//! snapshot files (see [`load`]) or is assembled in memory through the
//! constructors on [`Package`] and the types in [`types`].
//!
//! # Snapshot shape
//!
//! ```json
//! { "packages": [ {
//!     "path": "example.com/app/db",
//!     "name": "db",
//!     "scope": { "Queries": { "kind": "type", "name": "Queries", ... } },
//!     "files": [ { "path": "db/query.sql.go", "root": { "kind": "compound", ... } } ],
//!     "selections": [ { "expr": 4, "kind": "method_val", "recv": ..., "method": ... } ],
//!     "errors": []
//! } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::error::DeadmethodResult;

pub mod load;
pub mod syntax;
pub mod types;

pub use load::{parse_snapshot, parse_snapshot_str, SnapshotSource};
pub use syntax::{CallExpr, ExprId, Node, SelectorExpr, Visit};
pub use types::{
    Field, MethodDecl, MethodSymbol, Object, ReceiverKind, Selection, SelectionKind, TypeDecl,
    TypeIdentity, TypeRef, Underlying,
};

/// Anything that can hand over a fully type-checked program.
pub trait ProgramSource {
    fn load(&self) -> DeadmethodResult<Program>;
}

/// One source file and its syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub root: Node,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, items: Vec<Node>) -> Self {
        Self {
            path: path.into(),
            root: Node::compound("file", items),
        }
    }
}

/// A type-checked package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Package {
    /// Canonical import path
    pub path: String,
    /// Package clause name
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub files: Vec<SourceFile>,
    /// Top-level declarations
    #[serde(default)]
    pub scope: BTreeMap<String, Object>,
    #[serde(default)]
    pub selections: Vec<Selection>,
    /// Type checker diagnostics; a package with errors cannot be analyzed
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(skip)]
    index: HashMap<ExprId, usize>,
}

impl Package {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.scope.insert(decl.name.clone(), Object::Type(decl));
        self
    }

    pub fn with_object(mut self, name: impl Into<String>, object: Object) -> Self {
        self.scope.insert(name.into(), object);
        self
    }

    pub fn with_file(mut self, file: SourceFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.index
            .entry(selection.expr)
            .or_insert(self.selections.len());
        self.selections.push(selection);
        self
    }

    /// Rebuild the selection index after deserialization.
    ///
    /// The first entry for an id wins. Returns the ids that appeared more
    /// than once.
    pub fn index_selections(&mut self) -> Vec<ExprId> {
        self.index.clear();
        let mut duplicates = Vec::new();
        for (i, sel) in self.selections.iter().enumerate() {
            if self.index.contains_key(&sel.expr) {
                duplicates.push(sel.expr);
            } else {
                self.index.insert(sel.expr, i);
            }
        }
        duplicates
    }

    /// Look up the selection recorded for a selector node.
    pub fn selection(&self, id: ExprId) -> Option<&Selection> {
        self.index.get(&id).and_then(|&i| self.selections.get(i))
    }

    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.scope.get(name)
    }

    /// The declaration of a named, non-alias type in this package.
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        match self.scope.get(name) {
            Some(Object::Type(decl)) if !decl.alias => Some(decl),
            _ => None,
        }
    }
}

/// A whole loaded program.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub packages: Vec<Package>,
}

impl Program {
    pub fn new(packages: Vec<Package>) -> Self {
        Self { packages }
    }

    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.path == path)
    }

    /// Declaration behind a type identity, if the program contains it.
    pub fn type_decl(&self, id: &TypeIdentity) -> Option<&TypeDecl> {
        self.package(&id.package)?.type_decl(&id.name)
    }

    pub fn file_count(&self) -> usize {
        self.packages.iter().map(|p| p.files.len()).sum()
    }
}

impl ProgramSource for Program {
    fn load(&self) -> DeadmethodResult<Program> {
        Ok(self.clone())
    }
}
