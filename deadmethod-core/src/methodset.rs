//! Method set construction for a target type.
//!
//! The set is the union of two views of the type:
//!
//! - through a pointer (`*T`): every value- and pointer-receiver method,
//!   plus every promoted method;
//! - through a bare value (`T`): value-receiver methods, plus promoted
//!   methods whose receiver is reachable without taking an address.
//!
//! Promotion follows the selector rules of the analyzed language: embedded
//! types are expanded breadth-first by depth, a name found at a shallower
//! depth shadows deeper ones, and two candidates for one name at the same
//! depth cancel out. Fields take part in shadowing too.
//!
//! Performance characteristics:
//! - Each named type is expanded at most once per view: O(|T| + |F| + |M|)
//!   for the reachable types, fields and methods
//! - Embedding cycles (`type T struct{ *T }`) terminate through the seen set

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

use crate::program::{Program, ReceiverKind, TypeDecl, TypeIdentity, Underlying};

/// One method of a method set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodEntry {
    pub name: String,
    pub receiver: ReceiverKind,
    /// The type whose declaration provides the method
    pub declared_on: TypeIdentity,
    /// Embedding depth; 0 for methods declared on the target itself
    pub depth: usize,
}

impl MethodEntry {
    pub fn is_promoted(&self) -> bool {
        self.depth > 0
    }
}

/// Sorted, deduplicated method set of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSet {
    pub owner: TypeIdentity,
    entries: Vec<MethodEntry>,
}

impl MethodSet {
    pub fn entries(&self) -> &[MethodEntry] {
        &self.entries
    }

    /// Method names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which view of the type a walk computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// `T`: pointer-receiver methods need a pointer embedding on the path
    Value,
    /// `*T`
    Pointer,
}

/// Build the merged pointer/value method set of `target`.
///
/// A target missing from the program yields an empty set; resolve it first
/// with [`crate::resolve::resolve_target`].
pub fn build_method_set(program: &Program, target: &TypeIdentity) -> MethodSet {
    let mut merged = collect(program, target, View::Pointer);
    for (name, entry) in collect(program, target, View::Value) {
        merged.entry(name).or_insert(entry);
    }

    let entries: Vec<MethodEntry> = merged.into_values().collect();
    debug!(
        target = %target,
        methods = entries.len(),
        promoted = entries.iter().filter(|e| e.is_promoted()).count(),
        "built method set"
    );

    MethodSet {
        owner: target.clone(),
        entries,
    }
}

/// Method names of a single view, sorted.
pub fn view_names(program: &Program, target: &TypeIdentity, view: View) -> Vec<String> {
    collect(program, target, view).into_keys().collect()
}

/// A type waiting to be expanded at the current depth.
#[derive(Debug, Clone)]
struct Embedded {
    id: TypeIdentity,
    /// Some embedding on the path to this type was a pointer
    indirect: bool,
    /// The type was reached more than once at this depth
    multiples: bool,
}

/// Outcome for a name once some depth has claimed it.
enum Slot {
    Method(MethodEntry),
    /// Collision or shadowing field: nothing deeper may use the name
    Blocked,
}

fn collect(program: &Program, target: &TypeIdentity, view: View) -> BTreeMap<String, MethodEntry> {
    let mut base: HashMap<String, Slot> = HashMap::new();
    let mut seen: HashSet<TypeIdentity> = HashSet::new();
    let mut current = vec![Embedded {
        id: target.clone(),
        indirect: view == View::Pointer,
        multiples: false,
    }];
    let mut depth = 0;

    while !current.is_empty() {
        let mut next = Vec::new();
        // None marks a collision at this depth
        let mut methods: HashMap<String, Option<MethodEntry>> = HashMap::new();
        let mut fields: HashSet<String> = HashSet::new();

        for e in &current {
            if !seen.insert(e.id.clone()) {
                continue;
            }
            let Some(decl) = program.type_decl(&e.id) else {
                trace!(embedded = %e.id, "unresolvable embedded type skipped");
                continue;
            };

            let declared = decl.methods.iter().map(|m| (m.name.as_str(), m.receiver));
            add_methods(&mut methods, declared, e, depth);

            match &decl.underlying {
                Underlying::Struct { fields: struct_fields } => {
                    for f in struct_fields {
                        fields.insert(f.name.clone());
                        if !f.embedded {
                            continue;
                        }
                        if let Some(owner) = f.ty.owner() {
                            next.push(Embedded {
                                id: owner.clone(),
                                indirect: e.indirect || f.ty.is_pointer(),
                                multiples: e.multiples,
                            });
                        }
                    }
                }
                Underlying::Interface { .. } => {
                    // Interface methods are callable on any operand.
                    let iface = Embedded {
                        indirect: true,
                        ..e.clone()
                    };
                    let all = interface_methods(program, &e.id, decl);
                    for (name, declared_on) in &all {
                        add_method(&mut methods, name, ReceiverKind::Value, declared_on, &iface, depth);
                    }
                }
                Underlying::Other { .. } => {}
            }
        }

        for (name, method) in methods {
            if base.contains_key(&name) {
                continue;
            }
            let slot = match method {
                Some(m) if !fields.contains(&name) => Slot::Method(m),
                _ => Slot::Blocked,
            };
            base.insert(name, slot);
        }
        for name in fields {
            base.entry(name).or_insert(Slot::Blocked);
        }

        current = consolidate(next);
        depth += 1;
    }

    base.into_iter()
        .filter_map(|(name, slot)| match slot {
            Slot::Method(m) => Some((name, m)),
            Slot::Blocked => None,
        })
        .collect()
}

fn add_methods<'a>(
    level: &mut HashMap<String, Option<MethodEntry>>,
    methods: impl Iterator<Item = (&'a str, ReceiverKind)>,
    e: &Embedded,
    depth: usize,
) {
    for (name, receiver) in methods {
        add_method(level, name, receiver, &e.id, e, depth);
    }
}

fn add_method(
    level: &mut HashMap<String, Option<MethodEntry>>,
    name: &str,
    receiver: ReceiverKind,
    declared_on: &TypeIdentity,
    e: &Embedded,
    depth: usize,
) {
    let reachable = e.indirect || receiver == ReceiverKind::Value;
    if !e.multiples && reachable && !level.contains_key(name) {
        level.insert(
            name.to_string(),
            Some(MethodEntry {
                name: name.to_string(),
                receiver,
                declared_on: declared_on.clone(),
                depth,
            }),
        );
    } else {
        // Unreachable pointer methods still claim the name at this depth.
        level.insert(name.to_string(), None);
    }
}

/// Merge repeated types of one depth into a single entry flagged `multiples`.
fn consolidate(list: Vec<Embedded>) -> Vec<Embedded> {
    let mut out: Vec<Embedded> = Vec::with_capacity(list.len());
    let mut at: HashMap<TypeIdentity, usize> = HashMap::new();
    for e in list {
        if let Some(&i) = at.get(&e.id) {
            out[i].multiples = true;
        } else {
            at.insert(e.id.clone(), out.len());
            out.push(e);
        }
    }
    out
}

/// All methods of an interface, including embedded interfaces, with the
/// interface that spells each one out.
fn interface_methods(
    program: &Program,
    id: &TypeIdentity,
    decl: &TypeDecl,
) -> BTreeMap<String, TypeIdentity> {
    let mut out = BTreeMap::new();
    let mut visited = HashSet::new();
    flatten_interface(program, id, decl, &mut visited, &mut out);
    out
}

fn flatten_interface(
    program: &Program,
    id: &TypeIdentity,
    decl: &TypeDecl,
    visited: &mut HashSet<TypeIdentity>,
    out: &mut BTreeMap<String, TypeIdentity>,
) {
    if !visited.insert(id.clone()) {
        return;
    }
    let Underlying::Interface { methods, embedded } = &decl.underlying else {
        return;
    };
    for name in methods {
        out.entry(name.clone()).or_insert_with(|| id.clone());
    }
    for inner in embedded {
        let Some(inner_id) = inner.owner() else {
            continue;
        };
        if let Some(inner_decl) = program.type_decl(inner_id) {
            flatten_interface(program, inner_id, inner_decl, visited, out);
        }
    }
}
