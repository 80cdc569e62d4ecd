//! Method usage scanning over a typed program.
//!
//! Every call expression of every file is visited. A call counts when its
//! callee is a selector that the selection index resolves to a method whose
//! declared receiver, pointer stripped, is the target type. The selector's
//! text never matters: `q.Close()` on an unrelated type resolves to that
//! type and is ignored.
//!
//! Files are scanned in parallel; each worker builds a local set and the
//! sets are merged once all files are done.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{DeadmethodError, DeadmethodResult};
use crate::program::{CallExpr, Node, Package, Program, SourceFile, TypeIdentity, Visit};

/// Which calls count as usage of a promoted method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribution {
    /// Only the type that declares the method is credited, so `foo.Qux()`
    /// resolving to `Base.Qux` leaves `Foo`'s promoted `Qux` unused.
    #[default]
    Declared,
    /// A call also counts for the target when the call's operand has the
    /// target type, so `foo.Qux()` marks `Foo`'s promoted `Qux` as used.
    Receiver,
}

/// Cooperative cancellation for a running scan, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub attribution: Attribution,
    pub cancel: Option<CancellationToken>,
}

/// Methods of the target seen at call sites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageSet {
    /// Method name -> number of matching call sites
    pub calls: BTreeMap<String, usize>,
    /// Method call sites examined, matching or not
    pub call_sites: usize,
}

impl UsageSet {
    pub fn contains(&self, name: &str) -> bool {
        self.calls.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.calls.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    fn record(&mut self, name: &str) {
        *self.calls.entry(name.to_string()).or_insert(0) += 1;
    }

    fn merge(mut self, other: UsageSet) -> UsageSet {
        for (name, count) in other.calls {
            *self.calls.entry(name).or_insert(0) += count;
        }
        self.call_sites += other.call_sites;
        self
    }
}

/// Visitor collecting target method calls within one file.
struct CallCollector<'a> {
    package: &'a Package,
    target: &'a TypeIdentity,
    attribution: Attribution,
    usage: UsageSet,
}

impl<'a> CallCollector<'a> {
    fn new(package: &'a Package, target: &'a TypeIdentity, attribution: Attribution) -> Self {
        Self {
            package,
            target,
            attribution,
            usage: UsageSet::default(),
        }
    }

    fn record_call(&mut self, call: &CallExpr) {
        let Node::Selector(selector) = call.fun.as_ref() else {
            return;
        };
        let Some(selection) = self.package.selection(selector.id) else {
            trace!(package = %self.package.path, sel = %selector.sel, "unresolved selector");
            return;
        };
        let Some(method) = selection.resolved_method() else {
            return;
        };

        self.usage.call_sites += 1;

        let declared = method.owner() == Some(self.target);
        let via_operand =
            self.attribution == Attribution::Receiver && selection.recv.owner() == Some(self.target);

        if declared || via_operand {
            self.usage.record(&method.name);
        } else {
            trace!(
                package = %self.package.path,
                method = %method.name,
                "call on another type"
            );
        }
    }
}

impl<'ast, 'a> Visit<'ast> for CallCollector<'a> {
    fn visit_call(&mut self, call: &'ast CallExpr) {
        self.record_call(call);
        crate::program::syntax::visit_call(self, call);
    }
}

/// Scan one file for calls on the target.
pub fn scan_file(
    package: &Package,
    file: &SourceFile,
    target: &TypeIdentity,
    attribution: Attribution,
) -> UsageSet {
    let mut collector = CallCollector::new(package, target, attribution);
    collector.visit_node(&file.root);
    collector.usage
}

/// Scan the whole program for calls on the target's methods.
///
/// Every package is scanned, not just the one declaring the target. With a
/// cancellation token, the scan stops at the next file boundary and returns
/// [`DeadmethodError::Cancelled`]; partial results are dropped.
pub fn scan_usages(
    program: &Program,
    target: &TypeIdentity,
    options: &ScanOptions,
) -> DeadmethodResult<UsageSet> {
    let files: Vec<(&Package, &SourceFile)> = program
        .packages
        .iter()
        .flat_map(|pkg| pkg.files.iter().map(move |file| (pkg, file)))
        .collect();

    let cancelled = || {
        options
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    };

    let usage = files
        .par_iter()
        .map(|(pkg, file)| {
            if cancelled() {
                return Err(DeadmethodError::Cancelled);
            }
            Ok(scan_file(pkg, file, target, options.attribution))
        })
        .try_reduce(UsageSet::default, |a, b| Ok(a.merge(b)))?;

    if cancelled() {
        return Err(DeadmethodError::Cancelled);
    }

    debug!(
        target = %target,
        files = files.len(),
        call_sites = usage.call_sites,
        used = usage.len(),
        "scanned usages"
    );
    Ok(usage)
}
