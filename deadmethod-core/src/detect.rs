//! Unused method detection: declared minus used minus ignored.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::methodset::MethodSet;
use crate::usage::UsageSet;

/// Methods excluded from the report whatever their usage.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    names: HashSet<String>,
    patterns: Vec<Regex>,
}

impl IgnoreList {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            patterns: Vec::new(),
        }
    }

    /// Parse a comma-separated list such as `"Close, Ping,"`.
    pub fn from_csv(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }

    pub fn with_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_patterns(mut self, patterns: impl IntoIterator<Item = Regex>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.names.contains(name) || self.patterns.iter().any(|p| p.is_match(name))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.patterns.is_empty()
    }
}

/// Unused methods of the target, in method set order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub unused: Vec<String>,
    /// Unused methods left out because of the ignore list
    pub ignored: usize,
}

impl Report {
    pub fn has_unused(&self) -> bool {
        !self.unused.is_empty()
    }

    pub fn len(&self) -> usize {
        self.unused.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unused.is_empty()
    }
}

/// Builds the report. Total and deterministic: the output follows the
/// method set's sorted order.
pub fn build_report(methods: &MethodSet, usage: &UsageSet, ignore: &IgnoreList) -> Report {
    let mut report = Report::default();
    for name in methods.names().filter(|m| !usage.contains(m)) {
        if ignore.is_ignored(name) {
            report.ignored += 1;
        } else {
            report.unused.push(name.to_string());
        }
    }
    report
}
