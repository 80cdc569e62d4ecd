//! Builder pattern API for deadmethod analysis.
//!
//! ```rust,ignore
//! use deadmethod_core::prelude::*;
//!
//! let result = DeadMethods::new("example.com/app/db", "Queries")
//!     .root("./snapshots")
//!     .ignore(["Close"])
//!     .analyze()?;
//!
//! for name in result.unused() {
//!     println!("{}", name);
//! }
//! ```

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{config_dir, load_config, DeadmethodConfig, CONFIG_FILE};
use crate::detect::{build_report, IgnoreList, Report};
use crate::error::{DeadmethodError, DeadmethodResult};
use crate::methodset::{build_method_set, MethodSet};
use crate::program::{Program, ProgramSource, SnapshotSource, TypeIdentity};
use crate::resolve::resolve_target;
use crate::usage::{scan_usages, Attribution, CancellationToken, ScanOptions, UsageSet};

/// Builder for configuring an unused-method analysis.
#[derive(Debug, Clone)]
pub struct DeadMethods {
    /// Package path declaring the target type
    package: String,

    /// Target type name
    type_name: String,

    /// Analysis root: a directory of snapshots or a single snapshot file
    root: PathBuf,

    /// Method names to leave out of the report
    ignored: Vec<String>,

    /// Regular expressions for method names to leave out of the report
    ignored_patterns: Vec<String>,

    /// Promoted-method attribution; config or default when unset
    attribution: Option<Attribution>,

    /// Custom excluded directories
    excluded_dirs: Vec<String>,

    /// Explicit configuration, replacing deadmethod.toml
    config: Option<DeadmethodConfig>,

    /// Whether to read deadmethod.toml from the root
    use_config_file: bool,

    cancel: Option<CancellationToken>,
}

impl DeadMethods {
    /// Create a new analysis builder for `package.type_name`, rooted at `.`.
    pub fn new(package: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            type_name: type_name.into(),
            root: PathBuf::from("."),
            ignored: Vec::new(),
            ignored_patterns: Vec::new(),
            attribution: None,
            excluded_dirs: Vec::new(),
            config: None,
            use_config_file: true,
            cancel: None,
        }
    }

    /// Set the analysis root.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Add method names to leave out of the report.
    pub fn ignore(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add regular expressions for method names to leave out of the report.
    pub fn ignore_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Choose how promoted-method calls are credited.
    pub fn attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Add directories to exclude from snapshot discovery.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Use this configuration instead of reading deadmethod.toml.
    pub fn with_config(mut self, config: DeadmethodConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Enable or disable reading deadmethod.toml from the root.
    pub fn use_config_file(mut self, enabled: bool) -> Self {
        self.use_config_file = enabled;
        self
    }

    /// Make the usage scan interruptible.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Load the snapshots under the root and run the analysis.
    pub fn analyze(&self) -> DeadmethodResult<AnalysisResult> {
        let settings = self.settings()?;
        let source = SnapshotSource::new(&self.root).exclude_dirs(settings.excluded_dirs.clone());
        let program = source.load()?;
        self.run(&program, settings)
    }

    /// Run the analysis on a program from any source.
    pub fn analyze_source(&self, source: &impl ProgramSource) -> DeadmethodResult<AnalysisResult> {
        let settings = self.settings()?;
        let program = source.load()?;
        self.run(&program, settings)
    }

    /// Run the analysis on an already loaded program.
    pub fn analyze_program(&self, program: &Program) -> DeadmethodResult<AnalysisResult> {
        let settings = self.settings()?;
        self.run(program, settings)
    }

    fn run(&self, program: &Program, settings: Settings) -> DeadmethodResult<AnalysisResult> {
        // 1. Resolve the target
        let target = resolve_target(program, &self.package, &self.type_name)?;

        // 2. Declared methods
        let methods = build_method_set(program, &target);

        // 3. Used methods, across the whole program
        let options = ScanOptions {
            attribution: settings.attribution,
            cancel: self.cancel.clone(),
        };
        let usage = scan_usages(program, &target, &options)?;

        // 4. Report
        let report = build_report(&methods, &usage, &settings.ignore);

        info!(
            target = %target,
            declared = methods.len(),
            used = usage.len(),
            unused = report.len(),
            ignored = report.ignored,
            "analysis complete"
        );

        Ok(AnalysisResult {
            target,
            attribution: settings.attribution,
            packages: program.packages.len(),
            files: program.file_count(),
            methods,
            usage,
            report,
        })
    }

    /// Merge builder settings with the configuration file.
    fn settings(&self) -> DeadmethodResult<Settings> {
        let loaded;
        let config = match &self.config {
            Some(cfg) => Some(cfg),
            None if self.use_config_file => {
                loaded = load_config(&self.root).map_err(|e| self.config_error(&e))?;
                loaded.as_ref()
            }
            None => None,
        };

        let mut names = self.ignored.clone();
        let mut patterns = Vec::with_capacity(self.ignored_patterns.len());
        for p in &self.ignored_patterns {
            let re = Regex::new(p).map_err(|e| {
                DeadmethodError::config(&self.root, format!("invalid ignore pattern {:?}: {}", p, e))
            })?;
            patterns.push(re);
        }
        let mut excluded_dirs = self.excluded_dirs.clone();
        let mut attribution = self.attribution;

        if let Some(cfg) = config {
            names.extend(cfg.ignore.iter().flatten().cloned());
            patterns.extend(cfg.compiled_patterns().map_err(|e| self.config_error(&e))?);
            excluded_dirs.extend(cfg.exclude.iter().flatten().cloned());
            attribution = attribution.or(cfg.attribution);
        }

        Ok(Settings {
            ignore: IgnoreList::new(names).with_patterns(patterns),
            attribution: attribution.unwrap_or_default(),
            excluded_dirs,
        })
    }

    fn config_error(&self, err: &anyhow::Error) -> DeadmethodError {
        DeadmethodError::config(config_path(&self.root), format!("{:#}", err))
    }
}

fn config_path(root: &Path) -> PathBuf {
    config_dir(root).join(CONFIG_FILE)
}

/// Effective settings of one run.
struct Settings {
    ignore: IgnoreList,
    attribution: Attribution,
    excluded_dirs: Vec<String>,
}

/// Result of an unused-method analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub target: TypeIdentity,
    pub attribution: Attribution,
    /// Packages in the loaded program
    pub packages: usize,
    /// Source files scanned
    pub files: usize,
    pub methods: MethodSet,
    pub usage: UsageSet,
    pub report: Report,
}

impl AnalysisResult {
    /// Unused method names, sorted.
    pub fn unused(&self) -> &[String] {
        &self.report.unused
    }

    /// Check if any unused method was found.
    pub fn has_unused(&self) -> bool {
        self.report.has_unused()
    }

    pub fn declared_count(&self) -> usize {
        self.methods.len()
    }

    /// Methods of the set seen at least once.
    pub fn used_count(&self) -> usize {
        self.methods
            .names()
            .filter(|name| self.usage.contains(name))
            .count()
    }
}
