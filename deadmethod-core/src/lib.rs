//! deadmethod-core: unused method detection for typed Go programs
//!
//! Given a package path and a type name, reports the methods of that type
//! that are never called anywhere in the program. The program arrives
//! already type-checked: packages, declarations, syntax trees and the
//! selection table of every selector expression, loaded from
//! `*.typed.json` snapshots or any other [`program::ProgramSource`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use deadmethod_core::prelude::*;
//!
//! let result = DeadMethods::new("example.com/app/db", "Queries")
//!     .root("./snapshots")
//!     .analyze()?;
//!
//! for name in result.unused() {
//!     println!("{}", name);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`program`]: Typed program model and snapshot loading
//! - [`resolve`]: Target type resolution
//! - [`methodset`]: Method set of a named type, promoted methods included
//! - [`usage`]: Parallel scan for method calls
//! - [`detect`]: Unused method report
//! - [`report`]: Plain and JSON output
//! - [`builder`]: Fluent builder API for configuration
//! - [`error`]: Typed error handling

pub mod builder;
pub mod config;
pub mod detect;
pub mod error;
pub mod logging;
pub mod methodset;
pub mod prelude;
pub mod program;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod usage;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{DeadmethodError, DeadmethodResult, IoResultExt};

// Builder API
pub use builder::{AnalysisResult, DeadMethods};

// Configuration
pub use config::{load_config, DeadmethodConfig, OutputConfig, CONFIG_FILE};

// Report
pub use detect::{build_report, IgnoreList, Report};

// Logging
pub use logging::{init_structured_logging, init_with_default_filter};

// Method sets
pub use methodset::{build_method_set, view_names, MethodEntry, MethodSet, View};

// Program model
pub use program::{
    parse_snapshot, parse_snapshot_str, Program, ProgramSource, SnapshotSource, TypeIdentity,
};

// Output
pub use report::{print_json, print_plain, render_json, render_plain};

// Target resolution
pub use resolve::{resolve_decl, resolve_target};

// File scanning
pub use scan::{gather_snapshot_files, gather_snapshot_files_with_excludes, SNAPSHOT_SUFFIX};

// Usage scan
pub use usage::{scan_file, scan_usages, Attribution, CancellationToken, ScanOptions, UsageSet};

#[cfg(test)]
mod tests;
