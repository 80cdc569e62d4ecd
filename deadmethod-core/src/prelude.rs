//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use deadmethod_core::prelude::*;
//! ```

// Errors
pub use crate::error::{DeadmethodError, DeadmethodResult};

// Typed program
pub use crate::program::{Program, ProgramSource, SnapshotSource, TypeIdentity};

// Analysis stages
pub use crate::detect::{build_report, IgnoreList, Report};
pub use crate::methodset::{build_method_set, MethodSet};
pub use crate::resolve::resolve_target;
pub use crate::usage::{scan_usages, Attribution, CancellationToken, ScanOptions, UsageSet};

// Configuration
pub use crate::config::{load_config, DeadmethodConfig};

// Builder API
pub use crate::builder::{AnalysisResult, DeadMethods};
