//! deadmethod CLI - reports the methods of a Go type that nothing calls.
//!
//! Reads type-checked program snapshots (`*.typed.json`) under ROOT and
//! prints each unused method of `PACKAGE.TYPE` on its own line.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::Path;

use deadmethod_core::{
    init_structured_logging, load_config, print_json, print_plain, Attribution, DeadMethods,
    DeadmethodConfig,
};

/// Exit code when `--fail` is set and unused methods were found.
const EXIT_UNUSED: i32 = 1;
/// Exit code for any error.
const EXIT_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Report unused methods of a Go type")]
pub struct Cli {
    /// Import path of the package declaring the type
    package: String,

    /// Name of the type
    #[arg(value_name = "TYPE")]
    type_name: String,

    /// Directory of typed snapshots, or a single snapshot file
    #[arg(default_value = ".")]
    root: String,

    /// Exit with status 1 when unused methods are found
    #[arg(long)]
    fail: bool,

    /// Comma-separated method names to leave out of the report
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// How calls to promoted methods are credited
    #[arg(long, value_enum)]
    attribution: Option<AttributionArg>,

    /// Extra directory names to skip while discovering snapshots
    #[arg(long, value_name = "DIR")]
    exclude: Vec<String>,

    /// Print a summary to stderr
    #[arg(long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum AttributionArg {
    /// Credit only the type that declares the called method
    Declared,
    /// Also credit calls whose receiver is the type, promoted methods included
    Receiver,
}

impl From<AttributionArg> for Attribution {
    fn from(arg: AttributionArg) -> Self {
        match arg {
            AttributionArg::Receiver => Attribution::Receiver,
            AttributionArg::Declared => Attribution::Declared,
        }
    }
}

impl Cli {
    /// Method names from every `--ignore`, blanks dropped.
    fn ignored_names(&self) -> Vec<String> {
        self.ignore
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn main() {
    // Structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}

/// Run the analysis and print the report. Returns the exit code.
fn run(cli: &Cli) -> Result<i32> {
    let root = Path::new(&cli.root);

    let config = load_config(root)
        .with_context(|| format!("Invalid configuration for {}", root.display()))?
        .unwrap_or_default();
    let json = cli.json || config.wants_json();

    let mut analysis = builder_for(cli, config);
    if let Some(attribution) = cli.attribution {
        analysis = analysis.attribution(attribution.into());
    }

    let result = analysis.analyze()?;

    if json {
        print_json(&result);
    } else {
        print_plain(result.unused());
    }

    if cli.verbose {
        eprintln!(
            "{}: {} declared, {} used, {} unused, {} ignored",
            result.target,
            result.declared_count(),
            result.used_count(),
            result.report.len(),
            result.report.ignored
        );
    }

    Ok(if cli.fail && result.has_unused() {
        EXIT_UNUSED
    } else {
        0
    })
}

fn builder_for(cli: &Cli, config: DeadmethodConfig) -> DeadMethods {
    DeadMethods::new(&cli.package, &cli.type_name)
        .root(&cli.root)
        .with_config(config)
        .ignore(cli.ignored_names())
        .exclude_dirs(cli.exclude.iter().cloned())
}
