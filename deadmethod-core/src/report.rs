//! Output formatting - plaintext and JSON.

use serde_json::json;

use crate::builder::AnalysisResult;

/// Renders unused method names, one per line. Empty report, empty output.
pub fn render_plain(unused: &[String]) -> String {
    let mut out = String::new();
    for name in unused {
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// Renders the analysis as a pretty-printed JSON document.
pub fn render_json(result: &AnalysisResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({
        "target": result.target.to_string(),
        "declared": result.declared_count(),
        "used": result.used_count(),
        "ignored": result.report.ignored,
        "unused": result.unused(),
    }))
}

/// Prints unused method names in plain text format.
pub fn print_plain(unused: &[String]) {
    print!("{}", render_plain(unused));
}

/// Prints the analysis in JSON format.
///
/// Falls back to the bare unused list if serialization fails.
pub fn print_json(result: &AnalysisResult) {
    match render_json(result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::warn!(error = %e, "JSON serialization failed");
            println!("{{\"unused\": {:?}}}", result.unused());
        }
    }
}
