//! Human-readable formula summary.

use std::fmt::Write;

use crate::core::formula::Formula;

/// Render formula metadata and options the way `boostkeg info` prints them.
pub fn format_info(formula: &Formula) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}: stable {}", formula.name, formula.full_version());
    let _ = writeln!(out, "{}", formula.description);
    let _ = writeln!(out, "{}", formula.homepage);
    let _ = writeln!(out);
    let _ = writeln!(out, "Source:   {}", formula.url);
    let _ = writeln!(out, "SHA-256:  {}", formula.sha256);
    let _ = writeln!(out, "HEAD:     {}", formula.head);
    let _ = writeln!(out, "Keg-only: {}", formula.keg_only.explanation());

    if !formula.optional_dependencies.is_empty() {
        let names: Vec<&str> = formula.optional_dependencies.iter().map(|d| d.name).collect();
        let _ = writeln!(out);
        let _ = writeln!(out, "Optional dependencies: {}", names.join(", "));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Options:");
    for option in &formula.options {
        let _ = writeln!(out, "  {}", option.non_default_flag());
        let _ = writeln!(out, "      {}", option.description);
    }
    for alias in &formula.deprecated_options {
        let _ = writeln!(out, "  --{} (deprecated, use --{})", alias.old, alias.new);
    }

    if !formula.patches.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Patches:");
        for patch in &formula.patches {
            let _ = writeln!(out, "  {} ({})", patch.name, patch.upstream);
        }
    }

    out
}
