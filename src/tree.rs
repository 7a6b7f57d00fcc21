//! Dependency tree visualization.
//!
//! Prints the resolved graph as an ASCII tree before the diagram is rendered.
//!
//! ## Example Output
//!
//! ```text
//! Serilog v4.0.0
//! ├── net8.0
//! │   └── System.Memory (>= 4.5.5)
//! └── net6.0 (no dependencies)
//! ```

use crate::graph::Resolution;
use colored::*;
use std::fmt::Write;

pub fn format_tree(resolution: &Resolution) -> String {
    let mut out = String::new();

    // Root
    let _ = writeln!(
        out,
        "{} v{}",
        resolution.name.bold().cyan(),
        resolution.version
    );

    if resolution.graph.is_empty() {
        let _ = writeln!(out, "└── {}", "(no dependencies)".dimmed());
        return out;
    }

    let count = resolution.graph.len();
    for (i, (group, packages)) in resolution.graph.groups().enumerate() {
        let is_last = i == count - 1;
        let prefix = if is_last { "└──" } else { "├──" };
        let indent = if is_last { "    " } else { "│   " };

        if packages.is_empty() {
            let _ = writeln!(
                out,
                "{} {} {}",
                prefix,
                group.yellow(),
                "(no dependencies)".dimmed()
            );
            continue;
        }

        let _ = writeln!(out, "{} {}", prefix, group.yellow());
        let inner = packages.len();
        for (j, package) in packages.iter().enumerate() {
            let branch = if j == inner - 1 { "└──" } else { "├──" };
            let _ = writeln!(
                out,
                "{}{} {} {}",
                indent,
                branch,
                package.name.bold(),
                package.version.green()
            );
        }
    }

    out
}
