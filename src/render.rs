//! PlantUML diagram output.
//!
//! The resolved graph becomes a component diagram: the root package on top,
//! one `package` block per dependency group, one component per dependency and
//! an arrow from the root to each of them. The file is then handed to the
//! PlantUML jar.

use crate::graph::Resolution;
use log::{debug, info};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const ROOT_ID: &str = "root";

/// Error type for diagram output
#[derive(Debug)]
pub enum RenderError {
    /// The diagram file could not be written
    Write(PathBuf, std::io::Error),
    /// The renderer process could not be started
    Launch(String, std::io::Error),
    /// The renderer ran and failed; `None` when killed by a signal
    Exit { program: String, code: Option<i32> },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Write(path, _) => write!(f, "Failed to write {}", path.display()),
            RenderError::Launch(program, _) => write!(f, "Failed to start '{}'", program),
            RenderError::Exit {
                program,
                code: Some(code),
            } => write!(f, "'{}' exited with status {}", program, code),
            RenderError::Exit {
                program,
                code: None,
            } => write!(f, "'{}' was terminated by a signal", program),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Write(_, e) | RenderError::Launch(_, e) => Some(e),
            RenderError::Exit { .. } => None,
        }
    }
}

/// Build the PlantUML text for a resolution.
///
/// Identifiers are synthetic (`dep_<n>_<name>`) so two groups listing the
/// same package, or two versions of it, never collide.
pub fn render_diagram(resolution: &Resolution) -> String {
    let mut out = String::with_capacity(256 + resolution.graph.package_count() * 96);
    out.push_str("@startuml\n");
    let _ = writeln!(
        out,
        "component \"{}\\n{}\" as {} #lightblue",
        escape_label(&resolution.name),
        escape_label(&resolution.version),
        ROOT_ID
    );

    let mut next_id = 0usize;
    for (group, packages) in resolution.graph.groups() {
        let _ = writeln!(out, "package \"{}\" #lightgrey {{", escape_label(group));
        for package in packages {
            let id = format!("dep_{}_{}", next_id, sanitize_id(&package.name));
            next_id += 1;
            let _ = writeln!(
                out,
                "  component \"{}\\n{}\" as {}",
                escape_label(&package.name),
                escape_label(&package.version),
                id
            );
            let _ = writeln!(out, "  {} --> {}", ROOT_ID, id);
        }
        out.push_str("}\n");
    }

    out.push_str("@enduml\n");
    out
}

/// Create or overwrite the diagram file.
pub fn write_diagram(path: &Path, content: &str) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RenderError::Write(path.to_path_buf(), e))?;
    }
    fs::write(path, content).map_err(|e| RenderError::Write(path.to_path_buf(), e))?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// `java -jar <renderer> <diagram>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RenderCommand {
    pub fn new(java: &str, renderer_path: &str, diagram: &Path) -> Self {
        Self {
            program: java.to_string(),
            args: vec![
                "-jar".to_string(),
                renderer_path.to_string(),
                diagram.to_string_lossy().into_owned(),
            ],
        }
    }

    /// Run the renderer and wait for it. Its own output goes straight to the terminal.
    pub fn run(&self) -> Result<(), RenderError> {
        info!("Running {} {}", self.program, self.args.join(" "));
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|e| RenderError::Launch(self.program.clone(), e))?;

        if status.success() {
            Ok(())
        } else {
            Err(RenderError::Exit {
                program: self.program.clone(),
                code: status.code(),
            })
        }
    }
}

/// PlantUML has no escape for `"` inside quoted labels.
fn escape_label(input: &str) -> String {
    input.replace('"', "'").replace(['\r', '\n'], " ")
}

fn sanitize_id(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
