//! # pkgviz - Package Dependency Diagrams
//!
//! pkgviz reads a package page from a package registry, follows the
//! dependency links it lists up to a configured depth and draws the result
//! as a PlantUML component diagram.
//!
//! ## Quick Start
//!
//! ```bash
//! cat > pkgviz.toml <<EOF
//! [Configuration]
//! PlantUMLPath = "plantuml.jar"
//! PackagePath = "https://www.nuget.org/packages/Newtonsoft.Json"
//! MaxDepth = 2
//! EOF
//!
//! pkgviz pkgviz.toml
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Configuration file parsing
//! - [`resolver`] - Depth-limited dependency traversal
//! - [`render`] - PlantUML output and renderer invocation

/// Configuration file parsing.
pub mod config;

/// Page retrieval over HTTP.
pub mod fetch;

/// Dependency graph data model.
pub mod graph;

/// Package page markup extraction.
pub mod page;

/// PlantUML diagram generation.
pub mod render;

/// Recursive dependency resolution.
pub mod resolver;

/// Dependency tree visualization.
pub mod tree;
