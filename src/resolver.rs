//! Recursive dependency resolution.
//!
//! Starting from the root package page, every linked dependency is followed
//! depth-first while the hop budget allows, and the groups found on each page
//! are folded into a single [`DependencyGraph`].

use crate::fetch::{self, FetchError, PageSource};
use crate::graph::{DependencyGraph, MergePolicy, PackageRef, Resolution, ResolutionContext};
use crate::page::{self, PageError};
use log::{debug, info, trace};

/// Error type for resolution
#[derive(Debug)]
pub enum ResolveError {
    /// A page could not be retrieved
    Fetch(FetchError),
    /// A page was retrieved but did not have the expected structure
    Page { url: String, source: PageError },
    /// A dependency link could not be turned into a URL
    Link {
        href: String,
        source: url::ParseError,
    },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Fetch(_) => write!(f, "Failed to fetch package page"),
            ResolveError::Page { url, .. } => {
                write!(f, "Unexpected page structure at {}", url)
            }
            ResolveError::Link { href, .. } => {
                write!(f, "Invalid dependency link '{}'", href)
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Fetch(e) => Some(e),
            ResolveError::Page { source, .. } => Some(source),
            ResolveError::Link { source, .. } => Some(source),
        }
    }
}

impl From<FetchError> for ResolveError {
    fn from(e: FetchError) -> Self {
        ResolveError::Fetch(e)
    }
}

pub struct Resolver<'s, S: PageSource + ?Sized> {
    source: &'s S,
    max_depth: u32,
    merge_policy: MergePolicy,
}

impl<'s, S: PageSource + ?Sized> Resolver<'s, S> {
    pub fn new(source: &'s S, max_depth: u32) -> Self {
        Self {
            source,
            max_depth,
            merge_policy: MergePolicy::default(),
        }
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Resolve the package at `location` and everything reachable within the
    /// depth budget.
    pub fn resolve(&self, location: &str) -> Result<Resolution, ResolveError> {
        let resolution = self.resolve_at(location, ResolutionContext::root(self.max_depth))?;
        info!(
            "Resolved {} {}: {} groups, {} dependencies",
            resolution.name,
            resolution.version,
            resolution.graph.len(),
            resolution.graph.package_count()
        );
        Ok(resolution)
    }

    fn resolve_at(
        &self,
        location: &str,
        ctx: ResolutionContext,
    ) -> Result<Resolution, ResolveError> {
        let url = fetch::page_url(location);
        debug!("Fetching {} (depth {}/{})", url, ctx.depth, ctx.max_depth);

        let html = self.source.fetch(&url)?;
        let page = page::parse_package_page(&html).map_err(|source| ResolveError::Page {
            url: url.clone(),
            source,
        })?;

        let mut graph = DependencyGraph::new();
        for group in page.groups {
            graph.ensure_group(&group.label);

            for entry in group.entries {
                if let (Some(href), Some(child_ctx)) = (entry.link.as_deref(), ctx.descend()) {
                    let child_url =
                        fetch::resolve_link(&url, href).map_err(|source| ResolveError::Link {
                            href: href.to_string(),
                            source,
                        })?;
                    let nested = self.resolve_at(&child_url, child_ctx)?;
                    graph.merge(nested.graph, self.merge_policy);
                }

                trace!("{} -> [{}] {} {}", page.name, group.label, entry.name, entry.version);
                graph.insert(&group.label, PackageRef::new(entry.name, entry.version));
            }
        }

        Ok(Resolution {
            name: page.name,
            version: page.version,
            graph,
        })
    }
}
