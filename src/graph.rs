//! Dependency graph data model.
//!
//! A resolution produces one flat mapping from dependency group label
//! (e.g. `.NETStandard 2.0`) to the set of packages declared in that group,
//! accumulated across every page visited during the traversal.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A package identified by its display name and version text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageRef {
    pub name: String,
    pub version: String,
}

impl PackageRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// How a nested resolution's groups are folded into the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// A nested group replaces the accumulated set with the same label.
    #[default]
    Overwrite,
    /// A nested group adds its members to the accumulated set.
    Union,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(MergePolicy::Overwrite),
            "union" => Ok(MergePolicy::Union),
            other => Err(format!(
                "unknown merge policy '{}' (expected 'overwrite' or 'union')",
                other
            )),
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::Overwrite => write!(f, "overwrite"),
            MergePolicy::Union => write!(f, "union"),
        }
    }
}

/// Group label -> set of packages.
///
/// Ordered containers keep rendering deterministic for a given graph; callers
/// should still treat group and member order as unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    groups: BTreeMap<String, BTreeSet<PackageRef>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `group` exists, even if it ends up with no members.
    pub fn ensure_group(&mut self, group: &str) {
        if !self.groups.contains_key(group) {
            self.groups.insert(group.to_string(), BTreeSet::new());
        }
    }

    /// Record `package` under `group`. Returns false if it was already present.
    pub fn insert(&mut self, group: &str, package: PackageRef) -> bool {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(package)
    }

    pub fn merge(&mut self, other: DependencyGraph, policy: MergePolicy) {
        for (label, packages) in other.groups {
            match policy {
                MergePolicy::Overwrite => {
                    self.groups.insert(label, packages);
                }
                MergePolicy::Union => {
                    self.groups.entry(label).or_default().extend(packages);
                }
            }
        }
    }

    pub fn get(&self, group: &str) -> Option<&BTreeSet<PackageRef>> {
        self.groups.get(group)
    }

    pub fn contains(&self, group: &str, package: &PackageRef) -> bool {
        self.get(group).is_some_and(|set| set.contains(package))
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &BTreeSet<PackageRef>)> {
        self.groups.iter().map(|(label, set)| (label.as_str(), set))
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of (group, package) memberships.
    pub fn package_count(&self) -> usize {
        self.groups.values().map(BTreeSet::len).sum()
    }
}

/// Depth bookkeeping for one step of the traversal.
///
/// Depth 1 is the root page. Each recursive call receives its own copy from
/// [`ResolutionContext::descend`]; nothing is mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionContext {
    pub depth: u32,
    pub max_depth: u32,
}

impl ResolutionContext {
    pub fn root(max_depth: u32) -> Self {
        Self {
            depth: 1,
            max_depth,
        }
    }

    /// Context for a linked dependency, or `None` once the hop budget is spent.
    pub fn descend(self) -> Option<Self> {
        let next = self.depth + 1;
        (next <= self.max_depth).then_some(Self {
            depth: next,
            max_depth: self.max_depth,
        })
    }
}

/// Output of a full resolution: the root package identity and its graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: String,
    pub version: String,
    pub graph: DependencyGraph,
}
