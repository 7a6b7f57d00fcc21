//! Package page extraction.
//!
//! Pulls the package identity and its grouped dependency listing out of a
//! registry package page. The expected markup looks like:
//!
//! ```html
//! <span class="title">Serilog</span>
//! <span class="version-title">4.0.0</span>
//! <ul id="dependency-groups">
//!   <li>
//!     <h4><span>net8.0</span></h4>
//!     <ul>
//!       <li><a href="/packages/System.Memory/4.5.5">System.Memory</a> <span>(>= 4.5.5)</span></li>
//!     </ul>
//!   </li>
//! </ul>
//! ```

use scraper::{ElementRef, Html};

pub const TITLE_CLASS: &str = "title";
pub const VERSION_CLASS: &str = "version-title";
pub const GROUPS_ID: &str = "dependency-groups";

/// Everything the resolver needs from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePage {
    pub name: String,
    pub version: String,
    /// Empty when the page has no dependency-groups container.
    pub groups: Vec<PageGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGroup {
    pub label: String,
    pub entries: Vec<PageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub name: String,
    pub version: String,
    /// Raw `href` of the entry's anchor, if it has one.
    pub link: Option<String>,
}

/// Error type for page extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// No `span.title`
    MissingTitle,
    /// No `span.version-title`
    MissingVersion,
    /// A group without an `h4 > span` label (zero-based position)
    MissingGroupLabel { index: usize },
    /// An entry with neither anchor text nor own text
    MissingEntryName { group: String },
    /// An entry without a version `span`
    MissingEntryVersion { group: String, name: String },
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageError::MissingTitle => write!(f, "package title not found"),
            PageError::MissingVersion => write!(f, "package version not found"),
            PageError::MissingGroupLabel { index } => {
                write!(f, "dependency group #{} has no label", index + 1)
            }
            PageError::MissingEntryName { group } => {
                write!(f, "a dependency in group '{}' has no name", group)
            }
            PageError::MissingEntryVersion { group, name } => write!(
                f,
                "dependency '{}' in group '{}' has no version",
                name, group
            ),
        }
    }
}

impl std::error::Error for PageError {}

/// Extract the package identity and dependency groups from page markup.
pub fn parse_package_page(html: &str) -> Result<PackagePage, PageError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let name = find_descendant(root, |e| is_span_with_class(e, TITLE_CLASS))
        .map(element_text)
        .ok_or(PageError::MissingTitle)?;
    let version = find_descendant(root, |e| is_span_with_class(e, VERSION_CLASS))
        .map(element_text)
        .ok_or(PageError::MissingVersion)?;

    let container = find_descendant(root, |e| {
        e.value().name() == "ul" && e.value().id() == Some(GROUPS_ID)
    });

    let groups = match container {
        Some(container) => child_elements(container, "li")
            .enumerate()
            .map(|(index, row)| parse_group(index, row))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(PackagePage {
        name,
        version,
        groups,
    })
}

fn parse_group(index: usize, row: ElementRef<'_>) -> Result<PageGroup, PageError> {
    let label = find_descendant(row, |e| e.value().name() == "h4")
        .and_then(|h4| find_descendant(h4, |e| e.value().name() == "span"))
        .map(element_text)
        .ok_or(PageError::MissingGroupLabel { index })?;

    let entries = match child_elements(row, "ul").next() {
        Some(list) => child_elements(list, "li")
            .map(|item| parse_entry(&label, item))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(PageGroup { label, entries })
}

fn parse_entry(group: &str, item: ElementRef<'_>) -> Result<PageEntry, PageError> {
    let anchor = find_descendant(item, |e| e.value().name() == "a");

    let name = match anchor {
        Some(a) => element_text(a),
        None => own_text(item),
    };
    if name.is_empty() {
        return Err(PageError::MissingEntryName {
            group: group.to_string(),
        });
    }

    let version = find_descendant(item, |e| e.value().name() == "span")
        .map(element_text)
        .ok_or_else(|| PageError::MissingEntryVersion {
            group: group.to_string(),
            name: name.clone(),
        })?;

    let link = anchor
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string);

    Ok(PageEntry {
        name,
        version,
        link,
    })
}

fn is_span_with_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().name() == "span" && element.value().classes().any(|c| c == class)
}

/// First element below `parent` (document order) matching `pred`.
fn find_descendant<'a>(
    parent: ElementRef<'a>,
    pred: impl Fn(ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    parent
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| pred(*e))
}

/// Direct element children of `parent` with the given tag name.
fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |e| e.value().name() == tag)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text nodes directly under `element`, ignoring nested elements.
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
