//! Breadcrumb Resolution
//!
//! Produces the ordered navigational path from the site root to a single
//! entity by walking its ancestor chain. Self-hierarchical types (places,
//! articles) walk their own `parent_id` chain; packages borrow the chain of
//! their primary associated place through the [`AncestryProvider`] seam;
//! blogs and testimonials get a fixed section crumb.
//!
//! # Shape guarantees
//!
//! - The first crumb is always `{ "Home", "/" }`.
//! - The last crumb carries `url: None` - it represents the current page and
//!   is not navigable.
//! - A missing or dangling parent ends the walk silently (the same leniency
//!   the forest builder applies), so breadcrumb rendering never fails on a
//!   structural anomaly.
//!
//! # Cost model
//!
//! The walk issues one storage round trip per ancestor level - an explicit
//! loop with an accumulator, bounded by [`MAX_ANCESTOR_DEPTH`] and a visited
//! set so an accidental parent cycle cannot hang a request.

use crate::db::ContentStore;
use crate::models::{EntityTable, Node};
use crate::services::error::ContentServiceError;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Hard bound on ancestor-walk depth. The walk stops here rather than
/// erroring: a chain this deep is already malformed data.
pub const MAX_ANCESTOR_DEPTH: usize = 64;

/// One entry of a breadcrumb path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crumb {
    /// Display text
    pub title: String,

    /// Link target; `None` marks the terminal (current page) crumb
    pub url: Option<String>,
}

impl Crumb {
    /// A navigable crumb.
    pub fn linked(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: Some(url.into()),
        }
    }

    /// The terminal, non-navigable crumb for the current page.
    pub fn terminal(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
        }
    }

    fn home() -> Self {
        Self::linked("Home", "/")
    }
}

/// The entity a breadcrumb path is resolved for.
#[derive(Debug, Clone)]
pub enum BreadcrumbSubject {
    /// A place row; walks the places hierarchy
    Place(Node),

    /// An article row; walks the articles hierarchy
    Article(Node),

    /// A package; borrows its primary place's ancestry
    Package { id: String, title: String },

    /// A blog post; fixed "Blogs" section crumb
    Blog { title: String },

    /// A testimonial; fixed "Testimonials" section crumb
    Testimonial { title: String },
}

/// Capability for entity types that borrow another table's ancestor chain.
///
/// Packages are the one current implementor (via their primary place), but
/// the breadcrumb logic depends only on this seam, so any future type that
/// anchors into someone else's hierarchy plugs in without touching the
/// resolver.
#[async_trait]
pub trait AncestryProvider: Send + Sync {
    /// The hierarchical table the borrowed chain lives in.
    fn table(&self) -> EntityTable;

    /// The node whose chain is borrowed. `Ok(None)` means the subject has no
    /// anchor and contributes no borrowed crumbs.
    async fn anchor(&self, store: &dyn ContentStore) -> anyhow::Result<Option<Node>>;
}

/// Ancestry borrowed from a package's primary associated place.
pub struct PackagePlaceAncestry {
    /// The package whose place association is consulted
    pub package_id: String,
}

#[async_trait]
impl AncestryProvider for PackagePlaceAncestry {
    fn table(&self) -> EntityTable {
        EntityTable::Places
    }

    async fn anchor(&self, store: &dyn ContentStore) -> anyhow::Result<Option<Node>> {
        store.package_primary_place(&self.package_id).await
    }
}

/// Resolves breadcrumb paths against a content store.
///
/// # Examples
///
/// ```rust,no_run
/// use waypoint_core::db::MemoryStore;
/// use waypoint_core::models::Node;
/// use waypoint_core::services::{BreadcrumbResolver, BreadcrumbSubject};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = BreadcrumbResolver::new(Arc::new(MemoryStore::new()));
/// let place = Node::new("Kathmandu", "Kathmandu", "kathmandu", None);
///
/// let crumbs = resolver.resolve(&BreadcrumbSubject::Place(place)).await?;
/// assert_eq!(crumbs.first().unwrap().title, "Home");
/// assert!(crumbs.last().unwrap().url.is_none());
/// # Ok(())
/// # }
/// ```
pub struct BreadcrumbResolver {
    store: Arc<dyn ContentStore>,
}

impl BreadcrumbResolver {
    /// Create a resolver over a store.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Resolve the breadcrumb path for a subject.
    pub async fn resolve(
        &self,
        subject: &BreadcrumbSubject,
    ) -> Result<Vec<Crumb>, ContentServiceError> {
        let mut crumbs = vec![Crumb::home()];

        match subject {
            BreadcrumbSubject::Place(node) => {
                let chain = self
                    .ancestor_crumbs(EntityTable::Places, node.parent_id.as_deref())
                    .await?;
                crumbs.extend(chain);
                crumbs.push(Crumb::terminal(&node.title));
            }
            BreadcrumbSubject::Article(node) => {
                let chain = self
                    .ancestor_crumbs(EntityTable::Articles, node.parent_id.as_deref())
                    .await?;
                crumbs.extend(chain);
                crumbs.push(Crumb::terminal(&node.title));
            }
            BreadcrumbSubject::Package { id, title } => {
                let provider = PackagePlaceAncestry {
                    package_id: id.clone(),
                };
                self.push_borrowed(&provider, &mut crumbs).await?;
                crumbs.push(Crumb::terminal(title));
            }
            BreadcrumbSubject::Blog { title } => {
                crumbs.push(Crumb::linked("Blogs", "/blogs"));
                crumbs.push(Crumb::terminal(title));
            }
            BreadcrumbSubject::Testimonial { title } => {
                crumbs.push(Crumb::linked("Testimonials", "/testimonials"));
                crumbs.push(Crumb::terminal(title));
            }
        }

        Ok(crumbs)
    }

    /// Resolve a path for a subject that borrows ancestry through a custom
    /// provider: Home, the borrowed chain (anchor included, navigable), then
    /// the subject title as the terminal crumb.
    pub async fn resolve_borrowed(
        &self,
        provider: &dyn AncestryProvider,
        title: &str,
    ) -> Result<Vec<Crumb>, ContentServiceError> {
        let mut crumbs = vec![Crumb::home()];
        self.push_borrowed(provider, &mut crumbs).await?;
        crumbs.push(Crumb::terminal(title));
        Ok(crumbs)
    }

    /// Append the borrowed chain for a provider: the anchor's ancestors,
    /// then the anchor itself as a navigable crumb. No anchor, no crumbs.
    async fn push_borrowed(
        &self,
        provider: &dyn AncestryProvider,
        crumbs: &mut Vec<Crumb>,
    ) -> Result<(), ContentServiceError> {
        if let Some(anchor) = provider.anchor(self.store.as_ref()).await? {
            let chain = self
                .ancestor_crumbs(provider.table(), anchor.parent_id.as_deref())
                .await?;
            crumbs.extend(chain);
            crumbs.push(Crumb::linked(&anchor.title, format!("/{}", anchor.slug)));
        }

        Ok(())
    }

    /// Walk an ancestor chain upward, returning crumbs root-first.
    ///
    /// One storage round trip per level. The walk terminates on the first
    /// missing parent, on a repeated id (cycle), or at the depth cap.
    async fn ancestor_crumbs(
        &self,
        table: EntityTable,
        start_parent: Option<&str>,
    ) -> Result<Vec<Crumb>, ContentServiceError> {
        let mut chain: Vec<Crumb> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut cursor = start_parent.map(str::to_string);

        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id.clone()) {
                tracing::warn!(table = %table, id = %parent_id, "Ancestor cycle detected");
                break;
            }
            if visited.len() > MAX_ANCESTOR_DEPTH {
                tracing::warn!(table = %table, "Ancestor chain exceeds depth cap");
                break;
            }

            let Some(parent) = self.store.select_by_id(table, &parent_id).await? else {
                // Dangling reference: the chain simply ends here.
                break;
            };

            chain.push(Crumb::linked(&parent.title, format!("/{}", parent.slug)));
            cursor = parent.parent_id;
        }

        chain.reverse();
        Ok(chain)
    }
}

#[cfg(test)]
#[path = "breadcrumb_test.rs"]
mod breadcrumb_test;
