//! Presentation graphs.
//!
//! Every presentation role becomes a [`Role`]: the set of concepts it
//! mentions, each parent's children in presentation order, and each child's
//! parents. A concept may hang under several parents, and malformed or
//! hand-edited linkbases can contain cycles, so the graph is not assumed to
//! be a tree. [`Role::walk`] traverses it depth-first and visits each concept
//! at most once.

use crate::concept::Concept;
use crate::error::{Result, StatementError};
use folio_data::{ExtendedLink, Linkbase};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Order given to arcs whose `order` attribute is missing or unparsable.
pub const ORDER_SENTINEL: f64 = 999_999.0;

/// Parses an arc `order` attribute.
pub fn parse_order(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|order| order.is_finite())
        .unwrap_or(ORDER_SENTINEL)
}

/// A child entry of a parent concept.
#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    /// Child concept
    pub concept: Concept,
    /// Sort key among siblings
    pub order: f64,
    /// `preferredLabel` role of the arc
    pub preferred_label: Option<String>,
}

/// The presentation graph of one role.
#[derive(Debug, Clone, Default)]
pub struct Role {
    /// Role URI
    pub uri: String,
    /// Human-readable definition from the taxonomy schema
    pub definition: Option<String>,
    /// Every concept appearing on either end of an arc
    pub nodes: BTreeSet<Concept>,
    /// Children per parent, ascending by order
    pub children: HashMap<Concept, Vec<Child>>,
    /// Parents per child
    pub parents: HashMap<Concept, BTreeSet<Concept>>,
    /// Arcs dropped because an endpoint did not resolve
    pub dropped_arcs: usize,
}

impl Role {
    /// Creates an empty role.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Attaches a schema definition.
    pub fn with_definition(mut self, definition: Option<String>) -> Self {
        self.definition = definition;
        self
    }

    /// Adds a parent/child relationship. Children must be re-sorted with
    /// [`Self::sort_children`] once all arcs are in.
    pub fn add_arc(
        &mut self,
        parent: Concept,
        child: Concept,
        order: f64,
        preferred_label: Option<String>,
    ) {
        self.nodes.insert(parent.clone());
        self.nodes.insert(child.clone());
        self.parents
            .entry(child.clone())
            .or_default()
            .insert(parent.clone());
        self.children.entry(parent).or_default().push(Child {
            concept: child,
            order,
            preferred_label,
        });
    }

    /// Sorts every children list by order; equal orders keep arc order.
    pub fn sort_children(&mut self) {
        for children in self.children.values_mut() {
            children.sort_by(|a, b| a.order.total_cmp(&b.order));
        }
    }

    /// The definition if known, else the URI.
    pub fn name(&self) -> &str {
        self.definition.as_deref().unwrap_or(&self.uri)
    }

    /// Whether the role has no concepts.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of a concept in presentation order.
    pub fn children_of(&self, concept: &Concept) -> &[Child] {
        self.children.get(concept).map_or(&[], Vec::as_slice)
    }

    /// Root concepts: nodes without a parent, in ascending order.
    ///
    /// When every node has a parent, the smallest node stands in as the
    /// single root. Empty only for an empty role.
    pub fn roots(&self) -> Vec<&Concept> {
        let roots: Vec<&Concept> = self
            .nodes
            .iter()
            .filter(|n| !self.parents.contains_key(*n))
            .collect();
        if roots.is_empty() {
            self.nodes.iter().take(1).collect()
        } else {
            roots
        }
    }

    /// Depth-first traversal from the roots.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self)
    }
}

/// One step of a [`Walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit<'a> {
    /// Visited concept
    pub concept: &'a Concept,
    /// 0 for roots, +1 per descent
    pub depth: usize,
    /// `preferredLabel` of the arc the concept was reached through
    pub preferred_label: Option<&'a str>,
}

/// Pre-order depth-first traversal of a role.
///
/// Runs on an explicit stack, so deep taxonomies cannot overflow the call
/// stack. A concept is yielded once per role no matter how many parents
/// reference it, which also terminates cycles. Being an iterator, the
/// traversal can be stopped at any point.
#[derive(Debug)]
pub struct Walk<'a> {
    role: &'a Role,
    stack: Vec<Visit<'a>>,
    visited: HashSet<&'a Concept>,
}

impl<'a> Walk<'a> {
    fn new(role: &'a Role) -> Self {
        let stack = role
            .roots()
            .into_iter()
            .rev()
            .map(|concept| Visit {
                concept,
                depth: 0,
                preferred_label: None,
            })
            .collect();
        Self {
            role,
            stack,
            visited: HashSet::new(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(visit) = self.stack.pop() {
            if !self.visited.insert(visit.concept) {
                continue;
            }
            let children = self.role.children_of(visit.concept);
            self.stack.extend(children.iter().rev().map(|child| Visit {
                concept: &child.concept,
                depth: visit.depth + 1,
                preferred_label: child.preferred_label.as_deref(),
            }));
            return Some(visit);
        }
        None
    }
}

/// Builds [`Role`]s from a presentation linkbase.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'a> {
    linkbase: &'a Linkbase,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder over a parsed presentation linkbase.
    pub const fn new(linkbase: &'a Linkbase) -> Self {
        Self { linkbase }
    }

    /// Distinct role URIs in document order.
    pub fn role_uris(&self) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.linkbase
            .presentation_links()
            .filter_map(|link| link.role.as_deref())
            .filter(|uri| !uri.is_empty() && seen.insert(*uri))
            .collect()
    }

    /// Builds the graph of one role.
    ///
    /// Every presentation link with this role contributes; locators are
    /// resolved within their own link. Arcs with an unresolvable endpoint
    /// are dropped and counted in [`Role::dropped_arcs`].
    pub fn build(&self, role_uri: &str) -> Result<Role> {
        let mut links = self
            .linkbase
            .presentation_links()
            .filter(|link| link.role.as_deref() == Some(role_uri))
            .peekable();
        if links.peek().is_none() {
            return Err(StatementError::UnknownRole(role_uri.to_string()));
        }

        let mut role = Role::new(role_uri);
        for link in links {
            add_link(&mut role, link);
        }
        role.sort_children();

        if role.dropped_arcs > 0 {
            tracing::debug!(role = role_uri, dropped = role.dropped_arcs, "dropped unresolved arcs");
        }
        Ok(role)
    }

    /// Builds every role, in document order.
    pub fn build_all(&self) -> Vec<Role> {
        self.role_uris()
            .into_iter()
            .filter_map(|uri| self.build(uri).ok())
            .collect()
    }
}

fn add_link(role: &mut Role, link: &ExtendedLink) {
    let concepts: HashMap<&str, Concept> = link
        .locators
        .iter()
        .filter_map(|loc| Concept::from_href(&loc.href).map(|c| (loc.label.as_str(), c)))
        .collect();

    for arc in &link.arcs {
        let (Some(parent), Some(child)) = (concepts.get(arc.from.as_str()), concepts.get(arc.to.as_str()))
        else {
            role.dropped_arcs += 1;
            continue;
        };
        role.add_arc(
            parent.clone(),
            child.clone(),
            parse_order(arc.order.as_deref()),
            arc.preferred_label.clone(),
        );
    }
}
