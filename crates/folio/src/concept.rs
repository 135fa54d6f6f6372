//! Concept identifiers and locator reference resolution.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Returned by [`resolve_href`] for references it cannot resolve.
pub const UNRESOLVED: &str = "";

/// A taxonomy concept, `prefix:LocalName`.
///
/// Compared and ordered by its string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Concept(String);

impl Concept {
    /// Wraps an identifier as is.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Resolves a locator `href`, `None` when it is unresolvable.
    pub fn from_href(href: &str) -> Option<Self> {
        let id = resolve_href(href);
        (!id.is_empty()).then_some(Self(id))
    }

    /// The identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace prefix, e.g. `us-gaap`.
    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Local name, e.g. `Assets`.
    pub fn local_name(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, local)| local)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Concept {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Concept {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Concept {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Concept {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Turns a locator reference into a concept identifier.
///
/// `mp-20241231.xsd#us-gaap_Assets` becomes `us-gaap:Assets`: the fragment
/// after the first `#` is split on its first underscore. A reference
/// without `#` yields [`UNRESOLVED`]; a fragment without an underscore is
/// returned unchanged.
pub fn resolve_href(href: &str) -> String {
    let Some((_, fragment)) = href.split_once('#') else {
        return UNRESOLVED.to_string();
    };
    match fragment.split_once('_') {
        Some((prefix, local)) => format!("{prefix}:{local}"),
        None => fragment.to_string(),
    }
}
