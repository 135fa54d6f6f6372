//! Concept labels from a label linkbase.
//!
//! Each label link block is resolved on its own: its locators map to
//! concepts, its label resources map to texts, and its arcs connect the two.
//! For every concept the first standard label wins; the first non-standard
//! label is kept as a fallback, and the concept identifier itself is the
//! last resort.

use crate::concept::Concept;
use folio_data::{ExtendedLink, Linkbase};
use std::collections::HashMap;

/// The standard label role.
pub const STANDARD_LABEL_ROLE: &str = "http://www.xbrl.org/2003/role/label";

/// Classification of a label resource's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelClass {
    /// The standard label role, or no role at all
    Standard,
    /// Any other role (terse, total, period start, documentation, ...)
    Other,
}

impl LabelClass {
    /// Classifies a label resource role.
    pub fn of(role: Option<&str>) -> Self {
        match role {
            None => Self::Standard,
            Some(role) if role.ends_with("/label") => Self::Standard,
            Some(_) => Self::Other,
        }
    }
}

/// Concept to display text.
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    standard: HashMap<Concept, String>,
    other: HashMap<Concept, String>,
    by_role: HashMap<(Concept, String), String>,
}

impl LabelMap {
    /// Creates an empty map; every lookup falls back to the concept itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from every label link of a linkbase.
    pub fn from_linkbase(linkbase: &Linkbase) -> Self {
        let mut map = Self::new();
        for link in linkbase.label_links() {
            map.add_link(link);
        }
        tracing::debug!(
            standard = map.standard.len(),
            other = map.other.len(),
            "label map built"
        );
        map
    }

    fn add_link(&mut self, link: &ExtendedLink) {
        let concepts: HashMap<&str, Concept> = link
            .locators
            .iter()
            .filter_map(|loc| {
                let concept = Concept::from_href(&loc.href);
                if concept.is_none() {
                    tracing::debug!(href = %loc.href, "unresolved label locator");
                }
                concept.map(|c| (loc.label.as_str(), c))
            })
            .collect();

        // several resources may share one xlink:label
        let mut resources: HashMap<&str, Vec<(&str, Option<&str>)>> = HashMap::new();
        for res in &link.resources {
            resources
                .entry(res.label.as_str())
                .or_default()
                .push((res.text.as_str(), res.role.as_deref()));
        }

        for arc in &link.arcs {
            let Some(concept) = concepts.get(arc.from.as_str()) else {
                continue;
            };
            let Some(targets) = resources.get(arc.to.as_str()) else {
                continue;
            };
            for &(text, role) in targets {
                self.insert(concept, role, text);
            }
        }
    }

    /// Records one label, keeping the first text per classification and role.
    pub fn insert(&mut self, concept: &Concept, role: Option<&str>, text: &str) {
        if text.is_empty() {
            return;
        }
        let table = match LabelClass::of(role) {
            LabelClass::Standard => &mut self.standard,
            LabelClass::Other => &mut self.other,
        };
        table
            .entry(concept.clone())
            .or_insert_with(|| text.to_string());
        self.by_role
            .entry((concept.clone(), role.unwrap_or(STANDARD_LABEL_ROLE).to_string()))
            .or_insert_with(|| text.to_string());
    }

    /// Display text for a concept. Never empty.
    pub fn get_label<'a>(&'a self, concept: &'a Concept) -> &'a str {
        self.standard
            .get(concept)
            .or_else(|| self.other.get(concept))
            .map_or(concept.as_str(), String::as_str)
    }

    /// Display text preferring a specific label role, e.g. a presentation
    /// arc's `preferredLabel`, then falling back as [`Self::get_label`].
    pub fn label_for<'a>(&'a self, concept: &'a Concept, role: Option<&str>) -> &'a str {
        role.and_then(|role| self.by_role.get(&(concept.clone(), role.to_string())))
            .map_or_else(|| self.get_label(concept), String::as_str)
    }

    /// Whether any label is known for the concept.
    pub fn contains(&self, concept: &Concept) -> bool {
        self.standard.contains_key(concept) || self.other.contains_key(concept)
    }

    /// Number of concepts with at least one label.
    pub fn len(&self) -> usize {
        self.standard.len()
            + self
                .other
                .keys()
                .filter(|c| !self.standard.contains_key(*c))
                .count()
    }

    /// Whether no labels are known.
    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.other.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: &str = r#"<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
                                xmlns:xlink="http://www.w3.org/1999/xlink">
      <link:labelLink xlink:type="extended" xlink:role="http://www.xbrl.org/2003/role/link">
        <link:loc xlink:type="locator" xlink:href="mp.xsd#us-gaap_Assets" xlink:label="Assets"/>
        <link:label xlink:type="resource" xlink:label="lab_Assets_terse"
            xlink:role="http://www.xbrl.org/2003/role/terseLabel">Assets, terse</link:label>
        <link:label xlink:type="resource" xlink:label="lab_Assets"
            xlink:role="http://www.xbrl.org/2003/role/label">Total assets</link:label>
        <link:labelArc xlink:type="arc" xlink:from="Assets" xlink:to="lab_Assets_terse"/>
        <link:labelArc xlink:type="arc" xlink:from="Assets" xlink:to="lab_Assets"/>

        <link:loc xlink:type="locator" xlink:href="mp.xsd#mp_OnlyTerse" xlink:label="OnlyTerse"/>
        <link:label xlink:type="resource" xlink:label="lab_OnlyTerse_1"
            xlink:role="http://www.xbrl.org/2003/role/terseLabel">First terse</link:label>
        <link:label xlink:type="resource" xlink:label="lab_OnlyTerse_2"
            xlink:role="http://www.xbrl.org/2003/role/verboseLabel">Second verbose</link:label>
        <link:labelArc xlink:type="arc" xlink:from="OnlyTerse" xlink:to="lab_OnlyTerse_1"/>
        <link:labelArc xlink:type="arc" xlink:from="OnlyTerse" xlink:to="lab_OnlyTerse_2"/>

        <link:loc xlink:type="locator" xlink:href="no-fragment.xsd" xlink:label="Broken"/>
        <link:label xlink:type="resource" xlink:label="lab_Broken">Never used</link:label>
        <link:labelArc xlink:type="arc" xlink:from="Broken" xlink:to="lab_Broken"/>
      </link:labelLink>
      <link:labelLink xlink:type="extended" xlink:role="http://www.xbrl.org/2003/role/link">
        <link:loc xlink:type="locator" xlink:href="mp.xsd#us-gaap_Assets" xlink:label="Assets"/>
        <link:label xlink:type="resource" xlink:label="lab_Assets"
            xlink:role="http://www.xbrl.org/2003/role/label">Assets, second block</link:label>
        <link:labelArc xlink:type="arc" xlink:from="Assets" xlink:to="lab_Assets"/>
      </link:labelLink>
    </link:linkbase>"#;

    fn labels() -> LabelMap {
        LabelMap::from_linkbase(&Linkbase::parse(LABELS).unwrap())
    }

    #[test]
    fn test_standard_label_wins_over_earlier_other() {
        let labels = labels();
        assert_eq!(labels.get_label(&Concept::new("us-gaap:Assets")), "Total assets");
    }

    #[test]
    fn test_first_standard_label_wins_across_blocks() {
        let labels = labels();
        assert_ne!(
            labels.get_label(&Concept::new("us-gaap:Assets")),
            "Assets, second block"
        );
    }

    #[test]
    fn test_falls_back_to_first_other_label() {
        let labels = labels();
        assert_eq!(labels.get_label(&Concept::new("mp:OnlyTerse")), "First terse");
    }

    #[test]
    fn test_falls_back_to_concept_identifier() {
        let labels = labels();
        let concept = Concept::new("us-gaap:Liabilities");
        assert_eq!(labels.get_label(&concept), "us-gaap:Liabilities");
        assert!(!labels.contains(&concept));
    }

    #[test]
    fn test_preferred_role() {
        let labels = labels();
        let assets = Concept::new("us-gaap:Assets");

        assert_eq!(
            labels.label_for(&assets, Some("http://www.xbrl.org/2003/role/terseLabel")),
            "Assets, terse"
        );
        assert_eq!(
            labels.label_for(&assets, Some("http://www.xbrl.org/2003/role/totalLabel")),
            "Total assets"
        );
        assert_eq!(labels.label_for(&assets, None), "Total assets");
    }

    #[test]
    fn test_unresolved_locator_is_dropped() {
        let labels = labels();
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_label_class() {
        assert_eq!(LabelClass::of(None), LabelClass::Standard);
        assert_eq!(LabelClass::of(Some(STANDARD_LABEL_ROLE)), LabelClass::Standard);
        assert_eq!(
            LabelClass::of(Some("http://www.xbrl.org/2003/role/terseLabel")),
            LabelClass::Other
        );
    }

    #[test]
    fn test_empty_text_is_ignored() {
        let mut labels = LabelMap::new();
        let concept = Concept::new("x:A");
        labels.insert(&concept, None, "");
        assert!(labels.is_empty());
        assert_eq!(labels.get_label(&concept), "x:A");
    }
}
