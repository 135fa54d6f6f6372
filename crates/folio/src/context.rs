//! Run-wide, read-only state for statement extraction.
//!
//! An [`ExtractionContext`] is assembled once per run from the parsed
//! documents and then only borrowed. Roles share it without locking, so they
//! can be materialized in any order, or in parallel by the caller.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use folio::{ExtractionContext, FactIndex, LabelMap, TargetPeriod};
//!
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//! let ctx = ExtractionContext::builder(TargetPeriod::fiscal_year(end))
//!     .labels(LabelMap::new())
//!     .facts(FactIndex::new())
//!     .preferred_labels(true)
//!     .build();
//!
//! assert_eq!(ctx.target().end, end);
//! ```

use crate::classifier::{KeywordClassifier, PeriodClassifier};
use crate::labels::LabelMap;
use crate::matcher::{FactIndex, FactMatcher, TargetPeriod};
use std::fmt;

type BoxedClassifier = Box<dyn PeriodClassifier + Send + Sync>;

/// Labels, facts, the target period and the role classifier of one run.
pub struct ExtractionContext {
    labels: LabelMap,
    facts: FactIndex,
    matcher: FactMatcher,
    classifier: BoxedClassifier,
    preferred_labels: bool,
}

impl ExtractionContext {
    /// Starts a builder for the given target period.
    pub fn builder(target: TargetPeriod) -> ExtractionContextBuilder {
        ExtractionContextBuilder::new(target)
    }

    /// Label table.
    pub const fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// Fact table.
    pub const fn facts(&self) -> &FactIndex {
        &self.facts
    }

    /// Fact matcher.
    pub const fn matcher(&self) -> &FactMatcher {
        &self.matcher
    }

    /// Target period.
    pub const fn target(&self) -> &TargetPeriod {
        self.matcher.target()
    }

    /// Role classifier.
    pub fn classifier(&self) -> &dyn PeriodClassifier {
        &*self.classifier
    }

    /// Whether arcs' `preferredLabel` roles are honored.
    pub const fn preferred_labels(&self) -> bool {
        self.preferred_labels
    }
}

impl fmt::Debug for ExtractionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionContext")
            .field("labels", &self.labels.len())
            .field("facts", &self.facts.len())
            .field("target", self.target())
            .field("preferred_labels", &self.preferred_labels)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ExtractionContext`].
///
/// Labels and facts default to empty tables, the classifier to
/// [`KeywordClassifier::default`].
pub struct ExtractionContextBuilder {
    target: TargetPeriod,
    labels: LabelMap,
    facts: FactIndex,
    classifier: Option<BoxedClassifier>,
    preferred_labels: bool,
}

impl ExtractionContextBuilder {
    /// Creates a builder for the given target period.
    pub fn new(target: TargetPeriod) -> Self {
        Self {
            target,
            labels: LabelMap::new(),
            facts: FactIndex::new(),
            classifier: None,
            preferred_labels: false,
        }
    }

    /// Sets the label table.
    pub fn labels(mut self, labels: LabelMap) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the fact table.
    pub fn facts(mut self, facts: impl Into<FactIndex>) -> Self {
        self.facts = facts.into();
        self
    }

    /// Replaces the default keyword classifier.
    pub fn classifier(mut self, classifier: impl PeriodClassifier + Send + Sync + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Honors `preferredLabel` roles on presentation arcs.
    pub const fn preferred_labels(mut self, enabled: bool) -> Self {
        self.preferred_labels = enabled;
        self
    }

    /// Builds the context.
    pub fn build(self) -> ExtractionContext {
        ExtractionContext {
            labels: self.labels,
            facts: self.facts,
            matcher: FactMatcher::new(self.target),
            classifier: self
                .classifier
                .unwrap_or_else(|| Box::new(KeywordClassifier::default())),
            preferred_labels: self.preferred_labels,
        }
    }
}

impl fmt::Debug for ExtractionContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionContextBuilder")
            .field("target", &self.target)
            .field("custom_classifier", &self.classifier.is_some())
            .field("preferred_labels", &self.preferred_labels)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::PeriodKind;
    use crate::presentation::Role;
    use chrono::NaiveDate;

    fn target() -> TargetPeriod {
        TargetPeriod::fiscal_year(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
    }

    #[test]
    fn test_defaults() {
        let ctx = ExtractionContext::builder(target()).build();

        assert!(ctx.labels().is_empty());
        assert!(ctx.facts().is_empty());
        assert!(!ctx.preferred_labels());
        assert_eq!(
            ctx.classifier().classify(&Role::new("http://x.com/role/BalanceSheet")),
            PeriodKind::Instant
        );
    }

    #[test]
    fn test_custom_classifier() {
        let ctx = ExtractionContext::builder(target())
            .classifier(|_: &Role| PeriodKind::Duration)
            .build();

        assert_eq!(
            ctx.classifier().classify(&Role::new("http://x.com/role/BalanceSheet")),
            PeriodKind::Duration
        );
        assert!(format!("{ctx:?}").contains("ExtractionContext"));
    }

    #[test]
    fn test_context_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<ExtractionContext>();
    }
}
