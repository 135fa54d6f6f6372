//! Matching reported facts to a target period.
//!
//! Given a concept and the period kind of the statement being built, the
//! matcher picks at most one fact:
//!
//! - instant statements take facts whose end date is the target end
//! - duration statements take facts whose start and end are the target's
//! - if a form is configured (`10-K`, `10-Q`, ...) the fact must carry it
//!
//! Among the survivors the canonical currency unit wins, then any other named
//! unit, then facts without a unit. Ties go to the fact seen first.

use crate::concept::Concept;
use chrono::{Months, NaiveDate};
use folio_data::{CompanyFacts, Fact, FactValue, Instance};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default canonical currency.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Whether a statement reports balances at a point or flows over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Balance at the period end (balance sheet)
    Instant,
    /// Accumulated over the period (income, cash flow, equity)
    Duration,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant => f.write_str("instant"),
            Self::Duration => f.write_str("duration"),
        }
    }
}

/// The fiscal period a run extracts, plus its filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPeriod {
    /// First day of the fiscal period
    pub start: NaiveDate,
    /// Last day of the fiscal period
    pub end: NaiveDate,
    /// Required form type, if any
    pub form: Option<String>,
    /// Canonical currency unit
    pub currency: String,
}

impl TargetPeriod {
    /// Creates a target period with the default currency and no form filter.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            form: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// The twelve months ending on `end`: starts one year earlier, plus a day.
    pub fn fiscal_year(end: NaiveDate) -> Self {
        let start = end
            .checked_sub_months(Months::new(12))
            .and_then(|d| d.succ_opt())
            .unwrap_or(end);
        Self::new(start, end)
    }

    /// Requires matched facts to come from this form type.
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    /// Sets the canonical currency unit.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Period filter for a statement of the given kind.
    pub const fn policy(&self, kind: PeriodKind) -> PeriodPolicy {
        match kind {
            PeriodKind::Instant => PeriodPolicy::Instant { end: self.end },
            PeriodKind::Duration => PeriodPolicy::Duration {
                start: self.start,
                end: self.end,
            },
        }
    }
}

/// Period filter applied to candidate facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodPolicy {
    /// Fact end date equals `end`
    Instant {
        /// Target end date
        end: NaiveDate,
    },
    /// Fact start and end dates equal `start` and `end`
    Duration {
        /// Target start date
        start: NaiveDate,
        /// Target end date
        end: NaiveDate,
    },
}

impl PeriodPolicy {
    /// Whether a fact's period passes the filter. Facts without a parseable
    /// period never do.
    pub fn accepts(&self, fact: &Fact) -> bool {
        let Some(period) = fact.period() else {
            return false;
        };
        match *self {
            Self::Instant { end } => period.end() == end,
            Self::Duration { start, end } => period.start() == Some(start) && period.end() == end,
        }
    }
}

/// Read-only lookup of facts by concept.
pub trait FactSource {
    /// Facts reported for a concept, in source order.
    fn facts_for(&self, concept: &Concept) -> &[Fact];
}

/// Facts grouped by concept, in source order within each concept.
#[derive(Debug, Clone, Default)]
pub struct FactIndex {
    by_concept: HashMap<Concept, Vec<Fact>>,
    len: usize,
}

impl FactIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fact.
    pub fn insert(&mut self, fact: Fact) {
        self.by_concept
            .entry(Concept::new(fact.concept.clone()))
            .or_default()
            .push(fact);
        self.len += 1;
    }

    /// Number of facts.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no facts.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct concepts.
    pub fn concept_count(&self) -> usize {
        self.by_concept.len()
    }
}

impl FromIterator<Fact> for FactIndex {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        let mut index = Self::new();
        for fact in iter {
            index.insert(fact);
        }
        index
    }
}

impl From<CompanyFacts> for FactIndex {
    fn from(doc: CompanyFacts) -> Self {
        doc.facts.into_iter().collect()
    }
}

impl From<Instance> for FactIndex {
    fn from(instance: Instance) -> Self {
        instance.facts.into_iter().collect()
    }
}

impl FactSource for FactIndex {
    fn facts_for(&self, concept: &Concept) -> &[Fact] {
        self.by_concept.get(concept).map_or(&[], Vec::as_slice)
    }
}

/// The fact chosen for a concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedFact {
    /// Reported value, `None` for nil facts
    pub value: Option<FactValue>,
    /// Unit name
    pub unit: Option<String>,
    /// Period start (duration facts only)
    pub start: Option<NaiveDate>,
    /// Period end
    pub end: NaiveDate,
}

/// Chooses one fact per concept for a [`TargetPeriod`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactMatcher {
    target: TargetPeriod,
}

impl FactMatcher {
    /// Creates a matcher for a target period.
    pub const fn new(target: TargetPeriod) -> Self {
        Self { target }
    }

    /// The target period.
    pub const fn target(&self) -> &TargetPeriod {
        &self.target
    }

    /// Matches a concept for a statement of the given period kind.
    pub fn match_fact<S>(&self, source: &S, concept: &Concept, kind: PeriodKind) -> Option<MatchedFact>
    where
        S: FactSource + ?Sized,
    {
        let policy = self.target.policy(kind);
        let matched = self.select(source.facts_for(concept), &policy).and_then(|fact| {
            let period = fact.period()?;
            Some(MatchedFact {
                value: fact.value.clone(),
                unit: fact.unit_name().map(str::to_string),
                start: period.start(),
                end: period.end(),
            })
        });
        if matched.is_none() {
            tracing::trace!(concept = %concept, ?policy, "no matching fact");
        }
        matched
    }

    /// Picks the best candidate passing `policy` and the form filter.
    pub fn select<'f>(&self, candidates: &'f [Fact], policy: &PeriodPolicy) -> Option<&'f Fact> {
        candidates
            .iter()
            .filter(|fact| policy.accepts(fact))
            .filter(|fact| self.form_matches(fact))
            .min_by_key(|fact| self.unit_rank(fact))
    }

    fn form_matches(&self, fact: &Fact) -> bool {
        self.target
            .form
            .as_deref()
            .is_none_or(|form| fact.form.as_deref() == Some(form))
    }

    // 0: canonical currency, 1: other named unit, 2: no unit
    fn unit_rank(&self, fact: &Fact) -> u8 {
        match fact.unit_name() {
            Some(unit) if unit.eq_ignore_ascii_case(&self.target.currency) => 0,
            Some(_) => 1,
            None => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn target() -> TargetPeriod {
        TargetPeriod::new(date("2024-01-01"), date("2024-12-31"))
    }

    fn number(n: f64) -> Option<FactValue> {
        Some(FactValue::Number(n))
    }

    #[test]
    fn test_fiscal_year() {
        let target = TargetPeriod::fiscal_year(date("2024-12-31"));
        assert_eq!(target.start, date("2024-01-01"));
        assert_eq!(target.currency, "USD");

        let leap = TargetPeriod::fiscal_year(date("2024-02-29"));
        assert_eq!(leap.start, date("2023-03-01"));
    }

    #[rstest]
    #[case::instant_on_end(PeriodKind::Instant, None, "2024-12-31", true)]
    #[case::instant_prior_year(PeriodKind::Instant, None, "2023-12-31", false)]
    #[case::duration_exact(PeriodKind::Duration, Some("2024-01-01"), "2024-12-31", true)]
    #[case::duration_quarter(PeriodKind::Duration, Some("2024-10-01"), "2024-12-31", false)]
    #[case::duration_needs_start(PeriodKind::Duration, None, "2024-12-31", false)]
    #[case::malformed_end(PeriodKind::Instant, None, "31.12.2024", false)]
    fn test_policy(
        #[case] kind: PeriodKind,
        #[case] start: Option<&str>,
        #[case] end: &str,
        #[case] expected: bool,
    ) {
        let fact = Fact::new("x:A", number(1.0), Some("USD"));
        let fact = match start {
            Some(start) => fact.with_duration(start, end),
            None => fact.with_instant(end),
        };
        assert_eq!(target().policy(kind).accepts(&fact), expected);
    }

    #[test]
    fn test_canonical_unit_preferred() {
        let index: FactIndex = vec![
            Fact::new("x:A", number(1.0), None).with_instant("2024-12-31"),
            Fact::new("x:A", number(2.0), Some("EUR")).with_instant("2024-12-31"),
            Fact::new("x:A", number(3.0), Some("USD")).with_instant("2024-12-31"),
        ]
        .into_iter()
        .collect();

        let matched = FactMatcher::new(target())
            .match_fact(&index, &Concept::new("x:A"), PeriodKind::Instant)
            .unwrap();
        assert_eq!(matched.value, number(3.0));
        assert_eq!(matched.unit.as_deref(), Some("USD"));
        assert_eq!(matched.start, None);
        assert_eq!(matched.end, date("2024-12-31"));
    }

    #[test]
    fn test_named_unit_beats_empty_and_ties_keep_first() {
        let index: FactIndex = vec![
            Fact::new("x:A", number(1.0), Some(" ")).with_instant("2024-12-31"),
            Fact::new("x:A", number(2.0), Some("shares")).with_instant("2024-12-31"),
            Fact::new("x:A", number(3.0), Some("pure")).with_instant("2024-12-31"),
        ]
        .into_iter()
        .collect();

        let matched = FactMatcher::new(target())
            .match_fact(&index, &Concept::new("x:A"), PeriodKind::Instant)
            .unwrap();
        assert_eq!(matched.value, number(2.0));
    }

    #[test]
    fn test_form_filter() {
        let index: FactIndex = vec![
            Fact::new("x:A", number(1.0), Some("USD"))
                .with_instant("2024-12-31")
                .with_form("10-Q"),
            Fact::new("x:A", number(2.0), Some("USD")).with_instant("2024-12-31"),
            Fact::new("x:A", number(3.0), Some("EUR"))
                .with_instant("2024-12-31")
                .with_form("10-K"),
        ]
        .into_iter()
        .collect();
        let concept = Concept::new("x:A");

        let any_form = FactMatcher::new(target());
        assert_eq!(
            any_form.match_fact(&index, &concept, PeriodKind::Instant).unwrap().value,
            number(1.0)
        );

        let annual = FactMatcher::new(target().with_form("10-K"));
        assert_eq!(
            annual.match_fact(&index, &concept, PeriodKind::Instant).unwrap().value,
            number(3.0)
        );
    }

    #[test]
    fn test_malformed_facts_are_skipped() {
        let index: FactIndex = vec![
            Fact::new("x:A", number(1.0), Some("USD")),
            Fact::new("x:A", number(2.0), Some("USD")).with_duration("bad", "2024-12-31"),
            Fact::new("x:A", number(3.0), Some("USD")).with_duration("2024-01-01", "2024-12-31"),
        ]
        .into_iter()
        .collect();

        let matched = FactMatcher::new(target())
            .match_fact(&index, &Concept::new("x:A"), PeriodKind::Duration)
            .unwrap();
        assert_eq!(matched.value, number(3.0));
        assert_eq!(matched.start, Some(date("2024-01-01")));
    }

    #[test]
    fn test_no_candidates() {
        let index = FactIndex::new();
        assert!(index.is_empty());
        assert!(
            FactMatcher::new(target())
                .match_fact(&index, &Concept::new("x:Missing"), PeriodKind::Instant)
                .is_none()
        );
    }

    #[test]
    fn test_index_from_company_facts() {
        let mut doc = CompanyFacts::new();
        doc.facts.push(Fact::new("us-gaap:Assets", number(1.0), Some("USD")));
        doc.facts.push(Fact::new("us-gaap:Assets", number(2.0), Some("USD")));
        doc.facts.push(Fact::new("us-gaap:Cash", number(3.0), Some("USD")));

        let index = FactIndex::from(doc);
        assert_eq!(index.len(), 3);
        assert_eq!(index.concept_count(), 2);
        assert_eq!(index.facts_for(&Concept::new("us-gaap:Assets")).len(), 2);
    }
}
