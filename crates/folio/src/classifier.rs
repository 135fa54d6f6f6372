//! Role classification.
//!
//! Balance sheets report balances at a point in time, every other statement
//! reports flows over a period. Which is which is decided from the role's
//! schema definition and URI through a [`PeriodClassifier`].

use crate::matcher::PeriodKind;
use crate::presentation::Role;

/// Keywords marking a role as an instant (balance sheet) statement.
pub const INSTANT_KEYWORDS: &[&str] = &["balance sheet", "financial position"];

/// Keywords marking a role as a primary financial statement.
pub const STATEMENT_KEYWORDS: &[&str] = &[
    "balance",
    "financial position",
    "income",
    "operations",
    "earnings",
    "cash flow",
    "equity",
    "stockholders",
    "shareholders",
];

/// Decides the period kind of a statement role.
pub trait PeriodClassifier {
    /// Period kind of the role's facts.
    fn classify(&self, role: &Role) -> PeriodKind;
}

impl<F> PeriodClassifier for F
where
    F: Fn(&Role) -> PeriodKind,
{
    fn classify(&self, role: &Role) -> PeriodKind {
        self(role)
    }
}

/// Classifies a role as instant when its definition or URI contains one of
/// a set of keywords, duration otherwise.
///
/// Matching ignores case, spaces and punctuation, so `balance sheet` matches
/// both `Consolidated Balance Sheets` and `.../role/CONSOLIDATEDBALANCESHEETS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    /// Creates a classifier with custom instant keywords.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords.into_iter().map(|k| normalize(k.as_ref())).collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(INSTANT_KEYWORDS)
    }
}

impl PeriodClassifier for KeywordClassifier {
    fn classify(&self, role: &Role) -> PeriodKind {
        if mentions_any(role, &self.keywords) {
            PeriodKind::Instant
        } else {
            PeriodKind::Duration
        }
    }
}

/// Whether a role looks like a primary financial statement rather than a
/// note, policy or parenthetical disclosure.
pub fn is_statement_like(role: &Role) -> bool {
    let keywords: Vec<String> = STATEMENT_KEYWORDS.iter().map(|k| normalize(k)).collect();
    mentions_any(role, &keywords)
}

fn mentions_any(role: &Role, keywords: &[String]) -> bool {
    let haystack = normalize(&format!(
        "{} {}",
        role.definition.as_deref().unwrap_or_default(),
        role.uri
    ));
    keywords.iter().any(|k| !k.is_empty() && haystack.contains(k.as_str()))
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn role(uri: &str, definition: Option<&str>) -> Role {
        Role::new(uri).with_definition(definition.map(str::to_string))
    }

    #[rstest]
    #[case("http://mp.com/role/CONSOLIDATEDBALANCESHEETS", None, PeriodKind::Instant)]
    #[case("http://x.com/role/BalanceSheet", None, PeriodKind::Instant)]
    #[case("http://x.com/role/R2", Some("0000002 - Statement - Balance Sheets"), PeriodKind::Instant)]
    #[case("http://x.com/role/StatementOfFinancialPosition", None, PeriodKind::Instant)]
    #[case("http://x.com/role/IncomeStatement", None, PeriodKind::Duration)]
    #[case("http://x.com/role/CashFlows", Some("Statement - Cash Flows"), PeriodKind::Duration)]
    fn test_keyword_classifier(
        #[case] uri: &str,
        #[case] definition: Option<&str>,
        #[case] expected: PeriodKind,
    ) {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify(&role(uri, definition)), expected);
    }

    #[test]
    fn test_custom_keywords() {
        let classifier = KeywordClassifier::new(["Net Assets"]);
        assert_eq!(
            classifier.classify(&role("http://x.com/role/StatementOfNetAssets", None)),
            PeriodKind::Instant
        );
        assert_eq!(
            classifier.classify(&role("http://x.com/role/BalanceSheet", None)),
            PeriodKind::Duration
        );
    }

    #[test]
    fn test_closure_classifier() {
        let always_instant = |_: &Role| PeriodKind::Instant;
        assert_eq!(
            always_instant.classify(&role("http://x.com/role/IncomeStatement", None)),
            PeriodKind::Instant
        );
    }

    #[rstest]
    #[case("http://x.com/role/CONSOLIDATEDSTATEMENTSOFOPERATIONS", None, true)]
    #[case("http://x.com/role/R4", Some("Statement - Consolidated Statements of Cash Flows"), true)]
    #[case("http://x.com/role/StockholdersEquity", None, true)]
    #[case("http://x.com/role/AccountingPolicies", Some("Summary of Significant Accounting Policies"), false)]
    #[case("http://x.com/role/Cover", Some("Cover"), false)]
    fn test_is_statement_like(#[case] uri: &str, #[case] definition: Option<&str>, #[case] expected: bool) {
        assert_eq!(is_statement_like(&role(uri, definition)), expected);
    }
}
