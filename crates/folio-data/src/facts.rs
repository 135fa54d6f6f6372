//! Reported XBRL facts.
//!
//! Facts come either from the SEC JSON API:
//! `https://data.sec.gov/api/xbrl/companyfacts/CIK{cik_padded}.json`
//! or from a filing's instance document (see [`crate::instance`]).
//!
//! Period dates are kept as reported. A fact whose dates do not parse is not
//! rejected here; it simply has no [`Fact::period`] and is passed over when
//! facts are matched against a target period.
//!
//! # Example
//!
//! ```no_run
//! use folio_data::CompanyFacts;
//! use std::path::Path;
//!
//! # fn main() -> folio_data::Result<()> {
//! let doc = CompanyFacts::from_path(Path::new("CIK0001801368.json"))?;
//! for fact in doc.facts.iter().filter(|f| f.concept == "us-gaap:Assets") {
//!     println!("{:?} {:?} {:?}", fact.period_end, fact.value, fact.unit);
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The value of a fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// Numeric value
    Number(f64),
    /// Non-numeric value (text blocks, dates, identifiers)
    Text(String),
}

impl FactValue {
    /// Parses reported text, keeping it as text unless it is a plain number.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Numeric value, if any.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The reporting period of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactPeriod {
    /// Point in time, like a balance sheet item
    Instant(NaiveDate),
    /// Accumulated over a period, like an income statement item
    Duration {
        /// First day of the period
        start: NaiveDate,
        /// Last day of the period
        end: NaiveDate,
    },
}

impl FactPeriod {
    /// End of the period (the instant itself for instant facts).
    pub const fn end(&self) -> NaiveDate {
        match self {
            Self::Instant(end) | Self::Duration { end, .. } => *end,
        }
    }

    /// Start of the period, `None` for instants.
    pub const fn start(&self) -> Option<NaiveDate> {
        match self {
            Self::Instant(_) => None,
            Self::Duration { start, .. } => Some(*start),
        }
    }
}

/// A single reported fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Concept identifier, e.g. `us-gaap:NetIncomeLoss`
    pub concept: String,

    /// Reported value, `None` when nil or absent
    pub value: Option<FactValue>,

    /// Unit of measure (e.g. `USD`, `shares`, `USD/shares`)
    pub unit: Option<String>,

    /// Start date as reported (duration facts only)
    pub period_start: Option<String>,

    /// End date as reported
    pub period_end: Option<String>,

    /// Form type (e.g. `10-K`, `10-Q`)
    pub form: Option<String>,

    /// Fiscal year
    pub fiscal_year: Option<i32>,

    /// Fiscal period (e.g. `FY`, `Q1`)
    pub fiscal_period: Option<String>,

    /// Accession number of the filing that reported the fact
    pub accession: Option<String>,
}

impl Fact {
    /// Creates a fact with only a concept, value and unit set.
    pub fn new(concept: impl Into<String>, value: Option<FactValue>, unit: Option<&str>) -> Self {
        Self {
            concept: concept.into(),
            value,
            unit: unit.map(str::to_string),
            period_start: None,
            period_end: None,
            form: None,
            fiscal_year: None,
            fiscal_period: None,
            accession: None,
        }
    }

    /// Sets an instant period.
    pub fn with_instant(mut self, end: &str) -> Self {
        self.period_start = None;
        self.period_end = Some(end.to_string());
        self
    }

    /// Sets a duration period.
    pub fn with_duration(mut self, start: &str, end: &str) -> Self {
        self.period_start = Some(start.to_string());
        self.period_end = Some(end.to_string());
        self
    }

    /// Sets the form type.
    pub fn with_form(mut self, form: &str) -> Self {
        self.form = Some(form.to_string());
        self
    }

    /// Parsed reporting period.
    ///
    /// `None` when the end date is missing, or either date is malformed.
    pub fn period(&self) -> Option<FactPeriod> {
        let end = parse_date(self.period_end.as_deref()?)?;
        match self.period_start.as_deref() {
            None => Some(FactPeriod::Instant(end)),
            Some(start) => Some(FactPeriod::Duration {
                start: parse_date(start)?,
                end,
            }),
        }
    }

    /// Unit name, `None` when missing or blank.
    pub fn unit_name(&self) -> Option<&str> {
        self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// All facts a company has reported through the SEC JSON API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyFacts {
    /// All facts, ordered by taxonomy, concept and unit, then as reported
    pub facts: Vec<Fact>,

    /// Company name
    pub entity_name: Option<String>,

    /// CIK (Central Index Key)
    pub cik: Option<String>,
}

impl CompanyFacts {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the SEC companyfacts JSON format.
    ///
    /// The format is documented at: https://www.sec.gov/edgar/sec-api-documentation
    pub fn parse_json(json: &str) -> Result<Self> {
        Self::parse_json_named(json, "companyfacts")
    }

    /// Reads and parses a companyfacts JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::parse_json_named(&json, &path.display().to_string())
    }

    /// Parses companyfacts JSON, naming it `document` in errors.
    pub fn parse_json_named(json: &str, document: &str) -> Result<Self> {
        let response: SecApiResponse =
            serde_json::from_str(json).map_err(|e| DataError::document(document, e))?;

        let mut facts = Vec::new();

        for (taxonomy, concepts) in &response.facts {
            for (concept_name, concept_data) in concepts {
                let concept = format!("{taxonomy}:{concept_name}");

                for (unit, entries) in &concept_data.units {
                    for entry in entries {
                        facts.push(Fact {
                            concept: concept.clone(),
                            value: entry.val.as_ref().and_then(json_value),
                            unit: Some(unit.clone()),
                            period_start: entry.start.clone(),
                            period_end: entry.end.clone(),
                            form: entry.form.clone(),
                            fiscal_year: entry.fy,
                            fiscal_period: entry.fp.clone(),
                            accession: entry.accn.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            facts,
            entity_name: response.entity_name,
            cik: response.cik.map(|cik| cik.to_string()),
        })
    }
}

fn json_value(value: &serde_json::Value) -> Option<FactValue> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map(FactValue::Number),
        serde_json::Value::String(s) => Some(FactValue::Text(s.clone())),
        serde_json::Value::Bool(b) => Some(FactValue::Text(b.to_string())),
        _ => None,
    }
}

// SEC API JSON structure
// Based on: https://www.sec.gov/edgar/sec-api-documentation
// BTreeMaps keep fact order stable between runs.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecApiResponse {
    #[serde(default)]
    cik: Option<Cik>,
    #[serde(default)]
    entity_name: Option<String>,
    facts: BTreeMap<String, BTreeMap<String, ConceptData>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Cik {
    Number(u64),
    Text(String),
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n:0>10}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConceptData {
    #[serde(default)]
    units: BTreeMap<String, Vec<FactData>>,
}

#[derive(Debug, Deserialize)]
struct FactData {
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    val: Option<serde_json::Value>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    accn: Option<String>, // Accession number
    #[serde(default)]
    fy: Option<i32>, // Fiscal year
    #[serde(default)]
    fp: Option<String>, // Fiscal period
    #[serde(default)]
    form: Option<String>, // Form type (10-K, 10-Q, etc.)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_instant_period() {
        let fact = Fact::new("us-gaap:Assets", Some(FactValue::Number(1000000.0)), Some("USD"))
            .with_instant("2023-12-31");

        let period = fact.period().unwrap();
        assert!(matches!(period, FactPeriod::Instant(_)));
        assert_eq!(period.end(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_fact_duration_period() {
        let fact = Fact::new("us-gaap:NetIncomeLoss", Some(FactValue::Number(100000.0)), Some("USD"))
            .with_duration("2023-01-01", "2023-12-31");

        let period = fact.period().unwrap();
        assert!(matches!(period, FactPeriod::Duration { .. }));
        assert_eq!(period.start(), NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(period.end(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_malformed_period_is_none() {
        let missing_end = Fact::new("us-gaap:Assets", None, Some("USD"));
        assert!(missing_end.period().is_none());

        let bad_end = Fact::new("us-gaap:Assets", None, Some("USD")).with_instant("12/31/2023");
        assert!(bad_end.period().is_none());

        let bad_start =
            Fact::new("us-gaap:Revenues", None, Some("USD")).with_duration("2023-13-01", "2023-12-31");
        assert!(bad_start.period().is_none());
    }

    #[test]
    fn test_unit_name_blank() {
        assert_eq!(Fact::new("x:A", None, Some("USD")).unit_name(), Some("USD"));
        assert_eq!(Fact::new("x:A", None, Some("  ")).unit_name(), None);
        assert_eq!(Fact::new("x:A", None, None).unit_name(), None);
    }

    #[test]
    fn test_fact_value_parse_and_display() {
        assert_eq!(FactValue::parse(" 352755000000 "), FactValue::Number(352755000000.0));
        assert_eq!(FactValue::parse("10-K"), FactValue::Text("10-K".to_string()));
        assert_eq!(FactValue::Number(352755000000.0).to_string(), "352755000000");
        assert_eq!(FactValue::Number(-1.25).to_string(), "-1.25");
        assert_eq!(FactValue::Text("true".to_string()).as_number(), None);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "cik": 1801368,
            "entityName": "MP Materials Corp.",
            "facts": {
                "us-gaap": {
                    "Revenues": {
                        "label": "Revenues",
                        "units": {
                            "USD": [
                                {"start": "2024-01-01", "end": "2024-12-31", "val": 203859000,
                                 "accn": "0001801368-25-000009", "fy": 2024, "fp": "FY", "form": "10-K"}
                            ]
                        }
                    },
                    "Assets": {
                        "units": {
                            "USD": [
                                {"end": "2024-12-31", "val": 3.5e9, "form": "10-K"},
                                {"end": "not-a-date", "val": 1, "form": "10-K"}
                            ]
                        }
                    }
                },
                "dei": {
                    "EntityCommonStockSharesOutstanding": {
                        "units": {"shares": [{"end": "2025-02-14", "val": 163000000}]}
                    }
                }
            }
        }"#;

        let doc = CompanyFacts::parse_json(json).unwrap();

        assert_eq!(doc.cik.as_deref(), Some("0001801368"));
        assert_eq!(doc.entity_name.as_deref(), Some("MP Materials Corp."));
        assert_eq!(doc.facts.len(), 4);

        // taxonomies and concepts come out sorted
        assert_eq!(doc.facts[0].concept, "dei:EntityCommonStockSharesOutstanding");
        assert_eq!(doc.facts[1].concept, "us-gaap:Assets");
        assert_eq!(doc.facts[3].concept, "us-gaap:Revenues");

        let revenue = &doc.facts[3];
        assert_eq!(revenue.value, Some(FactValue::Number(203859000.0)));
        assert_eq!(revenue.fiscal_year, Some(2024));
        assert_eq!(revenue.accession.as_deref(), Some("0001801368-25-000009"));
        assert!(matches!(revenue.period(), Some(FactPeriod::Duration { .. })));

        // malformed dates survive parsing but have no period
        assert!(doc.facts[2].period().is_none());

        assert_eq!(doc.facts.iter().filter(|f| f.concept == "us-gaap:Assets").count(), 2);
    }

    #[test]
    fn test_parse_json_invalid() {
        let result = CompanyFacts::parse_json("invalid json");
        assert!(result.unwrap_err().is_document_failure());

        let result = CompanyFacts::parse_json("{}");
        assert!(result.is_err());
    }
}
