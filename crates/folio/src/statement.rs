//! Statement materialization.
//!
//! A statement is the flat, ordered row sequence of one presentation role:
//! one [`OutputRow`] per concept visited by [`Role::walk`], carrying its depth,
//! its label and the fact matched for the run's target period.

use crate::context::ExtractionContext;
use crate::error::{Result, StatementError};
use crate::matcher::PeriodKind;
use crate::presentation::Role;
use chrono::NaiveDate;
use folio_data::FactValue;
use serde::{Deserialize, Serialize};

/// One line of a rendered statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    /// Role the row belongs to
    pub role_uri: String,
    /// Nesting depth, 0 for roots
    pub depth: usize,
    /// Display label
    pub label: String,
    /// Concept identifier
    pub concept: String,
    /// Matched value, `None` when no fact matched
    pub value: Option<FactValue>,
    /// Unit of the matched value
    pub unit: Option<String>,
    /// Start of the matched fact's period
    #[serde(rename = "start")]
    pub period_start: Option<NaiveDate>,
    /// End of the matched fact's period
    #[serde(rename = "end")]
    pub period_end: Option<NaiveDate>,
}

impl OutputRow {
    /// Whether a value was matched.
    pub const fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// Materializes a role into rows, in traversal order.
///
/// Concepts without a label fall back to their identifier; concepts without
/// a matching fact still get a row, with no value. Fails only for a role
/// without any concept.
pub fn materialize(ctx: &ExtractionContext, role: &Role) -> Result<Vec<OutputRow>> {
    Statement::build(ctx, role).map(|statement| statement.rows)
}

fn rows(ctx: &ExtractionContext, role: &Role, kind: PeriodKind) -> Vec<OutputRow> {
    role.walk()
        .map(|visit| {
            let label = if ctx.preferred_labels() {
                ctx.labels().label_for(visit.concept, visit.preferred_label)
            } else {
                ctx.labels().get_label(visit.concept)
            };
            let matched = ctx.matcher().match_fact(ctx.facts(), visit.concept, kind);
            let (value, unit, period_start, period_end) = match matched {
                Some(m) => (m.value, m.unit, m.start, Some(m.end)),
                None => (None, None, None, None),
            };
            OutputRow {
                role_uri: role.uri.clone(),
                depth: visit.depth,
                label: label.to_string(),
                concept: visit.concept.to_string(),
                value,
                unit,
                period_start,
                period_end,
            }
        })
        .collect()
}

/// A materialized role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Role URI
    pub role_uri: String,
    /// Schema definition of the role
    pub definition: Option<String>,
    /// Period kind facts were matched with
    pub period_kind: PeriodKind,
    /// Rows in traversal order
    pub rows: Vec<OutputRow>,
}

impl Statement {
    /// Materializes a role into a statement.
    pub fn build(ctx: &ExtractionContext, role: &Role) -> Result<Self> {
        if role.is_empty() {
            return Err(StatementError::EmptyRole {
                role: role.uri.clone(),
            });
        }
        let period_kind = ctx.classifier().classify(role);
        Ok(Self {
            role_uri: role.uri.clone(),
            definition: role.definition.clone(),
            period_kind,
            rows: rows(ctx, role, period_kind),
        })
    }

    /// The definition if known, else the URI.
    pub fn name(&self) -> &str {
        self.definition.as_deref().unwrap_or(&self.role_uri)
    }

    /// Number of rows with a matched value.
    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.has_value()).count()
    }
}

/// A role that produced no statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRole {
    /// Role URI
    pub role_uri: String,
    /// Why it was skipped
    pub reason: String,
}

/// Outcome of a run over many roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Materialized statements, in role order
    pub statements: Vec<Statement>,
    /// Roles that were skipped
    pub skipped: Vec<SkippedRole>,
}

impl ExtractionReport {
    /// Total number of rows.
    pub fn row_count(&self) -> usize {
        self.statements.iter().map(|s| s.rows.len()).sum()
    }

    /// Total number of rows with a matched value.
    pub fn matched_count(&self) -> usize {
        self.statements.iter().map(Statement::matched_count).sum()
    }
}

/// Materializes every role. Empty roles are skipped and reported; they do not
/// stop the run.
pub fn extract<'r, I>(ctx: &ExtractionContext, roles: I) -> ExtractionReport
where
    I: IntoIterator<Item = &'r Role>,
{
    let mut report = ExtractionReport::default();

    for role in roles {
        match Statement::build(ctx, role) {
            Ok(statement) => {
                tracing::info!(
                    role = %statement.role_uri,
                    kind = %statement.period_kind,
                    rows = statement.rows.len(),
                    matched = statement.matched_count(),
                    "materialized statement"
                );
                report.statements.push(statement);
            }
            Err(e) => {
                tracing::warn!(role = %role.uri, error = %e, "skipping role");
                report.skipped.push(SkippedRole {
                    role_uri: role.uri.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}
