//! Plain-text rendering of a statement for terminal preview.

use folio::Statement;
use folio_data::FactValue;

const WIDTH: usize = 80;
const LABEL_WIDTH: usize = 52;

/// Renders a statement as an indented text table, two spaces per depth level.
pub fn render_statement(statement: &Statement) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", statement.name()));
    if statement.definition.is_some() {
        output.push_str(&format!("Role: {}\n", statement.role_uri));
    }
    output.push_str(&format!("Period: {}\n", statement.period_kind));
    output.push_str(&"=".repeat(WIDTH));
    output.push('\n');

    output.push_str(&format!("{:<LABEL_WIDTH$} {:>18} {:>8}\n", "Line item", "Value", "Unit"));
    output.push_str(&"-".repeat(WIDTH));
    output.push('\n');

    for row in &statement.rows {
        let label = fit(&format!("{}{}", "  ".repeat(row.depth), row.label), LABEL_WIDTH);
        output.push_str(&format!(
            "{:<LABEL_WIDTH$} {:>18} {:>8}\n",
            label,
            row.value.as_ref().map(format_value).unwrap_or_default(),
            row.unit.as_deref().unwrap_or_default()
        ));
    }

    output.push_str(&"=".repeat(WIDTH));
    output.push('\n');
    output.push_str(&format!(
        "{} rows, {} with values\n",
        statement.rows.len(),
        statement.matched_count()
    ));

    output
}

fn format_value(value: &FactValue) -> String {
    match value {
        FactValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => group_thousands(*n as i64),
        FactValue::Number(n) => format!("{n:.2}"),
        FactValue::Text(s) => fit(s, 18),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 { format!("({grouped})") } else { grouped }
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::{OutputRow, PeriodKind};

    fn row(depth: usize, label: &str, value: Option<FactValue>) -> OutputRow {
        OutputRow {
            role_uri: "http://x.com/role/BalanceSheet".to_string(),
            depth,
            label: label.to_string(),
            concept: String::new(),
            unit: value.as_ref().map(|_| "USD".to_string()),
            value,
            period_start: None,
            period_end: None,
        }
    }

    #[test]
    fn test_render_statement() {
        let statement = Statement {
            role_uri: "http://x.com/role/BalanceSheet".to_string(),
            definition: Some("0000002 - Statement - Balance Sheets".to_string()),
            period_kind: PeriodKind::Instant,
            rows: vec![
                row(0, "Total assets", Some(FactValue::Number(3_500_000_000.0))),
                row(1, "Cash", Some(FactValue::Number(-1250.0))),
                row(1, "Liabilities", None),
            ],
        };

        let text = render_statement(&statement);
        assert!(text.contains("0000002 - Statement - Balance Sheets"));
        assert!(text.contains("Role: http://x.com/role/BalanceSheet"));
        assert!(text.contains("Period: instant"));
        assert!(text.contains("3,500,000,000"));
        assert!(text.contains("(1,250)"));
        assert!(text.lines().any(|l| l.starts_with("  Cash")));
        assert!(text.contains("3 rows, 2 with values"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&FactValue::Number(999.0)), "999");
        assert_eq!(format_value(&FactValue::Number(1000.0)), "1,000");
        assert_eq!(format_value(&FactValue::Number(0.126)), "0.13");
        assert_eq!(format_value(&FactValue::Text("true".to_string())), "true");
    }

    #[test]
    fn test_fit_truncates_long_labels() {
        let long = "x".repeat(100);
        let cut = fit(&long, 20);
        assert_eq!(cut.chars().count(), 20);
        assert!(cut.ends_with("..."));
    }
}
