//! `folio extract`: linkbases and facts in, statement files out.

use crate::ExtractArgs;
use crate::config::{Config, ConfigError};
use folio::{
    ExtractionContext, ExtractionReport, FactIndex, GraphBuilder, LabelMap, Role, extract,
    is_statement_like,
};
use folio_data::{CompanyFacts, Instance, Linkbase, Schema};
use folio_output::{export_statements, render_statement};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub(crate) fn run(args: &ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, args);
    config.validate()?;

    let report = run_config(&config)?;
    let out_dir = config.output_dir();
    let paths = export_statements(&report.statements, &out_dir, config.output.format)?;

    if args.print {
        for statement in &report.statements {
            println!("{}", render_statement(statement));
        }
    }

    println!(
        "Wrote {} statements ({} rows, {} with values) to {}",
        paths.len(),
        report.row_count(),
        report.matched_count(),
        out_dir.display()
    );
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.role_uri, skipped.reason);
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, args: &ExtractArgs) {
    let inputs = &mut config.inputs;
    override_with(&mut inputs.presentation, &args.presentation);
    override_with(&mut inputs.labels, &args.labels);
    override_with(&mut inputs.schema, &args.schema);
    if args.company_facts.is_some() || args.instance.is_some() {
        inputs.company_facts.clone_from(&args.company_facts);
        inputs.instance.clone_from(&args.instance);
    }

    let period = &mut config.period;
    override_with(&mut period.end, &args.period_end);
    override_with(&mut period.start, &args.period_start);
    override_with(&mut period.form, &args.form);
    override_with(&mut period.currency, &args.currency);

    let output = &mut config.output;
    override_with(&mut output.dir, &args.out);
    if let Some(format) = args.format {
        output.format = format;
    }
    output.statements_only |= args.statements_only;
    output.preferred_labels |= args.preferred_labels;
}

fn override_with<T: Clone>(setting: &mut Option<T>, flag: &Option<T>) {
    if flag.is_some() {
        setting.clone_from(flag);
    }
}

/// Parses every input named by a validated config and materializes its roles.
pub(crate) fn run_config(config: &Config) -> Result<ExtractionReport, Box<dyn std::error::Error>> {
    let target = config.target_period()?;
    let inputs = &config.inputs;

    let schema = inputs
        .schema
        .as_deref()
        .map(|path| Schema::from_path(path).map(|s| (path, s)))
        .transpose()?;
    let definitions = schema
        .as_ref()
        .map(|(_, s)| s.role_definitions())
        .unwrap_or_default();

    let presentation_path = linkbase_path(
        inputs.presentation.as_deref(),
        schema.as_ref().and_then(|(path, s)| Some((*path, s.presentation_href()?))),
        "inputs.presentation",
    )?;
    let labels_path = linkbase_path(
        inputs.labels.as_deref(),
        schema.as_ref().and_then(|(path, s)| Some((*path, s.label_href()?))),
        "inputs.labels",
    )?;

    let presentation = Linkbase::from_path(&presentation_path)?;
    let labels = LabelMap::from_linkbase(&Linkbase::from_path(&labels_path)?);
    let facts = load_facts(config)?;
    tracing::info!(
        presentation = %presentation_path.display(),
        labels = labels.len(),
        facts = facts.len(),
        concepts = facts.concept_count(),
        "inputs loaded"
    );

    let roles = select_roles(&presentation, &definitions, config.output.statements_only);
    let ctx = ExtractionContext::builder(target)
        .labels(labels)
        .facts(facts)
        .preferred_labels(config.output.preferred_labels)
        .build();

    Ok(extract(&ctx, &roles))
}

/// An explicit path wins; otherwise the schema's linkbase reference,
/// relative to the schema file.
fn linkbase_path(
    explicit: Option<&Path>,
    referenced: Option<(&Path, &str)>,
    field: &'static str,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let (schema, href) = referenced.ok_or(ConfigError::MissingField(field))?;
    let path = schema.parent().unwrap_or_else(|| Path::new("")).join(href);
    tracing::debug!(field, path = %path.display(), "linkbase found through schema");
    Ok(path)
}

fn load_facts(config: &Config) -> Result<FactIndex, Box<dyn std::error::Error>> {
    if let Some(path) = &config.inputs.company_facts {
        let doc = CompanyFacts::from_path(path)?;
        tracing::info!(
            entity = doc.entity_name.as_deref().unwrap_or("unknown"),
            cik = doc.cik.as_deref().unwrap_or("unknown"),
            "company facts loaded"
        );
        return Ok(FactIndex::from(doc));
    }
    if let Some(path) = &config.inputs.instance {
        let instance = Instance::from_path(path)?;
        tracing::info!(
            document_type = instance.document_type.as_deref().unwrap_or("unknown"),
            dimensional_facts_skipped = instance.dimensional_facts,
            "instance loaded"
        );
        return Ok(FactIndex::from(instance));
    }
    Err(ConfigError::MissingField("inputs.company_facts or inputs.instance").into())
}

fn select_roles(
    presentation: &Linkbase,
    definitions: &HashMap<String, String>,
    statements_only: bool,
) -> Vec<Role> {
    GraphBuilder::new(presentation)
        .build_all()
        .into_iter()
        .map(|role| {
            let definition = definitions.get(&role.uri).cloned();
            role.with_definition(definition)
        })
        .filter(|role| {
            let keep = !statements_only || is_statement_like(role);
            if !keep {
                tracing::debug!(role = %role.uri, "not a statement role");
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_data::FactValue;
    use std::fs;

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:link="http://www.xbrl.org/2003/linkbase"
           xmlns:xlink="http://www.w3.org/1999/xlink">
  <xs:annotation><xs:appinfo>
    <link:linkbaseRef xlink:type="simple" xlink:href="ex_pre.xml"
        xlink:role="http://www.xbrl.org/2003/role/presentationLinkbaseRef"/>
    <link:linkbaseRef xlink:type="simple" xlink:href="ex_lab.xml"
        xlink:role="http://www.xbrl.org/2003/role/labelLinkbaseRef"/>
    <link:roleType roleURI="http://ex.com/role/R2" id="R2">
      <link:definition>0000002 - Statement - Balance Sheets</link:definition>
    </link:roleType>
    <link:roleType roleURI="http://ex.com/role/R9" id="R9">
      <link:definition>0000009 - Disclosure - Leases</link:definition>
    </link:roleType>
  </xs:appinfo></xs:annotation>
</xs:schema>"#;

    const PRESENTATION: &str = r#"<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
               xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:presentationLink xlink:type="extended" xlink:role="http://ex.com/role/R2">
    <link:loc xlink:type="locator" xlink:href="ex.xsd#us-gaap_Assets" xlink:label="a"/>
    <link:loc xlink:type="locator" xlink:href="ex.xsd#us-gaap_Cash" xlink:label="c"/>
    <link:presentationArc xlink:type="arc" xlink:from="a" xlink:to="c" order="1"/>
  </link:presentationLink>
  <link:presentationLink xlink:type="extended" xlink:role="http://ex.com/role/R9">
    <link:loc xlink:type="locator" xlink:href="ex.xsd#us-gaap_LeaseCost" xlink:label="l"/>
    <link:loc xlink:type="locator" xlink:href="ex.xsd#us-gaap_OperatingLeaseCost" xlink:label="o"/>
    <link:presentationArc xlink:type="arc" xlink:from="l" xlink:to="o" order="1"/>
  </link:presentationLink>
</link:linkbase>"#;

    const LABELS: &str = r#"<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
               xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:labelLink xlink:type="extended">
    <link:loc xlink:type="locator" xlink:href="ex.xsd#us-gaap_Assets" xlink:label="a"/>
    <link:label xlink:type="resource" xlink:label="lab_a">Total assets</link:label>
    <link:labelArc xlink:type="arc" xlink:from="a" xlink:to="lab_a"/>
  </link:labelLink>
</link:linkbase>"#;

    const FACTS: &str = r#"{"cik": 1234, "entityName": "Example", "facts": {"us-gaap": {
  "Assets": {"units": {"USD": [{"end": "2024-12-31", "val": 1000, "form": "10-K"}]}},
  "Cash": {"units": {"USD": [{"end": "2024-12-31", "val": 250, "form": "10-K"}]}}
}}}"#;

    fn filing() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ex.xsd"), SCHEMA).unwrap();
        fs::write(dir.path().join("ex_pre.xml"), PRESENTATION).unwrap();
        fs::write(dir.path().join("ex_lab.xml"), LABELS).unwrap();
        fs::write(dir.path().join("facts.json"), FACTS).unwrap();
        dir
    }

    fn config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.period.end = chrono::NaiveDate::from_ymd_opt(2024, 12, 31);
        config.inputs.schema = Some(dir.join("ex.xsd"));
        config.inputs.company_facts = Some(dir.join("facts.json"));
        config
    }

    #[test]
    fn test_linkbases_found_through_schema() {
        let dir = filing();
        let config = config(dir.path());
        config.validate().unwrap();

        let report = run_config(&config).unwrap();
        assert_eq!(report.statements.len(), 2);

        let balance = &report.statements[0];
        assert_eq!(balance.name(), "0000002 - Statement - Balance Sheets");
        assert_eq!(balance.rows[0].label, "Total assets");
        assert_eq!(balance.rows[0].value, Some(FactValue::Number(1000.0)));
        assert_eq!(balance.rows[1].value, Some(FactValue::Number(250.0)));
    }

    #[test]
    fn test_statements_only() {
        let dir = filing();
        let mut config = config(dir.path());
        config.output.statements_only = true;

        let report = run_config(&config).unwrap();
        assert_eq!(report.statements.len(), 1);
        assert_eq!(report.statements[0].role_uri, "http://ex.com/role/R2");
    }

    #[test]
    fn test_missing_document_fails() {
        let dir = filing();
        let mut config = config(dir.path());
        config.inputs.presentation = Some(dir.path().join("missing_pre.xml"));
        assert!(run_config(&config).is_err());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let mut config = config(Path::new("/filing"));
        let args = ExtractArgs {
            instance: Some(PathBuf::from("instance.xml")),
            form: Some("10-K".to_string()),
            statements_only: true,
            ..ExtractArgs::default()
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.inputs.instance, Some(PathBuf::from("instance.xml")));
        assert_eq!(config.inputs.company_facts, None);
        assert_eq!(config.inputs.schema, Some(PathBuf::from("/filing/ex.xsd")));
        assert_eq!(config.period.form.as_deref(), Some("10-K"));
        assert!(config.output.statements_only);
    }
}
