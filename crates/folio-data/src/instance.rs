//! XBRL instance documents.
//!
//! An instance holds the facts of one filing. Each fact element refers to a
//! context (entity and period, optionally dimensional qualifiers) and, for
//! numeric facts, a unit.
//!
//! Facts are turned into the same [`Fact`] records the companyfacts reader
//! produces:
//! - facts in dimensional contexts (`segment` or `scenario`) are left out,
//!   since a statement line item reports the undimensioned total
//! - units render as the measure's local name (`USD`) or `num/den` for divides
//! - the form comes from the instance's own `dei:DocumentType` fact
//! - `xsi:nil` facts have no value

use crate::error::{DataError, Result};
use crate::facts::{Fact, FactValue};
use crate::xml::{self, Attributes, LINK_NS, XBRLI_NS, XSI_NS};
use quick_xml::events::Event;
use std::collections::HashMap;
use std::path::Path;

/// A parsed instance document.
#[derive(Debug, Clone, Default)]
pub struct Instance {
    /// Facts in document order
    pub facts: Vec<Fact>,
    /// Value of `dei:DocumentType`, e.g. `10-K`
    pub document_type: Option<String>,
    /// Number of facts left out because their context is dimensional
    pub dimensional_facts: usize,
}

#[derive(Debug, Default)]
struct Context {
    start: Option<String>,
    end: Option<String>,
    dimensional: bool,
}

#[derive(Debug, Default)]
struct Unit {
    numerator: Vec<String>,
    denominator: Vec<String>,
}

impl Unit {
    fn render(&self) -> String {
        let num = self.numerator.join("*");
        if self.denominator.is_empty() {
            num
        } else {
            format!("{}/{}", num, self.denominator.join("*"))
        }
    }
}

#[derive(Debug)]
struct RawFact {
    concept: String,
    context: String,
    unit: Option<String>,
    nil: bool,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Instant,
    StartDate,
    EndDate,
    Measure,
}

impl Instance {
    /// Parses an instance from a string.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_named(xml, "instance")
    }

    /// Reads and parses an instance file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse_named(&xml, &path.display().to_string())
    }

    /// Parses an instance, naming it `document` in errors.
    pub fn parse_named(xml: &str, document: &str) -> Result<Self> {
        let mut reader = xml::reader(xml);
        let mut seen_root = false;
        let mut depth = 0usize;

        let mut contexts: HashMap<String, Context> = HashMap::new();
        let mut units: HashMap<String, Unit> = HashMap::new();
        let mut raw_facts: Vec<RawFact> = Vec::new();

        let mut context: Option<(String, Context)> = None;
        let mut unit: Option<(String, Unit)> = None;
        let mut in_denominator = false;
        let mut field: Option<Field> = None;
        let mut fact: Option<(usize, RawFact)> = None;

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| DataError::document(document, e))?;
            let in_xbrli = xml::in_namespace(&resolved, XBRLI_NS);
            let in_link = xml::in_namespace(&resolved, LINK_NS);

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let empty = matches!(event, Event::Empty(_));
                    if !empty {
                        depth += 1;
                    }
                    let local = e.local_name();
                    if !seen_root {
                        if !in_xbrli || local.as_ref() != b"xbrl" {
                            return Err(DataError::document(
                                document,
                                format!("root element is <{}>, not xbrli:xbrl", xml::qualified_name(e)),
                            ));
                        }
                        seen_root = true;
                        continue;
                    }
                    if fact.is_some() {
                        continue;
                    }

                    if in_xbrli {
                        match local.as_ref() {
                            b"context" => {
                                let attrs = Attributes::read(&reader, e, document)?;
                                let id = attrs.plain("id").unwrap_or_default().to_string();
                                context = Some((id, Context::default()));
                            }
                            b"segment" | b"scenario" => {
                                if let Some((_, ctx)) = context.as_mut() {
                                    ctx.dimensional = true;
                                }
                            }
                            b"instant" if !empty => field = Some(Field::Instant),
                            b"startDate" if !empty => field = Some(Field::StartDate),
                            b"endDate" if !empty => field = Some(Field::EndDate),
                            b"unit" => {
                                let attrs = Attributes::read(&reader, e, document)?;
                                let id = attrs.plain("id").unwrap_or_default().to_string();
                                unit = Some((id, Unit::default()));
                                in_denominator = false;
                            }
                            b"unitDenominator" => in_denominator = true,
                            b"measure" if !empty => field = Some(Field::Measure),
                            _ => {}
                        }
                        continue;
                    }
                    if in_link {
                        continue;
                    }

                    let attrs = Attributes::read(&reader, e, document)?;
                    let Some(context_ref) = attrs.plain("contextRef") else {
                        continue;
                    };
                    let raw = RawFact {
                        concept: xml::qualified_name(e),
                        context: context_ref.to_string(),
                        unit: attrs.plain("unitRef").map(str::to_string),
                        nil: is_nil(attrs.get(XSI_NS, "nil")),
                        text: String::new(),
                    };
                    if empty {
                        raw_facts.push(raw);
                    } else {
                        fact = Some((depth, raw));
                    }
                }
                Event::Text(ref t) => {
                    let text = xml::text(document, t)?;
                    if let Some((_, raw)) = fact.as_mut() {
                        raw.text.push_str(&text);
                    } else if let Some(f) = field {
                        let text = text.trim().to_string();
                        match f {
                            Field::Instant | Field::EndDate => {
                                if let Some((_, ctx)) = context.as_mut() {
                                    ctx.end = Some(text);
                                }
                            }
                            Field::StartDate => {
                                if let Some((_, ctx)) = context.as_mut() {
                                    ctx.start = Some(text);
                                }
                            }
                            Field::Measure => {
                                if let Some((_, u)) = unit.as_mut() {
                                    let measure = text.rsplit(':').next().unwrap_or_default().to_string();
                                    if in_denominator {
                                        u.denominator.push(measure);
                                    } else {
                                        u.numerator.push(measure);
                                    }
                                }
                            }
                        }
                    }
                }
                Event::CData(ref c) => {
                    if let Some((_, raw)) = fact.as_mut() {
                        raw.text.push_str(&xml::cdata(c));
                    }
                }
                Event::End(ref e) => {
                    if matches!(fact, Some((d, _)) if d == depth) {
                        if let Some((_, raw)) = fact.take() {
                            raw_facts.push(raw);
                        }
                    } else if fact.is_none() && in_xbrli {
                        match e.local_name().as_ref() {
                            b"context" => {
                                if let Some((id, ctx)) = context.take() {
                                    contexts.insert(id, ctx);
                                }
                            }
                            b"unit" => {
                                if let Some((id, u)) = unit.take() {
                                    units.insert(id, u);
                                }
                            }
                            b"unitDenominator" => in_denominator = false,
                            _ => {}
                        }
                        field = None;
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(DataError::document(document, "document has no root element"));
        }
        if depth != 0 {
            return Err(DataError::document(document, "unexpected end of document"));
        }

        Ok(Self::assemble(raw_facts, &contexts, &units))
    }

    fn assemble(
        raw_facts: Vec<RawFact>,
        contexts: &HashMap<String, Context>,
        units: &HashMap<String, Unit>,
    ) -> Self {
        let document_type = raw_facts
            .iter()
            .find(|f| f.concept.ends_with(":DocumentType") && !f.nil)
            .map(|f| f.text.trim().to_string())
            .filter(|t| !t.is_empty());

        let mut facts = Vec::with_capacity(raw_facts.len());
        let mut dimensional_facts = 0;

        for raw in raw_facts {
            let Some(ctx) = contexts.get(&raw.context) else {
                tracing::debug!(concept = %raw.concept, context = %raw.context, "fact refers to unknown context");
                continue;
            };
            if ctx.dimensional {
                dimensional_facts += 1;
                continue;
            }

            let value = if raw.nil || raw.text.trim().is_empty() {
                None
            } else {
                Some(FactValue::parse(&raw.text))
            };
            let unit = raw
                .unit
                .as_ref()
                .and_then(|id| units.get(id))
                .map(Unit::render);

            facts.push(Fact {
                concept: raw.concept,
                value,
                unit,
                period_start: ctx.start.clone(),
                period_end: ctx.end.clone(),
                form: document_type.clone(),
                fiscal_year: None,
                fiscal_period: None,
                accession: None,
            });
        }

        Self {
            facts,
            document_type,
            dimensional_facts,
        }
    }
}

/// `xsi:nil` is an XML Schema boolean: `true` or `1`.
fn is_nil(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true" | "1"))
}
