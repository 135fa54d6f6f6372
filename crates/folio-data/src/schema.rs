//! Taxonomy schema (`.xsd`) entry points.
//!
//! Only two things are read from a filing's schema: the `link:roleType`
//! declarations, which give each statement role its human-readable
//! definition, and the `link:linkbaseRef` list pointing at the presentation
//! and label linkbases.

use crate::error::{DataError, Result};
use crate::xml::{self, Attributes, LINK_NS, XLINK_NS, XSD_NS};
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const PRESENTATION_REF_ROLE: &str = "http://www.xbrl.org/2003/role/presentationLinkbaseRef";
const LABEL_REF_ROLE: &str = "http://www.xbrl.org/2003/role/labelLinkbaseRef";

/// A role declared by the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleType {
    /// Role URI
    pub uri: String,
    /// Element id
    pub id: Option<String>,
    /// Text of `link:definition`, e.g. `0000002 - Statement - Balance Sheets`
    pub definition: Option<String>,
}

/// A `link:linkbaseRef`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkbaseRef {
    /// Referenced file, relative to the schema
    pub href: String,
    /// `xlink:role`, which tells presentation from label linkbases
    pub role: Option<String>,
}

/// The parts of a taxonomy schema Folio cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Declared roles, in document order
    pub role_types: Vec<RoleType>,
    /// Referenced linkbases, in document order
    pub linkbase_refs: Vec<LinkbaseRef>,
}

impl Schema {
    /// Parses a schema from a string.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_named(xml, "schema")
    }

    /// Reads and parses a schema file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse_named(&xml, &path.display().to_string())
    }

    /// Parses a schema, naming it `document` in errors.
    pub fn parse_named(xml: &str, document: &str) -> Result<Self> {
        let mut reader = xml::reader(xml);
        let mut schema = Self::default();
        let mut seen_root = false;
        let mut role_type: Option<RoleType> = None;
        let mut in_definition = false;

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| DataError::document(document, e))?;
            let in_link_ns = xml::in_namespace(&resolved, LINK_NS);
            let in_xsd_ns = xml::in_namespace(&resolved, XSD_NS);

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let empty = matches!(event, Event::Empty(_));
                    let local = e.local_name();
                    if !seen_root {
                        if !in_xsd_ns || local.as_ref() != b"schema" {
                            return Err(DataError::document(
                                document,
                                format!("root element is <{}>, not xsd:schema", xml::qualified_name(e)),
                            ));
                        }
                        seen_root = true;
                        continue;
                    }
                    if !in_link_ns {
                        continue;
                    }
                    match local.as_ref() {
                        b"roleType" => {
                            let attrs = Attributes::read(&reader, e, document)?;
                            let Some(uri) = attrs.plain("roleURI") else {
                                continue;
                            };
                            let declared = RoleType {
                                uri: uri.to_string(),
                                id: attrs.plain("id").map(str::to_string),
                                definition: None,
                            };
                            if empty {
                                schema.role_types.push(declared);
                            } else {
                                role_type = Some(declared);
                            }
                        }
                        b"definition" => in_definition = !empty && role_type.is_some(),
                        b"linkbaseRef" => {
                            let attrs = Attributes::read(&reader, e, document)?;
                            if let Some(href) = attrs.get(XLINK_NS, "href") {
                                schema.linkbase_refs.push(LinkbaseRef {
                                    href: href.to_string(),
                                    role: attrs.get(XLINK_NS, "role").map(str::to_string),
                                });
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(ref t) if in_definition => {
                    if let Some(role) = role_type.as_mut() {
                        let text = xml::text(document, t)?;
                        role.definition.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::End(ref e) if in_link_ns => match e.local_name().as_ref() {
                    b"definition" => in_definition = false,
                    b"roleType" => {
                        if let Some(role) = role_type.take() {
                            schema.role_types.push(role);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(DataError::document(document, "document has no root element"));
        }
        Ok(schema)
    }

    /// Role URI to definition text, for roles that have one.
    pub fn role_definitions(&self) -> HashMap<String, String> {
        self.role_types
            .iter()
            .filter_map(|r| r.definition.as_ref().map(|d| (r.uri.clone(), d.trim().to_string())))
            .collect()
    }

    /// First referenced presentation linkbase.
    pub fn presentation_href(&self) -> Option<&str> {
        self.linkbase_href(PRESENTATION_REF_ROLE, "_pre.xml")
    }

    /// First referenced label linkbase.
    pub fn label_href(&self) -> Option<&str> {
        self.linkbase_href(LABEL_REF_ROLE, "_lab.xml")
    }

    fn linkbase_href(&self, role: &str, suffix: &str) -> Option<&str> {
        self.linkbase_refs
            .iter()
            .find(|r| r.role.as_deref() == Some(role))
            .or_else(|| self.linkbase_refs.iter().find(|r| r.href.ends_with(suffix)))
            .map(|r| r.href.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:link="http://www.xbrl.org/2003/linkbase"
           xmlns:xlink="http://www.w3.org/1999/xlink">
  <xs:annotation>
    <xs:appinfo>
      <link:linkbaseRef xlink:type="simple" xlink:href="mp-20241231_lab.xml"
          xlink:role="http://www.xbrl.org/2003/role/labelLinkbaseRef"/>
      <link:linkbaseRef xlink:type="simple" xlink:href="mp-20241231_pre.xml"
          xlink:role="http://www.xbrl.org/2003/role/presentationLinkbaseRef"/>
      <link:roleType roleURI="http://mp.com/role/CONSOLIDATEDBALANCESHEETS" id="BalanceSheets">
        <link:definition>0000002 - Statement - CONSOLIDATED BALANCE SHEETS</link:definition>
        <link:usedOn>link:presentationLink</link:usedOn>
      </link:roleType>
      <link:roleType roleURI="http://mp.com/role/Cover" id="Cover"/>
    </xs:appinfo>
  </xs:annotation>
  <xs:element name="Something" id="mp_Something"/>
</xs:schema>"#;

    #[test]
    fn test_parse_role_types() {
        let schema = Schema::parse(SCHEMA).unwrap();

        assert_eq!(schema.role_types.len(), 2);
        assert_eq!(schema.role_types[0].id.as_deref(), Some("BalanceSheets"));
        assert_eq!(
            schema.role_types[0].definition.as_deref(),
            Some("0000002 - Statement - CONSOLIDATED BALANCE SHEETS")
        );
        assert!(schema.role_types[1].definition.is_none());

        let definitions = schema.role_definitions();
        assert_eq!(definitions.len(), 1);
        assert!(
            definitions["http://mp.com/role/CONSOLIDATEDBALANCESHEETS"].contains("BALANCE SHEETS")
        );
    }

    #[test]
    fn test_linkbase_refs() {
        let schema = Schema::parse(SCHEMA).unwrap();

        assert_eq!(schema.presentation_href(), Some("mp-20241231_pre.xml"));
        assert_eq!(schema.label_href(), Some("mp-20241231_lab.xml"));
    }

    #[test]
    fn test_non_schema_root() {
        let err = Schema::parse(r#"<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"/>"#)
            .unwrap_err();
        assert!(err.is_document_failure());
    }
}
