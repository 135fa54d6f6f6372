//! XLink linkbase documents.
//!
//! A linkbase is a set of extended links. Each extended link carries a role
//! URI and three kinds of children:
//! - locators, which point at taxonomy concepts through an `href`
//! - resources, such as label texts
//! - arcs, which relate locators and resources by their `xlink:label`
//!
//! Locator and resource labels are only unique inside their enclosing link,
//! so the reader keeps every link as its own block and leaves resolution to
//! the caller.
//!
//! # Example
//!
//! ```no_run
//! use folio_data::Linkbase;
//! use std::path::Path;
//!
//! # fn main() -> folio_data::Result<()> {
//! let pre = Linkbase::from_path(Path::new("mp-20241231_pre.xml"))?;
//! for link in pre.presentation_links() {
//!     println!("{:?}: {} arcs", link.role, link.arcs.len());
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{DataError, Result};
use crate::xml::{self, Attributes, LINK_NS, XLINK_NS};
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Element name of presentation extended links.
pub const PRESENTATION_LINK: &str = "presentationLink";

/// Element name of label extended links.
pub const LABEL_LINK: &str = "labelLink";

/// A locator: a block-scoped label pointing at one concept definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    /// `xlink:label`, unique within the enclosing link
    pub label: String,
    /// `xlink:href`, e.g. `mp-20241231.xsd#us-gaap_Assets`
    pub href: String,
}

/// An arc between two labels of the same extended link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkArc {
    /// `xlink:from`
    pub from: String,
    /// `xlink:to`
    pub to: String,
    /// `xlink:arcrole`
    pub arcrole: Option<String>,
    /// Raw `order` attribute, left unparsed
    pub order: Option<String>,
    /// `preferredLabel` role on presentation arcs
    pub preferred_label: Option<String>,
}

/// A resource, in practice a label text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// `xlink:label`
    pub label: String,
    /// `xlink:role`, e.g. `http://www.xbrl.org/2003/role/label`
    pub role: Option<String>,
    /// `xml:lang`
    pub lang: Option<String>,
    /// Trimmed text content
    pub text: String,
}

/// One extended-link block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedLink {
    /// Local element name, e.g. `presentationLink`
    pub element: String,
    /// `xlink:role` of the block
    pub role: Option<String>,
    /// Locators in document order
    pub locators: Vec<Locator>,
    /// Arcs in document order
    pub arcs: Vec<LinkArc>,
    /// Resources in document order
    pub resources: Vec<Resource>,
}

/// A parsed linkbase document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linkbase {
    /// Role URIs declared through `link:roleRef`
    pub role_refs: Vec<String>,
    /// Extended links in document order
    pub links: Vec<ExtendedLink>,
}

impl Linkbase {
    /// Parses a linkbase from a string.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_named(xml, "linkbase")
    }

    /// Reads and parses a linkbase file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse_named(&xml, &path.display().to_string())
    }

    /// Parses a linkbase, naming it `document` in errors.
    pub fn parse_named(xml: &str, document: &str) -> Result<Self> {
        LinkbaseReader::new(document).read(xml)
    }

    /// Extended links with the given local element name.
    pub fn links_of<'a>(&'a self, element: &'a str) -> impl Iterator<Item = &'a ExtendedLink> {
        self.links.iter().filter(move |l| l.element == element)
    }

    /// Presentation links.
    pub fn presentation_links(&self) -> impl Iterator<Item = &ExtendedLink> {
        self.links_of(PRESENTATION_LINK)
    }

    /// Label links.
    pub fn label_links(&self) -> impl Iterator<Item = &ExtendedLink> {
        self.links_of(LABEL_LINK)
    }
}

struct LinkbaseReader<'d> {
    document: &'d str,
    linkbase: Linkbase,
    depth: usize,
    // open extended link and the depth it was opened at
    link: Option<(usize, ExtendedLink)>,
    resource: Option<(usize, Resource)>,
}

impl<'d> LinkbaseReader<'d> {
    fn new(document: &'d str) -> Self {
        Self {
            document,
            linkbase: Linkbase::default(),
            depth: 0,
            link: None,
            resource: None,
        }
    }

    fn read(mut self, input: &str) -> Result<Linkbase> {
        let mut reader = xml::reader(input);
        let mut seen_root = false;

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| DataError::document(self.document, e))?;
            let in_link_ns = xml::in_namespace(&resolved, LINK_NS);

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let empty = matches!(event, Event::Empty(_));
                    if !empty {
                        self.depth += 1;
                    }
                    if !seen_root {
                        if !in_link_ns || e.local_name().as_ref() != b"linkbase" {
                            return Err(DataError::document(
                                self.document,
                                format!("root element is <{}>, not link:linkbase", xml::qualified_name(e)),
                            ));
                        }
                        seen_root = true;
                        continue;
                    }
                    let attrs = Attributes::read(&reader, e, self.document)?;
                    self.open(e, &attrs, in_link_ns, empty);
                }
                Event::End(_) => {
                    self.close();
                    self.depth = self.depth.saturating_sub(1);
                }
                Event::Text(ref t) => {
                    if let Some((_, resource)) = self.resource.as_mut() {
                        resource.text.push_str(&xml::text(self.document, t)?);
                    }
                }
                Event::CData(ref c) => {
                    if let Some((_, resource)) = self.resource.as_mut() {
                        resource.text.push_str(&xml::cdata(c));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(DataError::document(self.document, "document has no root element"));
        }
        if self.depth != 0 {
            return Err(DataError::document(self.document, "unexpected end of document"));
        }
        Ok(self.linkbase)
    }

    fn open(&mut self, element: &BytesStart<'_>, attrs: &Attributes, in_link_ns: bool, empty: bool) {
        if in_link_ns && element.local_name().as_ref() == b"roleRef" {
            if let Some(uri) = attrs.plain("roleURI") {
                self.linkbase.role_refs.push(uri.to_string());
            }
            return;
        }

        match attrs.get(XLINK_NS, "type") {
            Some("extended") => {
                let link = ExtendedLink {
                    element: xml::local_name(element),
                    role: attrs.get(XLINK_NS, "role").map(str::to_string),
                    ..ExtendedLink::default()
                };
                if empty {
                    self.linkbase.links.push(link);
                } else {
                    self.link = Some((self.depth, link));
                }
            }
            Some("locator") => {
                let Some((_, link)) = self.link.as_mut() else {
                    return;
                };
                match (attrs.get(XLINK_NS, "label"), attrs.get(XLINK_NS, "href")) {
                    (Some(label), Some(href)) => link.locators.push(Locator {
                        label: label.to_string(),
                        href: href.to_string(),
                    }),
                    _ => tracing::debug!(document = self.document, "locator without label or href"),
                }
            }
            Some("arc") => {
                let Some((_, link)) = self.link.as_mut() else {
                    return;
                };
                match (attrs.get(XLINK_NS, "from"), attrs.get(XLINK_NS, "to")) {
                    (Some(from), Some(to)) => link.arcs.push(LinkArc {
                        from: from.to_string(),
                        to: to.to_string(),
                        arcrole: attrs.get(XLINK_NS, "arcrole").map(str::to_string),
                        order: attrs.plain("order").map(str::to_string),
                        preferred_label: attrs.plain("preferredLabel").map(str::to_string),
                    }),
                    _ => tracing::debug!(document = self.document, "arc without from or to"),
                }
            }
            Some("resource") => {
                if self.link.is_none() {
                    return;
                }
                let Some(label) = attrs.get(XLINK_NS, "label") else {
                    tracing::debug!(document = self.document, "resource without label");
                    return;
                };
                let resource = Resource {
                    label: label.to_string(),
                    role: attrs.get(XLINK_NS, "role").map(str::to_string),
                    lang: attrs.qualified("xml:lang").map(str::to_string),
                    text: String::new(),
                };
                if empty {
                    self.push_resource(resource);
                } else {
                    self.resource = Some((self.depth, resource));
                }
            }
            _ => {}
        }
    }

    fn close(&mut self) {
        if matches!(self.resource, Some((depth, _)) if depth == self.depth) {
            if let Some((_, resource)) = self.resource.take() {
                self.push_resource(resource);
            }
        }
        if matches!(self.link, Some((depth, _)) if depth == self.depth) {
            if let Some((_, link)) = self.link.take() {
                self.linkbase.links.push(link);
            }
        }
    }

    fn push_resource(&mut self, mut resource: Resource) {
        if let Some((_, link)) = self.link.as_mut() {
            resource.text = resource.text.trim().to_string();
            link.resources.push(resource);
        }
    }
}
