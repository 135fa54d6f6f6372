//! Namespace-aware helpers shared by the XML document readers.

use crate::error::{DataError, Result};
use quick_xml::NsReader;
use quick_xml::events::{BytesCData, BytesStart, BytesText};
use quick_xml::name::{Namespace, ResolveResult};

pub(crate) const LINK_NS: &[u8] = b"http://www.xbrl.org/2003/linkbase";
pub(crate) const XLINK_NS: &[u8] = b"http://www.w3.org/1999/xlink";
pub(crate) const XBRLI_NS: &[u8] = b"http://www.xbrl.org/2003/instance";
pub(crate) const XSD_NS: &[u8] = b"http://www.w3.org/2001/XMLSchema";
pub(crate) const XSI_NS: &[u8] = b"http://www.w3.org/2001/XMLSchema-instance";

pub(crate) type XmlReader<'a> = NsReader<&'a [u8]>;

pub(crate) fn reader(xml: &str) -> XmlReader<'_> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader
}

pub(crate) fn in_namespace(resolved: &ResolveResult<'_>, namespace: &[u8]) -> bool {
    matches!(resolved, ResolveResult::Bound(Namespace(ns)) if *ns == namespace)
}

pub(crate) fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

pub(crate) fn qualified_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

pub(crate) fn text(document: &str, text: &BytesText<'_>) -> Result<String> {
    text.unescape()
        .map(|t| t.into_owned())
        .map_err(|e| DataError::document(document, e))
}

pub(crate) fn cdata(cdata: &BytesCData<'_>) -> String {
    String::from_utf8_lossy(cdata).into_owned()
}

/// Attributes of one element with their namespaces resolved.
#[derive(Debug, Default)]
pub(crate) struct Attributes {
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    namespace: Option<Vec<u8>>,
    local: String,
    qualified: String,
    value: String,
}

impl Attributes {
    pub(crate) fn read(
        reader: &XmlReader<'_>,
        element: &BytesStart<'_>,
        document: &str,
    ) -> Result<Self> {
        let mut entries = Vec::new();
        for attr in element.attributes() {
            let attr = attr.map_err(|e| DataError::document(document, e))?;
            let (resolved, local) = reader.resolve_attribute(attr.key);
            let namespace = match resolved {
                ResolveResult::Bound(Namespace(ns)) => Some(ns.to_vec()),
                _ => None,
            };
            let local = String::from_utf8_lossy(local.as_ref()).into_owned();
            let qualified = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| DataError::document(document, e))?
                .into_owned();
            entries.push(Entry {
                namespace,
                local,
                qualified,
                value,
            });
        }
        Ok(Self { entries })
    }

    /// Attribute `local` bound to `namespace`.
    pub(crate) fn get(&self, namespace: &[u8], local: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.namespace.as_deref() == Some(namespace) && e.local == local)
            .map(|e| e.value.as_str())
    }

    /// Unprefixed attribute.
    pub(crate) fn plain(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.namespace.is_none() && e.qualified == name)
            .map(|e| e.value.as_str())
    }

    /// Attribute by its literal qualified name, e.g. `xml:lang`.
    pub(crate) fn qualified(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.qualified == name)
            .map(|e| e.value.as_str())
    }
}
