//! Ordered, namespace-aware XML element tree.
//!
//! The tree keeps qualified names (`cac:Delivery`) as written and resolves
//! prefixes against the namespace declarations on the root element, which is
//! where UBL documents declare them. Attribute order and child order are
//! preserved so that serialization is deterministic.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use super::xml_utils::{xml_io, xml_parse};
use crate::core::FacturaError;

/// Deepest element nesting accepted by [`DocumentTree::parse`].
pub const MAX_DEPTH: usize = 128;

/// Build a qualified name; an empty prefix means the default namespace.
pub fn qualify(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}:{local}")
    }
}

/// An element with a qualified name, attributes, optional text and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Set text content. Empty text is stored as no text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Qualified name as written, e.g. `cac:Delivery`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(p, _)| p)
    }

    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Replace an attribute in place, or append it.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    /// First child with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given qualified name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a path of qualified names, taking the first match at each step.
    pub fn descend(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.child(name))
    }

    /// Text of the element at `path`, if any.
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.descend(path).and_then(Element::text)
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Insert at `index`, clamped to the number of children.
    pub fn insert_child(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    /// Remove every child matching `pred`; returns how many were removed.
    pub fn remove_children<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Element) -> bool,
    {
        let before = self.children.len();
        self.children.retain(|c| !pred(c));
        before - self.children.len()
    }

    fn write<W: std::io::Write>(&self, w: &mut Writer<W>) -> Result<(), FacturaError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (k, v) in &self.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }

        if self.children.is_empty() && self.text.is_none() {
            w.write_event(Event::Empty(start)).map_err(xml_io)?;
            return Ok(());
        }

        w.write_event(Event::Start(start)).map_err(xml_io)?;
        if let Some(text) = &self.text {
            w.write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_io)?;
        }
        for child in &self.children {
            child.write(w)?;
        }
        w.write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_io)?;
        Ok(())
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self, FacturaError> {
        let name = std::str::from_utf8(e.name().as_ref())
            .map_err(xml_parse)?
            .to_string();
        let mut element = Element::new(name);
        for attr in e.attributes() {
            let attr = attr.map_err(xml_parse)?;
            let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_parse)?;
            let value = attr.unescape_value().map_err(xml_parse)?;
            element.attributes.push((key.to_string(), value.into_owned()));
        }
        Ok(element)
    }
}

/// A parsed or generated XML document, owned by a single rendering call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTree {
    root: Element,
}

impl DocumentTree {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Prefix bound to `namespace` on the root element. `Some("")` means the
    /// namespace is the default one.
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.root
            .attributes
            .iter()
            .filter(|(_, v)| v == namespace)
            .find_map(|(k, _)| {
                if k == "xmlns" {
                    Some("")
                } else {
                    k.strip_prefix("xmlns:")
                }
            })
    }

    /// Namespace URI bound to `prefix` on the root element.
    pub fn namespace_of(&self, prefix: &str) -> Option<&str> {
        let key = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{prefix}")
        };
        self.root.attr(&key)
    }

    /// Parse an XML document. Comments, processing instructions and the
    /// declaration are dropped; text is trimmed. Nesting deeper than
    /// [`MAX_DEPTH`] is rejected.
    pub fn parse(xml: &str) -> Result<Self, FacturaError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event().map_err(xml_parse)? {
                Event::Start(ref e) => {
                    check_depth(&stack)?;
                    stack.push(Element::from_start(e)?);
                }
                Event::Empty(ref e) => {
                    check_depth(&stack)?;
                    let element = Element::from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| xml_parse("unexpected closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(ref e) => {
                    let text = e.unescape().map_err(xml_parse)?;
                    append_text(&mut stack, &text)?;
                }
                Event::CData(e) => {
                    let bytes = e.into_inner();
                    let text = std::str::from_utf8(&bytes).map_err(xml_parse)?;
                    append_text(&mut stack, text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(xml_parse(format!("unclosed element <{}>", open.name)));
        }
        root.map(Self::new)
            .ok_or_else(|| xml_parse("document has no root element"))
    }

    /// Serialize compactly as UTF-8, without an XML declaration.
    pub fn to_xml(&self) -> Result<String, FacturaError> {
        into_string(self.to_bytes()?)
    }

    /// Serialize with two-space indentation, without an XML declaration.
    pub fn to_xml_pretty(&self) -> Result<String, FacturaError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        self.root.write(&mut writer)?;
        into_string(writer.into_inner().into_inner())
    }

    /// Compact UTF-8 byte stream, without an XML declaration.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FacturaError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.root.write(&mut writer)?;
        Ok(writer.into_inner().into_inner())
    }
}

fn into_string(buf: Vec<u8>) -> Result<String, FacturaError> {
    String::from_utf8(buf).map_err(|e| FacturaError::Xml(format!("XML UTF-8 error: {e}")))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FacturaError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(xml_parse("multiple root elements")),
        None => *root = Some(element),
    }
    Ok(())
}

fn check_depth(stack: &[Element]) -> Result<(), FacturaError> {
    if stack.len() >= MAX_DEPTH {
        return Err(xml_parse(format!("elements nested deeper than {MAX_DEPTH} levels")));
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> Result<(), FacturaError> {
    if text.is_empty() {
        return Ok(());
    }
    let Some(current) = stack.last_mut() else {
        return Err(xml_parse("text outside of the root element"));
    };
    match current.text.as_mut() {
        Some(existing) => existing.push_str(text),
        None => current.text = Some(text.to_string()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
         xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
         xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <!-- header -->
  <cbc:ID>F001-1</cbc:ID>
  <cac:TaxTotal>
    <cbc:TaxAmount currencyID="PEN">18.00</cbc:TaxAmount>
  </cac:TaxTotal>
  <cac:InvoiceLine><cbc:ID>1</cbc:ID><cbc:Note><![CDATA[a < b]]></cbc:Note></cac:InvoiceLine>
</Invoice>"#;

    #[test]
    fn parse_keeps_structure() {
        let tree = DocumentTree::parse(DOC).unwrap();
        let root = tree.root();
        assert_eq!(root.name(), "Invoice");
        assert_eq!(root.children().len(), 3);
        assert_eq!(root.text_at(&["cbc:ID"]), Some("F001-1"));
        let amount = root.descend(&["cac:TaxTotal", "cbc:TaxAmount"]).unwrap();
        assert_eq!(amount.text(), Some("18.00"));
        assert_eq!(amount.attr("currencyID"), Some("PEN"));
        assert_eq!(
            root.text_at(&["cac:InvoiceLine", "cbc:Note"]),
            Some("a < b")
        );
    }

    #[test]
    fn resolves_prefixes() {
        let tree = DocumentTree::parse(DOC).unwrap();
        assert_eq!(
            tree.prefix_for("urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"),
            Some("cac")
        );
        assert_eq!(
            tree.prefix_for("urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"),
            Some("")
        );
        assert_eq!(tree.prefix_for("urn:unknown"), None);
        assert_eq!(
            tree.namespace_of("cbc"),
            Some("urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2")
        );
    }

    #[test]
    fn serialization_has_no_declaration() {
        let tree = DocumentTree::parse(DOC).unwrap();
        let xml = tree.to_xml().unwrap();
        assert!(xml.starts_with("<Invoice "));
        assert!(!xml.contains("<?xml"));
        assert!(!xml.contains("header"));
        assert!(xml.contains("a &lt; b"));
    }

    #[test]
    fn compact_and_pretty_reparse_equal() {
        let tree = DocumentTree::parse(DOC).unwrap();
        let compact = DocumentTree::parse(&tree.to_xml().unwrap()).unwrap();
        let pretty = DocumentTree::parse(&tree.to_xml_pretty().unwrap()).unwrap();
        assert_eq!(compact, tree);
        assert_eq!(pretty, tree);
    }

    #[test]
    fn empty_elements_and_escaped_attributes() {
        let root = Element::new("a")
            .with_attr("q", "say \"hi\" & go")
            .with_child(Element::new("b"))
            .with_child(Element::new("c").with_text(""));
        let tree = DocumentTree::new(root);
        let xml = tree.to_xml().unwrap();
        assert!(xml.contains("<b/>"));
        assert!(xml.contains("<c/>"));
        let back = DocumentTree::parse(&xml).unwrap();
        assert_eq!(back.root().attr("q"), Some("say \"hi\" & go"));
        assert_eq!(back, tree);
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(DocumentTree::parse("").is_err());
        assert!(DocumentTree::parse("<a><b></a>").is_err());
        assert!(DocumentTree::parse("<a/><b/>").is_err());
        assert!(DocumentTree::parse("<a>").is_err());
    }

    #[test]
    fn caps_nesting_depth() {
        let nested =
            |depth: usize| format!("{}<b/>{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert!(DocumentTree::parse(&nested(MAX_DEPTH - 1)).is_ok());
        let err = DocumentTree::parse(&nested(MAX_DEPTH)).unwrap_err();
        assert!(matches!(err, FacturaError::Xml(msg) if msg.contains("nested deeper")));
        assert!(DocumentTree::parse(&nested(100_000)).is_err());
    }

    #[test]
    fn child_editing() {
        let mut el = Element::new("p")
            .with_child(Element::new("x"))
            .with_child(Element::new("y"))
            .with_child(Element::new("x"));
        assert_eq!(el.children_named("x").count(), 2);
        assert_eq!(el.remove_children(|c| c.name() == "x"), 2);
        el.insert_child(99, Element::new("z"));
        el.insert_child(0, Element::new("w"));
        let names: Vec<_> = el.children().iter().map(Element::name).collect();
        assert_eq!(names, ["w", "y", "z"]);
        el.set_attr("k", "1");
        el.set_attr("k", "2");
        assert_eq!(el.attributes().len(), 1);
        assert_eq!(el.attr("k"), Some("2"));
    }

    #[test]
    fn qualified_names() {
        let el = Element::new("cac:Delivery");
        assert_eq!(el.prefix(), Some("cac"));
        assert_eq!(el.local_name(), "Delivery");
        assert_eq!(qualify("", "Invoice"), "Invoice");
        assert_eq!(qualify("cbc", "ID"), "cbc:ID");
    }
}
