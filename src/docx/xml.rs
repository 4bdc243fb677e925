/// Owned XML tree over `quick-xml` events.
///
/// Only what the tree needs to edit is modelled: elements, their attributes and
/// text. Declarations, comments, processing instructions and CDATA are kept as
/// raw events so a parse/serialize round trip leaves them in place.
use std::io::Cursor;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::DocxError;

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Raw(Event<'static>),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attrs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Direct element children.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.is(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|el| el.is(name))
    }

    /// Depth-first search for the first descendant with this name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for el in self.elements() {
            if el.is(name) {
                return Some(el);
            }
            if let Some(found) = el.find(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        let idx = self.children.iter().position(|n| {
            n.as_element()
                .is_some_and(|el| el.is(name) || el.find(name).is_some())
        })?;
        let el = self.children[idx].as_element_mut()?;
        if el.is(name) { Some(el) } else { el.find_mut(name) }
    }

    /// Concatenated character data directly inside this element.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A parsed XML part: everything before the root element, then the root.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub prolog: Vec<Node>,
    pub root: Element,
}

impl XmlDocument {
    /// A document with a standard `<?xml ...?>` declaration.
    pub fn with_root(root: Element) -> Self {
        let decl = quick_xml::events::BytesDecl::new("1.0", Some("UTF-8"), Some("yes"));
        Self {
            prolog: vec![Node::Raw(Event::Decl(decl).into_owned())],
            root,
        }
    }
}

pub fn parse(xml: &str) -> Result<XmlDocument, DocxError> {
    let xml = xml.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut prolog = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let node = match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
                continue;
            }
            Event::End(_) => match stack.pop() {
                Some(el) => Node::Element(el),
                None => return Err(DocxError::Malformed("unbalanced end tag".into())),
            },
            Event::Empty(start) => Node::Element(element_from_start(&start)?),
            Event::Text(text) => {
                if stack.is_empty() {
                    // whitespace between prolog and root
                    continue;
                }
                Node::Text(text.unescape()?.into_owned())
            }
            Event::Eof => break,
            other => Node::Raw(other.into_owned()),
        };

        match (stack.last_mut(), node) {
            (Some(parent), node) => parent.children.push(node),
            (None, Node::Element(el)) => {
                if root.is_some() {
                    return Err(DocxError::Malformed("multiple root elements".into()));
                }
                root = Some(el);
            }
            (None, node) => prolog.push(node),
        }
    }

    if !stack.is_empty() {
        return Err(DocxError::Malformed("unclosed element".into()));
    }
    let root = root.ok_or_else(|| DocxError::Malformed("no root element".into()))?;
    Ok(XmlDocument { prolog, root })
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, DocxError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

pub fn serialize(doc: &XmlDocument) -> Result<String, DocxError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    for node in &doc.prolog {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, &doc.root)?;
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| DocxError::Malformed(e.to_string()))
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &Node) -> Result<(), DocxError> {
    match node {
        Node::Element(el) => write_element(writer, el),
        Node::Text(text) => {
            writer.write_event(Event::Text(BytesText::new(text)))?;
            Ok(())
        }
        Node::Raw(event) => {
            writer.write_event(event.clone())?;
            Ok(())
        }
    }
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, el: &Element) -> Result<(), DocxError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}
