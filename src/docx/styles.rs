/// Paragraph style lookup and synthesis over `word/styles.xml`.
use tracing::debug;

use super::xml::{Element, Node, XmlDocument};

const FONT_FAMILY: &str = "Calibri";
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Result of [`StyleSheet::ensure_paragraph_style`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredStyle {
    pub id: String,
    /// True when the style was missing and had to be created.
    pub synthesized: bool,
}

#[derive(Debug, Clone)]
pub struct StyleSheet {
    xml: XmlDocument,
}

impl StyleSheet {
    pub fn from_xml(xml: XmlDocument) -> Self {
        Self { xml }
    }

    /// A styles part with only document defaults (Calibri 11pt).
    pub fn empty() -> Self {
        let font = Element::new("w:rFonts")
            .with_attr("w:ascii", FONT_FAMILY)
            .with_attr("w:hAnsi", FONT_FAMILY)
            .with_attr("w:cs", FONT_FAMILY);
        let rpr = Element::new("w:rPr")
            .with_child(font)
            .with_child(Element::new("w:sz").with_attr("w:val", "22"))
            .with_child(Element::new("w:szCs").with_attr("w:val", "22"));
        let defaults = Element::new("w:docDefaults")
            .with_child(Element::new("w:rPrDefault").with_child(rpr));
        let root = Element::new("w:styles")
            .with_attr("xmlns:w", W_NS)
            .with_child(defaults);
        Self::from_xml(XmlDocument::with_root(root))
    }

    pub fn xml(&self) -> &XmlDocument {
        &self.xml
    }

    fn styles(&self) -> impl Iterator<Item = &Element> {
        self.xml.root.elements().filter(|el| el.is("w:style"))
    }

    /// Display name (`w:name`) of the style with this id.
    pub fn name_for_id(&self, id: &str) -> Option<&str> {
        self.styles()
            .find(|s| s.attr("w:styleId") == Some(id))
            .and_then(|s| s.child("w:name"))
            .and_then(|n| n.attr("w:val"))
    }

    /// Id of the paragraph style whose name or id matches `name`, ignoring
    /// case and spaces (`"Heading 1"` finds both `heading 1` and `Heading1`).
    pub fn find_paragraph_style(&self, name: &str) -> Option<&str> {
        let wanted = style_id_for(name);
        self.styles()
            .filter(|s| s.attr("w:type").is_none_or(|t| t == "paragraph"))
            .find(|s| {
                let id = s.attr("w:styleId").unwrap_or_default();
                let display = s
                    .child("w:name")
                    .and_then(|n| n.attr("w:val"))
                    .unwrap_or_default();
                display.eq_ignore_ascii_case(name)
                    || id.eq_ignore_ascii_case(name)
                    || id.eq_ignore_ascii_case(&wanted)
            })
            .and_then(|s| s.attr("w:styleId"))
    }

    /// Return the id of the named paragraph style, creating it with default
    /// formatting when the sheet does not define it.
    pub fn ensure_paragraph_style(&mut self, name: &str) -> EnsuredStyle {
        if let Some(id) = self.find_paragraph_style(name) {
            return EnsuredStyle {
                id: id.to_string(),
                synthesized: false,
            };
        }
        let id = style_id_for(name);
        debug!("Synthesizing missing paragraph style '{}' as '{}'", name, id);
        self.xml
            .root
            .children
            .push(Node::Element(synthesize_style(name, &id)));
        EnsuredStyle {
            id,
            synthesized: true,
        }
    }
}

/// Style ids are the display name without spaces or punctuation.
pub fn style_id_for(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Headings, title and subtitle end a section.
pub fn is_heading_style_name(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    lower.starts_with("heading") || lower == "title" || lower == "subtitle"
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StyleDefaults {
    half_points: u32,
    bold: bool,
    italic: bool,
    outline_level: Option<u32>,
    space_before: u32,
    space_after: u32,
    hanging_indent: bool,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            half_points: 22,
            bold: false,
            italic: false,
            outline_level: None,
            space_before: 0,
            space_after: 80,
            hanging_indent: false,
        }
    }
}

fn defaults_for(name: &str) -> StyleDefaults {
    let lower = name.trim().to_lowercase();
    let base = StyleDefaults::default();
    match lower.as_str() {
        "title" => StyleDefaults {
            half_points: 36,
            bold: true,
            space_after: 120,
            ..base
        },
        "subtitle" => StyleDefaults {
            half_points: 28,
            italic: true,
            space_after: 120,
            ..base
        },
        _ if lower.starts_with("heading") => {
            let level = lower
                .trim_start_matches("heading")
                .trim()
                .parse::<u32>()
                .unwrap_or(1)
                .max(1);
            let (half_points, italic) = match level {
                1 => (32, false),
                2 => (28, false),
                3 => (24, true),
                _ => (22, false),
            };
            StyleDefaults {
                half_points,
                bold: true,
                italic,
                outline_level: Some(level - 1),
                space_before: if level == 1 { 240 } else { 200 },
                space_after: if level == 1 { 120 } else { 80 },
                hanging_indent: false,
            }
        }
        _ if lower.starts_with("list") => StyleDefaults {
            space_after: 40,
            hanging_indent: true,
            ..base
        },
        _ => base,
    }
}

fn synthesize_style(name: &str, id: &str) -> Element {
    let d = defaults_for(name);

    let mut style = Element::new("w:style")
        .with_attr("w:type", "paragraph")
        .with_attr("w:customStyle", "1")
        .with_attr("w:styleId", id);
    if id == "Normal" {
        style.set_attr("w:default", "1");
    }
    style = style.with_child(Element::new("w:name").with_attr("w:val", name));
    if id != "Normal" {
        style = style
            .with_child(Element::new("w:basedOn").with_attr("w:val", "Normal"))
            .with_child(Element::new("w:next").with_attr("w:val", "Normal"));
    }
    style = style.with_child(Element::new("w:qFormat"));

    let mut ppr = Element::new("w:pPr");
    if d.outline_level.is_some() {
        ppr = ppr.with_child(Element::new("w:keepNext"));
    }
    ppr = ppr.with_child(
        Element::new("w:spacing")
            .with_attr("w:before", &d.space_before.to_string())
            .with_attr("w:after", &d.space_after.to_string()),
    );
    if d.hanging_indent {
        ppr = ppr.with_child(
            Element::new("w:ind")
                .with_attr("w:left", "360")
                .with_attr("w:hanging", "360"),
        );
    }
    if let Some(level) = d.outline_level {
        ppr = ppr.with_child(Element::new("w:outlineLvl").with_attr("w:val", &level.to_string()));
    }

    let mut rpr = Element::new("w:rPr").with_child(
        Element::new("w:rFonts")
            .with_attr("w:ascii", FONT_FAMILY)
            .with_attr("w:hAnsi", FONT_FAMILY)
            .with_attr("w:cs", FONT_FAMILY),
    );
    if d.bold {
        rpr = rpr.with_child(Element::new("w:b"));
    }
    if d.italic {
        rpr = rpr.with_child(Element::new("w:i"));
    }
    let size = d.half_points.to_string();
    rpr = rpr
        .with_child(Element::new("w:sz").with_attr("w:val", &size))
        .with_child(Element::new("w:szCs").with_attr("w:val", &size));

    style.with_child(ppr).with_child(rpr)
}
