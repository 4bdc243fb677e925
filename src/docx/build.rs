/// Builders for the body blocks the renderers emit: paragraphs of runs and
/// fixed-width two-column tables.
use super::xml::Element;

#[derive(Debug, Clone, Default)]
pub struct Run {
    text: String,
    bold: bool,
    italic: bool,
    tab_before: bool,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Emit a tab character before the text.
    pub fn after_tab(mut self) -> Self {
        self.tab_before = true;
        self
    }

    fn into_element(self) -> Element {
        let mut run = Element::new("w:r");
        if self.bold || self.italic {
            let mut rpr = Element::new("w:rPr");
            if self.bold {
                rpr = rpr.with_child(Element::new("w:b"));
            }
            if self.italic {
                rpr = rpr.with_child(Element::new("w:i"));
            }
            run = run.with_child(rpr);
        }
        if self.tab_before {
            run = run.with_child(Element::new("w:tab"));
        }
        // embedded newlines become line breaks
        for (i, line) in self.text.split('\n').enumerate() {
            if i > 0 {
                run = run.with_child(Element::new("w:br"));
            }
            if !line.is_empty() {
                run = run.with_child(
                    Element::new("w:t")
                        .with_attr("xml:space", "preserve")
                        .with_text(line),
                );
            }
        }
        run
    }
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    style: Option<String>,
    runs: Vec<Run>,
    right_tab: Option<u32>,
    align: Option<&'static str>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraph using the style with this id.
    pub fn styled(style_id: &str) -> Self {
        Self {
            style: Some(style_id.to_string()),
            ..Default::default()
        }
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.run(Run::new(text))
    }

    pub fn run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    /// Right-aligned tab stop at `pos` twips, for right-flushed dates.
    pub fn right_tab(mut self, pos: u32) -> Self {
        self.right_tab = Some(pos);
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Some("center");
        self
    }

    pub fn into_element(self) -> Element {
        let mut p = Element::new("w:p");
        if self.style.is_some() || self.right_tab.is_some() || self.align.is_some() {
            let mut ppr = Element::new("w:pPr");
            if let Some(style) = &self.style {
                ppr = ppr.with_child(Element::new("w:pStyle").with_attr("w:val", style));
            }
            if let Some(pos) = self.right_tab {
                ppr = ppr.with_child(
                    Element::new("w:tabs").with_child(
                        Element::new("w:tab")
                            .with_attr("w:val", "right")
                            .with_attr("w:pos", &pos.to_string()),
                    ),
                );
            }
            if let Some(align) = self.align {
                ppr = ppr.with_child(Element::new("w:jc").with_attr("w:val", align));
            }
            p = p.with_child(ppr);
        }
        for run in self.runs {
            p = p.with_child(run.into_element());
        }
        p
    }
}

/// An empty paragraph used as a visual separator.
pub fn blank_paragraph() -> Element {
    Element::new("w:p")
}

/// Borderless table with fixed column widths (twips); one paragraph per cell.
pub fn two_column_table(rows: Vec<(Paragraph, Paragraph)>, widths: [u32; 2]) -> Element {
    let total = (widths[0] + widths[1]).to_string();
    let tbl_pr = Element::new("w:tblPr")
        .with_child(
            Element::new("w:tblW")
                .with_attr("w:w", &total)
                .with_attr("w:type", "dxa"),
        )
        .with_child(Element::new("w:tblLayout").with_attr("w:type", "fixed"));

    let mut grid = Element::new("w:tblGrid");
    for w in widths {
        grid = grid.with_child(Element::new("w:gridCol").with_attr("w:w", &w.to_string()));
    }

    let mut table = Element::new("w:tbl").with_child(tbl_pr).with_child(grid);
    for (left, right) in rows {
        let mut tr = Element::new("w:tr");
        for (cell, width) in [(left, widths[0]), (right, widths[1])] {
            let tc_pr = Element::new("w:tcPr").with_child(
                Element::new("w:tcW")
                    .with_attr("w:w", &width.to_string())
                    .with_attr("w:type", "dxa"),
            );
            tr = tr.with_child(
                Element::new("w:tc")
                    .with_child(tc_pr)
                    .with_child(cell.into_element()),
            );
        }
        table = table.with_child(tr);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_shape() {
        let p = Paragraph::styled("Heading1")
            .run(Run::new("Engineer").bold())
            .run(Run::new("2020").italic().after_tab())
            .right_tab(10080)
            .into_element();

        let ppr = p.child("w:pPr").unwrap();
        assert_eq!(ppr.child("w:pStyle").unwrap().attr("w:val"), Some("Heading1"));
        assert_eq!(ppr.find("w:tab").unwrap().attr("w:pos"), Some("10080"));

        let runs: Vec<_> = p.elements().filter(|e| e.is("w:r")).collect();
        assert_eq!(runs.len(), 2);
        assert!(runs[0].find("w:b").is_some());
        assert!(runs[1].child("w:tab").is_some());
        assert_eq!(runs[1].find("w:t").unwrap().text(), "2020");
    }

    #[test]
    fn test_newlines_become_breaks() {
        let p = Paragraph::new().text("a\nb").into_element();
        let run = p.child("w:r").unwrap();
        let names: Vec<&str> = run.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["w:t", "w:br", "w:t"]);
    }

    #[test]
    fn test_table_widths() {
        let table = two_column_table(
            vec![(Paragraph::new().text("ML"), Paragraph::new().text("PyTorch"))],
            [2520, 7560],
        );
        assert_eq!(table.find("w:tblW").unwrap().attr("w:w"), Some("10080"));
        let cols: Vec<_> = table
            .child("w:tblGrid")
            .unwrap()
            .elements()
            .filter_map(|c| c.attr("w:w"))
            .collect();
        assert_eq!(cols, ["2520", "7560"]);
        assert_eq!(table.child("w:tr").unwrap().elements().count(), 2);
    }
}
