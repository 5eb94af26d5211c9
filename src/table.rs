use crate::document::{Document, NodeId};

/// Positional view over the results table: header cells from `thead`, data
/// rows from `tbody`. Cells are addressed by column index.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub node: NodeId,
    pub thead: Option<NodeId>,
    pub tbody: Option<NodeId>,
}

impl Table {
    pub fn locate(doc: &Document, id: &str) -> Option<Self> {
        let node = doc.by_id(id)?;
        Some(Self {
            node,
            thead: doc.first_descendant_by_tag(node, "thead"),
            tbody: doc.first_descendant_by_tag(node, "tbody"),
        })
    }

    pub fn headers(&self, doc: &Document) -> Vec<NodeId> {
        self.thead
            .map(|thead| doc.descendants_by_tag(thead, "th"))
            .unwrap_or_default()
    }

    pub fn rows(&self, doc: &Document) -> Vec<NodeId> {
        self.tbody
            .map(|tbody| doc.descendants_by_tag(tbody, "tr"))
            .unwrap_or_default()
    }

    pub fn column_index(&self, doc: &Document, header: NodeId) -> Option<usize> {
        self.headers(doc).iter().position(|&h| h == header)
    }

    /// Text of the cell at `column`, empty when the row is shorter.
    pub fn cell_text(doc: &Document, row: NodeId, column: usize) -> String {
        doc.children(row)
            .get(column)
            .map(|&cell| doc.text_content(cell))
            .unwrap_or_default()
    }
}
