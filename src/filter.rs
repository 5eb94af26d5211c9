use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, trace};

use crate::document::Document;
use crate::domain::{Behavior, Event, EventKind, PageConfig};
use crate::table::Table;

/// Case-insensitive substring match on the identifier and name columns.
/// `query` is expected to be lower-cased already.
pub fn row_matches(id: &str, name: &str, query: &str) -> bool {
    id.to_lowercase().contains(query) || name.to_lowercase().contains(query)
}

/// Visibility of each `(id, name)` row for `query`. An empty query shows
/// every row.
pub fn visible_rows(rows: &[(String, String)], query: &str) -> Vec<bool> {
    let query = query.to_lowercase();
    rows.par_iter()
        .map(|(id, name)| row_matches(id, name, &query))
        .collect()
}

/// Hides results rows whose first two columns do not contain the filter
/// input's text. Rows are only hidden, never removed.
#[derive(Debug, Clone)]
pub struct TableFilter {
    table_id: String,
    input_id: String,
}

impl TableFilter {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            table_id: config.results_id.clone(),
            input_id: config.filter_id.clone(),
        }
    }

    pub fn query(&self, doc: &Document) -> String {
        doc.by_id(&self.input_id)
            .and_then(|input| doc.value(input))
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Returns the number of rows left visible.
    pub fn filter(&self, doc: &mut Document) -> usize {
        let Some(table) = Table::locate(doc, &self.table_id) else {
            return 0;
        };
        let start_time = Instant::now();
        let query = self.query(doc);
        let rows = table.rows(doc);
        let cells: Vec<(String, String)> = rows
            .iter()
            .map(|&r| (Table::cell_text(doc, r, 0), Table::cell_text(doc, r, 1)))
            .collect();

        let visible = visible_rows(&cells, &query);
        for (&row, &show) in rows.iter().zip(visible.iter()) {
            doc.set_displayed(row, show);
        }

        let shown = visible.iter().filter(|&&v| v).count();
        debug!(
            "Filter \"{query}\" shows {shown}/{} rows in {}ms",
            rows.len(),
            start_time.elapsed().as_millis()
        );
        shown
    }
}

impl Behavior for TableFilter {
    fn name(&self) -> &'static str {
        "table-filter"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::Input]
    }

    fn handle(&mut self, doc: &mut Document, event: &Event) {
        match event.target {
            Some(target) if doc.by_id(&self.input_id) == Some(target) => {
                self.filter(doc);
            }
            _ => trace!("Table filter ignores {event:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeId;

    fn page(rows: &[(&str, &str)]) -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let root = doc.root();
        let input = doc.create_element(root, "input");
        doc.set_id(input, "filter");
        let table = doc.create_element(root, "table");
        doc.set_id(table, "results");
        let tbody = doc.create_element(table, "tbody");
        let trs = rows
            .iter()
            .map(|(id, name)| {
                let tr = doc.create_element(tbody, "tr");
                for text in [id, name, &"12.5"] {
                    let td = doc.create_element(tr, "td");
                    doc.set_text(td, text);
                }
                tr
            })
            .collect();
        (doc, input, trs)
    }

    fn shown(doc: &Document, rows: &[NodeId]) -> Vec<bool> {
        rows.iter().map(|&r| doc.displayed(r)).collect()
    }

    fn filter() -> TableFilter {
        TableFilter::new(&PageConfig::default())
    }

    const ROWS: [(&str, &str); 3] = [("440", "Team Fortress 2"), ("570", "Dota 2"), ("730", "abc Arena")];

    #[test]
    fn empty_query_shows_everything() {
        let (mut doc, _, rows) = page(&ROWS);
        for &r in &rows {
            doc.set_displayed(r, false);
        }
        assert_eq!(filter().filter(&mut doc), 3);
        assert_eq!(shown(&doc, &rows), vec![true, true, true]);
    }

    #[test]
    fn matches_identifier_or_name() {
        let (mut doc, input, rows) = page(&ROWS);
        doc.set_value(input, "57");
        filter().filter(&mut doc);
        assert_eq!(shown(&doc, &rows), vec![false, true, false]);

        doc.set_value(input, "fort");
        filter().filter(&mut doc);
        assert_eq!(shown(&doc, &rows), vec![true, false, false]);
    }

    #[test]
    fn match_is_case_insensitive() {
        let (mut doc, input, rows) = page(&ROWS);
        doc.set_value(input, "ABC");
        filter().filter(&mut doc);
        assert_eq!(shown(&doc, &rows), vec![false, false, true]);
    }

    #[test]
    fn third_column_is_not_searched() {
        let (mut doc, input, rows) = page(&ROWS);
        doc.set_value(input, "12.5");
        assert_eq!(filter().filter(&mut doc), 0);
        assert_eq!(shown(&doc, &rows), vec![false, false, false]);
    }

    #[test]
    fn filtering_is_idempotent_and_reversible() {
        let (mut doc, input, rows) = page(&ROWS);
        doc.set_value(input, "2");
        filter().filter(&mut doc);
        let once = shown(&doc, &rows);
        filter().filter(&mut doc);
        assert_eq!(shown(&doc, &rows), once);

        doc.set_value(input, "");
        filter().filter(&mut doc);
        assert_eq!(shown(&doc, &rows), vec![true, true, true]);
    }

    #[test]
    fn missing_input_counts_as_empty_query() {
        let mut doc = Document::new();
        let root = doc.root();
        let table = doc.create_element(root, "table");
        doc.set_id(table, "results");
        let tbody = doc.create_element(table, "tbody");
        let tr = doc.create_element(tbody, "tr");
        doc.set_displayed(tr, false);
        assert_eq!(filter().filter(&mut doc), 1);
        assert!(doc.displayed(tr));
    }

    #[test]
    fn input_events_from_other_elements_are_ignored() {
        let (mut doc, input, rows) = page(&ROWS);
        doc.set_value(input, "zzz");
        let root = doc.root();
        let other = doc.create_element(root, "input");
        let mut filter = filter();
        filter.handle(&mut doc, &Event::on(EventKind::Input, other));
        assert_eq!(shown(&doc, &rows), vec![true, true, true]);

        filter.handle(&mut doc, &Event::on(EventKind::Input, input));
        assert_eq!(shown(&doc, &rows), vec![false, false, false]);
    }

    #[test]
    fn visible_rows_pure() {
        let rows = vec![
            ("1".to_string(), "Alpha".to_string()),
            ("2".to_string(), "beta".to_string()),
        ];
        assert_eq!(visible_rows(&rows, "A"), vec![true, true]);
        assert_eq!(visible_rows(&rows, "LPH"), vec![true, false]);
        assert_eq!(visible_rows(&rows, ""), vec![true, true]);
    }
}
