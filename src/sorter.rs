use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, trace};

use crate::document::{Document, NodeId};
use crate::domain::{Behavior, Event, EventKind, PageConfig};
use crate::table::Table;

pub const SORTED_CLASS: &str = "sorted";
pub const ASC_CLASS: &str = "asc";
pub const DESC_CLASS: &str = "desc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn class(&self) -> &'static str {
        match self {
            SortDirection::Ascending => ASC_CLASS,
            SortDirection::Descending => DESC_CLASS,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class())
    }
}

/// How a column's text is compared, from the header's `data-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    Num,
    Str,
}

impl SortKind {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("num") => SortKind::Num,
            _ => SortKind::Str,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Num(f64),
    Str(String),
}

/// A header already sorted ascending flips to descending, anything else
/// starts ascending.
pub fn next_direction(sorted: bool, ascending: bool) -> SortDirection {
    if sorted && ascending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    }
}

/// Parses the longest numeric prefix of `text`, the way a browser's
/// `parseFloat` does. Text without a numeric prefix yields 0.
pub fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match s[..end].parse::<f64>() {
        Ok(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

fn sort_value(text: &str, kind: SortKind) -> SortValue {
    let text = text.trim();
    match kind {
        SortKind::Num => SortValue::Num(parse_float(text)),
        SortKind::Str => SortValue::Str(text.to_lowercase()),
    }
}

fn compare(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Num(a), SortValue::Num(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (SortValue::Str(a), SortValue::Str(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Returns the permutation of `texts` sorted by `kind` in `direction`.
///
/// The sort is stable in both directions: rows comparing equal keep their
/// current relative order.
pub fn sorted_order(texts: &[String], kind: SortKind, direction: SortDirection) -> Vec<usize> {
    let values: Vec<SortValue> = texts.iter().map(|t| sort_value(t, kind)).collect();
    let mut order: Vec<usize> = (0..texts.len()).collect();
    order.sort_by(|&a, &b| {
        let ord = compare(&values[a], &values[b]);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    order
}

/// Reorders the results table's body rows when a header cell is clicked.
///
/// Sort state belongs to the sorter instance; column index and data type
/// are read from the document again on every click.
#[derive(Debug, Clone)]
pub struct TableSorter {
    table_id: String,
    state: SortState,
}

impl TableSorter {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            table_id: config.results_id.clone(),
            state: SortState {
                key: config.default_sort_key.clone(),
                direction: SortDirection::Descending,
            },
        }
    }

    pub fn state(&self) -> &SortState {
        &self.state
    }

    /// The header cell the event refers to, if it is one of the table's.
    pub fn header_for(&self, doc: &Document, target: NodeId) -> Option<NodeId> {
        let table = Table::locate(doc, &self.table_id)?;
        let th = doc.closest_by_tag(target, "th")?;
        table.column_index(doc, th).map(|_| th)
    }

    pub fn sort(&mut self, doc: &mut Document, header: NodeId) {
        let Some(table) = Table::locate(doc, &self.table_id) else {
            debug!("No table #{} to sort", self.table_id);
            return;
        };
        let Some(column) = table.column_index(doc, header) else {
            debug!("Header {header:?} is not part of #{}", self.table_id);
            return;
        };

        let key = doc.attr(header, "data-key").unwrap_or_default().to_string();
        let kind = SortKind::from_attr(doc.attr(header, "data-type"));
        let direction = next_direction(
            doc.class_contains(header, SORTED_CLASS),
            doc.class_contains(header, ASC_CLASS),
        );
        self.state = SortState {
            key: key.clone(),
            direction,
        };

        for h in doc.descendants_by_tag(table.node, "th") {
            doc.class_remove(h, SORTED_CLASS);
            doc.class_remove(h, ASC_CLASS);
            doc.class_remove(h, DESC_CLASS);
        }
        doc.class_add(header, SORTED_CLASS);
        doc.class_add(header, direction.class());

        let rows = table.rows(doc);
        let texts: Vec<String> = rows
            .iter()
            .map(|&r| Table::cell_text(doc, r, column))
            .collect();
        let order = sorted_order(&texts, kind, direction);

        if let Some(tbody) = table.tbody {
            for idx in order {
                doc.append_child(tbody, rows[idx]);
            }
        }
        debug!("Sorted {} rows by {key} ({kind:?}, {direction})", rows.len());
    }
}

impl Behavior for TableSorter {
    fn name(&self) -> &'static str {
        "table-sorter"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::Click]
    }

    fn handle(&mut self, doc: &mut Document, event: &Event) {
        let header = event.target.and_then(|t| self.header_for(doc, t));
        match header {
            Some(th) => self.sort(doc, th),
            None => trace!("Table sorter ignores {event:?}"),
        }
    }
}
