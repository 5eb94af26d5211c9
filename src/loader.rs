use polars::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::document::{Document, NodeId};
use crate::domain::{FVError, HELP_TEXT, PageConfig};

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnData {
    pub name: String,
    pub numeric: bool,
    pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Friend {
    pub steam64: String,
    pub label: String,
}

/// Loads the aggregated results and the optional friends list into a page.
pub fn load_page(
    results: &Path,
    friends: Option<&Path>,
    config: &PageConfig,
) -> Result<Document, FVError> {
    let start_time = Instant::now();
    let columns = load_results(results)?;
    let friends = match friends {
        Some(path) => load_friends(path)?,
        None => Vec::new(),
    };
    info!(
        "Loaded {} columns and {} friends in {}ms",
        columns.len(),
        friends.len(),
        start_time.elapsed().as_millis()
    );
    Ok(build_page(&columns, &friends, config))
}

pub fn load_results(path: &Path) -> Result<Vec<ColumnData>, FVError> {
    let path = check_file(path)?;
    let frame = match detect_file_type(&path)? {
        FileType::CSV => load_csv(&path)?,
        FileType::PARQUET => load_parquet(&path)?,
        FileType::ARROW => load_arrow(&path)?,
    };
    let df = frame.collect()?;
    let columns = df
        .get_column_names()
        .iter()
        .map(|name| load_column(&df, name.as_str()))
        .collect::<Result<Vec<ColumnData>, PolarsError>>()?;
    for c in columns.iter() {
        debug!("Column {} numeric: {}, rows: {}", c.name, c.numeric, c.data.len());
    }
    Ok(columns)
}

/// Reads a `vanity,steam64_id` csv. Rows with neither are skipped, repeated
/// ids keep their first label.
pub fn load_friends(path: &Path) -> Result<Vec<Friend>, FVError> {
    let path = check_file(path)?;
    let df = load_csv(&path)?.collect()?;
    let vanity = optional_string_column(&df, "vanity")?;
    let steam64 = optional_string_column(&df, "steam64_id")?;

    let mut friends: Vec<Friend> = Vec::new();
    for (vanity, steam64) in vanity.into_iter().zip(steam64) {
        let vanity = vanity.map(|v| v.trim().to_string()).unwrap_or_default();
        let steam64 = steam64.map(|s| s.trim().to_string()).unwrap_or_default();
        let friend = match (vanity.is_empty(), steam64.is_empty()) {
            (true, true) => continue,
            (false, true) => Friend {
                steam64: vanity.clone(),
                label: vanity,
            },
            (true, false) => Friend {
                label: steam64.clone(),
                steam64,
            },
            (false, false) => Friend {
                steam64,
                label: vanity,
            },
        };
        if friends.iter().any(|f| f.steam64 == friend.steam64) {
            warn!("Skipping duplicate friend {}", friend.steam64);
            continue;
        }
        friends.push(friend);
    }
    Ok(friends)
}

/// Builds the page skeleton: limit hint, friend checkboxes, filter input,
/// results table and a hidden help modal.
pub fn build_page(columns: &[ColumnData], friends: &[Friend], config: &PageConfig) -> Document {
    let mut doc = Document::new();
    let root = doc.root();

    let note = doc.create_element(root, "p");
    doc.set_id(note, &config.limit_note_id);
    doc.class_add(note, &config.hidden_class);
    doc.set_text(
        note,
        &format!("You can select at most {} friends.", config.selection_limit),
    );

    let list = doc.create_element(root, "ul");
    doc.set_id(list, "friends");
    for friend in friends {
        let li = doc.create_element(list, "li");
        let input = doc.create_element(li, "input");
        doc.set_attr(input, "type", "checkbox");
        doc.set_attr(input, "name", "friend");
        doc.class_add(input, &config.checkbox_class);
        doc.set_value(input, &friend.steam64);
        let label = doc.create_element(li, "span");
        doc.set_text(label, &friend.label);
    }

    let filter = doc.create_element(root, "input");
    doc.set_id(filter, &config.filter_id);
    doc.set_attr(filter, "type", "text");

    build_table(&mut doc, root, columns, config);

    let modal = doc.create_element(root, "div");
    doc.set_id(modal, &config.modal_id);
    doc.class_add(modal, &config.hidden_class);
    let content = doc.create_element(modal, "div");
    doc.class_add(content, "modal-content");
    let text = doc.create_element(content, "pre");
    doc.set_text(text, HELP_TEXT);

    doc
}

fn build_table(doc: &mut Document, parent: NodeId, columns: &[ColumnData], config: &PageConfig) {
    let table = doc.create_element(parent, "table");
    doc.set_id(table, &config.results_id);

    let thead = doc.create_element(table, "thead");
    let header_row = doc.create_element(thead, "tr");
    for column in columns {
        let th = doc.create_element(header_row, "th");
        doc.set_attr(th, "data-key", &column.name);
        doc.set_attr(th, "data-type", if column.numeric { "num" } else { "str" });
        doc.set_text(th, &column.name);
    }

    let tbody = doc.create_element(table, "tbody");
    let nrows = columns.iter().map(|c| c.data.len()).max().unwrap_or(0);
    for ridx in 0..nrows {
        let tr = doc.create_element(tbody, "tr");
        for column in columns {
            let td = doc.create_element(tr, "td");
            doc.set_text(td, column.data.get(ridx).map(String::as_str).unwrap_or(""));
        }
    }
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<ColumnData, PolarsError> {
    let numeric = is_numeric_type(df.column(col_name)?.dtype());
    let col = df.column(col_name)?.cast(&DataType::String)?;
    let data = col
        .str()?
        .into_iter()
        .map(|value| {
            value
                .map(|s| s.replace("\r\n", " ").replace('\n', " "))
                .unwrap_or_default()
        })
        .collect();

    Ok(ColumnData {
        name: col_name.to_string(),
        numeric,
        data,
    })
}

fn optional_string_column(
    df: &DataFrame,
    col_name: &str,
) -> Result<Vec<Option<String>>, PolarsError> {
    if !df
        .get_column_names()
        .iter()
        .any(|name| name.as_str() == col_name)
    {
        return Ok(vec![None; df.height()]);
    }
    let col = df.column(col_name)?.cast(&DataType::String)?;
    Ok(col.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
}

fn check_file(path: &Path) -> Result<PathBuf, FVError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FVError::FileNotFound,
        ErrorKind::PermissionDenied => FVError::PermissionDenied,
        _ => FVError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(FVError::LoadingFailed(format!(
            "{} is not a file!",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

fn detect_file_type(path: &Path) -> Result<FileType, FVError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(FVError::UnknownFileType),
    }
}

fn load_csv(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.as_path().into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(
        PlPath::Local(path.as_path().into()),
        ScanArgsParquet::default(),
    )
}

fn load_arrow(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.as_path().into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    #[test]
    fn loads_results_fixture_with_types() {
        let columns = load_results(Path::new("tests/fixtures/results.csv")).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "appid",
                "name",
                "family_playtime_forever_h",
                "family_playtime_recent_h",
                "owners_count"
            ]
        );
        assert!(columns[0].numeric);
        assert!(!columns[1].numeric);
        assert!(columns[2].numeric);
        assert_eq!(columns[1].data[0], "Dota 2");
    }

    #[test]
    fn loads_friends_fixture() {
        let friends = load_friends(Path::new("tests/fixtures/friends.csv")).unwrap();
        let labels: Vec<&str> = friends.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["gabe", "robin", "76561197960287933", "kim", "lee", "sam", "alex"]
        );
        assert_eq!(friends[0].steam64, "76561197960287930");
    }

    #[test]
    fn file_errors_are_typed() {
        assert!(matches!(
            load_results(Path::new("tests/fixtures/missing.csv")),
            Err(FVError::FileNotFound)
        ));
        assert!(matches!(
            load_results(Path::new("tests/fixtures")),
            Err(FVError::LoadingFailed(_))
        ));
        assert!(matches!(
            load_results(Path::new("Cargo.toml")),
            Err(FVError::UnknownFileType)
        ));
    }

    #[test]
    fn page_skeleton() {
        let columns = vec![
            ColumnData {
                name: "appid".into(),
                numeric: true,
                data: vec!["1".into(), "2".into()],
            },
            ColumnData {
                name: "name".into(),
                numeric: false,
                data: vec!["Alpha".into()],
            },
        ];
        let friends = vec![Friend {
            steam64: "7656".into(),
            label: "gabe".into(),
        }];
        let config = PageConfig::default();
        let doc = build_page(&columns, &friends, &config);

        let boxes = doc.by_class("friend-checkbox");
        assert_eq!(boxes.len(), 1);
        assert_eq!(doc.value(boxes[0]), Some("7656"));

        let table = Table::locate(&doc, "results").unwrap();
        let headers = table.headers(&doc);
        assert_eq!(doc.attr(headers[0], "data-type"), Some("num"));
        assert_eq!(doc.attr(headers[1], "data-key"), Some("name"));
        let rows = table.rows(&doc);
        assert_eq!(rows.len(), 2);
        assert_eq!(Table::cell_text(&doc, rows[1], 1), "");

        for id in ["limit-note", "modal"] {
            let node = doc.by_id(id).unwrap();
            assert!(doc.class_contains(node, "hidden"));
        }
        assert!(doc.by_id("filter").is_some());
    }
}
