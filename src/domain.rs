use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::document::{Document, NodeId};

pub const FRIEND_CHECKBOX_CLASS: &str = "friend-checkbox";
pub const LIMIT_NOTE_ID: &str = "limit-note";
pub const RESULTS_TABLE_ID: &str = "results";
pub const FILTER_INPUT_ID: &str = "filter";
pub const MODAL_ID: &str = "modal";
pub const HIDDEN_CLASS: &str = "hidden";

pub const DEFAULT_SELECTION_LIMIT: usize = 5;
pub const DEFAULT_SORT_KEY: &str = "family_playtime_forever_h";

pub const HELP_TEXT: &str = "famview - family library results

<Tab>        cycle focus: friends, headers, table
<Up>/<Down>  move in friends list or table
<Left>/<Right> move between column headers
<Space>      toggle friend / sort by column
</>          edit the name filter (<Enter> keep, <Esc> clear)
<?>          this help
<q>          quit

Click outside this box (or press <Esc>) to close.";

#[derive(Debug)]
pub enum FVError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for FVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FVError::IoError(e) => write!(f, "io error: {e}"),
            FVError::PolarsError(e) => write!(f, "failed to read data: {e}"),
            FVError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            FVError::FileNotFound => write!(f, "file not found"),
            FVError::PermissionDenied => write!(f, "permission denied"),
            FVError::UnknownFileType => write!(f, "unknown file type"),
        }
    }
}

impl std::error::Error for FVError {}

impl From<Error> for FVError {
    fn from(err: Error) -> Self {
        FVError::IoError(err)
    }
}

impl From<PolarsError> for FVError {
    fn from(err: PolarsError) -> Self {
        FVError::PolarsError(err)
    }
}

/// Names and limits the page behaviours act on.
#[derive(Debug, Clone, Setters)]
#[setters(into)]
pub struct PageConfig {
    pub selection_limit: usize,
    pub checkbox_class: String,
    pub limit_note_id: String,
    pub results_id: String,
    pub filter_id: String,
    pub modal_id: String,
    pub hidden_class: String,
    pub default_sort_key: String,
    pub event_poll_time: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            selection_limit: DEFAULT_SELECTION_LIMIT,
            checkbox_class: FRIEND_CHECKBOX_CLASS.to_string(),
            limit_note_id: LIMIT_NOTE_ID.to_string(),
            results_id: RESULTS_TABLE_ID.to_string(),
            filter_id: FILTER_INPUT_ID.to_string(),
            modal_id: MODAL_ID.to_string(),
            hidden_class: HIDDEN_CLASS.to_string(),
            default_sort_key: DEFAULT_SORT_KEY.to_string(),
            event_poll_time: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Friends,
    Headers,
    Table,
}

/// Terminal input mapped into page intents.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    CycleFocus,
    Activate,
    EditFilter,
    Help,
    Exit,
    Resize(usize, usize),
    MouseClick(u16, u16),
    RawKey(KeyEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    Change,
    Click,
    Input,
}

/// A page event delivered to subscribed behaviours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub target: Option<NodeId>,
}

impl Event {
    pub fn ready() -> Self {
        Event {
            kind: EventKind::Ready,
            target: None,
        }
    }

    pub fn on(kind: EventKind, target: NodeId) -> Self {
        Event {
            kind,
            target: Some(target),
        }
    }
}

/// A page behaviour reacting to events by mutating the document.
///
/// Handlers run to completion, never fail and tolerate any document shape:
/// missing elements make them a no-op.
pub trait Behavior {
    fn name(&self) -> &'static str;

    fn interests(&self) -> &'static [EventKind];

    fn handle(&mut self, doc: &mut Document, event: &Event);
}
