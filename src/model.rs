use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use tracing::{debug, info, trace};

use crate::document::{Document, NodeId};
use crate::domain::{Behavior, Event, EventKind, Focus, Message, PageConfig};
use crate::filter::TableFilter;
use crate::inputter::{InputResult, Inputter};
use crate::modal::ModalDismiss;
use crate::selection::SelectionLimiter;
use crate::sorter::{SortState, TableSorter};
use crate::table::Table;
use crate::ui;

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    PAGE,
    FILTERINPUT,
    POPUP,
}

/// Which behaviour a subscription delivers to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Subscriber {
    Limiter,
    Sorter,
    Filter,
    Modal,
}

/// The page: its document, the behaviours attached to it and the cursor
/// state of the terminal host.
pub struct Model {
    config: PageConfig,
    pub status: Status,
    document: Document,
    limiter: SelectionLimiter,
    sorter: TableSorter,
    filter: TableFilter,
    modal: ModalDismiss,
    subscriptions: Vec<(EventKind, Subscriber)>,
    focus: Focus,
    friend_cursor: usize,
    header_cursor: usize,
    row_cursor: usize,
    input: Inputter,
    last_input: InputResult,
    editing_filter: bool,
    area: Rect,
    status_message: String,
}

impl Model {
    /// Attaches the behaviours to `document` and fires the ready event.
    pub fn init(config: &PageConfig, document: Document) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            document,
            limiter: SelectionLimiter::new(config),
            sorter: TableSorter::new(config),
            filter: TableFilter::new(config),
            modal: ModalDismiss::new(config),
            subscriptions: Vec::new(),
            focus: Focus::Friends,
            friend_cursor: 0,
            header_cursor: 0,
            row_cursor: 0,
            input: Inputter::default(),
            last_input: InputResult::default(),
            editing_filter: false,
            area: Rect::default(),
            status_message: "Started famview!".to_string(),
        };
        for sub in [
            Subscriber::Limiter,
            Subscriber::Sorter,
            Subscriber::Filter,
            Subscriber::Modal,
        ] {
            model.subscribe(sub);
        }
        if model.friend_boxes().is_empty() {
            model.focus = Focus::Headers;
        }
        model.dispatch(Event::ready());
        model
    }

    fn behavior(&mut self, sub: Subscriber) -> &mut dyn Behavior {
        match sub {
            Subscriber::Limiter => &mut self.limiter,
            Subscriber::Sorter => &mut self.sorter,
            Subscriber::Filter => &mut self.filter,
            Subscriber::Modal => &mut self.modal,
        }
    }

    fn subscribe(&mut self, sub: Subscriber) {
        let behavior = self.behavior(sub);
        let name = behavior.name();
        let kinds = behavior.interests();
        for &kind in kinds {
            debug!("{name} subscribes to {kind:?}");
            self.subscriptions.push((kind, sub));
        }
    }

    /// Delivers `event` to every behaviour subscribed to its kind, in
    /// subscription order.
    pub fn dispatch(&mut self, event: Event) {
        trace!("Dispatch {event:?}");
        let subscribers: Vec<Subscriber> = self
            .subscriptions
            .iter()
            .filter(|(kind, _)| *kind == event.kind)
            .map(|&(_, sub)| sub)
            .collect();
        for sub in subscribers {
            let doc = &mut self.document;
            match sub {
                Subscriber::Limiter => self.limiter.handle(doc, &event),
                Subscriber::Sorter => self.sorter.handle(doc, &event),
                Subscriber::Filter => self.filter.handle(doc, &event),
                Subscriber::Modal => self.modal.handle(doc, &event),
            }
        }
    }

    // -------------------- Read access for the ui ---------------------- //

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn sort_state(&self) -> &SortState {
        self.sorter.state()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn friend_cursor(&self) -> usize {
        self.friend_cursor
    }

    pub fn header_cursor(&self) -> usize {
        self.header_cursor
    }

    pub fn row_cursor(&self) -> usize {
        self.row_cursor
    }

    pub fn filter_input(&self) -> Option<&InputResult> {
        self.editing_filter.then_some(&self.last_input)
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn raw_keyevents(&self) -> bool {
        self.editing_filter
    }

    pub fn friend_boxes(&self) -> Vec<NodeId> {
        self.document.by_class(&self.config.checkbox_class)
    }

    pub fn table(&self) -> Option<Table> {
        Table::locate(&self.document, &self.config.results_id)
    }

    pub fn headers(&self) -> Vec<NodeId> {
        self.table()
            .map(|t| t.headers(&self.document))
            .unwrap_or_default()
    }

    /// Body rows currently displayed, in document order.
    pub fn displayed_rows(&self) -> Vec<NodeId> {
        self.table()
            .map(|t| t.rows(&self.document))
            .unwrap_or_default()
            .into_iter()
            .filter(|&r| self.document.displayed(r))
            .collect()
    }

    pub fn modal_open(&self) -> bool {
        self.modal.is_open(&self.document)
    }

    fn modus(&self) -> Modus {
        if self.editing_filter {
            Modus::FILTERINPUT
        } else if self.modal_open() {
            Modus::POPUP
        } else {
            Modus::PAGE
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    // -------------------- Message handling ---------------------- //

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) {
        let Some(msg) = message else {
            return;
        };
        match self.modus() {
            Modus::PAGE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_vertical(-1),
                Message::MoveDown => self.move_vertical(1),
                Message::MoveLeft => self.move_header(-1),
                Message::MoveRight => self.move_header(1),
                Message::CycleFocus => self.cycle_focus(),
                Message::Activate => self.activate(),
                Message::EditFilter => self.enter_filter_input(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.resize(width, height),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit => self.click_modal_backdrop(),
                Message::MouseClick(x, y) => self.click_modal_at(x, y),
                Message::Resize(width, height) => self.resize(width, height),
                _ => (),
            },
            Modus::FILTERINPUT => match msg {
                Message::RawKey(key) => self.raw_input(key),
                Message::Resize(width, height) => self.resize(width, height),
                _ => (),
            },
        }
    }

    fn resize(&mut self, width: usize, height: usize) {
        trace!("UI was resized to {width}x{height}");
        self.area = Rect::new(0, 0, width as u16, height as u16);
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Friends => Focus::Headers,
            Focus::Headers => Focus::Table,
            Focus::Table if self.friend_boxes().is_empty() => Focus::Headers,
            Focus::Table => Focus::Friends,
        };
    }

    fn move_vertical(&mut self, step: isize) {
        match self.focus {
            Focus::Friends => {
                let n = self.friend_boxes().len();
                self.friend_cursor = Self::step_cursor(self.friend_cursor, step, n);
            }
            Focus::Table | Focus::Headers => {
                let n = self.displayed_rows().len();
                self.focus = Focus::Table;
                self.row_cursor = Self::step_cursor(self.row_cursor, step, n);
            }
        }
    }

    fn move_header(&mut self, step: isize) {
        let n = self.headers().len();
        self.header_cursor = Self::step_cursor(self.header_cursor, step, n);
        if self.focus == Focus::Friends {
            self.focus = Focus::Headers;
        }
    }

    fn step_cursor(cursor: usize, step: isize, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        cursor.saturating_add_signed(step).min(len - 1)
    }

    fn activate(&mut self) {
        match self.focus {
            Focus::Friends => self.toggle_friend(),
            Focus::Headers => {
                if let Some(&th) = self.headers().get(self.header_cursor) {
                    self.dispatch(Event::on(EventKind::Click, th));
                    let state = self.sorter.state();
                    let message = format!("Sorted by {} ({})", state.key, state.direction);
                    self.set_status_message(message);
                }
            }
            Focus::Table => {}
        }
    }

    fn toggle_friend(&mut self) {
        let Some(&checkbox) = self.friend_boxes().get(self.friend_cursor) else {
            return;
        };
        if self.document.disabled(checkbox) {
            self.set_status_message(format!(
                "At most {} friends can be selected",
                self.config.selection_limit
            ));
            return;
        }
        let checked = !self.document.checked(checkbox);
        self.document.set_checked(checkbox, checked);
        self.dispatch(Event::on(EventKind::Change, checkbox));
        let selected = self
            .friend_boxes()
            .iter()
            .filter(|&&b| self.document.checked(b))
            .count();
        self.set_status_message(format!(
            "{selected}/{} friends selected",
            self.config.selection_limit
        ));
    }

    fn enter_filter_input(&mut self) {
        trace!("Entering filter input ...");
        let current = self
            .document
            .by_id(&self.config.filter_id)
            .and_then(|f| self.document.value(f))
            .unwrap_or_default()
            .to_string();
        self.input.set(&current);
        self.last_input = self.input.get();
        self.editing_filter = true;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.changed
            && let Some(filter) = self.document.by_id(&self.config.filter_id)
        {
            self.document.set_value(filter, &self.last_input.text);
            self.dispatch(Event::on(EventKind::Input, filter));
            self.row_cursor = 0;
        }
        if self.last_input.finished {
            self.editing_filter = false;
            let shown = self.displayed_rows().len();
            info!("Filter \"{}\" leaves {shown} rows", self.last_input.text);
            self.set_status_message(format!("{shown} rows shown"));
        }
    }

    fn show_help(&mut self) {
        trace!("Open help modal ...");
        self.modal.show(&mut self.document);
    }

    fn click_modal_backdrop(&mut self) {
        if let Some(modal) = self.document.by_id(&self.config.modal_id) {
            self.dispatch(Event::on(EventKind::Click, modal));
        }
    }

    /// Translates a mouse click while the modal is open into a click on the
    /// modal content (inside its box) or on the modal itself (backdrop).
    fn click_modal_at(&mut self, x: u16, y: u16) {
        let Some(modal) = self.document.by_id(&self.config.modal_id) else {
            return;
        };
        let content = ui::modal_area(self.area);
        let inside = x >= content.x
            && x < content.x + content.width
            && y >= content.y
            && y < content.y + content.height;
        let target = if inside {
            self.document.children(modal).first().copied().unwrap_or(modal)
        } else {
            modal
        };
        trace!("Mouse click at {x}:{y}, inside modal content: {inside}");
        self.dispatch(Event::on(EventKind::Click, target));
    }
}
