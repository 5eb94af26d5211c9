use tracing::{debug, trace};

use crate::document::{Document, NodeId};
use crate::domain::{Behavior, Event, EventKind, PageConfig};

pub fn should_dismiss(modal_hidden: bool, target_is_modal: bool) -> bool {
    !modal_hidden && target_is_modal
}

/// Hides the modal when its backdrop (the modal element itself, not one of
/// its descendants) is clicked. Showing it is left to the host.
#[derive(Debug, Clone)]
pub struct ModalDismiss {
    modal_id: String,
    hidden_class: String,
}

impl ModalDismiss {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            modal_id: config.modal_id.clone(),
            hidden_class: config.hidden_class.clone(),
        }
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.by_id(&self.modal_id)
            .is_some_and(|m| !doc.class_contains(m, &self.hidden_class))
    }

    pub fn show(&self, doc: &mut Document) {
        if let Some(modal) = doc.by_id(&self.modal_id) {
            doc.class_remove(modal, &self.hidden_class);
        }
    }

    pub fn click(&self, doc: &mut Document, target: NodeId) {
        let Some(modal) = doc.by_id(&self.modal_id) else {
            return;
        };
        let hidden = doc.class_contains(modal, &self.hidden_class);
        if should_dismiss(hidden, target == modal) {
            doc.class_add(modal, &self.hidden_class);
            debug!("Modal dismissed by backdrop click");
        }
    }
}

impl Behavior for ModalDismiss {
    fn name(&self) -> &'static str {
        "modal-dismiss"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::Click]
    }

    fn handle(&mut self, doc: &mut Document, event: &Event) {
        match event.target {
            Some(target) => self.click(doc, target),
            None => trace!("Modal dismiss ignores {event:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let modal = doc.create_element(root, "div");
        doc.set_id(modal, "modal");
        let content = doc.create_element(modal, "div");
        let button = doc.create_element(content, "button");
        (doc, modal, button)
    }

    fn dismiss() -> ModalDismiss {
        ModalDismiss::new(&PageConfig::default())
    }

    #[test]
    fn backdrop_click_hides() {
        let (mut doc, modal, _) = page();
        dismiss().handle(&mut doc, &Event::on(EventKind::Click, modal));
        assert!(doc.class_contains(modal, "hidden"));
    }

    #[test]
    fn descendant_click_keeps_it_open() {
        let (mut doc, modal, button) = page();
        let content = doc.parent(button).unwrap();
        dismiss().handle(&mut doc, &Event::on(EventKind::Click, button));
        dismiss().handle(&mut doc, &Event::on(EventKind::Click, content));
        assert!(dismiss().is_open(&doc));
        assert!(!doc.class_contains(modal, "hidden"));
    }

    #[test]
    fn hidden_or_missing_modal_is_a_no_op() {
        let (mut doc, modal, _) = page();
        doc.class_add(modal, "hidden");
        dismiss().click(&mut doc, modal);
        assert!(doc.class_contains(modal, "hidden"));
        dismiss().show(&mut doc);
        assert!(dismiss().is_open(&doc));

        let mut empty = Document::new();
        let root = empty.root();
        dismiss().click(&mut empty, root);
        assert!(!dismiss().is_open(&empty));
    }

    #[test]
    fn should_dismiss_table() {
        assert!(should_dismiss(false, true));
        assert!(!should_dismiss(true, true));
        assert!(!should_dismiss(false, false));
    }
}
