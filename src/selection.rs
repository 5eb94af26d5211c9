use tracing::{debug, trace};

use crate::document::Document;
use crate::domain::{Behavior, Event, EventKind, PageConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitDecision {
    pub checked: usize,
    pub limit_reached: bool,
}

/// Counts the checked boxes and decides whether the limit is active.
pub fn decide(checked_states: &[bool], limit: usize) -> LimitDecision {
    let checked = checked_states.iter().filter(|&&c| c).count();
    LimitDecision {
        checked,
        limit_reached: checked >= limit,
    }
}

/// Caps how many marker-class checkboxes can be checked at once.
///
/// Once the limit is reached every unchecked box is disabled, so a further
/// check is never possible; checked boxes stay enabled so they can be
/// unchecked again. The optional hint element is shown while the limit is
/// active.
#[derive(Debug, Clone)]
pub struct SelectionLimiter {
    limit: usize,
    checkbox_class: String,
    note_id: String,
    hidden_class: String,
}

impl SelectionLimiter {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            limit: config.selection_limit,
            checkbox_class: config.checkbox_class.clone(),
            note_id: config.limit_note_id.clone(),
            hidden_class: config.hidden_class.clone(),
        }
    }

    pub fn update(&self, doc: &mut Document) -> LimitDecision {
        let boxes = doc.by_class(&self.checkbox_class);
        let states: Vec<bool> = boxes.iter().map(|&b| doc.checked(b)).collect();
        let decision = decide(&states, self.limit);

        for (&b, &checked) in boxes.iter().zip(states.iter()) {
            if !decision.limit_reached {
                doc.set_disabled(b, false);
            } else if !checked {
                doc.set_disabled(b, true);
            }
        }
        if let Some(note) = doc.by_id(&self.note_id) {
            doc.class_toggle(note, &self.hidden_class, !decision.limit_reached);
        }

        debug!(
            "Selection {}/{} checked, limit reached: {}",
            decision.checked, self.limit, decision.limit_reached
        );
        decision
    }
}

impl Behavior for SelectionLimiter {
    fn name(&self) -> &'static str {
        "selection-limiter"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::Ready, EventKind::Change]
    }

    fn handle(&mut self, doc: &mut Document, event: &Event) {
        match (event.kind, event.target) {
            (EventKind::Ready, _) => {
                self.update(doc);
            }
            (EventKind::Change, Some(target)) if doc.class_contains(target, &self.checkbox_class) => {
                self.update(doc);
            }
            _ => trace!("Selection limiter ignores {event:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeId;

    fn page(n: usize, checked: usize, with_note: bool) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let root = doc.root();
        if with_note {
            let note = doc.create_element(root, "p");
            doc.set_id(note, "limit-note");
            doc.class_add(note, "hidden");
        }
        let list = doc.create_element(root, "ul");
        let mut boxes = Vec::new();
        for i in 0..n {
            let li = doc.create_element(list, "li");
            let input = doc.create_element(li, "input");
            doc.class_add(input, "friend-checkbox");
            doc.set_checked(input, i < checked);
            boxes.push(input);
        }
        (doc, boxes)
    }

    fn limiter() -> SelectionLimiter {
        SelectionLimiter::new(&PageConfig::default())
    }

    #[test]
    fn decide_counts_checked() {
        assert_eq!(
            decide(&[true, false, true], 5),
            LimitDecision {
                checked: 2,
                limit_reached: false
            }
        );
        assert!(decide(&[true; 5], 5).limit_reached);
        assert!(!decide(&[], 5).limit_reached);
    }

    #[test]
    fn below_limit_enables_everything() {
        for checked in 0..5 {
            let (mut doc, boxes) = page(8, checked, true);
            for &b in &boxes {
                doc.set_disabled(b, true);
            }
            limiter().update(&mut doc);
            assert!(boxes.iter().all(|&b| !doc.disabled(b)), "k = {checked}");
            let note = doc.by_id("limit-note").unwrap();
            assert!(doc.class_contains(note, "hidden"));
        }
    }

    #[test]
    fn at_limit_disables_only_unchecked() {
        let (mut doc, boxes) = page(8, 5, true);
        limiter().update(&mut doc);
        let disabled: Vec<bool> = boxes.iter().map(|&b| doc.disabled(b)).collect();
        assert_eq!(
            disabled,
            vec![false, false, false, false, false, true, true, true]
        );
        let note = doc.by_id("limit-note").unwrap();
        assert!(!doc.class_contains(note, "hidden"));
    }

    #[test]
    fn checked_boxes_never_disabled() {
        let (mut doc, boxes) = page(7, 7, false);
        limiter().update(&mut doc);
        assert!(boxes.iter().all(|&b| !doc.disabled(b)));
    }

    #[test]
    fn unchecking_releases_the_limit() {
        let (mut doc, boxes) = page(6, 5, true);
        let mut limiter = limiter();
        limiter.handle(&mut doc, &Event::ready());
        assert!(doc.disabled(boxes[5]));

        doc.set_checked(boxes[0], false);
        limiter.handle(&mut doc, &Event::on(EventKind::Change, boxes[0]));
        assert!(boxes.iter().all(|&b| !doc.disabled(b)));
    }

    #[test]
    fn change_on_other_elements_is_ignored() {
        let (mut doc, boxes) = page(6, 5, false);
        let root = doc.root();
        let other = doc.create_element(root, "input");
        limiter().handle(&mut doc, &Event::on(EventKind::Change, other));
        assert!(!doc.disabled(boxes[5]));
    }

    #[test]
    fn below_limit_reenables_disabled_checked_box() {
        let (mut doc, boxes) = page(1, 1, false);
        doc.set_disabled(boxes[0], true);
        limiter().update(&mut doc);
        assert!(!doc.disabled(boxes[0]));
    }

    #[test]
    fn missing_note_and_boxes_are_tolerated() {
        let mut doc = Document::new();
        let decision = limiter().update(&mut doc);
        assert_eq!(decision.checked, 0);
        assert!(!decision.limit_reached);
    }
}
