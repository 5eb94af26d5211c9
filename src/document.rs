use std::collections::HashMap;

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
    text: String,
    checked: bool,
    disabled: bool,
    value: String,
    displayed: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Element {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attrs: HashMap::new(),
            text: String::new(),
            checked: false,
            disabled: false,
            value: String::new(),
            displayed: true,
            parent,
            children: Vec::new(),
        }
    }
}

/// An owned element tree standing in for the live page.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Lookups with an
/// unknown id come back empty and mutations on one are ignored, so callers
/// never have to deal with a missing element as an error.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            nodes: vec![Element::new("body", None)],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0)
    }

    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = self.element(parent).map(|_| parent);
        self.nodes.push(Element::new(tag, parent));
        if let Some(p) = parent
            && let Some(el) = self.element_mut(p)
        {
            el.children.push(id);
        }
        id
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        let Some(el) = self.element_mut(node) else {
            return;
        };
        let previous = el.id.replace(id.to_string());
        if let Some(previous) = previous {
            self.id_index.remove(&previous);
        }
        self.id_index.insert(id.to_string(), node);
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).and_then(|el| el.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.element(node)
            .map(|el| el.children.as_slice())
            .unwrap_or(&[])
    }

    /// All descendants of `node` in document order, `node` excluded.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    pub fn descendants_by_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|&n| self.tag(n) == Some(tag))
            .collect()
    }

    pub fn first_descendant_by_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|&n| self.tag(n) == Some(tag))
    }

    /// Every element carrying `class`, in document order.
    pub fn by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&n| self.class_contains(n, class))
            .collect()
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest_by_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = self.element(node).map(|_| node);
        while let Some(n) = current {
            if self.tag(n) == Some(tag) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Moves `child` to the end of `parent`'s children, detaching it from
    /// its current parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child
            || self.element(parent).is_none()
            || self.element(child).is_none()
            || self.is_descendant_of(parent, child)
        {
            return;
        }
        if let Some(old) = self.parent(child)
            && let Some(el) = self.element_mut(old)
        {
            el.children.retain(|&c| c != child);
        }
        if let Some(el) = self.element_mut(parent) {
            el.children.push(child);
        }
        if let Some(el) = self.element_mut(child) {
            el.parent = Some(parent);
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.element_mut(node) {
            el.text = text.to_string();
        }
    }

    /// Own text followed by the text of all descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let Some(el) = self.element(node) else {
            return String::new();
        };
        let mut out = el.text.clone();
        for d in self.descendants(node) {
            if let Some(child) = self.element(d) {
                out.push_str(&child.text);
            }
        }
        out
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|el| el.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn class_contains(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    pub fn class_add(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node)
            && !el.classes.iter().any(|c| c == class)
        {
            el.classes.push(class.to_string());
        }
    }

    pub fn class_remove(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    /// Adds the class when `force` is true, removes it otherwise.
    pub fn class_toggle(&mut self, node: NodeId, class: &str, force: bool) {
        if force {
            self.class_add(node, class);
        } else {
            self.class_remove(node, class);
        }
    }

    pub fn checked(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|el| el.checked)
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(el) = self.element_mut(node) {
            el.checked = checked;
        }
    }

    pub fn disabled(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|el| el.disabled)
    }

    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        if let Some(el) = self.element_mut(node) {
            el.disabled = disabled;
        }
    }

    pub fn value(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.value.as_str())
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.value = value.to_string();
        }
    }

    pub fn displayed(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|el| el.displayed)
    }

    pub fn set_displayed(&mut self, node: NodeId, displayed: bool) {
        if let Some(el) = self.element_mut(node) {
            el.displayed = displayed;
        }
    }
}
