//! A slotmap-backed reference element tree.
//!
//! Embedders with their own document model implement
//! [`SelectorModel`](crate::SelectorModel) directly; this tree exists for
//! everyone else (and for the integration tests). All nodes live in a single
//! `SlotMap`, with parent/child links in secondary maps so lookup is O(1).

use std::collections::HashMap;

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::selector::SelectorModel;

new_key_type! {
    /// Unique identifier for an element. Copy, lightweight (u64).
    pub struct ElementId;
}

const EMPTY_CHILDREN: &[ElementId] = &[];

/// Data for a single element: type name plus the selector-visible facets.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Element type name (e.g. "button", "line").
    pub element_type: String,
    /// Optional unique id (`#id` selectors).
    pub id: Option<String>,
    /// Style classes (`.class` selectors).
    pub classes: Vec<String>,
    /// Active pseudo-classes (`:hover`, `:selected`, ...).
    pub pseudo_classes: Vec<String>,
    /// String attributes (`[name=value]` selectors, `attr()` lookups).
    pub attributes: HashMap<String, String>,
}

impl ElementData {
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            ..Self::default()
        }
    }

    /// Set the id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a style class (builder). No-op if already present.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Mark a pseudo-class active (builder).
    pub fn with_pseudo_class(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.pseudo_classes.contains(&name) {
            self.pseudo_classes.push(name);
        }
        self
    }

    /// Set an attribute (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// The element tree, backed by a slotmap arena.
#[derive(Default)]
pub struct ElementTree {
    elements: SlotMap<ElementId, ElementData>,
    children: SecondaryMap<ElementId, Vec<ElementId>>,
    parent: SecondaryMap<ElementId, ElementId>,
    root: Option<ElementId>,
}

impl ElementTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a root-level element (no parent).
    ///
    /// If no root has been set yet, this element becomes the root.
    pub fn insert(&mut self, data: ElementData) -> ElementId {
        let id = self.elements.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert an element as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: ElementId, data: ElementData) -> ElementId {
        debug_assert!(
            self.elements.contains_key(parent),
            "parent element does not exist"
        );
        let id = self.elements.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        self.children
            .get_mut(parent)
            .expect("parent must have children vec")
            .push(id);
        id
    }

    /// The parent of an element, if it has one.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.parent.get(id).copied()
    }

    /// The children of an element, in insertion order. Empty for unknown ids.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// The sibling inserted immediately before `id`, or `None` for a first
    /// child or a root.
    pub fn previous_sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// Walk from `id` up to the root, collecting ancestor ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to an element's data.
    pub fn get(&self, id: ElementId) -> Option<&ElementData> {
        self.elements.get(id)
    }

    /// Mutable access to an element's data.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementData> {
        self.elements.get_mut(id)
    }

    /// The current root element, if set.
    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl SelectorModel for ElementTree {
    type Element = ElementId;

    fn id(&self, element: &ElementId) -> Option<String> {
        self.get(*element).and_then(|data| data.id.clone())
    }

    fn element_type(&self, element: &ElementId) -> Option<String> {
        self.get(*element).map(|data| data.element_type.clone())
    }

    fn style_classes(&self, element: &ElementId) -> Vec<String> {
        self.get(*element)
            .map(|data| data.classes.clone())
            .unwrap_or_default()
    }

    fn has_pseudo_class(&self, element: &ElementId, name: &str) -> bool {
        self.get(*element)
            .is_some_and(|data| data.pseudo_classes.iter().any(|p| p == name))
    }

    fn attribute(&self, element: &ElementId, name: &str) -> Option<String> {
        self.get(*element)
            .and_then(|data| data.attributes.get(name).cloned())
    }

    fn parent(&self, element: &ElementId) -> Option<ElementId> {
        ElementTree::parent(self, *element)
    }

    fn previous_sibling(&self, element: &ElementId) -> Option<ElementId> {
        ElementTree::previous_sibling(self, *element)
    }
}
