//! The capability interface the matcher uses to query a host element tree.
//!
//! The engine never sees the host's node type directly. Implement
//! [`SelectorModel`] once per tree (see [`tree`](crate::tree) for the
//! built-in slotmap implementation) and the matcher and function processor
//! work against any document model.

/// Read-only structure and attribute queries over an opaque element type.
///
/// Elements are handed back by value; implementors typically use a cheap
/// `Copy` key (the built-in tree uses a slotmap key). The engine never
/// mutates an element and never stores one beyond a single call.
pub trait SelectorModel {
    type Element;

    /// The element's id, if it has one (`#id` selectors).
    fn id(&self, element: &Self::Element) -> Option<String>;

    /// The element's type name (`button`, `line`, ...), if it has one.
    fn element_type(&self, element: &Self::Element) -> Option<String>;

    /// All style classes on the element.
    fn style_classes(&self, element: &Self::Element) -> Vec<String>;

    /// Whether the named pseudo-class (`hover`, `selected`, ...) is active.
    fn has_pseudo_class(&self, element: &Self::Element, name: &str) -> bool;

    /// The value of the named attribute, if present.
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// The element's parent, or `None` at the root.
    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// The sibling immediately before this element, or `None` for a first
    /// child.
    fn previous_sibling(&self, element: &Self::Element) -> Option<Self::Element>;

    // ── Derived predicates ───────────────────────────────────────────

    fn has_style_class(&self, element: &Self::Element, name: &str) -> bool {
        self.style_classes(element).iter().any(|c| c == name)
    }

    fn has_attribute(&self, element: &Self::Element, name: &str) -> bool {
        self.attribute(element, name).is_some()
    }

    /// `[name=v]`
    fn attribute_equals(&self, element: &Self::Element, name: &str, value: &str) -> bool {
        self.attribute(element, name).as_deref() == Some(value)
    }

    /// `[name^=v]`
    fn attribute_starts_with(&self, element: &Self::Element, name: &str, value: &str) -> bool {
        self.attribute(element, name)
            .is_some_and(|a| a.starts_with(value))
    }

    /// `[name$=v]`
    fn attribute_ends_with(&self, element: &Self::Element, name: &str, value: &str) -> bool {
        self.attribute(element, name)
            .is_some_and(|a| a.ends_with(value))
    }

    /// `[name~=v]`: the value occurs as a whole whitespace-separated word.
    fn attribute_contains_word(&self, element: &Self::Element, name: &str, value: &str) -> bool {
        self.attribute(element, name)
            .is_some_and(|a| a.split_whitespace().any(|word| word == value))
    }

    /// `[name|=v]`: the value equals `v` or starts with `v-`.
    fn attribute_dash_matches(&self, element: &Self::Element, name: &str, value: &str) -> bool {
        self.attribute(element, name)
            .is_some_and(|a| a == value || a.strip_prefix(value).is_some_and(|rest| rest.starts_with('-')))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// A one-element model: just an attribute map.
    struct Single {
        attributes: HashMap<String, String>,
    }

    impl SelectorModel for Single {
        type Element = ();

        fn id(&self, _: &()) -> Option<String> {
            None
        }
        fn element_type(&self, _: &()) -> Option<String> {
            None
        }
        fn style_classes(&self, _: &()) -> Vec<String> {
            vec!["primary".into(), "wide".into()]
        }
        fn has_pseudo_class(&self, _: &(), _: &str) -> bool {
            false
        }
        fn attribute(&self, _: &(), name: &str) -> Option<String> {
            self.attributes.get(name).cloned()
        }
        fn parent(&self, _: &()) -> Option<()> {
            None
        }
        fn previous_sibling(&self, _: &()) -> Option<()> {
            None
        }
    }

    fn model() -> Single {
        let mut attributes = HashMap::new();
        attributes.insert("class".to_owned(), "alert alert-danger".to_owned());
        attributes.insert("lang".to_owned(), "en-US".to_owned());
        Single { attributes }
    }

    #[test]
    fn class_membership_from_list() {
        let m = model();
        assert!(m.has_style_class(&(), "primary"));
        assert!(!m.has_style_class(&(), "prim"));
    }

    #[test]
    fn attribute_word_membership() {
        let m = model();
        assert!(m.attribute_contains_word(&(), "class", "alert"));
        assert!(m.attribute_contains_word(&(), "class", "alert-danger"));
        assert!(!m.attribute_contains_word(&(), "class", "danger"));
    }

    #[test]
    fn attribute_dash_match() {
        let m = model();
        assert!(m.attribute_dash_matches(&(), "lang", "en"));
        assert!(m.attribute_dash_matches(&(), "lang", "en-US"));
        assert!(!m.attribute_dash_matches(&(), "lang", "e"));
    }

    #[test]
    fn attribute_prefix_and_suffix() {
        let m = model();
        assert!(m.attribute_starts_with(&(), "lang", "en"));
        assert!(m.attribute_ends_with(&(), "lang", "US"));
        assert!(!m.attribute_starts_with(&(), "missing", ""));
    }
}
