//! Selector matching against a host tree.
//!
//! Matching runs right-to-left: the rightmost sequence (the subject) is
//! tested against the element itself, then the chain walks leftward through
//! the combinators. `>` and `+` are exact single steps; descendant (space)
//! and `~` are searches that try every candidate anchor with full
//! backtracking, so `a b c` matches even when the nearest `b` ancestor has no
//! `a` above it but a farther one does.
//!
//! Everything here is read-only: all structure questions go through
//! [`SelectorModel`] and no element is ever mutated. A selector the model
//! cannot satisfy simply does not match; nothing panics.

use crate::ast::{
    AttributeOp, Combinator, Qualifier, Selector, SelectorGroup, SimpleSelectorSequence,
    TypeSelector,
};
use crate::selector::SelectorModel;

/// `true` if any alternative in the group matches the element.
pub fn matches<M: SelectorModel>(model: &M, group: &SelectorGroup, element: &M::Element) -> bool {
    group
        .alternatives
        .iter()
        .any(|selector| matches_selector(model, selector, element))
}

/// `true` if the single selector matches the element.
pub fn matches_selector<M: SelectorModel>(
    model: &M,
    selector: &Selector,
    element: &M::Element,
) -> bool {
    let Some(subject) = selector.subject() else {
        return false;
    };
    if !matches_sequence(model, subject, element) {
        return false;
    }
    match_chain(model, selector, selector.sequences.len() - 1, element)
}

/// Continue matching leftward given that `selector.sequences[index]` already
/// matched at `element`.
fn match_chain<M: SelectorModel>(
    model: &M,
    selector: &Selector,
    index: usize,
    element: &M::Element,
) -> bool {
    if index == 0 {
        return true;
    }
    let target = &selector.sequences[index - 1];
    match selector.combinators[index - 1] {
        Combinator::Child => model.parent(element).is_some_and(|parent| {
            matches_sequence(model, target, &parent)
                && match_chain(model, selector, index - 1, &parent)
        }),
        Combinator::AdjacentSibling => model.previous_sibling(element).is_some_and(|sibling| {
            matches_sequence(model, target, &sibling)
                && match_chain(model, selector, index - 1, &sibling)
        }),
        Combinator::Descendant => {
            // Try each ancestor nearest-to-farthest as the anchor; a failed
            // continuation falls through to the next candidate.
            let mut current = model.parent(element);
            while let Some(anchor) = current {
                if matches_sequence(model, target, &anchor)
                    && match_chain(model, selector, index - 1, &anchor)
                {
                    return true;
                }
                current = model.parent(&anchor);
            }
            false
        }
        Combinator::GeneralSibling => {
            let mut current = model.previous_sibling(element);
            while let Some(anchor) = current {
                if matches_sequence(model, target, &anchor)
                    && match_chain(model, selector, index - 1, &anchor)
                {
                    return true;
                }
                current = model.previous_sibling(&anchor);
            }
            false
        }
    }
}

/// Test one simple selector sequence against one element: the type selector
/// and every qualifier must hold.
pub fn matches_sequence<M: SelectorModel>(
    model: &M,
    sequence: &SimpleSelectorSequence,
    element: &M::Element,
) -> bool {
    match &sequence.type_selector {
        Some(TypeSelector::Universal) | None => {}
        Some(TypeSelector::Named(name)) => {
            if model.element_type(element).as_deref() != Some(name.as_str()) {
                return false;
            }
        }
    }

    sequence.qualifiers.iter().all(|qualifier| match qualifier {
        Qualifier::Id(id) => model.id(element).as_deref() == Some(id.as_str()),
        Qualifier::Class(class) => model.has_style_class(element, class),
        Qualifier::PseudoClass(pseudo) => model.has_pseudo_class(element, &pseudo.name),
        Qualifier::Attribute(predicate) => {
            let name = predicate.name.as_str();
            match (predicate.op, predicate.value.as_deref()) {
                (AttributeOp::Present, _) => model.has_attribute(element, name),
                (AttributeOp::Equals, Some(v)) => model.attribute_equals(element, name, v),
                (AttributeOp::ContainsWord, Some(v)) => {
                    model.attribute_contains_word(element, name, v)
                }
                (AttributeOp::DashMatch, Some(v)) => model.attribute_dash_matches(element, name, v),
                (AttributeOp::StartsWith, Some(v)) => {
                    model.attribute_starts_with(element, name, v)
                }
                (AttributeOp::EndsWith, Some(v)) => model.attribute_ends_with(element, name, v),
                // A valued operator without a value never comes out of the
                // parser; treat it as non-matching rather than panic.
                (_, None) => false,
            }
        }
    })
}
