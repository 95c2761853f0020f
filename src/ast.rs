//! Stylesheet AST: rules, selector groups, sequences, qualifiers,
//! declarations.
//!
//! Everything here is immutable value data produced by one
//! [`parse`](crate::parse) call. Nothing holds references into the source
//! text and nothing is shared between parses.

use crate::tokenizer::Token;

/// A parsed stylesheet: an ordered list of rules.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Iterate the style rules, skipping at-rules.
    pub fn style_rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Style(style) => Some(style),
            Rule::At(_) => None,
        })
    }
}

/// A top-level rule.
#[derive(Debug, Clone)]
pub enum Rule {
    At(AtRule),
    Style(StyleRule),
}

/// An at-rule such as `@import`, `@media`, or `@page`, recognized
/// syntactically and carried along without interpretation.
#[derive(Debug, Clone)]
pub struct AtRule {
    /// Keyword without the `@`.
    pub name: String,
    /// Tokens between the keyword and the block / semicolon.
    pub prelude: Vec<Token>,
    /// Raw block contents, if the rule had a `{ ... }` block.
    pub block: Option<Vec<Token>>,
}

/// A style rule: selector group plus ordered declarations.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selectors: SelectorGroup,
    pub declarations: Vec<Declaration>,
}

/// A comma-separated set of alternative selectors. The group matches an
/// element if any alternative does.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectorGroup {
    pub alternatives: Vec<Selector>,
}

/// One selector: a chain of simple selector sequences joined by combinators.
///
/// `sequences` is ordered left-to-right as written; `combinators[i]` sits
/// between `sequences[i]` and `sequences[i + 1]`, so
/// `combinators.len() == sequences.len() - 1`. Matching starts from the
/// rightmost sequence (the subject) and walks leftward.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    pub sequences: Vec<SimpleSelectorSequence>,
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// The rightmost sequence, which must match the element itself.
    pub fn subject(&self) -> Option<&SimpleSelectorSequence> {
        self.sequences.last()
    }
}

/// Structural operator between two simple selector sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: `a b` — any ancestor.
    Descendant,
    /// `a > b` — direct parent.
    Child,
    /// `a + b` — immediately preceding sibling.
    AdjacentSibling,
    /// `a ~ b` — any preceding sibling.
    GeneralSibling,
}

/// One compound selector: an optional type selector plus qualifiers, with no
/// combinator inside (e.g. `button.primary:hover`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleSelectorSequence {
    pub type_selector: Option<TypeSelector>,
    pub qualifiers: Vec<Qualifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSelector {
    /// `*`
    Universal,
    /// A named element type.
    Named(String),
}

/// A single qualifier inside a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Qualifier {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[name]`, `[name=v]`, `[name~=v]`, ...
    Attribute(AttributePredicate),
    /// `:hover`, `:nth-child(2)`, ...
    PseudoClass(PseudoClass),
}

/// An attribute test inside `[...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePredicate {
    pub name: String,
    pub op: AttributeOp,
    /// `None` only for [`AttributeOp::Present`].
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    /// `[name]` — the attribute exists.
    Present,
    /// `[name=v]` — exact value match.
    Equals,
    /// `[name~=v]` — whitespace-separated word membership.
    ContainsWord,
    /// `[name|=v]` — equals `v` or starts with `v-`.
    DashMatch,
    /// `[name^=v]` — value prefix.
    StartsWith,
    /// `[name$=v]` — value suffix.
    EndsWith,
}

/// A pseudo-class qualifier. The argument tokens of a functional form such as
/// `:nth-child(2)` are kept but not interpreted by the matcher; only the name
/// is forwarded to the [`SelectorModel`](crate::SelectorModel).
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoClass {
    pub name: String,
    pub arguments: Vec<Token>,
}

/// A property declaration: `property: term term ...`.
///
/// Terms are kept as raw tokens (whitespace and comments removed); the
/// [`FunctionProcessor`](crate::FunctionProcessor) turns them into a literal
/// token list on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub terms: Vec<Token>,
    /// Byte offset of the property name in the source, for diagnostics.
    pub offset: usize,
}

impl Declaration {
    /// `true` for `--name: ...` declarations, which define custom properties
    /// consumed by `var()` rather than ordinary styled properties.
    pub fn is_custom_property(&self) -> bool {
        self.property.starts_with("--")
    }
}

/// A function call extracted from a term token list: name plus one token list
/// per comma-separated argument.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<Vec<Token>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Token;

    #[test]
    fn custom_property_detection() {
        let decl = Declaration {
            property: "--accent".into(),
            terms: vec![Token::ident("red")],
            offset: 0,
        };
        assert!(decl.is_custom_property());

        let decl = Declaration {
            property: "color".into(),
            terms: vec![Token::ident("red")],
            offset: 0,
        };
        assert!(!decl.is_custom_property());
    }

    #[test]
    fn style_rules_skips_at_rules() {
        let sheet = Stylesheet {
            rules: vec![
                Rule::At(AtRule {
                    name: "import".into(),
                    prelude: vec![],
                    block: None,
                }),
                Rule::Style(StyleRule {
                    selectors: SelectorGroup::default(),
                    declarations: vec![],
                }),
            ],
        };
        assert_eq!(sheet.style_rules().count(), 1);
    }

    #[test]
    fn subject_is_rightmost_sequence() {
        let selector = Selector {
            sequences: vec![
                SimpleSelectorSequence {
                    type_selector: Some(TypeSelector::Named("a".into())),
                    qualifiers: vec![],
                },
                SimpleSelectorSequence {
                    type_selector: Some(TypeSelector::Named("b".into())),
                    qualifiers: vec![],
                },
            ],
            combinators: vec![Combinator::Child],
        };
        assert_eq!(
            selector.subject().and_then(|s| s.type_selector.as_ref()),
            Some(&TypeSelector::Named("b".into()))
        );
    }
}
