//! # patina
//!
//! A CSS-like styling engine for arbitrary element trees.
//!
//! patina parses stylesheets, matches selectors against any host document
//! model, and expands the in-value functions `attr()`, `calc()`, `var()`,
//! `concat()`, and `replace()` into literal token lists. The host tree stays
//! opaque behind the [`SelectorModel`] trait, and unit conversion is a
//! caller-supplied policy — the engine owns the language, the host owns the
//! document and the canvas.
//!
//! ## Pipeline
//!
//! - **[`scanner`]** — newline normalization, comment stripping, escape decoding
//! - **[`tokenizer`]** — logos-based lexer; never fails, malformed input
//!   degrades to best-effort tokens
//! - **[`parser`]** — recursive descent with error recovery; always returns a
//!   best-effort AST plus collected [`SyntaxError`]s
//! - **[`matcher`]** — right-to-left selector matching with backtracking
//! - **[`functions`]** — cycle-guarded recursive function expansion
//! - **[`engine`]** — [`Styler`]: match + expand, per element
//! - **[`tree`]** — slotmap-backed reference [`ElementTree`] for hosts
//!   without a document model of their own
//!
//! ## Example
//!
//! ```
//! use patina::{parse, ElementData, ElementTree, Styler, UnitTable};
//!
//! let mut tree = ElementTree::new();
//! let figure = tree.insert(ElementData::new("figure"));
//! let line = tree.insert_child(
//!     figure,
//!     ElementData::new("line").with_class("dashed").with_attr("width", "4"),
//! );
//!
//! let result = parse("figure > line.dashed { stroke-width: calc(attr(width number) * 2); }");
//! assert!(result.is_clean());
//!
//! let units = UnitTable::new();
//! let styler = Styler::new(&tree, &units);
//! let computed = styler.compute(&result.stylesheet, &line);
//! assert_eq!(computed["stroke-width"][0].value, Some(8.0));
//! ```

pub mod ast;
pub mod engine;
pub mod functions;
pub mod matcher;
pub mod parser;
pub mod scanner;
pub mod selector;
pub mod tokenizer;
pub mod tree;
pub mod units;

pub use ast::{
    AtRule, AttributeOp, AttributePredicate, Combinator, Declaration, FunctionCall, PseudoClass,
    Qualifier, Rule, Selector, SelectorGroup, SimpleSelectorSequence, StyleRule, Stylesheet,
    TypeSelector,
};
pub use engine::Styler;
pub use functions::{CustomProperties, FunctionError, FunctionProcessor};
pub use matcher::{matches, matches_selector};
pub use parser::{parse, ParseResult, SyntaxError};
pub use selector::SelectorModel;
pub use tokenizer::{tokenize, Token, TokenKind};
pub use tree::{ElementData, ElementId, ElementTree};
pub use units::{UnitConverter, UnitTable};
