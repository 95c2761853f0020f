//! Ties matching and expansion together.
//!
//! [`Styler`] walks a parsed stylesheet for one element: collect the custom
//! properties its matching rules define, then expand every matching
//! declaration into literal tokens. What to do with the resulting
//! `(property, tokens)` pairs is the host's business; [`Styler::compute`] is
//! a convenience for hosts that just want one winner per property.

use std::collections::HashMap;

use crate::ast::Stylesheet;
use crate::functions::{CustomProperties, FunctionProcessor};
use crate::matcher;
use crate::selector::SelectorModel;
use crate::tokenizer::Token;
use crate::units::UnitConverter;

/// The styling engine for one host tree and unit policy.
pub struct Styler<'a, M: SelectorModel, U: UnitConverter> {
    model: &'a M,
    units: &'a U,
}

impl<'a, M: SelectorModel, U: UnitConverter> Styler<'a, M, U> {
    pub fn new(model: &'a M, units: &'a U) -> Self {
        Self { model, units }
    }

    /// Collect the `--*` declarations of every rule matching `element`, in
    /// stylesheet order. A later definition of the same name wins.
    pub fn custom_properties(
        &self,
        sheet: &Stylesheet,
        element: &M::Element,
    ) -> CustomProperties {
        let mut out = CustomProperties::new();
        for rule in sheet.style_rules() {
            if !matcher::matches(self.model, &rule.selectors, element) {
                continue;
            }
            for declaration in &rule.declarations {
                if declaration.is_custom_property() {
                    out.insert(declaration.property.clone(), declaration.terms.clone());
                }
            }
        }
        out
    }

    /// Expand every non-custom declaration of every matching rule, in
    /// stylesheet order. Custom properties are gathered from the sheet first;
    /// use [`resolve_with`](Self::resolve_with) to supply them externally.
    pub fn resolve(
        &self,
        sheet: &Stylesheet,
        element: &M::Element,
    ) -> Vec<(String, Vec<Token>)> {
        let custom = self.custom_properties(sheet, element);
        self.resolve_with(sheet, element, &custom)
    }

    /// Like [`resolve`](Self::resolve), with an explicit custom-property map.
    ///
    /// A declaration whose expansion fails is skipped with a warning; the
    /// rest of the sheet is unaffected.
    pub fn resolve_with(
        &self,
        sheet: &Stylesheet,
        element: &M::Element,
        custom: &CustomProperties,
    ) -> Vec<(String, Vec<Token>)> {
        let processor = FunctionProcessor::new(self.model, self.units, custom);
        let mut out = Vec::new();
        for rule in sheet.style_rules() {
            if !matcher::matches(self.model, &rule.selectors, element) {
                continue;
            }
            for declaration in &rule.declarations {
                if declaration.is_custom_property() {
                    continue;
                }
                match processor.process(element, &declaration.terms) {
                    Ok(tokens) => out.push((declaration.property.clone(), tokens)),
                    Err(err) => log::warn!(
                        "skipping declaration '{}' (offset {}): {err}",
                        declaration.property,
                        declaration.offset
                    ),
                }
            }
        }
        out
    }

    /// One winning value per property: the last matching declaration in
    /// stylesheet order.
    pub fn compute(
        &self,
        sheet: &Stylesheet,
        element: &M::Element,
    ) -> HashMap<String, Vec<Token>> {
        self.resolve(sheet, element).into_iter().collect()
    }
}
