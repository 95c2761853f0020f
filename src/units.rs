//! Unit conversion policy.
//!
//! `calc()` needs to add quantities carrying different units. The engine does
//! not know what a millimeter is worth on the host's canvas, so the factors
//! come in from the caller through [`UnitConverter`]. [`UnitTable`] is the
//! plain map-backed implementation; hosts with dynamic DPI can implement the
//! trait themselves.

use std::collections::HashMap;

/// Caller-supplied unit policy: how many pixels one unit of `unit` is worth.
pub trait UnitConverter {
    /// Pixels per one unit of `unit`, or `None` if the unit is unknown.
    fn pixels_per_unit(&self, unit: &str) -> Option<f64>;

    /// Convert `value` from one unit to another through the pixel factors.
    /// Fails if either unit is unknown or the target factor is zero.
    fn convert(&self, value: f64, from: &str, to: &str) -> Option<f64> {
        if from == to {
            return Some(value);
        }
        let from_factor = self.pixels_per_unit(from)?;
        let to_factor = self.pixels_per_unit(to)?;
        if to_factor == 0.0 {
            return None;
        }
        Some(value * from_factor / to_factor)
    }
}

/// A fixed unit→pixels table.
///
/// ```
/// use patina::{UnitConverter, UnitTable};
///
/// let units = UnitTable::new()
///     .with_factor("px", 1.0)
///     .with_factor("in", 96.0)
///     .with_factor("cm", 96.0 / 2.54);
/// assert_eq!(units.convert(2.0, "in", "px"), Some(192.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    factors: HashMap<String, f64>,
}

impl UnitTable {
    /// An empty table: every unit is unknown until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit's pixel factor (builder).
    pub fn with_factor(mut self, unit: impl Into<String>, pixels: f64) -> Self {
        self.factors.insert(unit.into(), pixels);
        self
    }

    /// Register or update a unit's pixel factor.
    pub fn set_factor(&mut self, unit: impl Into<String>, pixels: f64) {
        self.factors.insert(unit.into(), pixels);
    }
}

impl UnitConverter for UnitTable {
    fn pixels_per_unit(&self, unit: &str) -> Option<f64> {
        self.factors.get(unit).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> UnitTable {
        UnitTable::new()
            .with_factor("px", 1.0)
            .with_factor("in", 96.0)
            .with_factor("pt", 96.0 / 72.0)
    }

    #[test]
    fn lookup() {
        let units = table();
        assert_eq!(units.pixels_per_unit("in"), Some(96.0));
        assert_eq!(units.pixels_per_unit("furlong"), None);
    }

    #[test]
    fn convert_between_units() {
        let units = table();
        assert_eq!(units.convert(1.0, "in", "px"), Some(96.0));
        assert_eq!(units.convert(72.0, "pt", "in"), Some(1.0));
    }

    #[test]
    fn convert_same_unit_needs_no_factor() {
        let units = UnitTable::new();
        assert_eq!(units.convert(5.0, "km", "km"), Some(5.0));
    }

    #[test]
    fn convert_unknown_unit_fails() {
        let units = table();
        assert_eq!(units.convert(1.0, "in", "furlong"), None);
        assert_eq!(units.convert(1.0, "furlong", "in"), None);
    }

    #[test]
    fn zero_target_factor_fails() {
        let units = table().with_factor("zero", 0.0);
        assert_eq!(units.convert(1.0, "px", "zero"), None);
    }
}
