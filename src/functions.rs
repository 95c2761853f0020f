//! In-value function expansion: `attr()`, `calc()`, `var()`, `concat()`,
//! `replace()`, and verbatim pass-through for everything else.
//!
//! [`FunctionProcessor::process`] turns a declaration's raw term list into a
//! fully literal token list. Expansion is recursive (a `var()` body may
//! contain a `calc()` whose operand is an `attr()`), with an explicit set of
//! in-progress custom-property names threaded through the recursion as the
//! cycle guard. A failure aborts only the declaration being expanded.

use std::collections::{HashMap, HashSet};

use crate::ast::FunctionCall;
use crate::selector::SelectorModel;
use crate::tokenizer::{tokenize, Token, TokenKind};
use crate::units::UnitConverter;

/// Custom property map: `--name` → raw (unexpanded) token list.
pub type CustomProperties = HashMap<String, Vec<Token>>;

/// A failure while expanding one declaration's value.
#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
    #[error("{name}() expects {expected} argument(s), got {got}")]
    WrongArity {
        name: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("no attribute '{0}' and no fallback given")]
    MissingAttribute(String),
    #[error("undefined custom property '{0}' and no fallback given")]
    MissingVariable(String),
    #[error("custom property '{0}' refers to itself")]
    CyclicVariable(String),
    #[error("cannot interpret '{0}' as a number")]
    InvalidNumber(String),
    #[error("invalid replace() pattern")]
    InvalidPattern(#[from] regex::Error),
    #[error("cannot combine '{left}' with '{right}'")]
    IncompatibleUnits { left: String, right: String },
    #[error("division by zero in calc()")]
    DivisionByZero,
    #[error("malformed {name}() call: {reason}")]
    MalformedCall { name: String, reason: String },
}

/// Expands functions inside declaration values for one element.
///
/// Holds only borrows; construct one per expansion batch and drop it. The
/// custom-property map is read, never written — it must not change while an
/// expansion is in flight.
pub struct FunctionProcessor<'a, M: SelectorModel, U: UnitConverter> {
    model: &'a M,
    units: &'a U,
    custom_properties: &'a CustomProperties,
}

impl<'a, M: SelectorModel, U: UnitConverter> FunctionProcessor<'a, M, U> {
    pub fn new(model: &'a M, units: &'a U, custom_properties: &'a CustomProperties) -> Self {
        Self {
            model,
            units,
            custom_properties,
        }
    }

    /// Expand every function call in `terms` into literal tokens.
    pub fn process(
        &self,
        element: &M::Element,
        terms: &[Token],
    ) -> Result<Vec<Token>, FunctionError> {
        let mut in_progress = HashSet::new();
        self.expand_terms(element, terms, &mut in_progress)
    }

    fn expand_terms(
        &self,
        element: &M::Element,
        terms: &[Token],
        guard: &mut HashSet<String>,
    ) -> Result<Vec<Token>, FunctionError> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < terms.len() {
            let token = &terms[i];
            if token.is_trivia() {
                i += 1;
                continue;
            }
            if token.kind != TokenKind::Function {
                out.push(token.clone());
                i += 1;
                continue;
            }
            let name = token.string.as_deref().unwrap_or("");
            if matches!(name, "attr" | "calc" | "var" | "concat" | "replace") {
                let (call, consumed) = parse_call(&terms[i..])?;
                out.extend(self.evaluate(element, &call, guard)?);
                i += consumed;
            } else {
                // Unknown function: pass the whole call through verbatim.
                let span = balanced_span(&terms[i..]);
                out.extend(terms[i..i + span].iter().cloned());
                i += span;
            }
        }
        Ok(out)
    }

    fn evaluate(
        &self,
        element: &M::Element,
        call: &FunctionCall,
        guard: &mut HashSet<String>,
    ) -> Result<Vec<Token>, FunctionError> {
        match call.name.as_str() {
            "attr" => self.eval_attr(element, call, guard).map(|t| vec![t]),
            "calc" => self.eval_calc(element, call, guard).map(|t| vec![t]),
            "var" => self.eval_var(element, call, guard),
            "concat" => self.eval_concat(element, call, guard).map(|t| vec![t]),
            "replace" => self.eval_replace(element, call, guard).map(|t| vec![t]),
            _ => unreachable!("dispatched only for recognized names"),
        }
    }

    // ── attr() ───────────────────────────────────────────────────────

    /// `attr(name [unit|length|number|%] [, fallback])`
    fn eval_attr(
        &self,
        element: &M::Element,
        call: &FunctionCall,
        guard: &mut HashSet<String>,
    ) -> Result<Token, FunctionError> {
        if call.arguments.is_empty() || call.arguments.len() > 2 {
            return Err(FunctionError::WrongArity {
                name: "attr",
                expected: 1,
                got: call.arguments.len(),
            });
        }
        let lead: Vec<&Token> = call.arguments[0].iter().filter(|t| !t.is_trivia()).collect();
        let name_token = lead.first().ok_or_else(|| FunctionError::MalformedCall {
            name: "attr".into(),
            reason: "missing attribute name".into(),
        })?;
        let name = name_token
            .string
            .clone()
            .unwrap_or_else(|| name_token.text.clone());
        if lead.len() > 2 {
            return Err(FunctionError::MalformedCall {
                name: "attr".into(),
                reason: "too many tokens before ','".into(),
            });
        }

        let raw = match self.model.attribute(element, &name) {
            Some(value) => value,
            None => {
                let fallback = call
                    .arguments
                    .get(1)
                    .ok_or(FunctionError::MissingAttribute(name))?;
                stringify(&self.expand_terms(element, fallback, guard)?)
            }
        };

        let Some(coercion) = lead.get(1) else {
            return Ok(Token::string(raw));
        };
        let quantity = parse_quantity(&raw).ok_or_else(|| FunctionError::InvalidNumber(raw.clone()))?;
        if coercion.is_delim('%') {
            return Ok(Token::percentage(quantity.0));
        }
        let coercion_name = coercion
            .string
            .clone()
            .unwrap_or_else(|| coercion.text.clone());
        match coercion_name.as_str() {
            "number" => Ok(Token::number(quantity.0)),
            "length" => match quantity.1 {
                Some(unit) => Ok(Token::dimension(quantity.0, unit)),
                None => Ok(Token::number(quantity.0)),
            },
            // A unit name: the attribute's own unit wins if it carries one.
            unit => Ok(Token::dimension(
                quantity.0,
                quantity.1.unwrap_or_else(|| unit.to_owned()),
            )),
        }
    }

    // ── calc() ───────────────────────────────────────────────────────

    fn eval_calc(
        &self,
        element: &M::Element,
        call: &FunctionCall,
        guard: &mut HashSet<String>,
    ) -> Result<Token, FunctionError> {
        if call.arguments.len() != 1 {
            return Err(FunctionError::WrongArity {
                name: "calc",
                expected: 1,
                got: call.arguments.len(),
            });
        }
        // Resolve nested attr()/var()/calc() into literals first, then run
        // the arithmetic grammar over the literal tokens.
        let expanded = self.expand_terms(element, &call.arguments[0], guard)?;
        let mut parser = CalcParser {
            units: self.units,
            tokens: &expanded,
            cursor: 0,
        };
        let result = parser.expression()?;
        if parser.cursor != parser.tokens.len() {
            return Err(FunctionError::MalformedCall {
                name: "calc".into(),
                reason: format!(
                    "expected operator, got '{}'",
                    parser.tokens[parser.cursor].text
                ),
            });
        }
        Ok(result.into_token())
    }

    // ── var() ────────────────────────────────────────────────────────

    /// `var(--name [, fallback])`
    fn eval_var(
        &self,
        element: &M::Element,
        call: &FunctionCall,
        guard: &mut HashSet<String>,
    ) -> Result<Vec<Token>, FunctionError> {
        if call.arguments.is_empty() || call.arguments.len() > 2 {
            return Err(FunctionError::WrongArity {
                name: "var",
                expected: 1,
                got: call.arguments.len(),
            });
        }
        let name_token = call.arguments[0]
            .iter()
            .find(|t| !t.is_trivia())
            .ok_or_else(|| FunctionError::MalformedCall {
                name: "var".into(),
                reason: "missing property name".into(),
            })?;
        let name = name_token
            .string
            .clone()
            .unwrap_or_else(|| name_token.text.clone());
        if !name.starts_with("--") {
            return Err(FunctionError::MalformedCall {
                name: "var".into(),
                reason: format!("'{name}' is not a custom property name"),
            });
        }

        match self.custom_properties.get(&name) {
            Some(raw) => {
                if !guard.insert(name.clone()) {
                    return Err(FunctionError::CyclicVariable(name));
                }
                let result = self.expand_terms(element, raw, guard);
                guard.remove(&name);
                result
            }
            None => match call.arguments.get(1) {
                Some(fallback) => self.expand_terms(element, fallback, guard),
                None => Err(FunctionError::MissingVariable(name)),
            },
        }
    }

    // ── concat() / replace() ─────────────────────────────────────────

    fn eval_concat(
        &self,
        element: &M::Element,
        call: &FunctionCall,
        guard: &mut HashSet<String>,
    ) -> Result<Token, FunctionError> {
        let mut out = String::new();
        for argument in &call.arguments {
            out.push_str(&stringify(&self.expand_terms(element, argument, guard)?));
        }
        Ok(Token::string(out))
    }

    /// `replace(input, pattern, replacement)` — global regex substitution.
    fn eval_replace(
        &self,
        element: &M::Element,
        call: &FunctionCall,
        guard: &mut HashSet<String>,
    ) -> Result<Token, FunctionError> {
        if call.arguments.len() != 3 {
            return Err(FunctionError::WrongArity {
                name: "replace",
                expected: 3,
                got: call.arguments.len(),
            });
        }
        let input = stringify(&self.expand_terms(element, &call.arguments[0], guard)?);
        let pattern = stringify(&self.expand_terms(element, &call.arguments[1], guard)?);
        let replacement = stringify(&self.expand_terms(element, &call.arguments[2], guard)?);
        let re = regex::Regex::new(&pattern)?;
        Ok(Token::string(
            re.replace_all(&input, replacement.as_str()).into_owned(),
        ))
    }
}

/// Split a call starting at a `Function` token into name plus comma-separated
/// argument token lists. Returns the call and the number of tokens consumed
/// (through the closing paren).
pub(crate) fn parse_call(terms: &[Token]) -> Result<(FunctionCall, usize), FunctionError> {
    let head = &terms[0];
    let name = head
        .string
        .clone()
        .unwrap_or_else(|| head.text.trim_end_matches('(').to_owned());

    let mut arguments: Vec<Vec<Token>> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut depth = 1usize;
    let mut i = 1;
    while i < terms.len() {
        let token = &terms[i];
        if token.kind == TokenKind::Function || token.is_delim('(') {
            depth += 1;
            current.push(token.clone());
        } else if token.is_delim(')') {
            depth -= 1;
            if depth == 0 {
                if !current.is_empty() || !arguments.is_empty() {
                    arguments.push(current);
                }
                return Ok((FunctionCall { name, arguments }, i + 1));
            }
            current.push(token.clone());
        } else if depth == 1 && token.is_delim(',') {
            arguments.push(std::mem::take(&mut current));
        } else if !token.is_trivia() {
            current.push(token.clone());
        }
        i += 1;
    }
    Err(FunctionError::MalformedCall {
        name,
        reason: "missing ')'".into(),
    })
}

/// Number of tokens from a `Function` token through its matching `)`, or to
/// the end of the slice if unbalanced.
fn balanced_span(terms: &[Token]) -> usize {
    let mut depth = 1usize;
    let mut i = 1;
    while i < terms.len() {
        let token = &terms[i];
        if token.kind == TokenKind::Function || token.is_delim('(') {
            depth += 1;
        } else if token.is_delim(')') {
            depth -= 1;
            if depth == 0 {
                return i + 1;
            }
        }
        i += 1;
    }
    terms.len()
}

/// Flatten a literal token list to text: strings, urls, and idents contribute
/// their decoded value, everything else its raw text.
pub(crate) fn stringify(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| match t.kind {
            TokenKind::String | TokenKind::Url | TokenKind::Ident => {
                t.string.clone().unwrap_or_else(|| t.text.clone())
            }
            _ => t.text.clone(),
        })
        .collect()
}

/// Parse attribute text as a single numeric quantity, returning the value and
/// the unit it carries (`Some("%")` for percentages).
fn parse_quantity(text: &str) -> Option<(f64, Option<String>)> {
    let tokens: Vec<Token> = tokenize(text.trim())
        .into_iter()
        .filter(|t| !t.is_trivia())
        .collect();
    let [token] = tokens.as_slice() else {
        return None;
    };
    match token.kind {
        TokenKind::Number => Some((token.value?, None)),
        TokenKind::Dimension => Some((token.value?, token.unit.clone())),
        TokenKind::Percentage => Some((token.value?, Some("%".to_owned()))),
        _ => None,
    }
}

/// A quantity inside a `calc()` expression. `unit` is `Some("%")` for
/// percentages and `None` for plain numbers.
#[derive(Debug, Clone, PartialEq)]
struct CalcValue {
    value: f64,
    unit: Option<String>,
}

impl CalcValue {
    fn plain(value: f64) -> Self {
        Self { value, unit: None }
    }

    fn into_token(self) -> Token {
        match self.unit {
            None => Token::number(self.value),
            Some(unit) if unit == "%" => Token::percentage(self.value),
            Some(unit) => Token::dimension(self.value, unit),
        }
    }
}

/// Precedence-climbing parser over an already-expanded literal token list.
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := factor (('*' | '/') factor)*
/// factor     := NUMBER | PERCENTAGE | DIMENSION | '(' expression ')'
///             | ('-' | '+') factor
/// ```
///
/// Note that `1+2` never reaches the `+` rule: the tokenizer folds the sign
/// into the second number, so the expression is two adjacent operands and
/// fails. `1 + 2` works.
struct CalcParser<'a, U: UnitConverter> {
    units: &'a U,
    tokens: &'a [Token],
    cursor: usize,
}

impl<U: UnitConverter> CalcParser<'_, U> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn malformed(&self, reason: impl Into<String>) -> FunctionError {
        FunctionError::MalformedCall {
            name: "calc".into(),
            reason: reason.into(),
        }
    }

    fn expression(&mut self) -> Result<CalcValue, FunctionError> {
        let mut left = self.term()?;
        loop {
            let subtract = match self.peek() {
                Some(t) if t.is_delim('+') => false,
                Some(t) if t.is_delim('-') => true,
                _ => break,
            };
            self.cursor += 1;
            let right = self.term()?;
            left = self.add(left, right, subtract)?;
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<CalcValue, FunctionError> {
        let mut left = self.factor()?;
        loop {
            let divide = match self.peek() {
                Some(t) if t.is_delim('*') => false,
                Some(t) if t.is_delim('/') => true,
                _ => break,
            };
            self.cursor += 1;
            let right = self.factor()?;
            left = if divide {
                self.divide(left, right)?
            } else {
                self.multiply(left, right)?
            };
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<CalcValue, FunctionError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.malformed("missing operand"));
        };
        match token.kind {
            TokenKind::Number => {
                self.cursor += 1;
                Ok(CalcValue::plain(value_of(&token)?))
            }
            TokenKind::Percentage => {
                self.cursor += 1;
                Ok(CalcValue {
                    value: value_of(&token)?,
                    unit: Some("%".to_owned()),
                })
            }
            TokenKind::Dimension => {
                self.cursor += 1;
                Ok(CalcValue {
                    value: value_of(&token)?,
                    unit: token.unit.clone(),
                })
            }
            _ if token.is_delim('(') => {
                self.cursor += 1;
                let inner = self.expression()?;
                match self.peek() {
                    Some(t) if t.is_delim(')') => {
                        self.cursor += 1;
                        Ok(inner)
                    }
                    _ => Err(self.malformed("missing ')'")),
                }
            }
            _ if token.is_delim('-') => {
                self.cursor += 1;
                let mut inner = self.factor()?;
                inner.value = -inner.value;
                Ok(inner)
            }
            _ if token.is_delim('+') => {
                self.cursor += 1;
                self.factor()
            }
            _ => Err(self.malformed(format!("unexpected '{}'", token.text))),
        }
    }

    /// `+` / `-`. Same units combine directly; a plain number adopts the
    /// other side's unit; a percentage mixed with a dimension pulls the
    /// dimension through its pixel factor and yields a percentage; two
    /// different dimensions convert right-into-left through the unit table.
    fn add(
        &self,
        left: CalcValue,
        right: CalcValue,
        subtract: bool,
    ) -> Result<CalcValue, FunctionError> {
        let combine = |l: f64, r: f64| if subtract { l - r } else { l + r };
        let (value, unit) = match (&left.unit, &right.unit) {
            (None, None) => (combine(left.value, right.value), None),
            (Some(u), None) | (None, Some(u)) => (combine(left.value, right.value), Some(u.clone())),
            (Some(a), Some(b)) if a == b => (combine(left.value, right.value), Some(a.clone())),
            (Some(a), Some(b)) if a == "%" || b == "%" => {
                let l = self.percent_space(&left)?;
                let r = self.percent_space(&right)?;
                (combine(l, r), Some("%".to_owned()))
            }
            (Some(a), Some(b)) => {
                let converted = self.units.convert(right.value, b, a).ok_or_else(|| {
                    FunctionError::IncompatibleUnits {
                        left: a.clone(),
                        right: b.clone(),
                    }
                })?;
                (combine(left.value, converted), Some(a.clone()))
            }
        };
        Ok(CalcValue { value, unit })
    }

    /// A value's magnitude in percentage points: percentages count as-is,
    /// dimensions through their pixel factor.
    fn percent_space(&self, v: &CalcValue) -> Result<f64, FunctionError> {
        match v.unit.as_deref() {
            Some("%") | None => Ok(v.value),
            Some(unit) => self
                .units
                .pixels_per_unit(unit)
                .map(|factor| v.value * factor)
                .ok_or_else(|| FunctionError::IncompatibleUnits {
                    left: "%".to_owned(),
                    right: unit.to_owned(),
                }),
        }
    }

    fn multiply(&self, left: CalcValue, right: CalcValue) -> Result<CalcValue, FunctionError> {
        let unit = match (&left.unit, &right.unit) {
            (None, None) => None,
            (Some(u), None) | (None, Some(u)) => Some(u.clone()),
            (Some(a), Some(b)) if a == b => Some(a.clone()),
            (Some(a), Some(b)) => {
                return Err(FunctionError::IncompatibleUnits {
                    left: a.clone(),
                    right: b.clone(),
                })
            }
        };
        Ok(CalcValue {
            value: left.value * right.value,
            unit,
        })
    }

    fn divide(&self, left: CalcValue, right: CalcValue) -> Result<CalcValue, FunctionError> {
        if right.value == 0.0 {
            return Err(FunctionError::DivisionByZero);
        }
        let unit = match (&left.unit, &right.unit) {
            // Same units cancel into a plain ratio.
            (Some(a), Some(b)) if a == b => None,
            (Some(u), None) => Some(u.clone()),
            (None, _) => None,
            (Some(a), Some(b)) => {
                let converted = self.units.convert(right.value, b, a).ok_or_else(|| {
                    FunctionError::IncompatibleUnits {
                        left: a.clone(),
                        right: b.clone(),
                    }
                })?;
                if converted == 0.0 {
                    return Err(FunctionError::DivisionByZero);
                }
                return Ok(CalcValue::plain(left.value / converted));
            }
        };
        Ok(CalcValue {
            value: left.value / right.value,
            unit,
        })
    }
}

fn value_of(token: &Token) -> Result<f64, FunctionError> {
    token
        .value
        .ok_or_else(|| FunctionError::InvalidNumber(token.text.clone()))
}
