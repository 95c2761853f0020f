//! Recursive descent stylesheet parser with error recovery.
//!
//! [`parse`] always returns a best-effort [`Stylesheet`] plus the list of
//! syntax errors encountered. A malformed rule or declaration is skipped up
//! to the next recovery point (`;` or the enclosing `}`) and parsing resumes;
//! one bad rule never aborts the rest of the sheet.

use crate::ast::{
    AtRule, AttributeOp, AttributePredicate, Combinator, Declaration, PseudoClass, Qualifier, Rule,
    Selector, SelectorGroup, SimpleSelectorSequence, StyleRule, Stylesheet, TypeSelector,
};
use crate::scanner;
use crate::tokenizer::{tokenize, Token, TokenKind};

/// A recoverable parse error: human-readable message plus the byte offset in
/// the normalized source where the parser gave up on the construct.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (offset {offset})")]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

/// Outcome of a parse: the AST that could be built, and everything that went
/// wrong along the way.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub stylesheet: Stylesheet,
    pub errors: Vec<SyntaxError>,
}

impl ParseResult {
    /// `true` if the whole input parsed without recovery.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a stylesheet. Newlines are normalized first; comments, CDO/CDC, and
/// whitespace are handled by the parser, so no stripping pre-pass is needed.
pub fn parse(input: &str) -> ParseResult {
    let normalized = scanner::normalize(input);
    Parser::new(tokenize(&normalized)).run()
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    errors: Vec<SyntaxError>,
    eof: Token,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        let end = tokens.last().map(|t| t.offset + t.text.len()).unwrap_or(0);
        let eof = Token::eof(end);
        Self {
            tokens,
            cursor: 0,
            errors: Vec::new(),
            eof,
        }
    }

    fn run(mut self) -> ParseResult {
        let mut rules = Vec::new();
        loop {
            self.skip_trivia();
            if self.at_eof() {
                break;
            }
            let result = if self.peek().kind == TokenKind::AtKeyword {
                self.parse_at_rule().map(Rule::At)
            } else {
                self.parse_style_rule().map(Rule::Style)
            };
            match result {
                Ok(rule) => rules.push(rule),
                Err(err) => {
                    log::warn!("stylesheet parse: {err}, skipping to next rule");
                    self.errors.push(err);
                    self.recover_rule();
                }
            }
        }
        ParseResult {
            stylesheet: Stylesheet { rules },
            errors: self.errors,
        }
    }

    // ── Token plumbing ───────────────────────────────────────────────

    fn at_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.cursor).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.at_eof() {
            self.cursor += 1;
        }
        token
    }

    /// Skip whitespace, comments, and CDO/CDC. Returns `true` if anything was
    /// skipped — the selector parser uses this to detect the descendant
    /// combinator.
    fn skip_trivia(&mut self) -> bool {
        let start = self.cursor;
        while matches!(
            self.peek().kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::Cdo | TokenKind::Cdc
        ) {
            self.cursor += 1;
        }
        self.cursor > start
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            offset: self.peek().offset,
        }
    }

    fn expect_delim(&mut self, c: char) -> Result<(), SyntaxError> {
        if self.peek().is_delim(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}', got '{}'", self.peek().text)))
        }
    }

    // ── Recovery ─────────────────────────────────────────────────────

    /// Skip to the end of the current rule: past a `;` at brace depth zero or
    /// past the closing `}` of the next block.
    fn recover_rule(&mut self) {
        let mut depth = 0usize;
        loop {
            let token = self.peek().clone();
            if token.kind == TokenKind::Eof {
                return;
            }
            if token.is_delim('{') {
                depth += 1;
            } else if token.is_delim('}') {
                self.advance();
                if depth <= 1 {
                    return;
                }
                depth -= 1;
                continue;
            } else if token.is_delim(';') && depth == 0 {
                self.advance();
                return;
            }
            self.advance();
        }
    }

    /// Skip the rest of a bad declaration: past the next `;`, or up to (not
    /// past) the `}` that closes the enclosing block.
    fn recover_declaration(&mut self) {
        let mut depth = 0usize;
        loop {
            let token = self.peek().clone();
            if token.kind == TokenKind::Eof {
                return;
            }
            if token.kind == TokenKind::Function
                || token.is_delim('(')
                || token.is_delim('[')
                || token.is_delim('{')
            {
                depth += 1;
            } else if token.is_delim(')') || token.is_delim(']') {
                depth = depth.saturating_sub(1);
            } else if token.is_delim('}') {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            } else if token.is_delim(';') && depth == 0 {
                self.advance();
                return;
            }
            self.advance();
        }
    }

    // ── At-rules ─────────────────────────────────────────────────────

    /// Consume `@name prelude (";" | "{" ... "}")` without interpreting it.
    fn parse_at_rule(&mut self) -> Result<AtRule, SyntaxError> {
        let keyword = self.advance();
        let name = keyword.string.unwrap_or(keyword.text);
        let mut prelude = Vec::new();
        loop {
            self.skip_trivia();
            let token = self.peek().clone();
            if token.kind == TokenKind::Eof || token.is_delim(';') {
                self.advance();
                return Ok(AtRule {
                    name,
                    prelude,
                    block: None,
                });
            }
            if token.is_delim('{') {
                self.advance();
                let block = self.consume_block();
                return Ok(AtRule {
                    name,
                    prelude,
                    block: Some(block),
                });
            }
            prelude.push(self.advance());
        }
    }

    /// Consume tokens up to the `}` matching an already-consumed `{`.
    /// EOF closes the block silently.
    fn consume_block(&mut self) -> Vec<Token> {
        let mut out = Vec::new();
        let mut depth = 1usize;
        loop {
            let token = self.peek().clone();
            if token.kind == TokenKind::Eof {
                return out;
            }
            if token.is_delim('{') {
                depth += 1;
            } else if token.is_delim('}') {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    return out;
                }
            }
            if !token.is_trivia() {
                out.push(token);
            }
            self.advance();
        }
    }

    // ── Style rules ──────────────────────────────────────────────────

    fn parse_style_rule(&mut self) -> Result<StyleRule, SyntaxError> {
        let selectors = self.parse_selector_group()?;
        self.skip_trivia();
        self.expect_delim('{')
            .map_err(|_| self.error("expected '{' after selector"))?;
        let declarations = self.parse_declarations();
        if self.peek().is_delim('}') {
            self.advance();
        } else {
            // EOF inside the block: keep what we have, note the damage.
            let err = self.error("unclosed rule block");
            log::warn!("stylesheet parse: {err}");
            self.errors.push(err);
        }
        Ok(StyleRule {
            selectors,
            declarations,
        })
    }

    fn parse_selector_group(&mut self) -> Result<SelectorGroup, SyntaxError> {
        let mut alternatives = vec![self.parse_selector()?];
        loop {
            self.skip_trivia();
            if !self.peek().is_delim(',') {
                break;
            }
            self.advance();
            self.skip_trivia();
            alternatives.push(self.parse_selector()?);
        }
        Ok(SelectorGroup { alternatives })
    }

    fn parse_selector(&mut self) -> Result<Selector, SyntaxError> {
        let mut sequences = vec![self.parse_sequence()?];
        let mut combinators = Vec::new();
        loop {
            let saw_whitespace = self.skip_trivia();
            let token = self.peek().clone();

            let combinator = if token.is_delim('>') {
                Some(Combinator::Child)
            } else if token.is_delim('+') {
                Some(Combinator::AdjacentSibling)
            } else if token.is_delim('~') {
                Some(Combinator::GeneralSibling)
            } else if saw_whitespace && starts_sequence(&token) {
                // Whitespace between two sequences is the descendant
                // combinator; parse the next sequence without consuming.
                combinators.push(Combinator::Descendant);
                sequences.push(self.parse_sequence()?);
                continue;
            } else {
                None
            };

            match combinator {
                Some(c) => {
                    self.advance();
                    self.skip_trivia();
                    combinators.push(c);
                    sequences.push(self.parse_sequence()?);
                }
                None => break,
            }
        }
        Ok(Selector {
            sequences,
            combinators,
        })
    }

    /// Parse one simple selector sequence, e.g. `button.primary:hover`.
    /// Qualifiers bind only while no whitespace intervenes.
    fn parse_sequence(&mut self) -> Result<SimpleSelectorSequence, SyntaxError> {
        let mut sequence = SimpleSelectorSequence::default();

        let first = self.peek().clone();
        if first.kind == TokenKind::Ident {
            self.advance();
            sequence.type_selector = Some(TypeSelector::Named(first.string.unwrap_or(first.text)));
        } else if first.is_delim('*') {
            self.advance();
            sequence.type_selector = Some(TypeSelector::Universal);
        }

        loop {
            let token = self.peek().clone();
            if token.kind == TokenKind::Hash {
                self.advance();
                sequence
                    .qualifiers
                    .push(Qualifier::Id(token.string.unwrap_or(token.text)));
            } else if token.is_delim('.') {
                self.advance();
                let name = self.peek().clone();
                if name.kind != TokenKind::Ident {
                    return Err(self.error("expected class name after '.'"));
                }
                self.advance();
                sequence
                    .qualifiers
                    .push(Qualifier::Class(name.string.unwrap_or(name.text)));
            } else if token.is_delim(':') {
                self.advance();
                sequence
                    .qualifiers
                    .push(Qualifier::PseudoClass(self.parse_pseudo_class()?));
            } else if token.is_delim('[') {
                self.advance();
                sequence
                    .qualifiers
                    .push(Qualifier::Attribute(self.parse_attribute_predicate()?));
            } else {
                break;
            }
        }

        if sequence.type_selector.is_none() && sequence.qualifiers.is_empty() {
            return Err(self.error(format!(
                "expected selector, got '{}'",
                self.peek().text
            )));
        }
        Ok(sequence)
    }

    fn parse_pseudo_class(&mut self) -> Result<PseudoClass, SyntaxError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident => {
                self.advance();
                Ok(PseudoClass {
                    name: token.string.unwrap_or(token.text),
                    arguments: Vec::new(),
                })
            }
            TokenKind::Function => {
                self.advance();
                let name = token.string.unwrap_or(token.text);
                let mut arguments = Vec::new();
                let mut depth = 1usize;
                loop {
                    let t = self.peek().clone();
                    if t.kind == TokenKind::Eof {
                        return Err(self.error(format!("unterminated ':{name}(' arguments")));
                    }
                    if t.kind == TokenKind::Function || t.is_delim('(') {
                        depth += 1;
                    } else if t.is_delim(')') {
                        depth -= 1;
                        if depth == 0 {
                            self.advance();
                            break;
                        }
                    }
                    if !t.is_trivia() {
                        arguments.push(t);
                    }
                    self.advance();
                }
                Ok(PseudoClass { name, arguments })
            }
            _ => Err(self.error("expected pseudo-class name after ':'")),
        }
    }

    fn parse_attribute_predicate(&mut self) -> Result<AttributePredicate, SyntaxError> {
        self.skip_trivia();
        let name_token = self.peek().clone();
        if name_token.kind != TokenKind::Ident {
            return Err(self.error("expected attribute name after '['"));
        }
        self.advance();
        let name = name_token.string.unwrap_or(name_token.text);

        self.skip_trivia();
        let op = if self.peek().is_delim(']') {
            AttributeOp::Present
        } else if self.peek().is_delim('=') {
            self.advance();
            AttributeOp::Equals
        } else if self.peek().is_delim('~') {
            self.advance();
            self.expect_delim('=')?;
            AttributeOp::ContainsWord
        } else if self.peek().is_delim('|') {
            self.advance();
            self.expect_delim('=')?;
            AttributeOp::DashMatch
        } else if self.peek().is_delim('^') {
            self.advance();
            self.expect_delim('=')?;
            AttributeOp::StartsWith
        } else if self.peek().is_delim('$') {
            self.advance();
            self.expect_delim('=')?;
            AttributeOp::EndsWith
        } else {
            return Err(self.error(format!(
                "expected attribute operator or ']', got '{}'",
                self.peek().text
            )));
        };

        let value = if op == AttributeOp::Present {
            None
        } else {
            self.skip_trivia();
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Ident | TokenKind::String => {
                    self.advance();
                    Some(token.string.unwrap_or(token.text))
                }
                TokenKind::Number => {
                    self.advance();
                    Some(token.text)
                }
                _ => return Err(self.error("expected attribute value")),
            }
        };

        self.skip_trivia();
        self.expect_delim(']')?;
        Ok(AttributePredicate { name, op, value })
    }

    // ── Declarations ─────────────────────────────────────────────────

    fn parse_declarations(&mut self) -> Vec<Declaration> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia();
            let token = self.peek();
            if token.kind == TokenKind::Eof || token.is_delim('}') {
                break;
            }
            if token.is_delim(';') {
                self.advance();
                continue;
            }
            match self.parse_declaration() {
                Ok(declaration) => out.push(declaration),
                Err(err) => {
                    log::warn!("stylesheet parse: {err}, skipping declaration");
                    self.errors.push(err);
                    self.recover_declaration();
                }
            }
        }
        out
    }

    fn parse_declaration(&mut self) -> Result<Declaration, SyntaxError> {
        let property_token = self.peek().clone();
        if property_token.kind != TokenKind::Ident {
            return Err(self.error(format!(
                "expected property name, got '{}'",
                property_token.text
            )));
        }
        self.advance();
        let property = property_token.string.unwrap_or(property_token.text);

        self.skip_trivia();
        if !self.peek().is_delim(':') {
            return Err(self.error(format!("expected ':' after property '{property}'")));
        }
        self.advance();

        let mut terms = Vec::new();
        let mut depth = 0usize;
        loop {
            self.skip_trivia();
            let token = self.peek().clone();
            if token.kind == TokenKind::Eof {
                break;
            }
            if depth == 0 && (token.is_delim(';') || token.is_delim('}')) {
                break;
            }
            if token.kind == TokenKind::Function || token.is_delim('(') {
                depth += 1;
            } else if token.is_delim(')') {
                depth = depth.saturating_sub(1);
            }
            terms.push(self.advance());
        }
        if self.peek().is_delim(';') {
            self.advance();
        }

        Ok(Declaration {
            property,
            terms,
            offset: property_token.offset,
        })
    }
}

fn starts_sequence(token: &Token) -> bool {
    token.kind == TokenKind::Ident
        || token.kind == TokenKind::Hash
        || token.is_delim('*')
        || token.is_delim('.')
        || token.is_delim(':')
        || token.is_delim('[')
}
