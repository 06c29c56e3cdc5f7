//! Grammar (C4): recognizes one preprocessed card and builds its `Node`.
//!
//! A hand-written recursive-descent parser over the [`crate::lexer`] token
//! stream, with expressions parsed by a Pratt-style precedence climber (one
//! precedence table: `||` loosest, then `&&`, equality, relational,
//! additive, multiplicative, `**` tightest) rather than the flat
//! left-to-right fold of the tool this grammar derives from.

use crate::ast::Node;
use crate::diagnostics::DiagnosticSink;
use crate::error::{NetlateError, Result};
use crate::lexer::{self, Tok, Token};

fn parse_err(card_kind: &'static str, detail: impl Into<String>) -> NetlateError {
    NetlateError::Parse { card_kind, detail: detail.into() }
}

fn strip_quotes(text: &str) -> String {
    text.trim_matches('"').to_string()
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token<'a>>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek_kind(&self, n: usize) -> Option<Tok> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn peek_text(&self, n: usize) -> Option<&'a str> {
        self.tokens.get(self.pos + n).map(|t| t.text)
    }

    fn at(&self, kind: Tok) -> bool {
        self.peek_kind(0) == Some(kind)
    }

    fn peek_next_is_eq(&self) -> bool {
        self.peek_kind(1) == Some(Tok::Eq)
    }

    fn bump(&mut self) -> Token<'a> {
        let tok = self.tokens[self.pos];
        self.pos += 1;
        tok
    }

    fn expect(&mut self, kind: Tok, card_kind: &'static str) -> Result<Token<'a>> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(parse_err(
                card_kind,
                format!("expected {kind:?}, found {:?}", self.peek_kind(0)),
            ))
        }
    }

    fn expect_ident(&mut self, card_kind: &'static str) -> Result<Token<'a>> {
        self.expect(Tok::Ident, card_kind)
    }

    fn expect_keyword(&mut self, keyword: &str, card_kind: &'static str) -> Result<()> {
        if self.at(Tok::Ident) && self.peek_text(0) == Some(keyword) {
            self.bump();
            Ok(())
        } else {
            Err(parse_err(
                card_kind,
                format!("expected keyword '{keyword}', found {:?}", self.peek_text(0)),
            ))
        }
    }
}

// ---------------------------------------------------------------- literals

impl<'a> Parser<'a> {
    fn parse_primary(&mut self) -> Result<Node> {
        match self.peek_kind(0) {
            Some(Tok::LParen) => {
                self.bump();
                let inner = self.parse_case_or_expr()?;
                self.expect(Tok::RParen, "primary")?;
                Ok(Node::Group(Box::new(inner)))
            }
            Some(Tok::Minus) => {
                self.bump();
                let operand = self.parse_primary()?;
                Ok(Node::UnaryOp { op: "-".to_string(), operand: Box::new(operand) })
            }
            Some(Tok::Ident) => {
                let tok = self.bump();
                if self.at(Tok::LParen) {
                    self.bump();
                    let mut args = vec![self.parse_case_or_expr()?];
                    while self.at(Tok::Comma) {
                        self.bump();
                        args.push(self.parse_case_or_expr()?);
                    }
                    self.expect(Tok::RParen, "call")?;
                    Ok(Node::Call { name: tok.text.to_string(), args })
                } else {
                    Ok(Node::Variable(tok.text.to_string()))
                }
            }
            Some(Tok::Integer | Tok::Real | Tok::Scientific | Tok::UnitPostfix) => {
                let tok = self.bump();
                Ok(Node::Number(tok.text.to_string()))
            }
            Some(Tok::String) => {
                let tok = self.bump();
                Ok(Node::StringLit(strip_quotes(tok.text)))
            }
            other => Err(parse_err("primary", format!("unexpected token {other:?}"))),
        }
    }
}

macro_rules! left_assoc_level {
    ($name:ident, $next:ident, [$($tok:pat => $op:literal),+ $(,)?]) => {
        impl<'a> Parser<'a> {
            fn $name(&mut self) -> Result<Node> {
                let mut node = self.$next()?;
                loop {
                    let op = match self.peek_kind(0) {
                        $(Some($tok) => $op,)+
                        _ => break,
                    };
                    self.bump();
                    let right = self.$next()?;
                    node = Node::BinOp { op: op.to_string(), left: Box::new(node), right: Box::new(right) };
                }
                Ok(node)
            }
        }
    };
}

left_assoc_level!(parse_or, parse_and, [Tok::PipePipe => "||"]);
left_assoc_level!(parse_and, parse_equality, [Tok::AmpAmp => "&&"]);
left_assoc_level!(parse_equality, parse_relational, [Tok::EqEq => "==", Tok::BangEq => "!="]);
left_assoc_level!(parse_relational, parse_additive, [
    Tok::LtEq => "<=", Tok::GtEq => ">=", Tok::Lt => "<", Tok::Gt => ">",
]);
left_assoc_level!(parse_additive, parse_multiplicative, [Tok::Plus => "+", Tok::Minus => "-"]);
left_assoc_level!(parse_multiplicative, parse_power, [Tok::Star => "*", Tok::Slash => "/"]);

impl<'a> Parser<'a> {
    /// `**` binds tightest and is right-associative.
    fn parse_power(&mut self) -> Result<Node> {
        let base = self.parse_primary()?;
        if self.at(Tok::StarStar) {
            self.bump();
            let exponent = self.parse_power()?;
            Ok(Node::BinOp { op: "**".to_string(), left: Box::new(base), right: Box::new(exponent) })
        } else {
            Ok(base)
        }
    }

    fn parse_expression(&mut self) -> Result<Node> {
        self.parse_or()
    }

    /// `case ^ expression`: an expression optionally followed by a ternary.
    fn parse_case_or_expr(&mut self) -> Result<Node> {
        let cond = self.parse_expression()?;
        if self.at(Tok::Question) {
            self.bump();
            let then_branch = self.parse_case_or_expr()?;
            self.expect(Tok::Colon, "case")?;
            let else_branch = self.parse_case_or_expr()?;
            Ok(Node::Ternary {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            })
        } else {
            Ok(cond)
        }
    }
}

// --------------------------------------------------------------- equation

impl<'a> Parser<'a> {
    /// `[parameters] expression '=' (case | expression | tuple | string)`.
    /// The leading `parameters` keyword, when present, is consumed by the
    /// caller before this is invoked.
    fn parse_equation(&mut self) -> Result<Node> {
        let left = self.parse_expression()?;
        self.expect(Tok::Eq, "equation")?;
        let right = if self.at(Tok::LBracket) {
            self.parse_tuple()?
        } else if self.at(Tok::String) {
            let tok = self.bump();
            Node::StringLit(strip_quotes(tok.text))
        } else {
            self.parse_case_or_expr()?
        };
        Ok(Node::Assign { left: Box::new(left), right: Box::new(right) })
    }

    /// `[` variable variable+ `]`.
    fn parse_tuple(&mut self) -> Result<Node> {
        self.expect(Tok::LBracket, "tuple")?;
        let mut elements = Vec::new();
        while self.at(Tok::Ident) {
            let tok = self.bump();
            elements.push(Node::Variable(tok.text.to_string()));
        }
        self.expect(Tok::RBracket, "tuple")?;
        if elements.len() < 2 {
            return Err(parse_err("tuple", "tuple must have at least two elements"));
        }
        Ok(Node::Tuple(elements))
    }

    /// `real variable '(' (real variable ','?)+ ')' '{' return (case|expression) [';'] '}'`.
    fn parse_func_def(&mut self) -> Result<Node> {
        self.expect_keyword("real", "function-def")?;
        let name = self.expect_ident("function-def")?.text.to_string();
        self.expect(Tok::LParen, "function-def")?;
        let mut params = Vec::new();
        loop {
            self.expect_keyword("real", "function-def")?;
            params.push(self.expect_ident("function-def")?.text.to_string());
            if self.at(Tok::Comma) {
                self.bump();
            }
            if self.at(Tok::RParen) {
                break;
            }
        }
        self.expect(Tok::RParen, "function-def")?;
        self.expect(Tok::LBrace, "function-def")?;
        self.expect_keyword("return", "function-def")?;
        let body = self.parse_case_or_expr()?;
        if self.at(Tok::Semicolon) {
            self.bump();
        }
        self.expect(Tok::RBrace, "function-def")?;
        Ok(Node::FuncDef { name, params, body: Box::new(body) })
    }

    /// `simulator <ident> '=' <ident>`; only the final identifier (the
    /// dialect tag) is kept.
    fn parse_lang_directive(&mut self) -> Result<Node> {
        self.expect_keyword("simulator", "lang-directive")?;
        self.expect_ident("lang-directive")?;
        self.expect(Tok::Eq, "lang-directive")?;
        let dialect = self.expect_ident("lang-directive")?.text.to_string();
        Ok(Node::LangDirective { dialect })
    }

    /// `('include'|'ahdl_include') '"' path basename '.' ext '"'`. The
    /// quoted path is a single lexer token; splitting it is plain text work.
    fn parse_include(&mut self) -> Result<Node> {
        let kind = self.expect_ident("include")?.text.to_string();
        let quoted = self.expect(Tok::String, "include")?.text;
        let inner = strip_quotes(quoted);
        let (path_prefix, filename) = match inner.rfind('/') {
            Some(idx) => (inner[..=idx].to_string(), inner[idx + 1..].to_string()),
            None => (String::new(), inner.clone()),
        };
        let (basename, extension) = match filename.rfind('.') {
            Some(idx) => (filename[..idx].to_string(), filename[idx + 1..].to_string()),
            None => return Err(parse_err("include", format!("missing extension in '{inner}'"))),
        };
        Ok(Node::Include { kind, path_prefix, basename, extension })
    }

    /// `['inline'] 'subckt' name (variable)+`, ports optionally parenthesized.
    fn parse_subckt_header(&mut self) -> Result<Node> {
        let inline = if self.at(Tok::Ident) && self.peek_text(0) == Some("inline") {
            self.bump();
            true
        } else {
            false
        };
        self.expect_keyword("subckt", "subckt-header")?;
        let name = self.expect_ident("subckt-header")?.text.to_string();
        let mut ports = Vec::new();
        while !self.at_end() {
            match self.peek_kind(0) {
                Some(Tok::LParen) | Some(Tok::RParen) => {
                    self.bump();
                }
                Some(Tok::Ident) => {
                    ports.push(self.bump().text.to_string());
                }
                _ => break,
            }
        }
        if ports.is_empty() {
            return Err(parse_err("subckt-header", "subckt has no ports"));
        }
        Ok(Node::SubcktHeader { inline, name, ports })
    }

    /// `ends variable`.
    fn parse_ends(&mut self) -> Result<Node> {
        self.expect_keyword("ends", "ends")?;
        let name = self.expect_ident("ends")?.text.to_string();
        Ok(Node::SubcktEnd { name })
    }

    /// `model variable variable equation+`.
    fn parse_model(&mut self) -> Result<Node> {
        self.expect_keyword("model", "model")?;
        let name = self.expect_ident("model")?.text.to_string();
        let base_type = self.expect_ident("model")?.text.to_string();
        let mut params = Vec::new();
        while self.at(Tok::Ident) && self.peek_next_is_eq() {
            params.push(self.parse_equation()?);
        }
        if params.is_empty() {
            return Err(parse_err("model", "model has no parameters"));
        }
        Ok(Node::Model { name, base_type, params })
    }

    /// `variable (variable)* (equation)+`, port/type classified per §4.4:
    /// every bare variable before the first equation is a port, except the
    /// last one, which is the instance type.
    fn parse_instance(&mut self) -> Result<Node> {
        let designator = self.expect_ident("instance")?.text.to_string();
        let mut vars = Vec::new();
        loop {
            match self.peek_kind(0) {
                Some(Tok::LParen) | Some(Tok::RParen) => {
                    self.bump();
                }
                Some(Tok::Ident) if !self.peek_next_is_eq() => {
                    vars.push(self.bump().text.to_string());
                }
                _ => break,
            }
        }
        if vars.is_empty() {
            return Err(parse_err("instance", "missing port/type list"));
        }
        let source_type = vars.pop().expect("non-empty vars");
        let ports = vars;

        let mut params = Vec::new();
        while self.at(Tok::Ident) && self.peek_next_is_eq() {
            params.push(self.parse_equation()?);
        }
        Ok(Node::Instance { designator, ports, source_type, params })
    }

    /// `variable 'assert' equation+`.
    fn parse_assertion(&mut self) -> Result<Node> {
        let label = self.expect_ident("assertion")?.text.to_string();
        self.expect_keyword("assert", "assertion")?;
        let mut params = Vec::new();
        while self.at(Tok::Ident) && self.peek_next_is_eq() {
            params.push(self.parse_equation()?);
        }
        if params.is_empty() {
            return Err(parse_err("assertion", "assertion has no parameters"));
        }
        Ok(Node::Assertion { label, params })
    }

    /// `if '(' expression ')' '{' (assertion | instance)+ '}'`. Statement
    /// boundaries inside the braces are not delimited by punctuation, so
    /// each iteration looks one token ahead for the `assert` keyword to
    /// decide which production to try; the instance/assertion productions
    /// themselves stop consuming equations as soon as a bare designator
    /// (an identifier not followed by `=`) appears, which is exactly the
    /// start of the next statement.
    fn parse_conditional(&mut self) -> Result<Node> {
        self.expect_keyword("if", "conditional")?;
        self.expect(Tok::LParen, "conditional")?;
        let cond = self.parse_expression()?;
        self.expect(Tok::RParen, "conditional")?;
        self.expect(Tok::LBrace, "conditional")?;
        let mut body = Vec::new();
        while !self.at(Tok::RBrace) {
            if self.at_end() {
                return Err(parse_err("conditional", "unterminated '{'"));
            }
            if self.peek_kind(1) == Some(Tok::Ident) && self.peek_text(1) == Some("assert") {
                body.push(self.parse_assertion()?);
            } else {
                body.push(self.parse_instance()?);
            }
        }
        self.expect(Tok::RBrace, "conditional")?;
        Ok(Node::Conditional { cond: Box::new(cond), body })
    }
}

/// Classify one preprocessed card by its leading keyword and parse it,
/// mirroring the driver+grammar split described in §4.4. Returns `None`
/// for lines in the unsupported-keyword skip set (after warning) or blank
/// lines; returns `Err(UnknownCard)` when no production accepts the line.
pub fn classify_and_parse(line: &str, sink: &DiagnosticSink) -> Result<Option<Node>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let first_word = trimmed.split_whitespace().next().unwrap_or("");
    if matches!(first_word, "statistics" | "process" | "vary" | "mismatch") {
        sink.warn(&format!("unsupported card: {trimmed}"));
        return Ok(None);
    }

    let tokens = lexer::tokenize(trimmed);
    let mut p = Parser::new(tokens);

    let node = if first_word == "parameters" {
        p.expect_keyword("parameters", "equation")?;
        p.parse_equation()?
    } else if first_word == "real" {
        p.parse_func_def()?
    } else if first_word == "simulator" {
        p.parse_lang_directive()?
    } else if first_word == "include" || first_word == "ahdl_include" {
        p.parse_include()?
    } else if first_word == "inline" || first_word == "subckt" {
        p.parse_subckt_header()?
    } else if first_word == "ends" {
        p.parse_ends()?
    } else if first_word == "model" {
        p.parse_model()?
    } else if first_word == "if" {
        p.parse_conditional()?
    } else {
        p.parse_instance()
            .map_err(|_| NetlateError::UnknownCard { card: trimmed.to_string() })?
    };
    Ok(Some(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> Node {
        let sink = DiagnosticSink::new();
        classify_and_parse(line, &sink).unwrap().unwrap()
    }

    #[test]
    fn power_binds_tighter_than_additive() {
        let sink = DiagnosticSink::new();
        let mut p = Parser::new(lexer::tokenize("a + b ** 2"));
        let node = p.parse_expression().unwrap();
        // a + (b ** 2)
        match node {
            Node::BinOp { op, right, .. } => {
                assert_eq!(op, "+");
                assert!(matches!(*right, Node::BinOp { op, .. } if op == "**"));
            }
            other => panic!("expected BinOp, got {other:?}"),
        }
        let _ = sink;
    }

    #[test]
    fn instance_disambiguates_ports_from_type() {
        let node = parse_one("R1 net1 net2 resistor r=5k");
        match node {
            Node::Instance { designator, ports, source_type, params } => {
                assert_eq!(designator, "R1");
                assert_eq!(ports, vec!["net1".to_string(), "net2".to_string()]);
                assert_eq!(source_type, "resistor");
                assert_eq!(params.len(), 1);
            }
            other => panic!("expected Instance, got {other:?}"),
        }
    }

    #[test]
    fn mosfet_instance_keeps_four_ports() {
        let node = parse_one("M1 d g s b nch_25 w=5u l=0.25u");
        match node {
            Node::Instance { ports, source_type, params, .. } => {
                assert_eq!(ports.len(), 4);
                assert_eq!(source_type, "nch_25");
                assert_eq!(params.len(), 2);
            }
            other => panic!("expected Instance, got {other:?}"),
        }
    }

    #[test]
    fn parameters_card_parses_as_assign() {
        let node = parse_one("parameters vth = 0.7");
        assert!(matches!(node, Node::Assign { .. }));
    }

    #[test]
    fn model_card_parses_parameter_list() {
        let node = parse_one("model nch_25 bsim4 lmin=1u lmax=10u");
        match node {
            Node::Model { name, base_type, params } => {
                assert_eq!(name, "nch_25");
                assert_eq!(base_type, "bsim4");
                assert_eq!(params.len(), 2);
            }
            other => panic!("expected Model, got {other:?}"),
        }
    }

    #[test]
    fn ahdl_include_splits_path_basename_extension() {
        let node = parse_one(r#"ahdl_include "./ahdl/foo.va""#);
        match node {
            Node::Include { kind, path_prefix, basename, extension } => {
                assert_eq!(kind, "ahdl_include");
                assert_eq!(path_prefix, "./ahdl/");
                assert_eq!(basename, "foo");
                assert_eq!(extension, "va");
            }
            other => panic!("expected Include, got {other:?}"),
        }
    }

    #[test]
    fn voltage_call_parses_as_call_node() {
        let node = parse_one("parameters vout = v(a,b) + 1");
        match node {
            Node::Assign { right, .. } => {
                assert!(matches!(*right, Node::BinOp { .. }));
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn unclassifiable_line_is_unknown_card() {
        let sink = DiagnosticSink::new();
        let err = classify_and_parse("!!! not a card", &sink).unwrap_err();
        assert!(matches!(err, NetlateError::UnknownCard { .. }));
    }

    #[test]
    fn unsupported_keyword_is_skipped_with_warning() {
        let sink = DiagnosticSink::new();
        let result = classify_and_parse("statistics foo bar", &sink).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn subckt_header_collects_ports_without_parens() {
        let node = parse_one("subckt inv a b c");
        match node {
            Node::SubcktHeader { inline, name, ports } => {
                assert!(!inline);
                assert_eq!(name, "inv");
                assert_eq!(ports, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
            }
            other => panic!("expected SubcktHeader, got {other:?}"),
        }
    }

    #[test]
    fn function_def_parses_body_expression() {
        let node = parse_one("real f ( real x ) { return x + 1 }");
        match node {
            Node::FuncDef { name, params, body } => {
                assert_eq!(name, "f");
                assert_eq!(params, vec!["x".to_string()]);
                assert!(matches!(*body, Node::BinOp { .. }));
            }
            other => panic!("expected FuncDef, got {other:?}"),
        }
    }
}
