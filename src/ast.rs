//! AST & renderer (C5): tagged node variants with a single rendering
//! contract per concern.
//!
//! `Node` is a sum type built once during parsing and never mutated.
//! Rendering is recursive and pure except for three side effects, each
//! routed through the driver-supplied collaborators: table lookup (C6,
//! via [`crate::tables::TranslationTables`]), diagnostic emission (C1,
//! via [`crate::diagnostics::DiagnosticSink`]), and nothing else.

use crate::diagnostics::DiagnosticSink;
use crate::error::{NetlateError, Result};
use crate::rewrite;
use crate::tables::TranslationTables;

/// One AST node. Payloads are semantic, not syntactic: no source spans,
/// no trivia.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(String),
    Variable(String),
    StringLit(String),
    BinOp {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryOp {
        op: String,
        operand: Box<Node>,
    },
    Call {
        name: String,
        args: Vec<Node>,
    },
    Ternary {
        cond: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Box<Node>,
    },
    Group(Box<Node>),
    Assign {
        left: Box<Node>,
        right: Box<Node>,
    },
    FuncDef {
        name: String,
        params: Vec<String>,
        body: Box<Node>,
    },
    LangDirective {
        dialect: String,
    },
    Include {
        kind: String,
        path_prefix: String,
        basename: String,
        extension: String,
    },
    SubcktHeader {
        inline: bool,
        name: String,
        ports: Vec<String>,
    },
    SubcktEnd {
        name: String,
    },
    Instance {
        designator: String,
        ports: Vec<String>,
        source_type: String,
        params: Vec<Node>,
    },
    Model {
        name: String,
        base_type: String,
        params: Vec<Node>,
    },
    Conditional {
        cond: Box<Node>,
        body: Vec<Node>,
    },
    Assertion {
        label: String,
        params: Vec<Node>,
    },
    Tuple(Vec<Node>),
}

impl Node {
    /// Render this node as one line of target-dialect text.
    ///
    /// `tables` and `sink` are consulted only by `Model` and `Instance`
    /// (table lookup) and by the `v()`/`V()` demotion and unsupported-include
    /// cases (diagnostic emission); every other variant renders without
    /// touching either collaborator.
    pub fn render_target(&self, tables: &TranslationTables, sink: &DiagnosticSink) -> Result<String> {
        match self {
            Node::Assign { left, right } => {
                let l = left.render_expr(sink);
                let r = right.render_expr(sink);
                Ok(format!(".param {l}='{r}'"))
            }
            Node::LangDirective { dialect } => Ok(format!("*simulator lang={dialect}")),
            Node::Include {
                kind,
                path_prefix,
                basename,
                extension,
            } => {
                if kind == "include" {
                    Ok(format!(".include {path_prefix}{basename}.sp"))
                } else {
                    sink.warn(&format!("unsupported include kind: {kind}"));
                    Ok(format!("*.{kind} {path_prefix}{basename}.{extension}"))
                }
            }
            Node::SubcktHeader { name, ports, .. } => {
                Ok(format!(".subckt {name} ({})", ports.join(" ")))
            }
            Node::SubcktEnd { name } => Ok(format!(".ends {name}")),
            Node::FuncDef { name, params, body } => {
                let body_text = body.render_expr(sink);
                Ok(format!(".func {name}({}) {{{body_text}}}", params.join(",")))
            }
            Node::Conditional { cond, body } => {
                let cond_text = cond.render_expr(sink);
                let mut lines = Vec::with_capacity(body.len());
                for card in body {
                    lines.push(card.render_target(tables, sink)?);
                }
                Ok(format!(".if ({cond_text}) {{{}}}", lines.join(" ")))
            }
            Node::Assertion { label, params } => {
                let rendered: Vec<String> = params
                    .iter()
                    .map(|p| match p {
                        Node::Assign { left, right } => {
                            format!("{}={}", left.render_expr(sink), right.render_expr(sink))
                        }
                        other => other.render_expr(sink),
                    })
                    .collect();
                Ok(format!("*{label} assert {}", rendered.join(" ")))
            }
            Node::Model {
                name,
                base_type,
                params,
            } => rewrite::render_model(name, base_type, params, tables, sink),
            Node::Instance {
                designator,
                ports,
                source_type,
                params,
            } => rewrite::render_instance(designator, ports, source_type, params, tables, sink),
            other => Err(NetlateError::UnknownCard {
                card: format!("{other:?} is not a card-level node"),
            }),
        }
    }

    /// Render an expression-level node: identity rendering with the three
    /// exceptions named in §4.5 (voltage-demotion, ternary, grouping).
    pub fn render_expr(&self, sink: &DiagnosticSink) -> String {
        match self {
            Node::Number(text) => text.clone(),
            Node::Variable(name) => name.clone(),
            Node::StringLit(text) => text.clone(),
            Node::BinOp { op, left, right } => {
                format!("{}{op}{}", left.render_expr(sink), right.render_expr(sink))
            }
            Node::UnaryOp { op, operand } => format!("{op}{}", operand.render_expr(sink)),
            Node::Call { name, .. } if name == "v" || name == "V" => {
                sink.warn("voltage in .param demoted");
                "0".to_string()
            }
            Node::Call { name, args } => {
                let rendered: Vec<String> = args.iter().map(|a| a.render_expr(sink)).collect();
                format!("{name}({})", rendered.join(","))
            }
            Node::Ternary {
                cond,
                then_branch,
                else_branch,
            } => format!(
                "{}?{}:{}",
                cond.render_expr(sink),
                then_branch.render_expr(sink),
                else_branch.render_expr(sink)
            ),
            Node::Group(inner) => format!("({})", inner.render_expr(sink)),
            Node::Tuple(elements) => {
                let rendered: Vec<String> = elements.iter().map(|e| e.render_expr(sink)).collect();
                format!("[{}]", rendered.join(" "))
            }
            // Card-level nodes never nest inside an expression; rendering
            // falls back to Debug text rather than panicking.
            other => format!("{other:?}"),
        }
    }

    /// True if this node is a parameter equation (`Assign`), as opposed to
    /// a bare port/type `Variable`. Used by the instance production for
    /// port/type/parameter classification on the parsed argument list
    /// rather than on rendered text (§9).
    pub fn is_assign(&self) -> bool {
        matches!(self, Node::Assign { .. })
    }

    /// True if this node is a bare identifier.
    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Variable(_))
    }

    /// The identifier text of a `Variable` node, if this is one.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Node::Variable(name) => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TranslationTables;
    use rustc_hash::FxHashMap;

    fn empty_tables() -> TranslationTables {
        TranslationTables::from_parts(FxHashMap::default(), FxHashMap::default())
    }

    #[test]
    fn assign_renders_as_dot_param() {
        let node = Node::Assign {
            left: Box::new(Node::Variable("vth".to_string())),
            right: Box::new(Node::Number("0.7".to_string())),
        };
        let sink = DiagnosticSink::new();
        let out = node.render_target(&empty_tables(), &sink).unwrap();
        assert_eq!(out, ".param vth='0.7'");
    }

    #[test]
    fn voltage_call_demotes_to_zero_with_warning() {
        let node = Node::Assign {
            left: Box::new(Node::Variable("vout".to_string())),
            right: Box::new(Node::BinOp {
                op: "+".to_string(),
                left: Box::new(Node::Call {
                    name: "v".to_string(),
                    args: vec![Node::Variable("a".to_string()), Node::Variable("b".to_string())],
                }),
                right: Box::new(Node::Number("1".to_string())),
            }),
        };
        let sink = DiagnosticSink::new();
        let out = node.render_target(&empty_tables(), &sink).unwrap();
        assert_eq!(out, ".param vout='0+1'");
    }

    #[test]
    fn ternary_renders_with_question_colon() {
        let node = Node::Ternary {
            cond: Box::new(Node::Variable("x".to_string())),
            then_branch: Box::new(Node::Number("1".to_string())),
            else_branch: Box::new(Node::Number("0".to_string())),
        };
        let sink = DiagnosticSink::new();
        assert_eq!(node.render_expr(&sink), "x?1:0");
    }

    #[test]
    fn group_preserves_parentheses() {
        let node = Node::Group(Box::new(Node::BinOp {
            op: "+".to_string(),
            left: Box::new(Node::Variable("a".to_string())),
            right: Box::new(Node::Variable("b".to_string())),
        }));
        let sink = DiagnosticSink::new();
        assert_eq!(node.render_expr(&sink), "(a+b)");
    }

    #[test]
    fn ahdl_include_renders_as_comment() {
        let node = Node::Include {
            kind: "ahdl_include".to_string(),
            path_prefix: "./ahdl/".to_string(),
            basename: "foo".to_string(),
            extension: "va".to_string(),
        };
        let sink = DiagnosticSink::new();
        let out = node.render_target(&empty_tables(), &sink).unwrap();
        assert_eq!(out, "*.ahdl_include ./ahdl/foo.va");
    }

    #[test]
    fn include_rewrites_extension_to_sp() {
        let node = Node::Include {
            kind: "include".to_string(),
            path_prefix: "./".to_string(),
            basename: "sub".to_string(),
            extension: "scs".to_string(),
        };
        let sink = DiagnosticSink::new();
        let out = node.render_target(&empty_tables(), &sink).unwrap();
        assert_eq!(out, ".include ./sub.sp");
    }
}
