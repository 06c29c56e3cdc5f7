//! Rewriter (C6): applies model and component rules to `Model`/`Instance`
//! parameter lists during rendering.
//!
//! Each function consumes the card's parsed `params` (a list of `Assign`
//! nodes) and produces the rendered parameter text in the order dictated
//! by the rule: `added` first, then `translated` in rule order (not
//! source-card order). Leftover parameters after both passes are a fatal
//! `TableCoverage` error.

use crate::ast::Node;
use crate::diagnostics::DiagnosticSink;
use crate::error::{NetlateError, Result};
use crate::tables::TranslationTables;

/// One source-card parameter, split into its bare name and (if present)
/// rendered `=value` text.
struct Param {
    name: String,
    rendered: String,
}

fn split_params(params: &[Node], sink: &DiagnosticSink) -> Vec<Param> {
    params
        .iter()
        .map(|p| match p {
            Node::Assign { left, right } => {
                let name = left
                    .as_variable()
                    .map(str::to_string)
                    .unwrap_or_else(|| left.render_expr(sink));
                Param {
                    name,
                    rendered: format!("{}={}", name, right.render_expr(sink)),
                }
            }
            other => {
                let text = other.render_expr(sink);
                Param {
                    name: text.clone(),
                    rendered: text,
                }
            }
        })
        .collect()
}

/// Render a `model` card: `.model name <added/translated params>`, or a
/// commented passthrough when the rule marks the model `ignored`.
pub fn render_model(
    name: &str,
    base_type: &str,
    params: &[Node],
    tables: &TranslationTables,
    sink: &DiagnosticSink,
) -> Result<String> {
    let rule = tables
        .lookup_model(name)
        .ok_or_else(|| NetlateError::ModelNotInTable { name: name.to_string() })?;

    if rule.ignored {
        let rendered: Vec<String> = split_params(params, sink).into_iter().map(|p| p.rendered).collect();
        sink.warn(&format!("model '{name}' is ignored; emitting as comment"));
        return Ok(format!("*.model {name} {base_type} {}", rendered.join(" ")));
    }

    let mut remaining = split_params(params, sink);
    let mut new_args: Vec<String> = rule.added.clone();

    for (from, to) in &rule.translated {
        if let Some(pos) = remaining.iter().position(|p| &p.name == from) {
            let param = remaining.remove(pos);
            new_args.push(rewrite_one(&param, to));
        }
    }

    for removed_name in &rule.removed {
        remaining.retain(|p| &p.name != removed_name);
    }

    if !remaining.is_empty() {
        return Err(NetlateError::TableCoverage {
            card_kind: "model",
            name: name.to_string(),
            remaining: remaining.into_iter().map(|p| p.name).collect(),
        });
    }

    Ok(format!(".model {name} {}", new_args.join(" ")))
}

/// Render an `instance` card: on a table hit, apply the component rule;
/// on a miss, fall back to the subcircuit convention (§4.2, §4.6).
pub fn render_instance(
    designator: &str,
    ports: &[String],
    source_type: &str,
    params: &[Node],
    tables: &TranslationTables,
    sink: &DiagnosticSink,
) -> Result<String> {
    let ports_text = ports.join(" ");

    let Some(rule) = tables.lookup_component(source_type) else {
        sink.info(&format!(
            "component '{source_type}' not in table; assuming subcircuit"
        ));
        let rendered: Vec<String> = split_params(params, sink).into_iter().map(|p| p.rendered).collect();
        let mut new_args = vec![source_type.to_string()];
        new_args.extend(rendered);
        return Ok(format!("X_{designator} {ports_text} {}", new_args.join(" ")));
    };

    let mut remaining = split_params(params, sink);
    let mut new_args: Vec<String> = if rule.keep_type {
        vec![source_type.to_string()]
    } else {
        Vec::new()
    };

    for (from, to) in &rule.translated {
        if let Some(pos) = remaining.iter().position(|p| &p.name == from) {
            let param = remaining.remove(pos);
            new_args.push(rewrite_one(&param, to));
        }
    }

    for removed_name in &rule.removed {
        remaining.retain(|p| &p.name != removed_name);
    }

    if !remaining.is_empty() {
        return Err(NetlateError::TableCoverage {
            card_kind: "instance",
            name: designator.to_string(),
            remaining: remaining.into_iter().map(|p| p.name).collect(),
        });
    }

    let new_designator = format!("{}_{designator}", rule.prefix_char());
    Ok(format!("{new_designator} {ports_text} {}", new_args.join(" ")))
}

/// `to` alone if the source parameter had no `=value`; `to=value` otherwise.
fn rewrite_one(param: &Param, to: &str) -> String {
    match param.rendered.split_once('=') {
        Some((_, value)) if param.rendered.contains('=') => format!("{to}={value}"),
        _ => to.to_string(),
    }
}
