//! Preprocessor (C3): normalizes raw netlist text into one card per line.
//!
//! Every step below is a textual transformation; together they guarantee
//! the postcondition that the output is a sequence of logical cards, one
//! per line, with no blank lines and no continuations, and that applying
//! the preprocessor twice is the same as applying it once (tested below).

use std::sync::LazyLock;

use regex::Regex;

static BACKSLASH_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[ \t]*\r?\n[ \t]*").unwrap());
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static E0_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\be0\b").unwrap());

/// Run the full preprocessing pipeline over raw source text.
pub fn preprocess(source: &str) -> String {
    let joined = BACKSLASH_NEWLINE.replace_all(&source.replace("\r\n", "\n"), " ");

    let mut lines: Vec<String> = Vec::new();
    for raw_line in joined.split('\n') {
        let stripped = strip_comment(raw_line);
        let collapsed = MULTI_SPACE.replace_all(stripped.trim(), " ");
        if collapsed.is_empty() {
            continue;
        }
        lines.push(collapsed.into_owned());
    }

    let folded = fold_continuations(lines);
    let joined_braces = join_brace_bodies(folded);

    let mut out = String::new();
    for line in joined_braces {
        let spaced = space_tokens(&line);
        let fixed = E0_TOKEN.replace_all(&spaced, "eps0");
        out.push_str(fixed.trim());
        out.push('\n');
    }
    out
}

/// Lines whose first non-blank character is `*` (including `***` fences)
/// are comments and vanish entirely; `//` tails are truncated in place.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('*') {
        return "";
    }
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// A line starting with `+` is a continuation of the previous card.
fn fold_continuations(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in lines {
        if let Some(rest) = line.strip_prefix('+') {
            if let Some(prev) = out.last_mut() {
                prev.push(' ');
                prev.push_str(rest.trim_start());
                continue;
            }
        }
        out.push(line);
    }
    out
}

/// Collapse a `real f(...) {` header and its `return ...; }` body (however
/// many lines it spans) onto a single card, by tracking brace depth.
fn join_brace_bodies(lines: Vec<String>) -> Vec<String> {
    let mut out = Vec::new();
    let mut iter = lines.into_iter();
    while let Some(line) = iter.next() {
        let mut depth = brace_delta(&line);
        if depth <= 0 {
            out.push(line);
            continue;
        }
        let mut acc = line;
        for next in iter.by_ref() {
            depth += brace_delta(&next);
            acc.push(' ');
            acc.push_str(&next);
            if depth <= 0 {
                break;
            }
        }
        out.push(acc);
    }
    out
}

fn brace_delta(line: &str) -> i32 {
    line.chars().filter(|&c| c == '{').count() as i32 - line.chars().filter(|&c| c == '}').count() as i32
}

/// Insert spaces around `*` and `)` so unit-postfix literals (`17f`) stay
/// lexically distinct from multiplication (`17*f`), while keeping the `**`
/// power operator intact as one token.
fn space_tokens(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut result = String::with_capacity(line.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                result.push_str(" ** ");
                i += 2;
            }
            '*' => {
                result.push_str(" * ");
                i += 1;
            }
            ')' => {
                result.push_str(" ) ");
                i += 1;
            }
            c => {
                result.push(c);
                i += 1;
            }
        }
    }
    MULTI_SPACE.replace_all(&result, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_backslash_continuations() {
        let out = preprocess("model foo bar \\\nlevel=1\n");
        assert_eq!(out, "model foo bar level=1\n");
    }

    #[test]
    fn strips_star_comments_entirely() {
        let out = preprocess("* a full line comment\nmodel foo bar level=1\n");
        assert_eq!(out, "model foo bar level=1\n");
    }

    #[test]
    fn strips_triple_star_fence_and_slash_slash_tails() {
        let out = preprocess("*** fence ***\nmodel foo bar level=1 // trailing note\n");
        assert_eq!(out, "model foo bar level=1\n");
    }

    #[test]
    fn folds_plus_prefixed_continuation_onto_previous_card() {
        let out = preprocess("model foo bar\n+ level=1\n+ lmin=1u\n");
        assert_eq!(out, "model foo bar level=1 lmin=1u\n");
    }

    #[test]
    fn collapses_multiline_function_body_onto_one_line() {
        let out = preprocess("real f(real x) {\nreturn x+1\n}\n");
        assert_eq!(out, "real f(real x ) { return x+1 }\n");
    }

    #[test]
    fn e0_is_rewritten_only_as_a_whole_token() {
        let out = preprocess("parameters x = e0 + some0\n");
        assert_eq!(out, "parameters x = eps0 + some0\n");
    }

    #[test]
    fn scientific_notation_with_e0_exponent_is_untouched() {
        let out = preprocess("parameters x = 2e0\n");
        assert_eq!(out, "parameters x = 2e0\n");
    }

    #[test]
    fn power_operator_survives_spacing_pass_intact() {
        let out = preprocess("parameters x = a**2\n");
        assert_eq!(out, "parameters x = a ** 2\n");
    }

    #[test]
    fn blank_and_whitespace_only_lines_vanish() {
        let out = preprocess("\n   \nmodel foo bar level=1\n\n\n");
        assert_eq!(out, "model foo bar level=1\n");
    }

    #[test]
    fn idempotent_on_already_preprocessed_text() {
        let once = preprocess("model foo bar \\\nlevel=1 * 2\n* comment\nreal f(real x) {\nreturn x**2\n}\n");
        let twice = preprocess(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn card_count_preservation() {
        let source = "model a b c=1\nmodel d e f=2\n* comment\n\nmodel g h i=3\n";
        let out = preprocess(source);
        assert_eq!(out.lines().count(), 3);
    }
}
