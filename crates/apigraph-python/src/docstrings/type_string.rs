//! Parsing of free-text type declarations found in docstrings.
//!
//! Accepted shapes: `int`, `str or None`, `int | None`, `list of int`,
//! `list[int]`, `dict[str, float]`, `{'a', 'b'}`, plus the trailing
//! modifiers `optional` and `default=...` / `default: ...` / `default ...`.

use apigraph_core::types::AbstractType;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTypeString {
    pub ty: Option<AbstractType>,
    pub default: Option<String>,
    pub optional: bool,
}

pub fn parse(text: &str) -> ParsedTypeString {
    let mut parsed = ParsedTypeString::default();
    let mut type_parts: Vec<AbstractType> = Vec::new();

    for item in split_top_level(text.trim(), ',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if item.eq_ignore_ascii_case("optional") {
            parsed.optional = true;
            continue;
        }
        if let Some(default) = strip_default(item) {
            parsed.default = Some(default.to_string());
            continue;
        }
        if let Some(ty) = parse_type(item) {
            type_parts.push(ty);
        }
    }

    if !type_parts.is_empty() {
        parsed.ty = Some(AbstractType::union(type_parts));
    }
    parsed
}

fn strip_default(item: &str) -> Option<&str> {
    let lower = item.to_ascii_lowercase();
    if !lower.starts_with("default") {
        return None;
    }
    let rest = item["default".len()..].trim_start();
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    let rest = rest.trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Parse one type expression (no top-level commas).
pub fn parse_type(text: &str) -> Option<AbstractType> {
    let text = text.trim().trim_matches('`').trim_start_matches('~').trim();
    if text.is_empty() {
        return None;
    }

    if text.starts_with('{') && text.ends_with('}') {
        let values: Vec<String> = split_top_level(&text[1..text.len() - 1], ',')
            .into_iter()
            .map(|v| unquote(v.trim()).to_string())
            .filter(|v| !v.is_empty())
            .collect();
        return Some(AbstractType::enum_of(values));
    }

    let alternatives = split_alternatives(text);
    if alternatives.len() > 1 {
        let members: Vec<AbstractType> =
            alternatives.iter().filter_map(|a| parse_type(a)).collect();
        return (!members.is_empty()).then(|| AbstractType::union(members));
    }

    let lower = text.to_ascii_lowercase();
    for prefix in ["list of ", "set of ", "tuple of "] {
        if lower.starts_with(prefix) {
            let inner: Vec<AbstractType> = parse_type(&text[prefix.len()..]).into_iter().collect();
            return Some(match prefix {
                "list of " => AbstractType::list(inner),
                "set of " => AbstractType::set(inner),
                _ => AbstractType::tuple(inner),
            });
        }
    }

    if let Some(open) = text.find('[') {
        if text.ends_with(']') {
            let head = text[..open].trim();
            let args: Vec<AbstractType> = split_top_level(&text[open + 1..text.len() - 1], ',')
                .iter()
                .filter_map(|a| parse_type(a))
                .collect();
            return Some(subscripted(head, args));
        }
    }

    Some(named(text))
}

fn subscripted(head: &str, args: Vec<AbstractType>) -> AbstractType {
    let head = head.rsplit('.').next().unwrap_or(head);
    match head {
        "list" | "List" => AbstractType::list(args),
        "set" | "Set" => AbstractType::set(args),
        "tuple" | "Tuple" => AbstractType::tuple(args),
        "dict" | "Dict" => {
            let mut args = args.into_iter();
            AbstractType::dict(
                args.next().unwrap_or(AbstractType::Unknown),
                args.next().unwrap_or(AbstractType::Unknown),
            )
        }
        "Optional" => AbstractType::union(args.into_iter().chain([AbstractType::none()])),
        "Union" => AbstractType::union(args),
        _ => {
            let base = named(head);
            match base {
                AbstractType::Named { name, qname } => {
                    AbstractType::named_sequence(name, qname, args)
                }
                other => other,
            }
        }
    }
}

fn named(text: &str) -> AbstractType {
    match text {
        "None" | "none" => AbstractType::none(),
        "int" | "float" | "str" | "bool" | "bytes" | "complex" | "object" | "list" | "dict"
        | "set" | "tuple" => AbstractType::builtin(text),
        "string" => AbstractType::builtin("str"),
        "integer" => AbstractType::builtin("int"),
        "boolean" => AbstractType::builtin("bool"),
        _ => {
            let name = text.rsplit('.').next().unwrap_or(text);
            AbstractType::named(name, text)
        }
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
        .unwrap_or(value)
}

/// Split on `or` / `|` outside brackets.
fn split_alternatives(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for piece in split_top_level(text, '|') {
        let mut rest = piece.as_str();
        while let Some(idx) = find_top_level_word(rest, " or ") {
            out.push(rest[..idx].trim().to_string());
            rest = &rest[idx + 4..];
        }
        out.push(rest.trim().to_string());
    }
    out.retain(|s| !s.is_empty());
    out
}

fn find_top_level_word(text: &str, word: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, ch) in text.char_indices() {
        match ch {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth -= 1,
            _ if depth == 0 && text[idx..].starts_with(word) => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Split on `sep` outside `[]`, `()`, `{}` and quotes.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut current = String::new();
    for ch in text.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                current.push(ch);
                continue;
            }
            None if ch == '\'' || ch == '"' => {
                quote = Some(ch);
                current.push(ch);
                continue;
            }
            None => {}
        }
        match ch {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth -= 1,
            _ => {}
        }
        if ch == sep && depth == 0 {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    parts.push(current);
    parts
}

// ============================================================================
// Tests
// ============================================================================
