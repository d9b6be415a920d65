use apigraph_core::model::{
    AttributeDocstring, ClassDocstring, FunctionDocstring, ParameterDocstring, ResultDocstring,
};

use super::{indentation, join_lines, DocEntry, DocstringProvider, ParsedDocstring, Sectioned};
use crate::nodes::{ClassDef, FuncDef};

/// NumPy style: underlined section headers with `name : type` entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumpyProvider;

const STYLE: Sectioned = Sectioned { parse: parse_numpy };

fn is_underline(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

fn is_header(lines: &[&str], i: usize) -> bool {
    !lines[i].trim().is_empty() && lines.get(i + 1).is_some_and(|next| is_underline(next))
}

pub(crate) fn parse_numpy(text: &str) -> ParsedDocstring {
    let lines: Vec<&str> = text.lines().collect();
    let mut parsed = ParsedDocstring::default();

    let first_header = (0..lines.len()).find(|&i| is_header(&lines, i)).unwrap_or(lines.len());
    parsed.description = lines[..first_header].join("\n").trim().to_string();

    let mut i = first_header;
    while i < lines.len() {
        let header = lines[i].trim();
        let start = i + 2;
        let mut end = start;
        while end < lines.len() && !is_header(&lines, end) {
            end += 1;
        }
        let body = lines.get(start..end).unwrap_or_default();
        match header {
            "Parameters" | "Other Parameters" | "Keyword Arguments" => {
                parsed.parameters.extend(entries(body).into_iter().flat_map(named_entries));
            }
            "Attributes" => {
                parsed.attributes.extend(entries(body).into_iter().flat_map(named_entries));
            }
            "Returns" | "Yields" => {
                parsed.returns.extend(entries(body).into_iter().map(result_entry));
            }
            _ => {}
        }
        i = end;
    }
    parsed
}

/// `(head line, description lines)` pairs; heads sit at the section's
/// base indentation.
fn entries<'l>(body: &[&'l str]) -> Vec<(&'l str, Vec<&'l str>)> {
    let base = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indentation(l))
        .min()
        .unwrap_or(0);
    let mut out: Vec<(&str, Vec<&str>)> = Vec::new();
    for line in body {
        if line.trim().is_empty() {
            continue;
        }
        if indentation(line) == base {
            out.push((line.trim(), Vec::new()));
        } else if let Some((_, description)) = out.last_mut() {
            description.push(line.trim());
        }
    }
    out
}

/// `x, y : int` documents both names.
fn named_entries((head, description): (&str, Vec<&str>)) -> Vec<DocEntry> {
    let (names, type_text) = match head.split_once(" : ") {
        Some((names, ty)) => (names, ty.trim()),
        None => (head.trim_end_matches(':'), ""),
    };
    let description = join_lines(&description);
    names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|name| DocEntry {
            name: name.to_string(),
            type_text: type_text.to_string(),
            description: description.clone(),
        })
        .collect()
}

/// `name : type` or a bare type.
fn result_entry((head, description): (&str, Vec<&str>)) -> DocEntry {
    let (name, type_text) = match head.split_once(" : ") {
        Some((name, ty)) => (name.trim(), ty.trim()),
        None => ("", head),
    };
    DocEntry {
        name: name.to_string(),
        type_text: type_text.to_string(),
        description: join_lines(&description),
    }
}

impl DocstringProvider for NumpyProvider {
    fn class_docstring(&self, class: &ClassDef) -> ClassDocstring {
        STYLE.class_docstring(class)
    }

    fn function_docstring(&self, function: &FuncDef) -> FunctionDocstring {
        STYLE.function_docstring(function)
    }

    fn parameter_docstring(
        &self,
        function: &FuncDef,
        class: Option<&ClassDef>,
        parameter_name: &str,
    ) -> ParameterDocstring {
        STYLE.parameter_docstring(function, class, parameter_name)
    }

    fn attribute_docstring(&self, class: &ClassDef, attribute_name: &str) -> AttributeDocstring {
        STYLE.attribute_docstring(class, attribute_name)
    }

    fn result_docstrings(&self, function: &FuncDef) -> Vec<ResultDocstring> {
        STYLE.result_docstrings(function)
    }
}

// ============================================================================
// Tests
// ============================================================================
