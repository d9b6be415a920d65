use std::sync::LazyLock;

use regex::Regex;

use apigraph_core::model::{
    AttributeDocstring, ClassDocstring, FunctionDocstring, ParameterDocstring, ResultDocstring,
};

use super::{indentation, join_lines, DocEntry, DocstringProvider, ParsedDocstring, Sectioned};
use crate::nodes::{ClassDef, FuncDef};

/// Google style: `Args:` / `Attributes:` / `Returns:` sections with
/// `name (type): description` entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleProvider;

const STYLE: Sectioned = Sectioned { parse: parse_google };

static HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([A-Z][A-Za-z ]*):\s*$").unwrap());
static ARGUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*{0,2}\w+)\s*(?:\((.*?)\))?\s*:\s*(.*)$").unwrap());
static RETURN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^:]+):\s*(.*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Parameters,
    Attributes,
    Returns,
    Ignored,
}

fn section_kind(header: &str) -> Section {
    match header {
        "Args" | "Arguments" | "Parameters" | "Params" | "Keyword Args" | "Keyword Arguments"
        | "Other Parameters" => Section::Parameters,
        "Attributes" => Section::Attributes,
        "Returns" | "Return" | "Yields" | "Yield" => Section::Returns,
        _ => Section::Ignored,
    }
}

pub(crate) fn parse_google(text: &str) -> ParsedDocstring {
    let lines: Vec<&str> = text.lines().collect();
    let mut parsed = ParsedDocstring::default();
    let mut description: Vec<&str> = Vec::new();
    let mut i = 0;
    let mut in_sections = false;

    while i < lines.len() {
        let line = lines[i];
        let header = HEADER.captures(line.trim()).map(|c| c[1].to_string());
        let Some(header) = header else {
            if !in_sections {
                description.push(line);
            }
            i += 1;
            continue;
        };
        in_sections = true;
        let header_indent = indentation(line);
        let start = i + 1;
        let mut end = start;
        while end < lines.len()
            && (lines[end].trim().is_empty() || indentation(lines[end]) > header_indent)
        {
            end += 1;
        }
        let entries = split_entries(&lines[start..end]);
        match section_kind(&header) {
            Section::Parameters => {
                parsed.parameters.extend(entries.iter().filter_map(|e| argument(e)))
            }
            Section::Attributes => {
                parsed.attributes.extend(entries.iter().filter_map(|e| argument(e)))
            }
            Section::Returns => parsed.returns.extend(entries.iter().map(|e| returned(e))),
            Section::Ignored => {}
        }
        i = end;
    }

    parsed.description = description.join("\n").trim().to_string();
    parsed
}

/// Group section lines into entries: each line at the section's base
/// indentation starts one, deeper lines continue it.
fn split_entries<'l>(lines: &[&'l str]) -> Vec<Vec<&'l str>> {
    let base = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indentation(l))
        .min()
        .unwrap_or(0);
    let mut entries: Vec<Vec<&str>> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if indentation(line) == base || entries.is_empty() {
            entries.push(vec![line.trim()]);
        } else if let Some(last) = entries.last_mut() {
            last.push(line.trim());
        }
    }
    entries
}

fn argument(lines: &[&str]) -> Option<DocEntry> {
    let (first, rest) = lines.split_first()?;
    let captures = ARGUMENT.captures(first)?;
    let mut description = vec![captures.get(3).map_or("", |m| m.as_str())];
    description.extend_from_slice(rest);
    Some(DocEntry {
        name: captures[1].to_string(),
        type_text: captures.get(2).map_or("", |m| m.as_str()).trim().to_string(),
        description: join_lines(&description),
    })
}

fn returned(lines: &[&str]) -> DocEntry {
    let Some((first, rest)) = lines.split_first() else {
        return DocEntry::default();
    };
    match RETURN.captures(first) {
        Some(captures) => {
            let mut description = vec![captures.get(2).map_or("", |m| m.as_str())];
            description.extend_from_slice(rest);
            DocEntry {
                name: String::new(),
                type_text: captures[1].trim().to_string(),
                description: join_lines(&description),
            }
        }
        None => DocEntry {
            name: String::new(),
            type_text: String::new(),
            description: join_lines(lines),
        },
    }
}

impl DocstringProvider for GoogleProvider {
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
