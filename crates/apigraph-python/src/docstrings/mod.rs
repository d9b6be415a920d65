//! Docstring description providers.
//!
//! A provider documents classes, functions, parameters, attributes and
//! results from the docstrings the analyzer attached to the owning
//! declarations. Providers are interchangeable; the style is chosen per run.

mod google;
pub mod mining;
mod numpy;
mod plaintext;
pub mod type_string;

pub use google::GoogleProvider;
pub use numpy::NumpyProvider;
pub use plaintext::PlainTextProvider;

use serde::{Deserialize, Serialize};

use apigraph_core::model::{
    AttributeDocstring, ClassDocstring, FunctionDocstring, ParameterDocstring, ResultDocstring,
};
use apigraph_core::types::AbstractType;

use crate::nodes::{ClassDef, FuncDef};

/// The five documentation operations.
pub trait DocstringProvider: Send + Sync {
    fn class_docstring(&self, class: &ClassDef) -> ClassDocstring;

    fn function_docstring(&self, function: &FuncDef) -> FunctionDocstring;

    /// `class` is the owning class of a method; constructors may document
    /// their parameters in the class docstring.
    fn parameter_docstring(
        &self,
        function: &FuncDef,
        class: Option<&ClassDef>,
        parameter_name: &str,
    ) -> ParameterDocstring;

    fn attribute_docstring(&self, class: &ClassDef, attribute_name: &str) -> AttributeDocstring;

    /// Every result the function's docstring declares, in order.
    fn result_docstrings(&self, function: &FuncDef) -> Vec<ResultDocstring>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocstringStyle {
    #[default]
    Plaintext,
    Google,
    Numpy,
}

impl DocstringStyle {
    pub fn parse(s: &str) -> Option<DocstringStyle> {
        match s.to_ascii_lowercase().as_str() {
            "plaintext" | "plain" => Some(DocstringStyle::Plaintext),
            "google" => Some(DocstringStyle::Google),
            "numpy" | "numpydoc" => Some(DocstringStyle::Numpy),
            _ => None,
        }
    }
}

pub fn create_provider(style: DocstringStyle) -> Box<dyn DocstringProvider> {
    match style {
        DocstringStyle::Plaintext => Box::new(PlainTextProvider),
        DocstringStyle::Google => Box::new(GoogleProvider),
        DocstringStyle::Numpy => Box::new(NumpyProvider),
    }
}

// ============================================================================
// Shared parsing
// ============================================================================

/// One `name (type): description` style entry of a docstring section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DocEntry {
    pub name: String,
    pub type_text: String,
    pub description: String,
}

/// A docstring split into its description and the sections providers care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParsedDocstring {
    pub description: String,
    pub parameters: Vec<DocEntry>,
    pub attributes: Vec<DocEntry>,
    pub returns: Vec<DocEntry>,
}

impl ParsedDocstring {
    pub fn parameter(&self, name: &str) -> Option<&DocEntry> {
        find_entry(&self.parameters, name)
    }

    pub fn attribute(&self, name: &str) -> Option<&DocEntry> {
        find_entry(&self.attributes, name)
    }
}

fn find_entry<'e>(entries: &'e [DocEntry], name: &str) -> Option<&'e DocEntry> {
    entries
        .iter()
        .find(|e| e.name.trim_start_matches('*') == name)
}

/// Dedent a raw docstring: blank edges dropped, common indentation of the
/// lines after the first removed.
pub(crate) fn clean(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| indentation(l))
        .min()
        .unwrap_or(0);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            out.push(line.trim().to_string());
        } else if indentation(line) >= indent {
            out.push(strip_indent(line, indent).trim_end().to_string());
        } else {
            out.push(line.trim().to_string());
        }
    }
    while out.first().is_some_and(|l| l.is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Leading whitespace, in chars.
pub(crate) fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn strip_indent(line: &str, chars: usize) -> &str {
    match line.char_indices().nth(chars) {
        Some((offset, _)) => &line[offset..],
        None => "",
    }
}

/// Join description lines, collapsing internal whitespace runs.
pub(crate) fn join_lines(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fold the parts of a parameter entry into a docstring record.
///
/// The declared type comes from the type text; value sets and numeric ranges
/// mined from the description refine it.
pub(crate) fn parameter_record(entry: Option<&DocEntry>) -> ParameterDocstring {
    let Some(entry) = entry else {
        return ParameterDocstring::default();
    };
    let parsed = type_string::parse(&entry.type_text);
    let mut ty = parsed.ty;

    if let Some(values) = mining::mine_enum(&entry.description) {
        if ty.as_ref().is_none_or(|t| *t == AbstractType::builtin("str")) {
            ty = Some(values);
        }
    }
    if let Some(declared) = &ty {
        if let Some(refined) = mining::refine_with_boundary(declared, &entry.description) {
            ty = Some(refined);
        }
    }

    let default_value = parsed
        .default
        .or_else(|| mining::mine_default(&entry.description))
        .unwrap_or_default();

    ParameterDocstring {
        ty,
        default_value,
        description: entry.description.clone(),
    }
}

pub(crate) fn attribute_record(entry: Option<&DocEntry>) -> AttributeDocstring {
    match entry {
        Some(entry) => AttributeDocstring {
            ty: type_string::parse(&entry.type_text).ty,
            description: entry.description.clone(),
        },
        None => AttributeDocstring::default(),
    }
}

pub(crate) fn result_records(entries: &[DocEntry]) -> Vec<ResultDocstring> {
    entries
        .iter()
        .map(|entry| ResultDocstring {
            ty: type_string::parse(&entry.type_text).ty,
            name: entry.name.clone(),
            description: entry.description.clone(),
        })
        .collect()
}

/// Operations shared by the sectioned styles, given a parse function.
pub(crate) struct Sectioned {
    pub parse: fn(&str) -> ParsedDocstring,
}

impl Sectioned {
    fn parsed(&self, docstring: Option<&String>) -> ParsedDocstring {
        docstring
            .map(|d| (self.parse)(&clean(d)))
            .unwrap_or_default()
    }

    pub fn class_docstring(&self, class: &ClassDef) -> ClassDocstring {
        ClassDocstring {
            description: self.parsed(class.docstring.as_ref()).description,
            full_docstring: class.docstring.as_deref().map(clean).unwrap_or_default(),
        }
    }

    pub fn function_docstring(&self, function: &FuncDef) -> FunctionDocstring {
        FunctionDocstring {
            description: self.parsed(function.docstring.as_ref()).description,
            full_docstring: function.docstring.as_deref().map(clean).unwrap_or_default(),
        }
    }

    pub fn parameter_docstring(
        &self,
        function: &FuncDef,
        class: Option<&ClassDef>,
        name: &str,
    ) -> ParameterDocstring {
        let own = self.parsed(function.docstring.as_ref());
        if let Some(entry) = own.parameter(name) {
            return parameter_record(Some(entry));
        }
        match class {
            Some(class) if function.name == "__init__" => {
                let class_doc = self.parsed(class.docstring.as_ref());
                parameter_record(class_doc.parameter(name))
            }
            _ => ParameterDocstring::default(),
        }
    }

    pub fn attribute_docstring(&self, class: &ClassDef, name: &str) -> AttributeDocstring {
        attribute_record(self.parsed(class.docstring.as_ref()).attribute(name))
    }

    pub fn result_docstrings(&self, function: &FuncDef) -> Vec<ResultDocstring> {
        result_records(&self.parsed(function.docstring.as_ref()).returns)
    }
}

// ============================================================================
// Tests
// ============================================================================
