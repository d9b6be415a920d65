use apigraph_core::model::{
    AttributeDocstring, ClassDocstring, FunctionDocstring, ParameterDocstring, ResultDocstring,
};

use super::{clean, DocstringProvider};
use crate::nodes::{ClassDef, FuncDef};

/// Treats every docstring as unstructured prose.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextProvider;

fn cleaned(docstring: Option<&String>) -> String {
    docstring.map(|d| clean(d)).unwrap_or_default()
}

impl DocstringProvider for PlainTextProvider {
    fn class_docstring(&self, class: &ClassDef) -> ClassDocstring {
        let text = cleaned(class.docstring.as_ref());
        ClassDocstring {
            description: text.clone(),
            full_docstring: text,
        }
    }

    fn function_docstring(&self, function: &FuncDef) -> FunctionDocstring {
        let text = cleaned(function.docstring.as_ref());
        FunctionDocstring {
            description: text.clone(),
            full_docstring: text,
        }
    }

    fn parameter_docstring(
        &self,
        _function: &FuncDef,
        _class: Option<&ClassDef>,
        _parameter_name: &str,
    ) -> ParameterDocstring {
        ParameterDocstring::default()
    }

    fn attribute_docstring(&self, _class: &ClassDef, _attribute_name: &str) -> AttributeDocstring {
        AttributeDocstring::default()
    }

    fn result_docstrings(&self, _function: &FuncDef) -> Vec<ResultDocstring> {
        Vec::new()
    }
}
