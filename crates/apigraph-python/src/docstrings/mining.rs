//! Constraint mining from parameter descriptions.
//!
//! Descriptions often say more than the declared type: `One of {'a', 'b'}`,
//! `in the range [0, 1)`, `Must be non-negative`, `Defaults to 3.`

use std::sync::LazyLock;

use regex::Regex;

use apigraph_core::types::{AbstractType, BoundaryBase, FloatValue};

static VALUE_SET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());
static INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\bin\s+(?:the\s+)?(?:range|interval)?\s*",
        r"([\[(])\s*([+-]?[\w.]+)\s*,\s*([+-]?[\w.]+)\s*([\])])",
    ))
    .unwrap()
});
static BETWEEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbetween\s+([+-]?\d+(?:\.\d+)?)\s+and\s+([+-]?\d+(?:\.\d+)?)").unwrap()
});
static NON_NEGATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnon-?negative\b").unwrap());
static NON_POSITIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnon-?positive\b").unwrap());
static POSITIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bpositive\b").unwrap());
static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bnegative\b").unwrap());
static DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdefaults?\s+(?:to|is)\s+(.+?)\.?\s*$").unwrap());

/// The value set named in a description, if any.
pub fn mine_enum(description: &str) -> Option<AbstractType> {
    let captures = VALUE_SET.captures(description)?;
    let values: Vec<String> = captures[1]
        .split(',')
        .map(|v| v.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|v| !v.is_empty())
        .collect();
    (!values.is_empty()).then(|| AbstractType::enum_of(values))
}

/// The default value spelled out in a description, if any.
pub fn mine_default(description: &str) -> Option<String> {
    let first_sentence_line = description.lines().find(|l| DEFAULT.is_match(l))?;
    let captures = DEFAULT.captures(first_sentence_line)?;
    let value = captures[1].trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: Option<f64>,
    min_inclusive: bool,
    max: Option<f64>,
    max_inclusive: bool,
}

fn mine_range(description: &str) -> Option<Range> {
    if let Some(c) = INTERVAL.captures(description) {
        return Some(Range {
            min: parse_bound(&c[2])?,
            min_inclusive: &c[1] == "[",
            max: parse_bound(&c[3])?,
            max_inclusive: &c[4] == "]",
        });
    }
    if let Some(c) = BETWEEN.captures(description) {
        return Some(Range {
            min: Some(c[1].parse().ok()?),
            min_inclusive: true,
            max: Some(c[2].parse().ok()?),
            max_inclusive: true,
        });
    }
    let half = |min: Option<f64>, min_inclusive, max: Option<f64>, max_inclusive| Range {
        min,
        min_inclusive,
        max,
        max_inclusive,
    };
    if NON_NEGATIVE.is_match(description) {
        return Some(half(Some(0.0), true, None, false));
    }
    if NON_POSITIVE.is_match(description) {
        return Some(half(None, false, Some(0.0), true));
    }
    if POSITIVE.is_match(description) {
        return Some(half(Some(0.0), false, None, false));
    }
    if NEGATIVE.is_match(description) {
        return Some(half(None, false, Some(0.0), false));
    }
    None
}

/// `None` inside `Some` is an unbounded side; outer `None` is unparseable.
fn parse_bound(text: &str) -> Option<Option<f64>> {
    match text.trim_start_matches('+').to_ascii_lowercase().as_str() {
        "inf" | "infinity" | "-inf" | "-infinity" => Some(None),
        other => other.parse::<f64>().ok().map(Some),
    }
}

fn numeric_base(ty: &AbstractType) -> Option<BoundaryBase> {
    match ty {
        AbstractType::Named { qname, .. } if qname == "builtins.int" => Some(BoundaryBase::Int),
        AbstractType::Named { qname, .. } if qname == "builtins.float" => {
            Some(BoundaryBase::Float)
        }
        _ => None,
    }
}

/// Narrow a numeric declared type with a range found in the description.
///
/// Inside a union only the numeric member is replaced. Returns `None` when
/// the description names no range or the type has no numeric member.
pub fn refine_with_boundary(declared: &AbstractType, description: &str) -> Option<AbstractType> {
    let range = mine_range(description)?;
    let boundary = |base| AbstractType::Boundary {
        base,
        min: range.min.map(FloatValue),
        min_inclusive: range.min_inclusive,
        max: range.max.map(FloatValue),
        max_inclusive: range.max_inclusive,
    };

    if let Some(base) = numeric_base(declared) {
        return Some(boundary(base));
    }
    if let AbstractType::Union { types } = declared {
        let position = types.iter().position(|t| numeric_base(t).is_some())?;
        let base = numeric_base(&types[position])?;
        let mut members = types.clone();
        members[position] = boundary(base);
        return Some(AbstractType::union(members));
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn float_range(
        min: Option<f64>,
        min_inclusive: bool,
        max: Option<f64>,
        max_inclusive: bool,
    ) -> AbstractType {
        AbstractType::Boundary {
            base: BoundaryBase::Float,
            min: min.map(FloatValue),
            min_inclusive,
            max: max.map(FloatValue),
            max_inclusive,
        }
    }

    mod value_sets {
        use super::*;

        #[test]
        fn quoted_values() {
            assert_eq!(
                mine_enum("Either {'linear', \"cubic\"}."),
                Some(AbstractType::enum_of(["cubic", "linear"]))
            );
        }

        #[test]
        fn absent() {
            assert_eq!(mine_enum("The interpolation kind."), None);
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn trailing_sentence() {
            assert_eq!(mine_default("Size of the window. Defaults to 3."), Some("3".to_string()));
            assert_eq!(mine_default("Default is None"), Some("None".to_string()));
        }

        #[test]
        fn absent() {
            assert_eq!(mine_default("Size of the window."), None);
        }
    }

    mod boundaries {
        use super::*;

        #[test]
        fn half_open_interval() {
            let declared = AbstractType::builtin("float");
            assert_eq!(
                refine_with_boundary(&declared, "Ratio in the range [0, 1)."),
                Some(float_range(Some(0.0), true, Some(1.0), false))
            );
        }

        #[test]
        fn infinite_side() {
            let declared = AbstractType::builtin("float");
            assert_eq!(
                refine_with_boundary(&declared, "Scale in (0, inf)."),
                Some(float_range(Some(0.0), false, None, false))
            );
        }

        #[test]
        fn sign_words() {
            let declared = AbstractType::builtin("int");
            let refined = refine_with_boundary(&declared, "Must be non-negative.");
            assert_eq!(
                refined,
                Some(AbstractType::Boundary {
                    base: BoundaryBase::Int,
                    min: Some(FloatValue(0.0)),
                    min_inclusive: true,
                    max: None,
                    max_inclusive: false,
                })
            );
        }

        #[test]
        fn union_member_is_replaced() {
            let declared =
                AbstractType::union(vec![AbstractType::builtin("float"), AbstractType::none()]);
            let refined = refine_with_boundary(&declared, "between 1 and 5");
            assert_eq!(
                refined,
                Some(AbstractType::union(vec![
                    float_range(Some(1.0), true, Some(5.0), true),
                    AbstractType::none(),
                ]))
            );
        }

        #[test]
        fn non_numeric_is_left_alone() {
            let declared = AbstractType::builtin("str");
            assert_eq!(refine_with_boundary(&declared, "A positive label."), None);
        }
    }
}
