//! Builder for PocketBase filter and sort expressions.
//!
//! Field names come from code (`&'static str`); values are always rendered
//! as quoted literals, so text typed by a user can never change the shape of
//! the expression.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `field = 'value'`
    Eq(&'static str, String),
    /// `field ~ 'value'` (case-insensitive contains)
    Contains(&'static str, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self::Eq(field, value.into())
    }

    pub fn contains(field: &'static str, value: impl Into<String>) -> Self {
        Self::Contains(field, value.into())
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// AND together every filter; `None` when there are none.
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Option<Self> {
        filters.into_iter().reduce(Filter::and)
    }

    pub fn render(&self) -> String {
        match self {
            Self::Eq(field, value) => format!("{} = {}", field, quote(value)),
            Self::Contains(field, value) => format!("{} ~ {}", field, quote(value)),
            Self::And(parts) => join(parts, " && "),
            Self::Or(parts) => join(parts, " || "),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn join(parts: &[Filter], op: &str) -> String {
    let rendered: Vec<String> = parts.iter().map(Filter::render).collect();
    format!("({})", rendered.join(op))
}

/// Single-quote a literal. Quotes are backslash-escaped. The backend lexer
/// treats a quote preceded by a backslash as escaped, so trailing
/// backslashes are dropped to keep the closing quote intact.
fn quote(value: &str) -> String {
    let value = value.trim_end_matches('\\');
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Sort key, e.g. `-created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    field: &'static str,
    descending: bool,
}

impl Sort {
    #[cfg(test)]
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    pub fn render(&self) -> String {
        if self.descending {
            format!("-{}", self.field)
        } else {
            self.field.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_equality() {
        assert_eq!(Filter::eq("username", "alice").render(), "username = 'alice'");
    }

    #[test]
    fn quotes_are_escaped() {
        let f = Filter::contains("title", "it's");
        assert_eq!(f.render(), r"title ~ 'it\'s'");
    }

    #[test]
    fn injection_attempt_stays_inside_literal() {
        let f = Filter::eq("username", r#"x' || id != '"#);
        assert_eq!(f.render(), r"username = 'x\' || id != \''");
    }

    #[test]
    fn double_quotes_pass_through_single_quoted_literal() {
        let f = Filter::eq("username", r#"a" || "1"="1"#);
        assert_eq!(f.render(), r#"username = 'a" || "1"="1'"#);
    }

    #[test]
    fn trailing_backslash_cannot_escape_closing_quote() {
        assert_eq!(Filter::eq("title", r"abc\\").render(), "title = 'abc'");
    }

    #[test]
    fn nested_groups_are_parenthesised() {
        let f = Filter::contains("title", "jazz")
            .or(Filter::contains("platform", "jazz"))
            .and(Filter::eq("platform", "youtube"));
        assert_eq!(
            f.render(),
            "((title ~ 'jazz' || platform ~ 'jazz') && platform = 'youtube')"
        );
    }

    #[test]
    fn all_of_nothing_is_none() {
        assert_eq!(Filter::all(Vec::new()), None);
        let one = Filter::all(vec![Filter::eq("a", "b")]).unwrap();
        assert_eq!(one.render(), "a = 'b'");
    }

    #[test]
    fn sort_rendering() {
        assert_eq!(Sort::desc("created").render(), "-created");
        assert_eq!(Sort::asc("title").render(), "title");
    }
}
