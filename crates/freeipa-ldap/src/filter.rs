//! LDAP search filter builder.
//!
//! Values are escaped per RFC 4515 when the filter is rendered, so caller input such as a record
//! name or UUID can never change the structure of the filter.

use ldap3::ldap_escape;
use std::fmt;

/// An LDAP search filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `(attribute=value)`
    Equal {
        /// Attribute name.
        attribute: String,
        /// Unescaped assertion value.
        value: String,
    },
    /// `(attribute=*)`
    Present(String),
    /// `(&...)`
    And(Vec<Filter>),
    /// `(|...)`
    Or(Vec<Filter>),
    /// `(!...)`
    Not(Box<Filter>),
    /// Pre-built filter text, rendered verbatim.
    Raw(String),
}

impl Filter {
    /// Equality assertion on `attribute`.
    #[must_use]
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equal {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Presence assertion on `attribute`.
    #[must_use]
    pub fn present(attribute: impl Into<String>) -> Self {
        Self::Present(attribute.into())
    }

    /// Conjunction of `filters`.
    #[must_use]
    pub fn and<I: IntoIterator<Item = Filter>>(filters: I) -> Self {
        Self::And(filters.into_iter().collect())
    }

    /// Disjunction of `filters`.
    #[must_use]
    pub fn or<I: IntoIterator<Item = Filter>>(filters: I) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    /// Negation of `filter`.
    #[must_use]
    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Filter text supplied by the caller. Nothing inside is escaped.
    #[must_use]
    pub fn raw(filter: impl Into<String>) -> Self {
        Self::Raw(filter.into())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal { attribute, value } => {
                write!(f, "({attribute}={})", escape_filter_value(value))
            }
            Self::Present(attribute) => write!(f, "({attribute}=*)"),
            Self::And(filters) => write_composite(f, '&', filters),
            Self::Or(filters) => write_composite(f, '|', filters),
            Self::Not(filter) => write!(f, "(!{filter})"),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

fn write_composite(f: &mut fmt::Formatter<'_>, op: char, filters: &[Filter]) -> fmt::Result {
    write!(f, "({op}")?;
    for filter in filters {
        write!(f, "{filter}")?;
    }
    f.write_str(")")
}

/// Escapes an assertion value per RFC 4515.
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    ldap_escape(value).into_owned()
}
