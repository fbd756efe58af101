//! Distinguished name handling for FreeIPA directory entries.
//!
//! Search bases are built by prefixing caller-supplied values (zone names, record names) onto
//! fixed containers such as `cn=dns`, so values are always escaped per RFC 4514 when rendered.

use ldap3::dn_escape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use freeipa_core::Error as CoreError;

/// Errors that can occur when parsing distinguished names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistinguishedNameError {
    /// The distinguished name was empty.
    #[error("distinguished name cannot be empty")]
    Empty,
    /// A component in the distinguished name was invalid.
    #[error("invalid distinguished name component: {0}")]
    InvalidComponent(String),
    /// A component was missing the attribute name to the left of the `=`.
    #[error("distinguished name component missing attribute: {0}")]
    MissingAttribute(String),
    /// The distinguished name ended with an escape character or a bad hex pair.
    #[error("distinguished name contains an invalid escape sequence")]
    InvalidEscape,
}

impl From<DistinguishedNameError> for CoreError {
    fn from(err: DistinguishedNameError) -> Self {
        CoreError::InvalidDn(err.to_string())
    }
}

/// Relative distinguished name (single attribute/value pair).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeDistinguishedName {
    attribute: String,
    value: String,
}

impl RelativeDistinguishedName {
    /// Create a new relative distinguished name from an unescaped value.
    #[must_use]
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Attribute portion of the RDN (e.g. `idnsname`).
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Unescaped attribute value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    fn matches_attribute(&self, attribute: &str) -> bool {
        self.attribute.eq_ignore_ascii_case(attribute)
    }
}

impl fmt::Display for RelativeDistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, dn_escape(self.value.as_str()))
    }
}

/// Distinguished name as an ordered list of RDNs, most specific first.
///
/// Multi-valued RDNs (`a=1+b=2`) do not occur in the FreeIPA tree and are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinguishedName {
    rdns: Vec<RelativeDistinguishedName>,
}

impl DistinguishedName {
    /// Parses a distinguished name from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`DistinguishedNameError`] if the input is empty or malformed.
    pub fn parse(input: impl AsRef<str>) -> std::result::Result<Self, DistinguishedNameError> {
        let raw = input.as_ref().trim();
        if raw.is_empty() {
            return Err(DistinguishedNameError::Empty);
        }

        let rdns = split_unescaped(raw, ',')?
            .into_iter()
            .map(|component| parse_rdn(&component))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { rdns })
    }

    /// Builds a single-RDN distinguished name from an unescaped value.
    #[must_use]
    pub fn from_rdn(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            rdns: vec![RelativeDistinguishedName::new(attribute, value)],
        }
    }

    /// Returns the RDNs in order.
    #[must_use]
    pub fn rdns(&self) -> &[RelativeDistinguishedName] {
        &self.rdns
    }

    /// Looks up the value for the first attribute that matches `attribute` (case-insensitive).
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.rdns
            .iter()
            .find(|rdn| rdn.matches_attribute(attribute))
            .map(RelativeDistinguishedName::value)
    }

    /// Value of the leading RDN (e.g. the user name in `uid=jdoe,cn=users,...`).
    #[must_use]
    pub fn leaf_value(&self) -> Option<&str> {
        self.rdns.first().map(RelativeDistinguishedName::value)
    }

    /// Creates a new distinguished name by prefixing the provided RDN.
    #[must_use]
    pub fn with_prefix(mut self, rdn: RelativeDistinguishedName) -> Self {
        self.rdns.insert(0, rdn);
        self
    }

    /// Appends `suffix`, e.g. to place a container under the directory base DN.
    #[must_use]
    pub fn join(mut self, suffix: &DistinguishedName) -> Self {
        self.rdns.extend(suffix.rdns.iter().cloned());
        self
    }

    /// Returns true if `self` is located at or below `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &DistinguishedName) -> bool {
        if ancestor.rdns.len() > self.rdns.len() {
            return false;
        }
        let offset = self.rdns.len() - ancestor.rdns.len();
        self.rdns[offset..]
            .iter()
            .zip(&ancestor.rdns)
            .all(|(a, b)| {
                a.matches_attribute(&b.attribute) && a.value.eq_ignore_ascii_case(&b.value)
            })
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, rdn) in self.rdns.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rdn}")?;
        }
        Ok(())
    }
}

impl FromStr for DistinguishedName {
    type Err = DistinguishedNameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for DistinguishedName {
    type Error = DistinguishedNameError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        Self::parse(value)
    }
}

fn parse_rdn(
    component: &str,
) -> std::result::Result<RelativeDistinguishedName, DistinguishedNameError> {
    if split_unescaped(component, '+')?.len() > 1 {
        return Err(DistinguishedNameError::InvalidComponent(component.to_string()));
    }

    let idx = find_unescaped(component, '=')
        .ok_or_else(|| DistinguishedNameError::InvalidComponent(component.to_string()))?;
    let attribute = component[..idx].trim();
    let value = component[idx + 1..].trim();

    if attribute.is_empty() {
        return Err(DistinguishedNameError::MissingAttribute(component.to_string()));
    }
    if value.is_empty() {
        return Err(DistinguishedNameError::InvalidComponent(component.to_string()));
    }

    Ok(RelativeDistinguishedName::new(attribute, unescape(value)?))
}

/// Splits on `delimiter`, keeping escape sequences intact for the later unescape pass.
fn split_unescaped(
    input: &str,
    delimiter: char,
) -> std::result::Result<Vec<String>, DistinguishedNameError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let next = chars.next().ok_or(DistinguishedNameError::InvalidEscape)?;
            current.push(ch);
            current.push(next);
        } else if ch == delimiter {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    parts.push(current.trim().to_string());

    if parts.iter().any(String::is_empty) {
        return Err(DistinguishedNameError::InvalidComponent(input.to_string()));
    }
    Ok(parts)
}

fn find_unescaped(input: &str, needle: char) -> Option<usize> {
    let mut escaped = false;
    for (i, ch) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == needle {
            return Some(i);
        }
    }
    None
}

/// Resolves both `\,` style escapes and `\2c` hex pairs.
fn unescape(value: &str) -> std::result::Result<String, DistinguishedNameError> {
    let mut bytes = Vec::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let first = chars.next().ok_or(DistinguishedNameError::InvalidEscape)?;
        if first.is_ascii_hexdigit() && chars.peek().is_some_and(char::is_ascii_hexdigit) {
            let second = chars.next().ok_or(DistinguishedNameError::InvalidEscape)?;
            let pair = format!("{first}{second}");
            let byte =
                u8::from_str_radix(&pair, 16).map_err(|_| DistinguishedNameError::InvalidEscape)?;
            bytes.push(byte);
        } else {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(first.encode_utf8(&mut buf).as_bytes());
        }
    }

    String::from_utf8(bytes).map_err(|_| DistinguishedNameError::InvalidEscape)
}
