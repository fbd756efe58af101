//! Typed scalar decoders for FreeIPA attribute values.
//!
//! FreeIPA is inconsistent about how single-valued attributes are sent: depending on the
//! endpoint and object class the same attribute may arrive as a bare scalar, as a one-element
//! list, or not at all. Every wrapper in this module runs the same normalization first and then
//! decodes the remaining bare value for its kind:
//!
//! - `null`, a missing attribute or an empty list produce the wrapper's zero value
//! - a one-element list is unwrapped
//! - a bare scalar is decoded directly
//! - anything else (a list of several values, a type mismatch) is an error

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Key FreeIPA uses to tag DNS name values.
pub const DNS_NAME_TAG: &str = "__dns_name__";

/// Key FreeIPA uses to tag generalized-time values.
pub const DATETIME_TAG: &str = "__datetime__";

/// Generalized time layout used inside `__datetime__` values.
pub const DATETIME_FORMAT: &str = "%Y%m%d%H%M%SZ";

/// A scalar kind that can be decoded from a single, already-normalized JSON value.
pub trait IpaScalar: Sized + Default {
    /// Decodes the bare value.
    ///
    /// # Errors
    ///
    /// Returns a message describing the mismatch when the value is not of the expected kind.
    fn from_bare(value: Value) -> std::result::Result<Self, String>;
}

/// Collapses the server's scalar/singleton/null shapes into an optional bare value.
///
/// # Errors
///
/// Fails when the value is a list holding more than one element.
pub fn normalize(value: Value) -> std::result::Result<Option<Value>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Array(mut items) => match items.len() {
            0 => Ok(None),
            1 => Ok(items.pop().filter(|item| !item.is_null())),
            n => Err(format!("expected a single value, found a list of {n}")),
        },
        other => Ok(Some(other)),
    }
}

/// Normalizes and decodes a JSON value into the requested scalar kind.
///
/// # Errors
///
/// Returns the decoder message when the value has an unexpected shape.
pub fn decode_scalar<T: IpaScalar>(value: Value) -> std::result::Result<T, String> {
    match normalize(value)? {
        None => Ok(T::default()),
        Some(bare) => T::from_bare(bare),
    }
}

fn deserialize_scalar<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: IpaScalar,
{
    let value = Value::deserialize(deserializer)?;
    decode_scalar(value).map_err(de::Error::custom)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected}, found {}", describe(value))
}

/// Generates the common trait surface shared by the scalar wrappers.
macro_rules! ipa_scalar {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name($inner);

        impl $name {
            /// Wraps an already-decoded value.
            #[must_use]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Returns the wrapped value.
            #[must_use]
            pub fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserialize_scalar(deserializer)
            }
        }
    };
}

ipa_scalar!(
    /// String-valued attribute.
    IpaString(String)
);
ipa_scalar!(
    /// Integer-valued attribute. Numeric strings are accepted.
    IpaInt(i64)
);
ipa_scalar!(
    /// Boolean attribute. Accepts JSON booleans and the LDAP `TRUE`/`FALSE` strings.
    IpaBool(bool)
);
ipa_scalar!(
    /// Floating point attribute. Numeric strings are accepted.
    IpaFloat(f64)
);
ipa_scalar!(
    /// DNS name attribute, sent either as `{"__dns_name__": "..."}` or as a plain string.
    IpaDnsName(String)
);
ipa_scalar!(
    /// Generalized time attribute sent as `{"__datetime__": "20240131120000Z"}`.
    IpaDateTime(Option<DateTime<Utc>>)
);

impl IpaScalar for IpaString {
    fn from_bare(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::String(s) => Ok(Self(s)),
            other => Err(mismatch("a string", &other)),
        }
    }
}

impl IpaScalar for IpaInt {
    fn from_bare(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Self)
                .ok_or_else(|| format!("expected an integer, found {n}")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Self)
                .map_err(|err| format!("invalid integer `{s}`: {err}")),
            other => Err(mismatch("an integer", &other)),
        }
    }
}

impl IpaScalar for IpaBool {
    fn from_bare(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(Self(b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Self(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Self(false)),
            Value::String(s) => Err(format!("invalid boolean `{s}`")),
            other => Err(mismatch("a boolean", &other)),
        }
    }
}

impl IpaScalar for IpaFloat {
    fn from_bare(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Self)
                .ok_or_else(|| format!("expected a float, found {n}")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Self)
                .map_err(|err| format!("invalid float `{s}`: {err}")),
            other => Err(mismatch("a float", &other)),
        }
    }
}

impl IpaScalar for IpaDnsName {
    fn from_bare(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::String(s) => Ok(Self(s)),
            Value::Object(mut map) => match map.remove(DNS_NAME_TAG) {
                Some(Value::String(s)) => Ok(Self(s)),
                Some(other) => Err(mismatch("a DNS name string", &other)),
                None => Err(format!("object without `{DNS_NAME_TAG}` key")),
            },
            other => Err(mismatch("a DNS name", &other)),
        }
    }
}

impl IpaScalar for IpaDateTime {
    fn from_bare(value: Value) -> std::result::Result<Self, String> {
        let raw = match value {
            Value::String(s) => s,
            Value::Object(mut map) => match map.remove(DATETIME_TAG) {
                Some(Value::String(s)) => s,
                Some(other) => return Err(mismatch("a datetime string", &other)),
                None => return Err(format!("object without `{DATETIME_TAG}` key")),
            },
            other => return Err(mismatch("a datetime", &other)),
        };

        NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT)
            .map(|naive| Self(Some(naive.and_utc())))
            .map_err(|err| format!("invalid generalized time `{raw}`: {err}"))
    }
}

impl IpaString {
    /// Borrows the string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the attribute was absent or empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IpaDnsName {
    /// Borrows the DNS name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the name is fully qualified (ends with a dot).
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.0.ends_with('.')
    }
}

impl IpaInt {
    /// Returns the integer value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl IpaBool {
    /// Returns the boolean value.
    #[must_use]
    pub const fn value(&self) -> bool {
        self.0
    }
}

impl IpaFloat {
    /// Returns the float value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }
}

impl IpaDateTime {
    /// Returns the timestamp, if the attribute was present.
    #[must_use]
    pub const fn value(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}

impl From<&str> for IpaString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for IpaDnsName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<str> for IpaString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for IpaString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<&str> for IpaDnsName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for IpaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for IpaDnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for IpaInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Outgoing values are sent bare; the server accepts plain strings for DNS names.
impl Serialize for IpaString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl Serialize for IpaDnsName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl Serialize for IpaInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl Serialize for IpaBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.0)
    }
}

impl Serialize for IpaFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl Serialize for IpaDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Some(ts) => serializer.serialize_str(&ts.format(DATETIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn decode<T: IpaScalar>(value: Value) -> std::result::Result<T, String> {
        decode_scalar(value)
    }

    #[test]
    fn string_shapes_agree() {
        let bare: IpaString = decode(json!("admins")).unwrap();
        let listed: IpaString = decode(json!(["admins"])).unwrap();
        let null: IpaString = decode(Value::Null).unwrap();

        assert_eq!(bare, listed);
        assert_eq!(bare, "admins");
        assert!(null.is_empty());
    }

    #[test]
    fn int_accepts_numbers_and_numeric_strings() {
        let bare: IpaInt = decode(json!(3600)).unwrap();
        let listed: IpaInt = decode(json!(["3600"])).unwrap();
        let null: IpaInt = decode(json!(null)).unwrap();

        assert_eq!(bare.value(), 3600);
        assert_eq!(bare, listed);
        assert_eq!(null.value(), 0);
    }

    #[test]
    fn bool_accepts_ldap_strings() {
        assert!(decode::<IpaBool>(json!(true)).unwrap().value());
        assert!(decode::<IpaBool>(json!(["TRUE"])).unwrap().value());
        assert!(!decode::<IpaBool>(json!("False")).unwrap().value());
        assert!(!decode::<IpaBool>(Value::Null).unwrap().value());
        assert!(decode::<IpaBool>(json!("yes")).is_err());
    }

    #[test]
    fn float_shapes_agree() {
        let bare: IpaFloat = decode(json!(12.5)).unwrap();
        let listed: IpaFloat = decode(json!(["12.5"])).unwrap();
        assert_eq!(bare, listed);
        assert_eq!(decode::<IpaFloat>(Value::Null).unwrap().value(), 0.0);
    }

    #[test]
    fn dns_name_accepts_tagged_object() {
        let tagged: IpaDnsName = decode(json!([{ "__dns_name__": "example.com." }])).unwrap();
        let plain: IpaDnsName = decode(json!("example.com.")).unwrap();

        assert_eq!(tagged, plain);
        assert!(tagged.is_absolute());
        assert!(decode::<IpaDnsName>(json!({ "name": "x" })).is_err());
    }

    #[test]
    fn datetime_parses_generalized_time() {
        let ts: IpaDateTime = decode(json!([{ "__datetime__": "20240131120000Z" }])).unwrap();
        assert_eq!(
            ts.value(),
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap())
        );
        assert_eq!(decode::<IpaDateTime>(Value::Null).unwrap().value(), None);
    }

    #[test]
    fn multi_element_list_is_rejected() {
        let err = decode::<IpaString>(json!(["a", "b"])).unwrap_err();
        assert!(err.contains("list of 2"));
        assert!(decode::<IpaInt>(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn type_mismatch_is_rejected() {
        assert!(decode::<IpaString>(json!(42)).is_err());
        assert!(decode::<IpaInt>(json!("forty-two")).is_err());
        assert!(decode::<IpaInt>(json!(true)).is_err());
        assert!(decode::<IpaString>(json!([["nested"]])).is_err());
    }

    #[test]
    fn serde_deserialize_uses_normalization() {
        #[derive(Debug, Deserialize)]
        struct Row {
            cn: IpaString,
            #[serde(default)]
            gidnumber: IpaInt,
        }

        let row: Row = serde_json::from_value(json!({ "cn": ["editors"] })).unwrap();
        assert_eq!(row.cn, "editors");
        assert_eq!(row.gidnumber.value(), 0);

        let err = serde_json::from_value::<Row>(json!({ "cn": ["a", "b"] })).unwrap_err();
        assert!(err.to_string().contains("expected a single value"));
    }

    #[test]
    fn serializes_bare_values() {
        assert_eq!(
            serde_json::to_value(IpaDnsName::from("ns1.example.com.")).unwrap(),
            json!("ns1.example.com.")
        );
        assert_eq!(serde_json::to_value(IpaInt::new(86400)).unwrap(), json!(86400));
    }
}
