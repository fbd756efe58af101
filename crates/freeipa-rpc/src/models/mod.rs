//! Typed FreeIPA entries.
//!
//! Every attribute is decoded on its own with the scalar rules from [`freeipa_core::types`],
//! so a malformed value is reported as [`Error::Decoding`] naming the attribute. Missing or
//! `null` attributes decode to their zero value.

use crate::Result;
use freeipa_core::Error;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Decoding from the attribute map FreeIPA returns in `result.result`.
pub trait FromAttributes: Sized {
    /// Decode from an attribute map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decoding`] naming the first attribute that has an unexpected shape.
    fn from_attributes(attributes: &Map<String, Value>) -> Result<Self>;

    /// Decode from a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decoding`] if `value` is not an object or an attribute is malformed.
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(attributes) => Self::from_attributes(&attributes),
            other => Err(Error::decoding(
                "<entry>",
                format!("expected an object, found {other}"),
            )),
        }
    }
}

/// Decodes `name` from `attributes`, yielding the zero value when it is absent or null.
pub(crate) fn decode_field<T>(attributes: &Map<String, Value>, name: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match attributes.get(name) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => <T as Deserialize>::deserialize(value)
            .map_err(|err| Error::decoding(name, err.to_string())),
    }
}

/// Declares an entry struct whose fields are bound to FreeIPA attribute names.
macro_rules! ipa_entity {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                pub $field:ident: $ty:ty => $attr:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(rename = $attr)]
                pub $field: $ty,
            )*
        }

        impl $name {
            /// FreeIPA attribute names decoded into this entry.
            pub const ATTRIBUTES: &'static [&'static str] = &[$($attr),*];
        }

        impl $crate::models::FromAttributes for $name {
            fn from_attributes(
                attributes: &serde_json::Map<String, serde_json::Value>,
            ) -> $crate::Result<Self> {
                Ok(Self {
                    $($field: $crate::models::decode_field(attributes, $attr)?,)*
                })
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let attributes =
                    <serde_json::Map<String, serde_json::Value> as serde::Deserialize>::deserialize(
                        deserializer,
                    )?;
                <Self as $crate::models::FromAttributes>::from_attributes(&attributes)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

mod dns_record;
mod dns_zone;
mod group;
mod user;

pub use dns_record::DnsRecord;
pub use dns_zone::DnsZone;
pub use group::Group;
pub use user::User;

#[cfg(test)]
mod tests {
    use super::*;
    use freeipa_core::{IpaBool, IpaInt, IpaString};
    use serde_json::json;

    ipa_entity! {
        /// Minimal entry used to exercise the macro.
        pub struct Sample {
            pub name: IpaString => "cn",
            pub size: IpaInt => "size",
            pub enabled: IpaBool => "enabled",
            pub tags: Vec<String> => "tags",
        }
    }

    #[test]
    fn decodes_each_field_with_scalar_rules() {
        let sample = Sample::from_value(json!({
            "cn": ["sample"],
            "size": "42",
            "enabled": ["TRUE"],
            "tags": ["a", "b"]
        }))
        .unwrap();
        assert_eq!(sample.name, "sample");
        assert_eq!(sample.size.value(), 42);
        assert!(sample.enabled.value());
        assert_eq!(sample.tags, vec!["a", "b"]);
    }

    #[test]
    fn absent_and_null_attributes_are_zero_values() {
        let sample = Sample::from_value(json!({"size": null, "tags": null})).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn decoding_error_names_the_attribute() {
        let err = Sample::from_value(json!({"cn": ["sample"], "size": ["1", "2"]})).unwrap_err();
        match err {
            Error::Decoding { field, .. } => assert_eq!(field, "size"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_entry_is_rejected() {
        let err = Sample::from_value(json!(["cn", "sample"])).unwrap_err();
        assert!(matches!(err, Error::Decoding { ref field, .. } if field == "<entry>"));
    }

    #[test]
    fn deserialize_goes_through_attribute_decoding() {
        let sample: Sample = serde_json::from_value(json!({"cn": "sample", "size": [7]})).unwrap();
        assert_eq!(sample.name, "sample");
        assert_eq!(sample.size.value(), 7);
        assert_eq!(Sample::ATTRIBUTES, &["cn", "size", "enabled", "tags"]);
    }
}
