//! Newtype keys for type-safe identities.
//!
//! Use the `define_key!` macro to create validated string wrappers that
//! prevent mixing a product identity with a customer identity, and that make
//! an empty identity unrepresentable.

use thiserror::Error;

/// An identity string failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The identity was empty or contained only whitespace.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Macro to define a validated string key.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` routed through validation (`try_from = "String"`)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()` which trims input and rejects empty values, and `as_str()`
/// - `Display`, `AsRef<str>`, `TryFrom<String>` and `Into<String>`
///
/// # Example
///
/// ```rust
/// # use trendcart_core::define_key;
/// define_key!(SkuCode);
///
/// assert!(SkuCode::parse("   ").is_err());
/// assert_eq!(SkuCode::parse(" sku-1 ").map(|k| k.to_string()), Ok("sku-1".to_string()));
/// ```
#[macro_export]
macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse a key, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns `IdentityError::Empty` if nothing remains after trimming.
            pub fn parse(value: &str) -> ::core::result::Result<Self, $crate::IdentityError> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err($crate::IdentityError::Empty(stringify!($name)));
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::IdentityError;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> Self {
                key.0
            }
        }
    };
}

define_key!(
    /// Cart identity of a product, taken from the catalog slug.
    ProductSlug
);
define_key!(
    /// Identity of a signed-in customer as reported by the auth provider.
    CustomerId
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let slug = ProductSlug::parse("  chair-01 ").unwrap();
        assert_eq!(slug.as_str(), "chair-01");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(
            ProductSlug::parse(""),
            Err(IdentityError::Empty("ProductSlug"))
        );
        assert!(ProductSlug::parse(" \t\n").is_err());
        assert!(CustomerId::parse("").is_err());
    }

    #[test]
    fn test_error_names_the_key() {
        let err = CustomerId::parse("").unwrap_err();
        assert_eq!(err.to_string(), "CustomerId must not be empty");
    }

    #[test]
    fn test_deserialize_validates() {
        let slug: ProductSlug = serde_json::from_str("\"lamp\"").unwrap();
        assert_eq!(slug.to_string(), "lamp");

        assert!(serde_json::from_str::<ProductSlug>("\"\"").is_err());
        assert!(serde_json::from_str::<ProductSlug>("\"   \"").is_err());
    }

    #[test]
    fn test_serialize_is_transparent() {
        let slug = ProductSlug::parse("sofa").unwrap();
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"sofa\"");
    }
}
