//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// The database hands out UUID strings for printings and orders, but the
/// REST function never promises a format, so IDs are kept opaque.
///
/// # Example
///
/// ```rust
/// # use manavault_core::define_id;
/// define_id!(PrintingId);
/// define_id!(OrderId);
///
/// let printing_id = PrintingId::new("a1");
/// let order_id = OrderId::new("a1");
///
/// // These are different types, so this won't compile:
/// // let _: PrintingId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
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
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(PrintingId);
define_id!(OracleId);
define_id!(OrderId);
define_id!(UserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_matches_inner() {
        let id = PrintingId::new("3f2a-foil");
        assert_eq!(id.to_string(), "3f2a-foil");
        assert_eq!(id.as_str(), "3f2a-foil");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = OracleId::from("oracle-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"oracle-1\"");

        let back: OracleId = serde_json::from_str("\"oracle-1\"").unwrap();
        assert_eq!(back, id);
    }
}
