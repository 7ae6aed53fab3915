//! Newtype IDs for type-safe entity references.
//!
//! Upstream systems hand us opaque string identifiers (hex object ids, carrier
//! labels). Use the `define_id!` macro to create wrappers that prevent
//! accidentally passing a shop id where an order id is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Default`
/// - Conversion methods: `new()`, `as_str()`, `is_empty()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use shipgate_core::define_id;
/// define_id!(WarehouseId);
///
/// let id = WarehouseId::new("wh-01");
/// assert_eq!(id.as_str(), "wh-01");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Default,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the id is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(ShopId);
define_id!(OrderId);
define_id!(ShipmentLabel);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_is_raw_string() {
        let id = OrderId::new("5a5f04ba50254980160008a0");
        assert_eq!(id.to_string(), "5a5f04ba50254980160008a0");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let label = ShipmentLabel::new("S264232.MN1.B5.47744801");
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, "\"S264232.MN1.B5.47744801\"");

        let back: ShipmentLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, label);
    }

    #[test]
    fn test_default_id_is_empty() {
        assert!(ShopId::default().is_empty());
        assert!(!UserId::from("u1").is_empty());
    }
}
