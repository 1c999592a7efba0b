//! Entities hydrated from declared field schemas.
//!
//! An entity is a `Default` struct whose source-backed fields are
//! `Option<Lazy<T>>`. Its schema is declared next to the type with
//! [`entity_schema!`](crate::entity_schema), which generates the
//! [`Entity`] implementation; no runtime type introspection is involved.

use hydrate_types::FieldSchema;
use serde_json::Value;

use crate::error::HydrateError;
use crate::lazy::Lazy;

/// A type that can be populated by the [`Hydrator`](crate::Hydrator).
pub trait Entity: Default {
    /// Short type name used in logs and errors.
    fn entity_name() -> &'static str;

    /// Schema-level descriptors for every source-backed field.
    fn schema() -> &'static [FieldSchema];

    /// Assign `holder` to the field named `field`.
    ///
    /// # Errors
    ///
    /// Returns [`HydrateError::UnknownField`] when `field` is not part of the schema.
    fn bind(&mut self, field: &str, holder: Lazy<Value>) -> Result<(), HydrateError>;
}

/// Implement [`Entity`] for a struct from a list of `field: Type => descriptor` lines.
///
/// Each listed field must be declared on the struct as `Option<Lazy<Type>>`.
/// Fields left out of the list are not touched by hydration.
///
/// ```rust
/// use hydrate_engine::{Lazy, entity_schema};
/// use hydrate_types::FieldDescriptor;
///
/// #[derive(Debug, Default)]
/// struct Account {
///     email: Option<Lazy<String>>,
///     note: Option<String>,
/// }
///
/// entity_schema! {
///     Account {
///         email: String => FieldDescriptor::contact("Email"),
///     }
/// }
/// ```
#[macro_export]
macro_rules! entity_schema {
    ($entity:ident { $($field:ident : $ty:ty => $descriptor:expr),+ $(,)? }) => {
        impl $crate::Entity for $entity {
            fn entity_name() -> &'static str {
                stringify!($entity)
            }

            fn schema() -> &'static [$crate::__private::FieldSchema] {
                const SCHEMA: &[$crate::__private::FieldSchema] = &[
                    $($crate::__private::FieldSchema::new(stringify!($field), $descriptor)),+
                ];
                SCHEMA
            }

            fn bind(
                &mut self,
                field: &str,
                holder: $crate::Lazy<$crate::__private::Value>,
            ) -> ::std::result::Result<(), $crate::HydrateError> {
                $(
                    if field == stringify!($field) {
                        self.$field = ::std::option::Option::Some(holder.typed::<$ty>(stringify!($field)));
                        return ::std::result::Result::Ok(());
                    }
                )+
                ::std::result::Result::Err($crate::HydrateError::unknown_field(stringify!($entity), field))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrate_types::{FieldDescriptor, SourceKind};
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Profile {
        email: Option<Lazy<String>>,
        region: Option<Lazy<String>>,
        nickname: Option<String>,
    }

    entity_schema! {
        Profile {
            email: String => FieldDescriptor::contact("Email"),
            region: String => FieldDescriptor::Business { record_key: None },
        }
    }

    #[test]
    fn schema_lists_declared_fields_in_order() {
        let schema = Profile::schema();
        assert_eq!(Profile::entity_name(), "Profile");
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0].name, "email");
        assert_eq!(schema[0].record_key(), "Email");
        assert_eq!(schema[1].name, "region");
        assert_eq!(schema[1].record_key(), "region");
        assert_eq!(schema[1].descriptor.source_kind(), SourceKind::Business);
    }

    #[test]
    fn bind_assigns_typed_holder() {
        let mut profile = Profile::default();
        profile.bind("email", Lazy::new(|| Ok(json!("a@b.c")))).unwrap();

        let email = profile.email.as_ref().expect("email bound");
        assert_eq!(email.value().unwrap(), "a@b.c");
        assert!(profile.region.is_none());
        assert!(profile.nickname.is_none());
    }

    #[test]
    fn bind_rejects_unknown_fields() {
        let mut profile = Profile::default();
        let error = profile.bind("nickname", Lazy::new(|| Ok(json!("x")))).unwrap_err();
        assert!(matches!(error, HydrateError::UnknownField { entity: "Profile", .. }));
    }
}
