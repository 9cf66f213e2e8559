//! Helper macro for declaring port error enums.
//!
//! Each variant gets a snake_case constructor whose parameters accept
//! anything convertible into the field type. Variants tagged `as transient`
//! report `true` from the generated `is_transient`, which retrying callers
//! consult before trying again.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (@transient transient) => { true };
    (@transient) => { false };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:literal $( as $flag:ident )?
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Whether the failure may clear up if the call is repeated.
            #[must_use]
            pub const fn is_transient(&self) -> bool {
                match self {
                    $( Self::$variant { .. } => define_port_error!(@transient $($flag)?), )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for the generated constructors and classifiers.
    define_port_error! {
        pub enum StoreProbeError {
            Offline { message: String } => "store offline: {message}" as transient,
            Rejected { count: u32 } => "store rejected {count} rows",
            Mixed { message: String, count: u32 } => "mixed: {message} ({count})",
            Exhausted => "store exhausted",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = StoreProbeError::offline("socket closed");
        assert_eq!(err.to_string(), "store offline: socket closed");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = StoreProbeError::rejected(3_u32);
        assert_eq!(err.to_string(), "store rejected 3 rows");
    }

    #[test]
    fn constructors_support_mixed_and_unit_variants() {
        assert_eq!(
            StoreProbeError::mixed("partial", 2_u32).to_string(),
            "mixed: partial (2)"
        );
        assert_eq!(StoreProbeError::exhausted().to_string(), "store exhausted");
    }

    #[test]
    fn only_tagged_variants_are_transient() {
        assert!(StoreProbeError::offline("x").is_transient());
        assert!(!StoreProbeError::rejected(1_u32).is_transient());
        assert!(!StoreProbeError::mixed("x", 1_u32).is_transient());
        assert!(!StoreProbeError::exhausted().is_transient());
    }
}
