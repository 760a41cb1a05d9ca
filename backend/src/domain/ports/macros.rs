//! Helper macro for declaring port error enums.
//!
//! Each variant gains a snake_case constructor whose fields accept
//! `impl Into<T>`, so adapters can write `AllocationStoreError::query("...")`.

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
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
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
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum LookupError {
            Unreachable => "lookup target unreachable",
            Refused { message: String } => "lookup refused: {message}",
            Throttled { retry_after: u32 } => "throttled for {retry_after}s",
            Partial { message: String, missing: u32 } => "partial: {message} ({missing} missing)",
        }
    }

    #[test]
    fn unit_variants_get_zero_argument_constructors() {
        assert_eq!(LookupError::unreachable(), LookupError::Unreachable);
        assert_eq!(LookupError::unreachable().to_string(), "lookup target unreachable");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = LookupError::refused("locked");
        assert_eq!(err.to_string(), "lookup refused: locked");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = LookupError::throttled(30_u32);
        assert_eq!(err, LookupError::Throttled { retry_after: 30 });
    }

    #[test]
    fn mixed_fields_render_in_order() {
        let err = LookupError::partial("snapshot", 2_u32);
        assert_eq!(err.to_string(), "partial: snapshot (2 missing)");
    }
}
