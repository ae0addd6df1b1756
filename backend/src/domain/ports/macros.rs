//! Helper macro for declaring port error enums.
//!
//! Every outbound port speaks its own small error vocabulary; this macro cuts
//! the boilerplate of deriving `thiserror::Error` and writing `Into`-friendly
//! constructors for each variant.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    pub fn [<$variant:snake>]($($($field: impl Into<$ty>),*)?) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for the generated error constructors.
    define_port_error! {
        pub enum SamplePortError {
            Connection { message: String } => "connection failed: {message}",
            Duplicate { name: String } => "duplicate entry: {name}",
            Gone => "record gone",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = SamplePortError::connection("refused");
        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn unit_variants_get_argless_constructors() {
        assert_eq!(SamplePortError::gone().to_string(), "record gone");
    }

    #[test]
    fn display_interpolates_fields() {
        let err = SamplePortError::duplicate("admin");
        assert_eq!(err.to_string(), "duplicate entry: admin");
    }
}
