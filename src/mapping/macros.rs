/// Implement [`Describable`](crate::mapping::Describable) and the host value
/// conversions for a plain struct.
///
/// Each listed field becomes a readable and writable attribute named after
/// the field. The type name defaults to the struct name.
///
/// ```
/// use odata_connector::describable;
///
/// #[derive(Debug, Default, Clone)]
/// struct Widget {
///     name: String,
///     price: f64,
///     tags: Vec<String>,
/// }
///
/// describable!(Widget { name, price, tags });
///
/// #[derive(Debug, Default, Clone)]
/// struct Order {
///     id: i32,
/// }
///
/// describable!(Order as "SalesOrder", { id });
/// ```
#[macro_export]
macro_rules! describable {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        $crate::describable!($ty as ::std::stringify!($ty), { $($field),* });
    };
    ($ty:ident as $type_name:expr, { $($field:ident),* $(,)? }) => {
        impl $crate::mapping::Describable for $ty {
            const TYPE_NAME: &'static str = $type_name;

            fn attributes() -> ::std::vec::Vec<$crate::mapping::Attribute<Self>> {
                ::std::vec![$(
                    $crate::mapping::Attribute::new(
                        ::std::stringify!($field),
                        |object: &Self| {
                            ::std::result::Result::Ok(
                                $crate::mapping::ToHostValue::to_host_value(&object.$field),
                            )
                        },
                        |object: &mut Self, value: $crate::mapping::HostValue| {
                            object.$field = $crate::mapping::FromHostValue::from_host_value(value)?;
                            ::std::result::Result::Ok(())
                        },
                    )
                ),*]
            }
        }

        impl $crate::mapping::ToHostValue for $ty {
            fn to_host_value(&self) -> $crate::mapping::HostValue {
                $crate::mapping::HostValue::Object(::std::boxed::Box::new(
                    ::std::clone::Clone::clone(self),
                ))
            }
        }

        impl $crate::mapping::FromHostValue for $ty {
            fn from_host_value(
                value: $crate::mapping::HostValue,
            ) -> ::std::result::Result<Self, $crate::mapping::AccessError> {
                $crate::mapping::populate(value)
            }
        }
    };
}
