//! Typed attribute keys.
//!
//! An [`Attr<T>`] names an attribute and fixes the Rust type its values are
//! read as. The conversion lives in [`AttrType`], implemented once per value
//! shape, so every attribute of every entry kind shares the same getter and
//! setter logic.

use super::value;
use crate::schema::AttributeType;
use chrono::{DateTime, Utc};
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

/// A Rust type that attribute values convert to and from.
pub trait AttrType: Sized {
    /// Schema type this Rust type is normally declared with.
    const ATTRIBUTE_TYPE: AttributeType;
    /// Whether the attribute holds a list of values.
    const MULTI_VALUED: bool = false;

    /// What a getter returns, including the unset default.
    type Read;

    /// Convert stored values (`None` when unset) into the read type.
    fn read(values: Option<&[String]>) -> Self::Read;

    /// Convert a value into its stored strings.
    fn write(&self) -> Vec<String>;

    /// Whether an attribute declared with `declared` can be read as this type.
    fn accepts(declared: AttributeType) -> bool {
        declared == Self::ATTRIBUTE_TYPE
    }
}

fn first(values: Option<&[String]>) -> Option<&str> {
    values.and_then(|v| v.first()).map(String::as_str)
}

impl AttrType for String {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::String;
    type Read = Option<String>;

    fn read(values: Option<&[String]>) -> Option<String> {
        first(values).map(str::to_string)
    }

    fn write(&self) -> Vec<String> {
        vec![self.clone()]
    }

    fn accepts(declared: AttributeType) -> bool {
        declared.is_textual()
    }
}

impl AttrType for bool {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Boolean;
    type Read = bool;

    fn read(values: Option<&[String]>) -> bool {
        first(values).and_then(value::parse_bool).unwrap_or(false)
    }

    fn write(&self) -> Vec<String> {
        vec![value::format_bool(*self).to_string()]
    }
}

impl AttrType for i32 {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Integer;
    type Read = i32;

    fn read(values: Option<&[String]>) -> i32 {
        first(values)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(-1)
    }

    fn write(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl AttrType for i64 {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Long;
    type Read = i64;

    fn read(values: Option<&[String]>) -> i64 {
        first(values).and_then(value::parse_long).unwrap_or(-1)
    }

    fn write(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl AttrType for Vec<String> {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::String;
    const MULTI_VALUED: bool = true;
    type Read = Vec<String>;

    fn read(values: Option<&[String]>) -> Vec<String> {
        values.map(<[String]>::to_vec).unwrap_or_default()
    }

    fn write(&self) -> Vec<String> {
        self.clone()
    }

    fn accepts(_declared: AttributeType) -> bool {
        true
    }
}

impl AttrType for DateTime<Utc> {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::GeneralizedTime;
    type Read = Option<DateTime<Utc>>;

    fn read(values: Option<&[String]>) -> Option<DateTime<Utc>> {
        first(values).and_then(value::parse_generalized_time)
    }

    fn write(&self) -> Vec<String> {
        vec![value::format_generalized_time(self)]
    }
}

impl AttrType for Duration {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Duration;
    type Read = Option<Duration>;

    fn read(values: Option<&[String]>) -> Option<Duration> {
        first(values)
            .and_then(value::parse_time_interval)
            .and_then(|millis| u64::try_from(millis).ok())
            .map(Duration::from_millis)
    }

    fn write(&self) -> Vec<String> {
        let millis = i64::try_from(self.as_millis()).unwrap_or(i64::MAX);
        vec![value::format_time_interval(millis)]
    }
}

/// Typed key of one attribute.
pub struct Attr<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Attr<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Attr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Attr<T> {}

impl<T> fmt::Debug for Attr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Attr").field(&self.name).finish()
    }
}

impl<T> fmt::Display for Attr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl<T> AsRef<str> for Attr<T> {
    fn as_ref(&self) -> &str {
        self.name
    }
}

/// Static description of a typed key, used to check keys against the schema.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredAttr {
    pub name: &'static str,
    pub multi_valued: bool,
    pub accepts: fn(AttributeType) -> bool,
    pub enum_values: &'static [&'static str],
}

/// Values a typed key may hold when it is an enum; empty otherwise.
pub trait EnumValues {
    const VALUES: &'static [&'static str] = &[];
}

impl EnumValues for String {}
impl EnumValues for bool {}
impl EnumValues for i32 {}
impl EnumValues for i64 {}
impl EnumValues for Vec<String> {}
impl EnumValues for DateTime<Utc> {}
impl EnumValues for Duration {}

/// Declares typed attribute keys and a `declared()` listing of them.
macro_rules! attributes {
    ($($(#[$meta:meta])* $ident:ident: $ty:ty = $name:literal,)*) => {
        $(
            $(#[$meta])*
            pub const $ident: Attr<$ty> = Attr::new($name);
        )*

        /// Every typed key declared in this module.
        pub fn declared() -> Vec<DeclaredAttr> {
            vec![$(DeclaredAttr {
                name: $name,
                multi_valued: <$ty as AttrType>::MULTI_VALUED,
                accepts: <$ty as AttrType>::accepts,
                enum_values: <$ty as EnumValues>::VALUES,
            },)*]
        }
    };
}

pub(crate) use attributes;
