//! Serde helpers for CSL attribute values.
//!
//! Inside flattened structs every attribute arrives as a string, so booleans,
//! integers and lists are decoded by hand here.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrBool {
    Bool(bool),
    String(String),
}

impl StringOrBool {
    fn into_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::String(s) => s.trim().eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrUnsigned {
    Unsigned(u32),
    String(String),
}

pub fn deserialize_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    StringOrBool::deserialize(deserializer).map(StringOrBool::into_bool)
}

pub fn deserialize_bool_option<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    let res = Option::<StringOrBool>::deserialize(deserializer)?;
    Ok(res.map(StringOrBool::into_bool))
}

pub fn deserialize_u32_option<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    let res = Option::<StringOrUnsigned>::deserialize(deserializer)?;
    res.map(|s| match s {
        StringOrUnsigned::Unsigned(u) => Ok(u),
        StringOrUnsigned::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    })
    .transpose()
}

/// Split a whitespace-separated attribute such as `variable="editor translator"`.
pub fn deserialize_space_separated<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let s = String::deserialize(deserializer)?;
    Ok(s.split_whitespace().map(str::to_owned).collect())
}

/// Collect every child element called `tag` in document order.
///
/// Meant for `#[serde(flatten, deserialize_with = "...")]` fields: a flattened
/// field sees the buffered entries of its parent element as a map, where each
/// child element is one entry keyed by its tag name.
pub(crate) fn collect_children<'de, D, T>(
    deserializer: D,
    tag: &'static str,
) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct ChildVisitor<T> {
        tag: &'static str,
        marker: PhantomData<T>,
    }

    impl<'de, T: Deserialize<'de>> Visitor<'de> for ChildVisitor<T> {
        type Value = Vec<T>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a list of <{}> elements", self.tag)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut children = Vec::new();
            while let Some(key) = map.next_key::<String>()? {
                if key == self.tag {
                    children.push(map.next_value()?);
                } else {
                    map.next_value::<IgnoredAny>()?;
                }
            }
            Ok(children)
        }
    }

    deserializer.deserialize_map(ChildVisitor { tag, marker: PhantomData })
}
