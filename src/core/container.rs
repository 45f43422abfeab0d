// Read-only view of a hierarchical container (groups, datasets, attributes)

use crate::core::constants::PATH_SEPARATOR;
use crate::core::error::Result;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Dataset,
    /// Anything else the binding can see (named datatypes, dangling links, ...).
    Other(String),
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Group => write!(f, "group"),
            NodeKind::Dataset => write!(f, "dataset"),
            NodeKind::Other(label) => write!(f, "{label}"),
        }
    }
}

/// Attribute value as exposed by a container binding.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    TextArray(Vec<String>),
    /// Present, but of a type the binding has no mapping for.
    Opaque(String),
}

impl AttrValue {
    /// Non-negative integer, accepting integral floats and one-element arrays.
    pub fn as_non_negative_integer(&self) -> Option<usize> {
        match self {
            AttrValue::Int(v) => usize::try_from(*v).ok(),
            AttrValue::Float(v) => integral_float(*v),
            AttrValue::IntArray(v) if v.len() == 1 => usize::try_from(v[0]).ok(),
            AttrValue::FloatArray(v) if v.len() == 1 => integral_float(v[0]),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::TextArray(v) if v.len() == 1 => Some(&v[0]),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Text(s) => write!(f, "'{s}'"),
            AttrValue::IntArray(v) => write!(f, "{v:?}"),
            AttrValue::FloatArray(v) => write!(f, "{v:?}"),
            AttrValue::TextArray(v) => write!(f, "{v:?}"),
            AttrValue::Opaque(kind) => write!(f, "<{kind}>"),
        }
    }
}

fn integral_float(v: f64) -> Option<usize> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < usize::MAX as f64 {
        Some(v as usize)
    } else {
        None
    }
}

/// Dataset contents: numbers and strings nested to any depth.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue {
    Number(f64),
    Text(String),
    List(Vec<ArrayValue>),
}

impl ArrayValue {
    pub fn as_list(&self) -> Option<&[ArrayValue]> {
        match self {
            ArrayValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            ArrayValue::Number(v) => format!("scalar {v}"),
            ArrayValue::Text(s) => format!("string '{s}'"),
            ArrayValue::List(items) => format!("array of {} element(s)", items.len()),
        }
    }
}

/// Capability a container binding must provide. Handles are cheap values
/// (references or ids), so children are returned by value.
pub trait ContainerNode: Sized {
    fn kind(&self) -> NodeKind;

    fn children(&self) -> Result<Vec<(String, Self)>>;

    fn attribute(&self, key: &str) -> Option<AttrValue>;

    fn to_array(&self) -> Result<ArrayValue>;

    fn child(&self, name: &str) -> Result<Option<Self>> {
        Ok(self
            .children()?
            .into_iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, node)| node))
    }

    /// Walks a slash-separated path relative to this node. Leading and
    /// repeated separators are ignored.
    fn lookup(&self, path: &str) -> Result<Option<Self>>
    where
        Self: Clone,
    {
        let mut current = self.clone();
        for segment in path.split(PATH_SEPARATOR).filter(|s| !s.is_empty()) {
            match current.child(segment)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative_integer() {
        assert_eq!(AttrValue::Int(4).as_non_negative_integer(), Some(4));
        assert_eq!(AttrValue::Int(-1).as_non_negative_integer(), None);
        assert_eq!(AttrValue::Float(3.0).as_non_negative_integer(), Some(3));
        assert_eq!(AttrValue::Float(3.5).as_non_negative_integer(), None);
        assert_eq!(AttrValue::Float(f64::NAN).as_non_negative_integer(), None);
        // 2^64 would saturate to usize::MAX
        assert_eq!(AttrValue::Float(1.8446744073709552e19).as_non_negative_integer(), None);
        assert_eq!(AttrValue::IntArray(vec![7]).as_non_negative_integer(), Some(7));
        assert_eq!(AttrValue::IntArray(vec![7, 8]).as_non_negative_integer(), None);
        assert_eq!(AttrValue::Text("4".into()).as_non_negative_integer(), None);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(AttrValue::Text("time".into()).as_text(), Some("time"));
        assert_eq!(
            AttrValue::TextArray(vec!["freq".into()]).as_text(),
            Some("freq")
        );
        assert_eq!(AttrValue::Int(0).as_text(), None);
    }
}
