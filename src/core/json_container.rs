// JSON rendering of a container tree, read into memory up front

use crate::core::compression::{decompress, CompressionType};
use crate::core::container::{ArrayValue, AttrValue, ContainerNode, NodeKind};
use crate::core::error::{Result, WaveformError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

fn default_kind() -> String {
    "group".to_string()
}

/// One node of the tree. Groups carry `children`, datasets carry `value`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonNode {
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub children: BTreeMap<String, JsonNode>,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct JsonContainer {
    path: PathBuf,
    root: JsonNode,
}

impl JsonContainer {
    /// Reads and parses the whole file; the OS handle is closed before this returns.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = std::fs::read(&path)?;
        let compression = CompressionType::from_path(&path);
        let data = decompress(&raw, compression)?;

        debug!(
            "Read container {} ({} bytes, {:?}, {} bytes decoded)",
            path.display(),
            raw.len(),
            compression,
            data.len()
        );

        let root = serde_json::from_slice(&data)?;
        Ok(Self { path, root })
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(Self {
            path: PathBuf::new(),
            root: serde_json::from_slice(data)?,
        })
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(Self {
            path: PathBuf::new(),
            root: serde_json::from_value(value)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &JsonNode {
        &self.root
    }
}

impl<'a> ContainerNode for &'a JsonNode {
    fn kind(&self) -> NodeKind {
        match self.kind.as_str() {
            "group" => NodeKind::Group,
            "dataset" => NodeKind::Dataset,
            other => NodeKind::Other(other.to_string()),
        }
    }

    fn children(&self) -> Result<Vec<(String, Self)>> {
        let node: &'a JsonNode = *self;
        Ok(node
            .children
            .iter()
            .map(|(name, node)| (name.clone(), node))
            .collect())
    }

    fn attribute(&self, key: &str) -> Option<AttrValue> {
        self.attributes.get(key).map(json_to_attr)
    }

    fn to_array(&self) -> Result<ArrayValue> {
        if self.kind() != NodeKind::Dataset {
            return Err(WaveformError::invalid(format!(
                "a {} cannot be read as an array",
                self.kind()
            )));
        }
        let value = self
            .value
            .as_ref()
            .ok_or_else(|| WaveformError::invalid("dataset has no value"))?;
        json_to_array(value)
    }
}

fn json_to_attr(value: &Value) -> AttrValue {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttrValue::Int(i),
            None => AttrValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => AttrValue::Text(s.clone()),
        // h5py stores booleans as an int8 enum
        Value::Bool(b) => AttrValue::Int(i64::from(*b)),
        Value::Array(items) => json_array_to_attr(items),
        Value::Null => AttrValue::Opaque("null".to_string()),
        Value::Object(_) => AttrValue::Opaque("object".to_string()),
    }
}

fn json_array_to_attr(items: &[Value]) -> AttrValue {
    if let Some(ints) = items.iter().map(Value::as_i64).collect::<Option<Vec<_>>>() {
        return AttrValue::IntArray(ints);
    }
    if let Some(floats) = items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>() {
        return AttrValue::FloatArray(floats);
    }
    if let Some(texts) = items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
    {
        return AttrValue::TextArray(texts);
    }
    AttrValue::Opaque("mixed array".to_string())
}

fn json_to_array(value: &Value) -> Result<ArrayValue> {
    match value {
        Value::Number(n) => Ok(ArrayValue::Number(n.as_f64().unwrap_or(f64::NAN))),
        Value::String(s) => Ok(ArrayValue::Text(s.clone())),
        Value::Bool(b) => Ok(ArrayValue::Number(if *b { 1.0 } else { 0.0 })),
        // serde_json writes NaN and +-inf as null
        Value::Null => Ok(ArrayValue::Number(f64::NAN)),
        Value::Array(items) => items
            .iter()
            .map(json_to_array)
            .collect::<Result<Vec<_>>>()
            .map(ArrayValue::List),
        Value::Object(_) => Err(WaveformError::invalid(
            "dataset value contains a JSON object; expected numbers, strings or arrays",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> JsonContainer {
        JsonContainer::from_value(json!({
            "attributes": { "num_points": 2, "scale": 0.5, "label": "tran", "flags": [1, 2] },
            "children": {
                "signals": {
                    "kind": "group",
                    "children": {
                        "b": { "kind": "dataset", "value": [1, 2] },
                        "a": { "kind": "dataset", "value": [[1, 0], [2, null]] }
                    }
                },
                "named_type": { "kind": "datatype" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_kinds_and_children() {
        let container = sample();
        let root = container.root();
        assert_eq!(root.kind(), NodeKind::Group);

        let names: Vec<_> = root.children().unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["named_type", "signals"]);

        let other = root.child("named_type").unwrap().unwrap();
        assert_eq!(other.kind(), NodeKind::Other("datatype".to_string()));

        let leaf = root.lookup("/signals/b").unwrap().unwrap();
        assert_eq!(leaf.kind(), NodeKind::Dataset);
        assert!(root.lookup("signals/missing").unwrap().is_none());
    }

    #[test]
    fn test_attributes() {
        let container = sample();
        let root = container.root();
        assert_eq!(root.attribute("num_points"), Some(AttrValue::Int(2)));
        assert_eq!(root.attribute("scale"), Some(AttrValue::Float(0.5)));
        assert_eq!(
            root.attribute("label"),
            Some(AttrValue::Text("tran".to_string()))
        );
        assert_eq!(root.attribute("flags"), Some(AttrValue::IntArray(vec![1, 2])));
        assert_eq!(root.attribute("absent"), None);
    }

    #[test]
    fn test_to_array_maps_null_to_nan() {
        let container = sample();
        let leaf = container.root().lookup("signals/a").unwrap().unwrap();
        let array = leaf.to_array().unwrap();
        let rows = array.as_list().unwrap();
        let second = rows[1].as_list().unwrap();
        assert_eq!(second[0], ArrayValue::Number(2.0));
        assert!(matches!(second[1], ArrayValue::Number(v) if v.is_nan()));
    }

    #[test]
    fn test_group_is_not_an_array() {
        let container = sample();
        let group = container.root().child("signals").unwrap().unwrap();
        assert!(matches!(
            group.to_array(),
            Err(WaveformError::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_open_gzip_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(br#"{"attributes": {"num_points": 3}}"#)
            .unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let container = JsonContainer::open(&path).unwrap();
        assert_eq!(container.path(), path.as_path());
        assert_eq!(
            container.root().attribute("num_points"),
            Some(AttrValue::Int(3))
        );
    }

    #[test]
    fn test_open_missing_file() {
        let err = JsonContainer::open("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, WaveformError::Io(_)));
    }
}
