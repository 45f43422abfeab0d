// HDF5 binding over the pure-Rust rustyhdf5 reader

use crate::core::container::{ArrayValue, AttrValue, ContainerNode, NodeKind};
use crate::core::error::{Result, WaveformError};
use rustyhdf5::{AttrValue as H5AttrValue, DType, Dataset, File, Group};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An HDF5 file held in memory. The OS handle is closed once `open` returns.
pub struct Hdf5Container {
    path: PathBuf,
    file: File,
}

impl Hdf5Container {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = std::fs::read(&path)?;
        debug!("Read HDF5 container {} ({} bytes)", path.display(), bytes.len());

        Ok(Self {
            file: File::from_bytes(bytes)?,
            path,
        })
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self {
            path: PathBuf::new(),
            file: File::from_bytes(data)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> Hdf5Node<'_> {
        Hdf5Node {
            file: &self.file,
            path: String::new(),
            kind: NodeKind::Group,
        }
    }
}

/// Group or dataset handle, addressed by its path from the root group.
#[derive(Clone)]
pub struct Hdf5Node<'f> {
    file: &'f File,
    path: String,
    kind: NodeKind,
}

impl<'f> Hdf5Node<'f> {
    fn group(&self) -> Result<Group<'f>> {
        Ok(self.file.group(&self.path)?)
    }

    fn dataset(&self) -> Result<Dataset<'f>> {
        Ok(self.file.dataset(&self.path)?)
    }

    fn child_node(&self, name: String, kind: NodeKind) -> (String, Self) {
        let path = if self.path.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", self.path, name)
        };
        (
            name,
            Hdf5Node {
                file: self.file,
                path,
                kind,
            },
        )
    }

    fn attrs(&self) -> Result<HashMap<String, H5AttrValue>> {
        match self.kind {
            NodeKind::Dataset => Ok(self.dataset()?.attrs()?),
            _ => Ok(self.group()?.attrs()?),
        }
    }
}

impl<'f> ContainerNode for Hdf5Node<'f> {
    fn kind(&self) -> NodeKind {
        self.kind.clone()
    }

    fn children(&self) -> Result<Vec<(String, Self)>> {
        if self.kind != NodeKind::Group {
            return Ok(Vec::new());
        }
        let group = self.group()?;
        let mut children = Vec::new();
        for name in group.groups()? {
            children.push(self.child_node(name, NodeKind::Group));
        }
        for name in group.datasets()? {
            children.push(self.child_node(name, NodeKind::Dataset));
        }
        Ok(children)
    }

    fn attribute(&self, key: &str) -> Option<AttrValue> {
        match self.attrs() {
            Ok(mut attrs) => attrs.remove(key).map(convert_attr),
            Err(e) => {
                debug!("Cannot read attributes of '/{}': {}", self.path, e);
                None
            }
        }
    }

    fn to_array(&self) -> Result<ArrayValue> {
        if self.kind != NodeKind::Dataset {
            return Err(WaveformError::invalid(format!("{} has no value", self.kind)));
        }
        let dataset = self.dataset()?;
        let shape: Vec<usize> = dataset.shape()?.into_iter().map(|d| d as usize).collect();

        let flat = match dataset.dtype()? {
            DType::String | DType::VariableLengthString => dataset
                .read_string()?
                .into_iter()
                .map(ArrayValue::Text)
                .collect(),
            dtype if is_complex_pair(&dtype) => read_complex_pairs(&dataset)?,
            dtype @ (DType::Compound(_) | DType::Enum(_) | DType::Array(..) | DType::Other(_)) => {
                return Err(WaveformError::invalid(format!(
                    "unsupported datatype {dtype}"
                )))
            }
            _ => dataset
                .read_f64()?
                .into_iter()
                .map(ArrayValue::Number)
                .collect(),
        };
        reshape(flat, &shape)
    }
}

#[allow(unreachable_patterns)]
fn convert_attr(value: H5AttrValue) -> AttrValue {
    match value {
        H5AttrValue::F64(v) => AttrValue::Float(v),
        H5AttrValue::F64Array(v) => AttrValue::FloatArray(v),
        H5AttrValue::I64(v) => AttrValue::Int(v),
        H5AttrValue::I64Array(v) => AttrValue::IntArray(v),
        H5AttrValue::U64(v) => match i64::try_from(v) {
            Ok(v) => AttrValue::Int(v),
            Err(_) => AttrValue::Opaque(format!("u64 {v}")),
        },
        H5AttrValue::String(s) => AttrValue::Text(s),
        H5AttrValue::StringArray(v) => AttrValue::TextArray(v),
        other => AttrValue::Opaque(format!("{other:?}")),
    }
}

/// `{r, i}` compounds (h5py's complex128) and `[f64; 2]` array elements.
fn is_complex_pair(dtype: &DType) -> bool {
    match dtype {
        DType::Compound(fields) => {
            fields.len() == 2 && fields.iter().all(|(_, field)| *field == DType::F64)
        }
        DType::Array(base, dims) => **base == DType::F64 && dims.len() == 1 && dims[0] == 2,
        _ => false,
    }
}

// Members are packed little-endian f64 pairs, as numpy writes them.
fn read_complex_pairs(dataset: &Dataset<'_>) -> Result<Vec<ArrayValue>> {
    let raw = dataset.read_raw_ref()?.ok_or_else(|| {
        WaveformError::invalid("complex samples must be stored contiguously")
    })?;
    if raw.len() % 16 != 0 {
        return Err(WaveformError::invalid(format!(
            "complex data length {} is not a multiple of 16 bytes",
            raw.len()
        )));
    }

    let f64_at = |bytes: &[u8]| {
        let mut le = [0u8; 8];
        le.copy_from_slice(bytes);
        f64::from_le_bytes(le)
    };
    Ok(raw
        .chunks_exact(16)
        .map(|pair| {
            ArrayValue::List(vec![
                ArrayValue::Number(f64_at(&pair[..8])),
                ArrayValue::Number(f64_at(&pair[8..])),
            ])
        })
        .collect())
}

/// Nests row-major `flat` into `shape`; a rank-0 dataset yields its only element.
fn reshape(flat: Vec<ArrayValue>, shape: &[usize]) -> Result<ArrayValue> {
    let expected: usize = shape.iter().product();
    if flat.len() != expected {
        return Err(WaveformError::invalid(format!(
            "dataset holds {} values but its shape {:?} needs {}",
            flat.len(),
            shape,
            expected
        )));
    }

    let mut items = flat.into_iter();
    Ok(nest(&mut items, shape))
}

fn nest(items: &mut std::vec::IntoIter<ArrayValue>, shape: &[usize]) -> ArrayValue {
    match shape.split_first() {
        None => items.next().unwrap_or(ArrayValue::List(Vec::new())),
        Some((&len, rest)) => ArrayValue::List((0..len).map(|_| nest(items, rest)).collect()),
    }
}
