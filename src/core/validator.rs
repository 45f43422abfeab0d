// Structural and attribute checks run once per container before decoding

use crate::core::constants::*;
use crate::core::container::{ArrayValue, ContainerNode, NodeKind};
use crate::core::error::{Result, WaveformError};
use tracing::debug;

/// Everything the later stages need from a container that passed validation.
#[derive(Debug, Clone)]
pub struct ContainerLayout<N> {
    pub indep_var_name: String,
    pub indep_var_index: usize,
    pub point_count: usize,
    pub variable_count: usize,
    pub column_names: Vec<String>,
    /// Sample matrix, row-major; every row has `variable_count` cells.
    pub rows: Vec<Vec<ArrayValue>>,
    pub signals: N,
}

pub fn validate<N: ContainerNode>(root: &N) -> Result<ContainerLayout<N>> {
    let indep_var_name = required_text(root, ATTR_INDEP_VAR_NAME)?;
    let indep_var_index = required_count(root, ATTR_INDEP_VAR_INDEX)?;
    let point_count = required_count(root, ATTR_NUM_POINTS)?;
    let variable_count = required_count(root, ATTR_NUM_VARIABLES)?;

    let indep_group = required_node(root, INDEP_VAR_GROUP, NodeKind::Group)?;
    match indep_group.child(&indep_var_name)? {
        Some(node) if node.kind() == NodeKind::Dataset => {}
        Some(node) => {
            return Err(WaveformError::invalid(format!(
                "'/{INDEP_VAR_GROUP}/{indep_var_name}' must be a dataset, found {}",
                node.kind()
            )))
        }
        None => {
            return Err(WaveformError::invalid(format!(
                "missing required dataset '/{INDEP_VAR_GROUP}/{indep_var_name}'"
            )))
        }
    }
    let signals = required_node(root, SIGNALS_GROUP, NodeKind::Group)?;
    let matrix = required_node(root, SAMPLE_MATRIX, NodeKind::Dataset)?;
    let names = required_node(root, VARIABLE_NAMES, NodeKind::Dataset)?;

    let rows = read_sample_matrix(&matrix)?;
    let column_names = read_column_names(&names)?;

    if point_count != rows.len() {
        return Err(mismatch(
            ATTR_NUM_POINTS,
            point_count,
            "sample matrix row count",
            rows.len(),
        ));
    }

    // An empty matrix has no observable column count.
    if let Some(first) = rows.first() {
        if variable_count != first.len() {
            return Err(mismatch(
                ATTR_NUM_VARIABLES,
                variable_count,
                "sample matrix column count",
                first.len(),
            ));
        }
    }

    if variable_count != column_names.len() {
        return Err(mismatch(
            ATTR_NUM_VARIABLES,
            variable_count,
            "variable name count",
            column_names.len(),
        ));
    }

    if indep_var_index >= variable_count {
        return Err(WaveformError::invalid(format!(
            "{ATTR_INDEP_VAR_INDEX} ({indep_var_index}) must be less than {ATTR_NUM_VARIABLES} ({variable_count})"
        )));
    }

    let declared = &column_names[indep_var_index];
    if *declared != indep_var_name {
        return Err(WaveformError::invalid(format!(
            "{VARIABLE_NAMES}[{indep_var_index}] ('{declared}') must match {ATTR_INDEP_VAR_NAME} ('{indep_var_name}')"
        )));
    }

    debug!(
        "Container layout ok: {} points, {} variables, independent variable '{}' at column {}",
        point_count, variable_count, indep_var_name, indep_var_index
    );

    Ok(ContainerLayout {
        indep_var_name,
        indep_var_index,
        point_count,
        variable_count,
        column_names,
        rows,
        signals,
    })
}

fn mismatch(a: &str, a_val: usize, b: &str, b_val: usize) -> WaveformError {
    WaveformError::invalid(format!("{a} ({a_val}) must match {b} ({b_val})"))
}

fn required_text<N: ContainerNode>(node: &N, key: &str) -> Result<String> {
    let value = node
        .attribute(key)
        .ok_or_else(|| WaveformError::invalid(format!("missing required attribute '{key}'")))?;
    match value.as_text() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(WaveformError::invalid(format!(
            "'{key}' must be a non-empty string, found {value}"
        ))),
    }
}

fn required_count<N: ContainerNode>(node: &N, key: &str) -> Result<usize> {
    let value = node
        .attribute(key)
        .ok_or_else(|| WaveformError::invalid(format!("missing required attribute '{key}'")))?;
    value.as_non_negative_integer().ok_or_else(|| {
        WaveformError::invalid(format!(
            "'{key}' must be a non-negative integer, found {value}"
        ))
    })
}

fn required_node<N: ContainerNode>(parent: &N, name: &str, kind: NodeKind) -> Result<N> {
    let node = parent
        .child(name)?
        .ok_or_else(|| WaveformError::invalid(format!("missing required {kind} '/{name}'")))?;
    let found = node.kind();
    if found != kind {
        return Err(WaveformError::invalid(format!(
            "'/{name}' must be a {kind}, found {found}"
        )));
    }
    Ok(node)
}

fn read_array<N: ContainerNode>(node: &N, name: &str) -> Result<ArrayValue> {
    node.to_array().map_err(|e| match e {
        WaveformError::InvalidContainer(msg) => {
            WaveformError::invalid(format!("'/{name}': {msg}"))
        }
        other => other,
    })
}

fn read_sample_matrix<N: ContainerNode>(node: &N) -> Result<Vec<Vec<ArrayValue>>> {
    let rows = match read_array(node, SAMPLE_MATRIX)? {
        ArrayValue::List(rows) => rows,
        other => {
            return Err(WaveformError::invalid(format!(
                "'/{SAMPLE_MATRIX}' must be a 2-D array, found {}",
                other.describe()
            )))
        }
    };

    let mut matrix = Vec::with_capacity(rows.len());
    for (r, row) in rows.into_iter().enumerate() {
        let cells = match row {
            ArrayValue::List(cells) => cells,
            other => {
                return Err(WaveformError::invalid(format!(
                    "'/{SAMPLE_MATRIX}' must be a 2-D array, row {r} is a {}",
                    other.describe()
                )))
            }
        };
        if let Some(first) = matrix.first().map(|f: &Vec<ArrayValue>| f.len()) {
            if cells.len() != first {
                return Err(WaveformError::invalid(format!(
                    "'/{SAMPLE_MATRIX}' row {r} has {} columns, expected {first}",
                    cells.len()
                )));
            }
        }
        matrix.push(cells);
    }
    Ok(matrix)
}

fn read_column_names<N: ContainerNode>(node: &N) -> Result<Vec<String>> {
    let items = match read_array(node, VARIABLE_NAMES)? {
        ArrayValue::List(items) => items,
        other => {
            return Err(WaveformError::invalid(format!(
                "'/{VARIABLE_NAMES}' must be a 1-D array of strings, found {}",
                other.describe()
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            ArrayValue::Text(name) => Ok(name),
            other => Err(WaveformError::invalid(format!(
                "'/{VARIABLE_NAMES}' must be a 1-D array of strings, element {i} is a {}",
                other.describe()
            ))),
        })
        .collect()
}
