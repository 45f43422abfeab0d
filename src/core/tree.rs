// Discovery of leaf signals under /signals

use crate::core::constants::{
    ATTR_LEAF_INDEX, ATTR_LEAF_ORIGINAL_NAME, PATH_SEPARATOR, SIGNALS_GROUP,
};
use crate::core::container::{ContainerNode, NodeKind};
use crate::core::error::{Result, WaveformError};
use crate::core::format::{SignalAliasTable, SignalLeaf};
use std::collections::btree_map::Entry;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Walks the `/signals` group depth-first, visiting children in lexicographic
/// order, and returns one leaf per dataset.
pub fn collect_leaves<N: ContainerNode>(
    signals: &N,
    column_names: &[String],
    indep_var_name: &str,
) -> Result<Vec<SignalLeaf>> {
    let mut leaves = Vec::new();
    let mut segments = Vec::new();
    visit(signals, &mut segments, column_names, &mut leaves)?;

    if leaves.is_empty() {
        return Err(WaveformError::invalid(format!(
            "'/{SIGNALS_GROUP}' contains no signal datasets"
        )));
    }

    let mut seen = HashSet::with_capacity(leaves.len());
    for leaf in &leaves {
        if !seen.insert(leaf.signal_path.as_str()) {
            return Err(WaveformError::invalid(format!(
                "duplicate signal path '{}'",
                leaf.signal_path
            )));
        }
        if leaf.signal_path == indep_var_name {
            return Err(WaveformError::invalid(format!(
                "signal path '{}' collides with the independent variable name",
                leaf.signal_path
            )));
        }
    }

    debug!("Collected {} signal leaves", leaves.len());
    Ok(leaves)
}

fn visit<N: ContainerNode>(
    node: &N,
    segments: &mut Vec<String>,
    column_names: &[String],
    leaves: &mut Vec<SignalLeaf>,
) -> Result<()> {
    let mut children = node.children()?;
    children.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, child) in children {
        if name.is_empty() {
            return Err(WaveformError::invalid(format!(
                "{} has a child with an empty name",
                node_path(segments)
            )));
        }
        segments.push(name);
        let signal_path = segments.join(PATH_SEPARATOR);

        match child.kind() {
            NodeKind::Group => visit(&child, segments, column_names, leaves)?,
            NodeKind::Dataset => leaves.push(read_leaf(&child, signal_path, column_names)?),
            NodeKind::Other(label) => {
                return Err(WaveformError::invalid(format!(
                    "{} is a {label}; expected a group or dataset",
                    node_path(segments)
                )));
            }
        }

        segments.pop();
    }
    Ok(())
}

fn node_path(segments: &[String]) -> String {
    let mut path = format!("'/{SIGNALS_GROUP}");
    for segment in segments {
        path.push_str(PATH_SEPARATOR);
        path.push_str(segment);
    }
    path.push('\'');
    path
}

fn read_leaf<N: ContainerNode>(
    node: &N,
    signal_path: String,
    column_names: &[String],
) -> Result<SignalLeaf> {
    let location = format!("'/{SIGNALS_GROUP}/{signal_path}'");

    let raw_index = node.attribute(ATTR_LEAF_INDEX).ok_or_else(|| {
        WaveformError::invalid(format!(
            "{location} is missing required attribute '{ATTR_LEAF_INDEX}'"
        ))
    })?;
    let column_index = raw_index.as_non_negative_integer().ok_or_else(|| {
        WaveformError::invalid(format!(
            "{location} attribute '{ATTR_LEAF_INDEX}' must be a non-negative integer, found {raw_index}"
        ))
    })?;
    if column_index >= column_names.len() {
        return Err(WaveformError::invalid(format!(
            "{location} {ATTR_LEAF_INDEX} ({column_index}) is out of range for {} columns",
            column_names.len()
        )));
    }

    let original_name = node
        .attribute(ATTR_LEAF_ORIGINAL_NAME)
        .and_then(|v| v.as_text().map(str::to_string));
    let canonical_alias = [original_name, Some(column_names[column_index].clone())]
        .into_iter()
        .flatten()
        .find(|alias| !alias.trim().is_empty());

    Ok(SignalLeaf {
        signal_path,
        column_index,
        canonical_alias,
    })
}

/// Alias -> canonical path for every leaf whose alias differs from its path.
/// Aliases never shadow a canonical path or the independent variable; when two
/// leaves claim the same alias the first in path order keeps it.
pub fn build_alias_table(leaves: &[SignalLeaf], indep_var_name: &str) -> SignalAliasTable {
    let paths: HashSet<&str> = leaves.iter().map(|l| l.signal_path.as_str()).collect();
    let mut table = SignalAliasTable::new();

    for leaf in leaves {
        let Some(alias) = leaf.canonical_alias.as_deref() else {
            continue;
        };
        if alias == leaf.signal_path {
            continue;
        }
        if paths.contains(alias) || alias == indep_var_name {
            debug!(
                "Alias '{}' of '{}' names another signal; not registered",
                alias, leaf.signal_path
            );
            continue;
        }
        match table.entry(alias.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(leaf.signal_path.clone());
            }
            Entry::Occupied(existing) => {
                warn!(
                    "Alias '{}' already maps to '{}'; ignoring it for '{}'",
                    alias,
                    existing.get(),
                    leaf.signal_path
                );
            }
        }
    }
    table
}
