// End-to-end loading of waveform containers from JSON fixtures

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use std::io::Write;
use waveform_reader::*;

/// 4 points: complex V(IN) at column 1, real V(OUT) at column 2.
fn ac_sweep() -> Value {
    json!({
        "attributes": {
            "indep_var_name": "time",
            "indep_var_index": 0,
            "num_points": 4,
            "num_variables": 3
        },
        "children": {
            "indep_var": {
                "kind": "group",
                "children": { "time": { "kind": "dataset", "value": [0.0, 1.0, 2.0, 3.0] } }
            },
            "signals": {
                "kind": "group",
                "children": {
                    "V(IN)": { "kind": "dataset", "attributes": { "index": 1 } },
                    "V(OUT)": { "kind": "dataset", "attributes": { "index": 2 } }
                }
            },
            "data": {
                "kind": "dataset",
                "value": [
                    [0.0, [1.0, 0.0], 0.5],
                    [1.0, [0.0, 2.0], 0.6],
                    [2.0, [3.0, 4.0], 0.7],
                    [3.0, [-1.0, 1.0], 0.8]
                ]
            },
            "var_names": { "kind": "dataset", "value": ["time", "V(IN)", "V(OUT)"] }
        }
    })
}

/// Hierarchical signal tree with exporter names differing from leaf paths.
fn subcircuit() -> Value {
    json!({
        "attributes": {
            "indep_var_name": "frequency",
            "indep_var_index": 0,
            "num_points": 3,
            "num_variables": 4
        },
        "children": {
            "indep_var": {
                "kind": "group",
                "children": { "frequency": { "kind": "dataset", "value": [1e3, 1e4, 1e5] } }
            },
            "signals": {
                "kind": "group",
                "children": {
                    "x1": {
                        "kind": "group",
                        "children": {
                            "in": { "kind": "dataset", "attributes": { "index": 1, "original_name": "V(X1.IN)" } },
                            "out": { "kind": "dataset", "attributes": { "index": 2 } }
                        }
                    },
                    "I(R1)": { "kind": "dataset", "attributes": { "index": 3 } }
                }
            },
            "data": {
                "kind": "dataset",
                "value": [
                    [[1e3, 0.0], [1.0, 0.0], [0.5, 0.5], 1e-3],
                    [[1e4, 0.0], [0.0, 1.0], [0.25, 0.0], 2e-3],
                    [[1e5, 0.0], [0.0, 0.0], [0.0, -0.1], 3e-3]
                ]
            },
            "var_names": {
                "kind": "dataset",
                "value": ["frequency", "V(X1.IN)", "V(X1.OUT)", "I(R1)"]
            }
        }
    })
}

fn load(doc: &Value) -> Result<LoadedWaveform> {
    let bytes = serde_json::to_vec(doc).unwrap();
    WaveformReader::from_slice(&bytes, "fixture.json")
}

fn invalid_message(result: Result<LoadedWaveform>) -> String {
    match result {
        Err(WaveformError::InvalidContainer(msg)) => msg,
        Err(other) => panic!("expected InvalidContainer, got {other}"),
        Ok(_) => panic!("expected InvalidContainer, load succeeded"),
    }
}

#[test]
fn test_missing_independent_group() {
    let mut doc = ac_sweep();
    doc["children"].as_object_mut().unwrap().remove("indep_var");

    let msg = invalid_message(load(&doc));
    assert!(msg.contains("/indep_var"), "{msg}");
}

#[test]
fn test_real_signal_values_and_accessor_misuse() {
    let loaded = load(&ac_sweep()).unwrap();

    assert_eq!(
        loaded.resolve_signal_values("V(OUT)").unwrap(),
        Some(vec![0.5, 0.6, 0.7, 0.8])
    );
    assert!(matches!(
        loaded.resolve_signal_values("V(OUT).db20"),
        Err(WaveformError::RealSignalAccessor { accessor: Accessor::Db20, .. })
    ));
}

#[test]
fn test_complex_signal_accessors() {
    let loaded = load(&ac_sweep()).unwrap();
    let get = |name: &str| loaded.resolve_signal_values(name).unwrap().unwrap();

    assert_eq!(get("V(IN).re"), vec![1.0, 0.0, 3.0, -1.0]);
    assert_eq!(get("V(IN).im"), vec![0.0, 2.0, 4.0, 1.0]);
    assert!((get("V(IN).mag")[1] - 2.0).abs() < 1e-12);
    assert!((get("V(IN).phase")[1] - 90.0).abs() < 1e-12);
    assert!(get("V(IN).db20")[0].abs() < 1e-12);

    assert!(matches!(
        loaded.resolve_signal_values("V(IN)"),
        Err(WaveformError::MissingAccessor { .. })
    ));
}

#[test]
fn test_declared_variable_count_mismatch() {
    let mut doc = ac_sweep();
    doc["children"]["var_names"]["value"] = json!(["time", "V(IN)"]);

    let msg = invalid_message(load(&doc));
    assert!(msg.contains('3') && msg.contains('2'), "{msg}");
}

#[test]
fn test_dataset_invariants() {
    let loaded = load(&subcircuit()).unwrap();

    for column in &loaded.dataset.columns {
        assert_eq!(column.len(), loaded.dataset.row_count);
    }

    let mut paths = loaded.signal_paths.clone();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), loaded.signal_paths.len());
    assert!(!loaded.signal_paths.iter().any(|p| p == loaded.independent_name()));

    // every real column resolves back to its own values
    for column in &loaded.dataset.columns {
        assert_eq!(
            loaded.resolve_signal_values(&column.name).unwrap(),
            Some(column.values.clone())
        );
    }
}

#[test]
fn test_nested_tree_and_aliases() {
    let loaded = load(&subcircuit()).unwrap();

    assert_eq!(loaded.independent_name(), "frequency");
    assert_eq!(loaded.independent_values(), &[1e3, 1e4, 1e5]);
    assert_eq!(loaded.signal_paths, vec!["I(R1)", "x1/in", "x1/out"]);
    assert_eq!(loaded.complex_signal_paths, vec!["x1/in", "x1/out"]);

    assert_eq!(loaded.signal_alias_lookup.len(), 2);
    assert_eq!(loaded.signal_alias_lookup["V(X1.IN)"], "x1/in");
    assert_eq!(loaded.signal_alias_lookup["V(X1.OUT)"], "x1/out");

    assert_eq!(
        loaded.resolve_signal_values("V(X1.OUT).re").unwrap(),
        loaded.resolve_signal_values("x1/out.re").unwrap()
    );
    assert_eq!(
        loaded.resolve_signal_values("I(R1)").unwrap(),
        Some(vec![1e-3, 2e-3, 3e-3])
    );

    let leaf = &loaded.leaves[1];
    assert_eq!(leaf.signal_path, "x1/in");
    assert_eq!(leaf.column_index, 1);
}

#[test]
fn test_zero_magnitude_hits_db20_floor() {
    let loaded = load(&subcircuit()).unwrap();
    let db20 = loaded.resolve_signal_values("x1/in.db20").unwrap().unwrap();

    assert!(db20[0].abs() < 1e-12);
    assert!((db20[2] + 600.0).abs() < 1e-9);
}

#[test]
fn test_selectable_names_all_resolve() {
    let loaded = load(&subcircuit()).unwrap();
    let names = loaded.resolver().selectable_names();

    assert_eq!(names.len(), 1 + 2 * 5);
    assert!(names.contains(&"x1/out.phase".to_string()));
    for name in &names {
        assert!(loaded.resolve_signal_values(name).unwrap().is_some(), "{name}");
    }
    assert_eq!(loaded.resolve_signal_values("V(X1.MISSING)").unwrap(), None);
}

#[test]
fn test_open_gzip_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.json.gz");

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&serde_json::to_vec(&ac_sweep()).unwrap())
        .unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    let loaded = WaveformReader::open(&path).unwrap();
    assert_eq!(loaded.dataset.path, path.display().to_string());
    assert_eq!(loaded.row_count(), 4);
    assert_eq!(
        loaded.resolve_signal_values("V(OUT)").unwrap(),
        Some(vec![0.5, 0.6, 0.7, 0.8])
    );
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        WaveformReader::open(dir.path().join("absent.json")),
        Err(WaveformError::Io(_))
    ));
}

#[test]
fn test_undecodable_cell_reports_position() {
    let mut doc = ac_sweep();
    doc["children"]["data"]["value"][2][2] = json!("0.7");

    match load(&doc) {
        Err(WaveformError::Decode { row, column, .. }) => {
            assert_eq!((row, column), (2, 2));
        }
        Err(other) => panic!("expected Decode, got {other}"),
        Ok(_) => panic!("expected Decode, load succeeded"),
    }
}

#[test]
fn test_leaf_named_like_an_accessor_stays_selectable() {
    let mut doc = ac_sweep();
    doc["children"]["signals"]["children"]
        .as_object_mut()
        .unwrap()
        .remove("V(OUT)");
    doc["children"]["signals"]["children"]["net.re"] =
        json!({ "kind": "dataset", "attributes": { "index": 2 } });
    doc["children"]["var_names"]["value"] = json!(["time", "V(IN)", "net.re"]);

    let loaded = load(&doc).unwrap();
    let names = loaded.resolver().selectable_names();
    assert!(names.contains(&"net.re".to_string()));
    for name in &names {
        assert!(loaded.resolve_signal_values(name).unwrap().is_some(), "{name}");
    }
    assert_eq!(
        loaded.resolve_signal_values("net.re").unwrap(),
        Some(vec![0.5, 0.6, 0.7, 0.8])
    );
}
