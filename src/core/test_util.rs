// Container fixtures shared by the unit tests

use serde_json::{json, Value};

/// `time` plus a complex `V(IN)` (column 1) and a real `V(OUT)` (column 2), 4 points.
pub(crate) fn mixed_fixture() -> Value {
    json!({
        "kind": "group",
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

/// `time` plus one real signal `V(OUT)` holding `values`.
pub(crate) fn real_fixture(values: &[f64]) -> Value {
    let time: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let rows: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(i, v)| json!([i as f64, v]))
        .collect();

    json!({
        "attributes": {
            "indep_var_name": "time",
            "indep_var_index": 0,
            "num_points": values.len(),
            "num_variables": 2
        },
        "children": {
            "indep_var": {
                "kind": "group",
                "children": { "time": { "kind": "dataset", "value": time } }
            },
            "signals": {
                "kind": "group",
                "children": {
                    "V(OUT)": { "kind": "dataset", "attributes": { "index": 1 } }
                }
            },
            "data": { "kind": "dataset", "value": rows },
            "var_names": { "kind": "dataset", "value": ["time", "V(OUT)"] }
        }
    })
}

pub(crate) fn remove_child(doc: &mut Value, name: &str) {
    doc["children"]
        .as_object_mut()
        .expect("fixture root has children")
        .remove(name);
}
