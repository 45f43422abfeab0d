// Schema constants for waveform containers

// Root attributes
pub const ATTR_INDEP_VAR_NAME: &str = "indep_var_name";
pub const ATTR_INDEP_VAR_INDEX: &str = "indep_var_index";
pub const ATTR_NUM_POINTS: &str = "num_points";
pub const ATTR_NUM_VARIABLES: &str = "num_variables";

// Required nodes, relative to the root group
pub const INDEP_VAR_GROUP: &str = "indep_var";
pub const SIGNALS_GROUP: &str = "signals";
pub const SAMPLE_MATRIX: &str = "data";
pub const VARIABLE_NAMES: &str = "var_names";

// Leaf dataset attributes under /signals
pub const ATTR_LEAF_INDEX: &str = "index";
pub const ATTR_LEAF_ORIGINAL_NAME: &str = "original_name";

pub const PATH_SEPARATOR: &str = "/";
pub const ACCESSOR_SEPARATOR: char = '.';

/// Accessor suffixes in the order they are offered to users.
pub const ACCESSOR_NAMES: [&str; 5] = ["re", "im", "mag", "phase", "db20"];

// Independent variable: |im| <= max(IMAG_ABS_FLOOR, max|re| * IMAG_REL_TOLERANCE)
pub const IMAG_ABS_FLOOR: f64 = 1e-12;
pub const IMAG_REL_TOLERANCE: f64 = 1e-9;

// Magnitude floor for db20 so an exact zero maps to -600 dB instead of -inf
pub const DB20_MAGNITUDE_FLOOR: f64 = 1e-30;
