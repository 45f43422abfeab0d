pub mod compression;
pub mod constants;
pub mod container;
pub mod decoder;
pub mod error;
pub mod format;
pub mod hdf5_container;
pub mod json_container;
pub mod reader;
pub mod resolver;
pub mod tree;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_util;
