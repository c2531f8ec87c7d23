pub mod classifier;
pub mod error;
pub mod field_source;
pub mod field_table;
pub mod matrix_builder;

#[cfg(test)]
pub(crate) mod test_support;
