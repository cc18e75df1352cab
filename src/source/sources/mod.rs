/// ARFF rating source implementation.
pub mod arff_source;
/// Delimited-text rating source implementation.
pub mod text_source;
