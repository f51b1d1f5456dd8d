pub mod deletion;
pub mod tree_reader;
