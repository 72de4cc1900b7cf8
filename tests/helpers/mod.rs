pub mod grammars;
pub mod tree_assertions;
