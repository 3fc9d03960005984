pub mod index_set;
pub mod sparse_bitvector;
