pub mod btree_index;
pub mod indexes;
pub mod schema;
pub mod table;
pub mod temp_table;

pub use partdb_sats::static_assert_size;
