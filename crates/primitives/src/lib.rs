mod col_list;
mod ids;

pub use col_list::ColList;
pub use ids::{ColId, IndexId, TableId};
