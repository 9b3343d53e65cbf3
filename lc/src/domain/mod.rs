//! Domain types shared by the controller, the fetch adapter and handlers

mod query;
mod result;
mod row;

pub use query::{ChipSpec, Chips, Pagination, SortDirection, SortItem, SortModel, toggle_sort};
pub use result::FetchResult;
pub use row::{JsonRow, RowData, RowId};
