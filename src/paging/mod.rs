//! Offset-keyed, forward-only paging over the log store.

pub mod pager;
pub mod slot;
pub mod source;

pub use pager::{MessagePager, PagerEvent};
pub use slot::PagingSlot;
pub use source::{LoadParams, LoadResult, LogPagingSource, Page};
