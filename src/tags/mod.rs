//! Tag index files: header metadata, binary search and record parsing

pub mod header;
pub mod record;
pub mod search;

pub use header::{HeaderCache, SortMode, TagFileHeader};
pub use record::{parse_records, Location, SearchPattern, TagRecord};
pub use search::{BlockRange, TagIndexSearch};
