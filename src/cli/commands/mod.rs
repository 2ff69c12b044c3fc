pub mod collect;
pub mod dates;
pub mod summary;
pub mod trend;
