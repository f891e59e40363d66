pub mod csv_cache;
pub mod sink;

pub use csv_cache::{CacheKey, CsvCache, CsvSink, PersistOutcome};
pub use sink::{DataSink, SinkError};
