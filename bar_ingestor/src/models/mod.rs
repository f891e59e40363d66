pub mod bar;
pub mod range;
pub mod request_params;
pub mod resolution;

pub use bar::{Bar, BarRecord, BarSeries, NormalizedSeries};
pub use range::{ChunkSpec, DateRange};
pub use request_params::{Adjustment, BarsRequestParams, ProviderParams};
pub use resolution::Resolution;
