mod file;
mod nasdaq;
mod static_source;
mod synthetic;

pub use file::JsonFileSource;
pub use nasdaq::NasdaqScreenerSource;
pub use static_source::StaticSource;
pub use synthetic::SyntheticSource;
