pub mod analyzers;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod output;
pub mod relations;
pub mod source;

pub use error::FeatureError;
pub use features::{FeatureVector, extract};
pub use relations::Relations;
