pub mod batch;
pub mod binding;
pub mod engine;
pub mod matcher;
pub mod pipeline;
pub mod table;

pub use crate::domain::model::{BatchInput, BatchOutput};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
