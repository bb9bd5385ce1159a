pub mod coerce;
pub mod error;
pub mod models;
pub mod news;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::InferenceModel;
pub use news::NewsSource;
pub use storage::{BlogStorage, ImageStore};
pub use types::*;
