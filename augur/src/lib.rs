pub mod column_inferrer;
pub mod convert;
pub mod driver;
pub mod error;
pub mod frame_inferrer;
pub mod repository;
pub mod selector;
pub mod subset_reader;

pub use convert::{convert, ConvertResult, TypedCell};
pub use error::AugurError;
pub use frame_inferrer::{process, Batch};
pub use selector::{candidates, preferred, Override};
