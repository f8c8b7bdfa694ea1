//! Shared utility helpers.

pub mod error;

pub use error::{MserError, MserResult};
pub(crate) use error::try_filled_vec;
