#![doc = include_str!("../README.md")]
mod error;
mod ids;
mod models;
mod operations;
mod parsing;
mod sheet;

pub use error::{TResult, TafweejError};
pub use ids::{IdGenerator, SequentialIdGenerator, TimestampIdGenerator};
pub use models::*;
pub use operations::*;
pub use parsing::*;
pub use sheet::*;
