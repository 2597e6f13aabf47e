#![doc = include_str!("../README.md")]

mod api;
mod error;
#[cfg(feature = "futures")]
mod futures;
mod generator;
mod id;
mod node;
mod time;

pub use crate::api::*;
pub use crate::error::*;
#[cfg(feature = "futures")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::node::*;
pub use crate::time::*;
