#![doc = include_str!("../README.md")]

mod catalogue;
mod error;
mod money;
mod report;
mod sales;

pub use catalogue::Catalogue;
pub use error::{LoadError, RecordError};
pub use money::Money;
pub use report::{LineItem, Priced, Report};
pub use sales::{Quantity, Sale, Sales, Unreadable};
