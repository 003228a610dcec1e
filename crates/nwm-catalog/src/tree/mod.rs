//! The lazy Catalog → Day → Configuration → File hierarchy.

mod catalog;
mod children;
mod configuration;
mod day;
mod file;

pub use catalog::Catalog;
pub use children::Entries;
pub use configuration::{configuration_key, Configuration};
pub use day::{Day, DayId};
pub use file::File;
