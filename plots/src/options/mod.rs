pub mod base;

pub use base::{BasePlotOptions, BasePlotOptionsBuilder};
