#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

pub use seedmatte::{ExecutionContext, MattingConfig, MattingError, MattingPipeline};
