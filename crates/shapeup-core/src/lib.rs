pub mod allocator;
pub mod calendar;
pub mod config;
pub mod error;
pub mod io;
pub mod migrations;
pub mod model;
pub mod paths;
pub mod sprint;
pub mod storage;
pub mod store;
pub mod task;
pub mod types;

pub use error::{PlannerError, Result};
