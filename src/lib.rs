pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod matcher;
pub mod order;
pub mod portfolio;
pub mod position;
pub mod quote;
pub mod roll;
pub mod schedule;
pub mod settle;
pub mod strategy;
pub mod tick;
pub mod ticker;
pub mod trade;
pub mod types;

pub use engine::{BatchOutcome, Engine};
pub use error::{EngineError, EngineResult};
