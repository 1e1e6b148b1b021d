pub mod error;
pub mod types;

pub mod params;
pub mod reader;
pub mod tables;

pub mod cash_flow;
pub mod depreciation;
pub mod loan;
pub mod price;
pub mod real_estate_cash;
pub mod sale;
pub mod tax;

pub mod pipeline;

pub use error::SimulationError;
pub use types::*;

/// Standard result type for all simulation operations
pub type SimResult<T> = Result<T, SimulationError>;
