pub mod error;
pub mod rates;
pub mod sanitize;
pub mod time_value;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "auto_lease")]
pub mod auto_lease;

#[cfg(feature = "savings")]
pub mod savings;

#[cfg(feature = "wealth")]
pub mod wealth;

pub use error::FinCalcError;
pub use sanitize::Sanitize;
pub use types::*;

/// Standard result type for all fincalc operations
pub type FinCalcResult<T> = Result<T, FinCalcError>;
