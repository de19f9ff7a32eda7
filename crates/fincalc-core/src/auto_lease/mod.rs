pub mod buy;
pub mod comparison;
pub mod depreciation;
pub mod lease;
