pub mod auto_lease;
pub mod mortgage;
pub mod rates;
pub mod savings;
pub mod wealth;
