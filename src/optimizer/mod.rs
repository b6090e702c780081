pub mod constraints;
pub mod day_ahead;
pub mod load_shift;
pub mod merit_order;
pub mod price_response;
pub mod tariff;
pub mod types;

pub use constraints::*;
pub use merit_order::*;
pub use tariff::*;
pub use types::*;
