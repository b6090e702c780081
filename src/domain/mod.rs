pub mod anomaly;
pub mod dispatch;
pub mod forecast;
pub mod types;

pub use anomaly::*;
pub use dispatch::*;
pub use forecast::*;
pub use types::*;
