pub mod confidence;
pub mod consumption;
pub mod engine;
pub mod features;
pub mod metrics;
pub mod production;

pub use confidence::*;
pub use consumption::*;
pub use engine::*;
pub use metrics::*;
pub use production::*;
