use thiserror::Error;

/// Input-contract violations of the multi-period optimizer operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptimizerError {
    #[error("Input length mismatch: {demands} demands, {solar} solar, {prices} prices, {tou} time-of-use periods")]
    LengthMismatch {
        demands: usize,
        solar: usize,
        prices: usize,
        tou: usize,
    },
}
