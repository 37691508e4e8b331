// ============================================================================
// Order Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Malformed order id: {0:?}")]
    MalformedId(String),
}
