use thiserror::Error;

/// Errors surfaced by the value-store client.
///
/// None of these are retried; callers see every failure unmodified.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No deployment record exists for the requested network.
    #[error("contract is not deployed on network `{network_id}`")]
    NotDeployed { network_id: String },

    /// The ledger endpoint could not be reached.
    #[error("endpoint unreachable: {0}")]
    Connection(String),

    /// The signer declined or the node rejected the transaction.
    #[error("transaction rejected: {0}")]
    RejectedTransaction(String),

    /// Malformed deployment descriptor or address.
    #[error("invalid deployment record: {0}")]
    InvalidDeployment(String),

    /// The endpoint answered with a malformed RPC envelope.
    #[error("malformed response from endpoint: {0}")]
    BadResponse(String),

    /// Response or event bytes could not be decoded.
    #[error(transparent)]
    Codec(#[from] scale::Error),
}
