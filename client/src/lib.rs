//! Off-chain client for the `value_store` contract.
//!
//! Binds the two-message contract interface to a concrete deployed instance:
//! the deployment registry resolves a network identifier to an address, the
//! transport carries raw call/send payloads to the node, and
//! [`ValueStoreClient`] puts typed wrappers on top.

mod client;
mod error;
mod registry;
mod transport;

pub use crate::{
    client::{SetValueReceipt, ValueChanged, ValueStoreClient},
    error::ClientError,
    registry::{ContractAddress, Deployment, DeploymentRegistry},
    transport::{CallReceipt, HttpTransport, LedgerTransport, Signer},
};
