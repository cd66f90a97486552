use std::{collections::HashMap, fmt, io::Read};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Identity of a deployed contract instance, a 32-byte account id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContractAddress(pub [u8; 32]);

impl ContractAddress {
    /// Parses a hex-encoded address, with or without a `0x` prefix.
    ///
    /// An empty or malformed string is an error; `resolve` must never hand
    /// out an address it could not fully parse.
    pub fn from_hex(s: &str) -> Result<Self, ClientError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        if stripped.is_empty() {
            return Err(ClientError::InvalidDeployment(
                "empty contract address".to_string(),
            ));
        }
        let bytes = hex::decode(stripped)
            .map_err(|err| ClientError::InvalidDeployment(format!("bad address hex: {err}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            ClientError::InvalidDeployment(format!(
                "address must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// One deployment record, as written by the deployment process.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deployment {
    pub address: String,
}

/// Mapping from network identifier to deployed instance.
///
/// The descriptor is produced by the deployment process; this side only
/// reads it. Same shape as the `networks` section of the build artifact.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DeploymentRegistry {
    pub networks: HashMap<String, Deployment>,
}

impl DeploymentRegistry {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json)
            .map_err(|err| ClientError::InvalidDeployment(err.to_string()))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ClientError> {
        serde_json::from_reader(reader)
            .map_err(|err| ClientError::InvalidDeployment(err.to_string()))
    }

    /// Looks up the instance deployed on the given network.
    pub fn resolve(&self, network_id: &str) -> Result<ContractAddress, ClientError> {
        let record = self
            .networks
            .get(network_id)
            .ok_or_else(|| ClientError::NotDeployed {
                network_id: network_id.to_string(),
            })?;
        let address = ContractAddress::from_hex(&record.address)?;
        tracing::debug!(%network_id, %address, "resolved contract address");
        Ok(address)
    }
}
