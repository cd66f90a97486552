use scale::{Decode, Encode};

use crate::{
    error::ClientError,
    registry::{ContractAddress, DeploymentRegistry},
    transport::{LedgerTransport, Signer},
};

/// Selector for the contract's `get_value` message ("GETV").
pub const GET_VALUE_SELECTOR: [u8; 4] = 0x4745_5456u32.to_be_bytes();
/// Selector for the contract's `set_value` message ("SETV").
pub const SET_VALUE_SELECTOR: [u8; 4] = 0x5345_5456u32.to_be_bytes();

/// Change notification emitted by `set_value`, decoded from the receipt's
/// event records.
#[derive(Clone, Debug, PartialEq, Eq, Decode, Encode)]
pub struct ValueChanged {
    pub new_value: u128,
}

/// Result of a successful `set_value`: the transaction id and the typed
/// notifications observed in the same execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetValueReceipt {
    pub transaction_id: String,
    pub events: Vec<ValueChanged>,
}

/// Typed wrapper over one deployed `value_store` instance.
///
/// The address is resolved once at construction; after that the client is
/// stateless between calls.
#[derive(Debug)]
pub struct ValueStoreClient<T> {
    address: ContractAddress,
    transport: T,
}

impl<T: LedgerTransport> ValueStoreClient<T> {
    /// Binds to the instance deployed on `network_id`.
    pub fn new(
        registry: &DeploymentRegistry,
        network_id: &str,
        transport: T,
    ) -> Result<Self, ClientError> {
        let address = registry.resolve(network_id)?;
        Ok(Self { address, transport })
    }

    pub fn address(&self) -> &ContractAddress {
        &self.address
    }

    /// Reads the stored value.
    pub async fn get_value(&self) -> Result<u128, ClientError> {
        let input = encode_message(GET_VALUE_SELECTOR, &());
        let output = self.transport.call(&self.address, input).await?;
        let value = u128::decode(&mut output.as_slice())?;
        tracing::debug!(value, "read stored value");
        Ok(value)
    }

    /// Overwrites the stored value, returning the typed change
    /// notifications alongside the transaction id.
    pub async fn set_value(
        &self,
        new_value: u128,
        signer: &Signer,
    ) -> Result<SetValueReceipt, ClientError> {
        let input = encode_message(SET_VALUE_SELECTOR, &new_value);
        let receipt = self.transport.send(&self.address, input, signer).await?;
        let events = receipt
            .events
            .iter()
            .map(|record| ValueChanged::decode(&mut record.as_slice()))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            new_value,
            transaction_id = %receipt.transaction_id,
            "stored value overwritten"
        );
        Ok(SetValueReceipt {
            transaction_id: receipt.transaction_id,
            events,
        })
    }
}

/// A message payload is the 4-byte selector followed by the SCALE-encoded
/// arguments.
fn encode_message<A: Encode>(selector: [u8; 4], args: &A) -> Vec<u8> {
    let mut input = selector.to_vec();
    args.encode_to(&mut input);
    input
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use async_trait::async_trait;
    use scale::{Decode, Encode};

    use super::*;
    use crate::{
        registry::{Deployment, DeploymentRegistry},
        transport::{CallReceipt, LedgerTransport, Signer},
    };

    const DEV_ADDRESS: &str =
        "0x0202020202020202020202020202020202020202020202020202020202020202";

    /// In-memory stand-in for a node hosting one `value_store` instance.
    /// Executes the same selector dispatch the contract would.
    #[derive(Debug)]
    struct MockLedger {
        address: ContractAddress,
        value: Mutex<u128>,
        sends: Mutex<u64>,
        reject: bool,
        unreachable: bool,
    }

    impl MockLedger {
        fn new() -> Self {
            Self {
                address: ContractAddress::from_hex(DEV_ADDRESS).unwrap(),
                value: Mutex::new(0),
                sends: Mutex::new(0),
                reject: false,
                unreachable: false,
            }
        }

        fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::new()
            }
        }

        fn unreachable() -> Self {
            Self {
                unreachable: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl LedgerTransport for &MockLedger {
        async fn call(
            &self,
            address: &ContractAddress,
            input: Vec<u8>,
        ) -> Result<Vec<u8>, ClientError> {
            if self.unreachable {
                return Err(ClientError::Connection("connection refused".to_string()));
            }
            assert_eq!(address, &self.address);
            assert_eq!(input[..4], GET_VALUE_SELECTOR);
            Ok(self.value.lock().unwrap().encode())
        }

        async fn send(
            &self,
            address: &ContractAddress,
            input: Vec<u8>,
            signer: &Signer,
        ) -> Result<CallReceipt, ClientError> {
            if self.unreachable {
                return Err(ClientError::Connection("connection refused".to_string()));
            }
            if self.reject {
                return Err(ClientError::RejectedTransaction(
                    "signer declined".to_string(),
                ));
            }
            assert_eq!(address, &self.address);
            assert_eq!(input[..4], SET_VALUE_SELECTOR);
            assert!(!signer.account.is_empty());
            let new_value = u128::decode(&mut &input[4..]).unwrap();
            *self.value.lock().unwrap() = new_value;
            let mut sends = self.sends.lock().unwrap();
            *sends += 1;
            Ok(CallReceipt {
                transaction_id: format!("0x{:064x}", *sends),
                events: vec![ValueChanged { new_value }.encode()],
            })
        }

        async fn accounts(&self) -> Result<Vec<String>, ClientError> {
            Ok(vec!["alice".to_string()])
        }
    }

    fn registry() -> DeploymentRegistry {
        let mut networks = HashMap::new();
        networks.insert(
            "5777".to_string(),
            Deployment {
                address: DEV_ADDRESS.to_string(),
            },
        );
        DeploymentRegistry { networks }
    }

    fn signer() -> Signer {
        Signer::new("alice")
    }

    #[tokio::test]
    async fn set_then_get_roundtrip() {
        let ledger = MockLedger::new();
        let client = ValueStoreClient::new(&registry(), "5777", &ledger).unwrap();

        assert_eq!(client.get_value().await.unwrap(), 0);

        let receipt = client.set_value(42, &signer()).await.unwrap();
        assert_eq!(receipt.events, vec![ValueChanged { new_value: 42 }]);
        assert_eq!(client.get_value().await.unwrap(), 42);

        // A second write overwrites, it does not accumulate.
        let receipt = client.set_value(7, &signer()).await.unwrap();
        assert_eq!(receipt.events, vec![ValueChanged { new_value: 7 }]);
        assert_eq!(client.get_value().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn reads_do_not_mutate() {
        let ledger = MockLedger::new();
        let client = ValueStoreClient::new(&registry(), "5777", &ledger).unwrap();
        client.set_value(5, &signer()).await.unwrap();
        for _ in 0..3 {
            assert_eq!(client.get_value().await.unwrap(), 5);
        }
        assert_eq!(*ledger.sends.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_network_fails_at_construction() {
        let ledger = MockLedger::new();
        let err = ValueStoreClient::new(&registry(), "1", &ledger).unwrap_err();
        assert!(matches!(err, ClientError::NotDeployed { .. }));
    }

    #[tokio::test]
    async fn declined_signature_surfaces_as_rejection() {
        let ledger = MockLedger::rejecting();
        let client = ValueStoreClient::new(&registry(), "5777", &ledger).unwrap();
        let err = client.set_value(42, &signer()).await.unwrap_err();
        assert!(matches!(err, ClientError::RejectedTransaction(_)));
        // The read path is unaffected by the rejection.
        assert_eq!(client.get_value().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unreachable_ledger_surfaces_as_connection_error() {
        let ledger = MockLedger::unreachable();
        let client = ValueStoreClient::new(&registry(), "5777", &ledger).unwrap();
        assert!(matches!(
            client.get_value().await.unwrap_err(),
            ClientError::Connection(_)
        ));
        assert!(matches!(
            client.set_value(1, &signer()).await.unwrap_err(),
            ClientError::Connection(_)
        ));
    }

    #[tokio::test]
    async fn undecodable_event_record_is_a_codec_error() {
        struct Garbage;

        #[async_trait]
        impl LedgerTransport for Garbage {
            async fn call(
                &self,
                _address: &ContractAddress,
                _input: Vec<u8>,
            ) -> Result<Vec<u8>, ClientError> {
                Ok(vec![0x01])
            }

            async fn send(
                &self,
                _address: &ContractAddress,
                _input: Vec<u8>,
                _signer: &Signer,
            ) -> Result<CallReceipt, ClientError> {
                Ok(CallReceipt {
                    transaction_id: "0x00".to_string(),
                    events: vec![vec![0x01]],
                })
            }

            async fn accounts(&self) -> Result<Vec<String>, ClientError> {
                Ok(Vec::new())
            }
        }

        let client = ValueStoreClient::new(&registry(), "5777", Garbage).unwrap();
        assert!(matches!(
            client.get_value().await.unwrap_err(),
            ClientError::Codec(_)
        ));
        assert!(matches!(
            client.set_value(1, &signer()).await.unwrap_err(),
            ClientError::Codec(_)
        ));
    }
}
