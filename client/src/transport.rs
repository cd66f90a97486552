use async_lock::Mutex;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::{error::ClientError, registry::ContractAddress};

/// Account authorized to sign state-changing calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signer {
    pub account: String,
}

impl Signer {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }
}

/// Outcome of a state-changing call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallReceipt {
    /// Node-assigned transaction id.
    pub transaction_id: String,
    /// SCALE-encoded event records emitted during the execution.
    pub events: Vec<Vec<u8>>,
}

/// Boundary between the typed wrappers and a concrete node endpoint.
///
/// One request per invocation, one response per request; no retries, no
/// batching. Implementations map their own failure modes onto
/// [`ClientError`].
#[async_trait]
pub trait LedgerTransport {
    /// Read-only dispatch of a message payload against an instance.
    async fn call(
        &self,
        address: &ContractAddress,
        input: Vec<u8>,
    ) -> Result<Vec<u8>, ClientError>;

    /// Signed, state-changing dispatch of a message payload.
    async fn send(
        &self,
        address: &ContractAddress,
        input: Vec<u8>,
        signer: &Signer,
    ) -> Result<CallReceipt, ClientError>;

    /// Accounts the endpoint is willing to sign for.
    async fn accounts(&self) -> Result<Vec<String>, ClientError>;
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SendResult {
    transaction_id: String,
    #[serde(default)]
    events: Vec<String>,
}

/// JSON-RPC 2.0 transport over HTTP, the dev-node convention: methods
/// `contracts_call`, `contracts_send` and `accounts`, hex-encoded payloads.
#[derive(Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
    next_id: Mutex<u64>,
}

impl HttpTransport {
    /// Validates the endpoint URL; does not probe the node.
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| ClientError::Connection(format!("bad endpoint url: {err}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            next_id: Mutex::new(0),
        })
    }

    async fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().await;
        *id += 1;
        *id
    }

    async fn request(&self, method: &str, params: Value) -> Result<RpcResponse, ClientError> {
        let id = self.next_id().await;
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        tracing::debug!(method, id, "dispatching rpc request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|err| ClientError::Connection(err.to_string()))?;
        let response: RpcResponse = response
            .json()
            .await
            .map_err(|err| ClientError::BadResponse(err.to_string()))?;
        check_id(&response, id)?;
        Ok(response)
    }
}

#[async_trait]
impl LedgerTransport for HttpTransport {
    async fn call(
        &self,
        address: &ContractAddress,
        input: Vec<u8>,
    ) -> Result<Vec<u8>, ClientError> {
        let params = json!({
            "address": address.to_string(),
            "input": encode_payload(&input),
        });
        let response = self.request("contracts_call", params).await?;
        let result = expect_result(response)?;
        let output: String = serde_json::from_value(result)
            .map_err(|err| ClientError::BadResponse(err.to_string()))?;
        decode_payload(&output)
    }

    async fn send(
        &self,
        address: &ContractAddress,
        input: Vec<u8>,
        signer: &Signer,
    ) -> Result<CallReceipt, ClientError> {
        let params = json!({
            "address": address.to_string(),
            "input": encode_payload(&input),
            "signer": signer.account,
        });
        let response = self.request("contracts_send", params).await?;
        // A node-reported failure on a send is a rejection, not a transport
        // problem.
        if let Some(error) = response.error {
            return Err(ClientError::RejectedTransaction(format!(
                "{} (code {})",
                error.message, error.code
            )));
        }
        let result = response.result.ok_or_else(missing_result_error)?;
        let result: SendResult = serde_json::from_value(result)
            .map_err(|err| ClientError::BadResponse(err.to_string()))?;
        let events = result
            .events
            .iter()
            .map(|record| decode_payload(record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CallReceipt {
            transaction_id: result.transaction_id,
            events,
        })
    }

    async fn accounts(&self) -> Result<Vec<String>, ClientError> {
        let response = self.request("accounts", Value::Null).await?;
        let result = expect_result(response)?;
        serde_json::from_value(result).map_err(|err| ClientError::BadResponse(err.to_string()))
    }
}

fn check_id(response: &RpcResponse, expected: u64) -> Result<(), ClientError> {
    if response.id != expected {
        return Err(ClientError::BadResponse(format!(
            "response id {} does not match request id {expected}",
            response.id
        )));
    }
    Ok(())
}

fn expect_result(response: RpcResponse) -> Result<Value, ClientError> {
    if let Some(error) = response.error {
        return Err(ClientError::BadResponse(format!(
            "call failed: {} (code {})",
            error.message, error.code
        )));
    }
    response.result.ok_or_else(missing_result_error)
}

fn missing_result_error() -> ClientError {
    ClientError::BadResponse("response carries neither result nor error".to_string())
}

fn encode_payload(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn decode_payload(payload: &str) -> Result<Vec<u8>, ClientError> {
    let stripped = payload.strip_prefix("0x").unwrap_or(payload);
    hex::decode(stripped).map_err(|err| ClientError::BadResponse(format!("bad payload hex: {err}")))
}
