//! ERC-721 `ownerOf` lookups over an Ethereum JSON-RPC endpoint using ethers-rs.

use super::{OracleError, OwnershipOracle};
use crate::crypto::to_checksum_address;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider, ProviderError, RpcError};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, U256};
use log::debug;
use std::convert::TryFrom;

/// keccak256("ownerOf(uint256)")[0..4]
const OWNER_OF_SELECTOR: [u8; 4] = [0x63, 0x52, 0x21, 0x1e];

/// JSON-RPC error code geth uses for reverted calls
const EXECUTION_REVERTED: i64 = 3;

/// Oracle backed by the deployed token contract
pub struct EthereumOwnershipOracle {
    provider: Provider<Http>,
    contract_address: Address,
}

impl EthereumOwnershipOracle {
    pub fn new(rpc_url: &str, contract_addr: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| anyhow!("Failed to create HTTP provider: {}", e))?;
        let contract_address = contract_addr
            .parse::<Address>()
            .map_err(|e| anyhow!("Invalid contract address: {}", e))?;

        Ok(Self {
            provider,
            contract_address,
        })
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }
}

/// ABI-encode `ownerOf(token_id)`.
pub fn encode_owner_of(token_id: u64) -> Bytes {
    let mut word = [0u8; 32];
    U256::from(token_id).to_big_endian(&mut word);

    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&OWNER_OF_SELECTOR);
    data.extend_from_slice(&word);
    Bytes::from(data)
}

/// Decode the single `address` word returned by `ownerOf`.
pub fn decode_owner(output: &[u8]) -> Result<String, OracleError> {
    if output.len() < 32 {
        return Err(OracleError::Unavailable(format!(
            "ownerOf returned {} bytes",
            output.len()
        )));
    }
    if output[..12].iter().any(|b| *b != 0) {
        return Err(OracleError::Unavailable(
            "ownerOf returned a malformed address word".to_string(),
        ));
    }

    let mut address = [0u8; 20];
    address.copy_from_slice(&output[12..32]);
    Ok(to_checksum_address(&address))
}

fn classify(token_id: u64, err: ProviderError) -> OracleError {
    if let Some(response) = err.as_error_response() {
        if response.code == EXECUTION_REVERTED
            || response.message.to_ascii_lowercase().contains("revert")
        {
            return OracleError::InvalidId(token_id);
        }
    }
    OracleError::Unavailable(err.to_string())
}

#[async_trait]
impl OwnershipOracle for EthereumOwnershipOracle {
    async fn owner_of(&self, token_id: u64) -> Result<String, OracleError> {
        let tx: TypedTransaction = TransactionRequest::new()
            .to(self.contract_address)
            .data(encode_owner_of(token_id))
            .into();

        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| classify(token_id, e))?;

        let owner = decode_owner(&output)?;
        debug!("ownerOf({}) = {}", token_id, owner);
        Ok(owner)
    }
}
