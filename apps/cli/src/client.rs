//! `ethers` implementation of the uploader's chain collaborator.
//!
//! [`EthersClient`] talks to one flat directory contract. Read-only
//! commands wrap a bare [`Provider`]; writing commands wrap a
//! [`SignerMiddleware`] and get the full [`DirectoryClient`] surface.

use std::sync::Arc;
use std::time::Duration;

use ethers::abi::{self, ParamType, Token};
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethfs_protocol::contract::{
    SIG_COUNT_CHUNKS, SIG_GET_CHUNK_HASH, SIG_GET_STORAGE_MODE, SIG_IS_SUPPORT_BLOB,
    SIG_READ_CHUNK, SIG_UPFRONT_PAYMENT,
};
use ethfs_protocol::{B256, DirectoryCall, FeeData, StorageMode, TxOptions, TxReceipt};
use ethfs_uploader::{ClientFuture, DirectoryClient, UploadError};
use tracing::debug;

/// Provider plus local signing key.
pub type EthSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

pub fn provider(rpc_url: &str) -> anyhow::Result<Provider<Http>> {
    let provider = Provider::<Http>::try_from(rpc_url)
        .map_err(|e| anyhow::anyhow!("invalid RPC url {rpc_url}: {e}"))?;
    Ok(provider.interval(POLL_INTERVAL))
}

pub fn signer(
    provider: Provider<Http>,
    private_key: &str,
    chain_id: u64,
) -> anyhow::Result<EthSigner> {
    let wallet = private_key
        .parse::<LocalWallet>()
        .map_err(|e| anyhow::anyhow!("invalid private key: {e}"))?
        .with_chain_id(chain_id);
    Ok(SignerMiddleware::new(provider, wallet))
}

/// Sends the contract's init code and returns the deployed address.
pub async fn deploy(signer: &EthSigner, init_code: Vec<u8>) -> anyhow::Result<Address> {
    let tx = Eip1559TransactionRequest::new()
        .from(signer.address())
        .data(Bytes::from(init_code));
    let pending = signer.send_transaction(tx, None).await?;
    debug!(tx = ?pending.tx_hash(), "deployment sent");

    let receipt = pending
        .await?
        .ok_or_else(|| anyhow::anyhow!("deployment transaction was dropped"))?;
    if receipt.status != Some(U64::from(1)) {
        anyhow::bail!("deployment reverted: {:?}", receipt.transaction_hash);
    }
    receipt
        .contract_address
        .ok_or_else(|| anyhow::anyhow!("receipt carries no contract address"))
}

pub struct EthersClient<M> {
    middleware: Arc<M>,
    contract: Address,
    chain_id: u64,
}

impl<M: Middleware> EthersClient<M> {
    pub fn new(middleware: Arc<M>, contract: Address, chain_id: u64) -> Self {
        Self {
            middleware,
            contract,
            chain_id,
        }
    }

    /// `eth_call` against the contract, decoding `outputs`.
    async fn view(
        &self,
        signature: &str,
        args: &[Token],
        outputs: &[ParamType],
    ) -> Result<Vec<Token>, UploadError> {
        let tx: TypedTransaction = Eip1559TransactionRequest::new()
            .to(self.contract)
            .data(encode_call(signature, args))
            .into();
        let raw = self.middleware.call(&tx, None).await.map_err(rpc_error)?;
        abi::decode(outputs, &raw).map_err(rpc_error)
    }

    pub async fn read_count_chunks(&self, name: &[u8]) -> Result<u64, UploadError> {
        let out = self
            .view(
                SIG_COUNT_CHUNKS,
                &[Token::Bytes(name.to_vec())],
                &[ParamType::Uint(256)],
            )
            .await?;
        as_u64(first(out)?)
    }

    pub async fn read_chunk_hash(&self, name: &[u8], chunk_id: u64) -> Result<B256, UploadError> {
        let out = self
            .view(
                SIG_GET_CHUNK_HASH,
                &[Token::Bytes(name.to_vec()), Token::Uint(chunk_id.into())],
                &[ParamType::FixedBytes(32)],
            )
            .await?;
        match first(out)? {
            Token::FixedBytes(bytes) if bytes.len() == 32 => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&bytes);
                Ok(B256(hash))
            }
            other => Err(unexpected("bytes32", &other)),
        }
    }

    pub async fn read_storage_mode(&self, name: &[u8]) -> Result<StorageMode, UploadError> {
        let out = self
            .view(
                SIG_GET_STORAGE_MODE,
                &[Token::Bytes(name.to_vec())],
                &[ParamType::Uint(256)],
            )
            .await?;
        Ok(StorageMode::from_raw(as_u64(first(out)?)?))
    }

    pub async fn read_is_support_blob(&self) -> Result<bool, UploadError> {
        let out = self.view(SIG_IS_SUPPORT_BLOB, &[], &[ParamType::Bool]).await?;
        match first(out)? {
            Token::Bool(b) => Ok(b),
            other => Err(unexpected("bool", &other)),
        }
    }

    pub async fn read_upfront_payment(&self) -> Result<u128, UploadError> {
        let out = self
            .view(SIG_UPFRONT_PAYMENT, &[], &[ParamType::Uint(256)])
            .await?;
        as_u128(first(out)?)
    }

    /// Chunk content and whether the chunk exists.
    pub async fn read_chunk(
        &self,
        name: &[u8],
        chunk_id: u64,
    ) -> Result<(Vec<u8>, bool), UploadError> {
        let out = self
            .view(
                SIG_READ_CHUNK,
                &[Token::Bytes(name.to_vec()), Token::Uint(chunk_id.into())],
                &[ParamType::Bytes, ParamType::Bool],
            )
            .await?;
        match out.as_slice() {
            [Token::Bytes(data), Token::Bool(found)] => Ok((data.clone(), *found)),
            _ => Err(UploadError::Rpc("unexpected readChunk return data".into())),
        }
    }
}

impl EthersClient<EthSigner> {
    fn request(&self, call: &DirectoryCall, options: &TxOptions) -> Eip1559TransactionRequest {
        let mut tx = Eip1559TransactionRequest::new()
            .from(self.middleware.address())
            .to(self.contract)
            .data(encode_directory_call(call))
            .value(U256::from(options.value))
            .chain_id(self.chain_id);
        if let Some(nonce) = options.nonce {
            tx = tx.nonce(nonce);
        }
        if let Some(gas) = options.gas_limit {
            tx = tx.gas(gas);
        }
        if let Some(max_fee) = options.max_fee_per_gas {
            tx = tx.max_fee_per_gas(U256::from(max_fee));
        }
        if let Some(priority) = options.max_priority_fee_per_gas {
            tx = tx.max_priority_fee_per_gas(U256::from(priority));
        }
        tx
    }
}

impl DirectoryClient for EthersClient<EthSigner> {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn pending_nonce(&self) -> ClientFuture<'_, u64> {
        Box::pin(async move {
            let nonce = self
                .middleware
                .get_transaction_count(
                    self.middleware.address(),
                    Some(BlockNumber::Pending.into()),
                )
                .await
                .map_err(rpc_error)?;
            u256_to_u64(nonce)
        })
    }

    fn fee_data(&self) -> ClientFuture<'_, FeeData> {
        Box::pin(async move {
            let gas_price = self.middleware.get_gas_price().await.map_err(rpc_error)?;
            let (max_fee, priority_fee) =
                match self.middleware.estimate_eip1559_fees(None).await {
                    Ok(fees) => fees,
                    Err(e) => {
                        debug!("EIP-1559 fees unavailable, using gas price: {e}");
                        (gas_price, gas_price)
                    }
                };
            Ok(FeeData {
                gas_price: u256_to_u128(gas_price)?,
                max_fee_per_gas: u256_to_u128(max_fee)?,
                max_priority_fee_per_gas: u256_to_u128(priority_fee)?,
            })
        })
    }

    fn is_support_blob(&self) -> ClientFuture<'_, bool> {
        Box::pin(self.read_is_support_blob())
    }

    fn storage_mode(&self, name: &[u8]) -> ClientFuture<'_, StorageMode> {
        let name = name.to_vec();
        Box::pin(async move { self.read_storage_mode(&name).await })
    }

    fn count_chunks(&self, name: &[u8]) -> ClientFuture<'_, u64> {
        let name = name.to_vec();
        Box::pin(async move { self.read_count_chunks(&name).await })
    }

    fn chunk_hash(&self, name: &[u8], chunk_id: u64) -> ClientFuture<'_, B256> {
        let name = name.to_vec();
        Box::pin(async move { self.read_chunk_hash(&name, chunk_id).await })
    }

    fn upfront_payment(&self) -> ClientFuture<'_, u128> {
        Box::pin(self.read_upfront_payment())
    }

    fn estimate_gas(&self, call: &DirectoryCall, value: u128) -> ClientFuture<'_, u64> {
        let options = TxOptions {
            value,
            ..TxOptions::default()
        };
        let tx: TypedTransaction = self.request(call, &options).into();
        Box::pin(async move {
            let gas = self
                .middleware
                .estimate_gas(&tx, None)
                .await
                .map_err(rpc_error)?;
            u256_to_u64(gas)
        })
    }

    fn send(&self, call: DirectoryCall, options: TxOptions) -> ClientFuture<'_, B256> {
        Box::pin(async move {
            let tx = self.request(&call, &options);
            let pending = self
                .middleware
                .send_transaction(tx, None)
                .await
                .map_err(rpc_error)?;
            Ok(B256(pending.tx_hash().0))
        })
    }

    fn wait_receipt(&self, tx_hash: B256) -> ClientFuture<'_, TxReceipt> {
        Box::pin(async move {
            let pending = PendingTransaction::new(H256(tx_hash.0), self.middleware.provider())
                .interval(POLL_INTERVAL);
            let receipt = pending
                .await
                .map_err(rpc_error)?
                .ok_or_else(|| UploadError::Rpc(format!("transaction {tx_hash} was dropped")))?;
            Ok(TxReceipt {
                tx_hash,
                success: receipt.status == Some(U64::from(1)),
            })
        })
    }
}

/// Selector followed by the ABI-encoded arguments.
pub fn encode_call(signature: &str, args: &[Token]) -> Bytes {
    let mut data = ethers::utils::id(signature).to_vec();
    data.extend(abi::encode(args));
    data.into()
}

/// Calldata of a directory write.
pub(crate) fn encode_directory_call(call: &DirectoryCall) -> Bytes {
    encode_call(call.signature(), &call_tokens(call))
}

fn call_tokens(call: &DirectoryCall) -> Vec<Token> {
    match call {
        DirectoryCall::WriteChunk {
            name,
            chunk_id,
            data,
        } => vec![
            Token::Bytes(name.clone()),
            Token::Uint((*chunk_id).into()),
            Token::Bytes(data.clone()),
        ],
        DirectoryCall::WriteChunks {
            name,
            chunk_ids,
            sizes,
        } => vec![
            Token::Bytes(name.clone()),
            uint_array(chunk_ids),
            uint_array(sizes),
        ],
        DirectoryCall::Remove { name } | DirectoryCall::SetDefault { name } => {
            vec![Token::Bytes(name.clone())]
        }
        DirectoryCall::Refund => Vec::new(),
    }
}

fn uint_array(values: &[u64]) -> Token {
    Token::Array(values.iter().map(|&v| Token::Uint(v.into())).collect())
}

fn first(tokens: Vec<Token>) -> Result<Token, UploadError> {
    tokens
        .into_iter()
        .next()
        .ok_or_else(|| UploadError::Rpc("empty return data".into()))
}

fn as_u64(token: Token) -> Result<u64, UploadError> {
    match token {
        Token::Uint(v) => u256_to_u64(v),
        other => Err(unexpected("uint256", &other)),
    }
}

fn as_u128(token: Token) -> Result<u128, UploadError> {
    match token {
        Token::Uint(v) => u256_to_u128(v),
        other => Err(unexpected("uint256", &other)),
    }
}

pub fn u256_to_u64(value: U256) -> Result<u64, UploadError> {
    if value > U256::from(u64::MAX) {
        return Err(UploadError::Rpc(format!("value {value} overflows u64")));
    }
    Ok(value.as_u64())
}

fn u256_to_u128(value: U256) -> Result<u128, UploadError> {
    if value.bits() > 128 {
        return Err(UploadError::Rpc(format!("value {value} overflows u128")));
    }
    Ok(value.as_u128())
}

fn unexpected(expected: &str, got: &Token) -> UploadError {
    UploadError::Rpc(format!("expected {expected} in return data, got {got:?}"))
}

pub(crate) fn rpc_error(e: impl std::fmt::Display) -> UploadError {
    UploadError::Rpc(e.to_string())
}
