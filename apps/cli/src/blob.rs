//! EIP-4844 blob submission.
//!
//! ethers has no type-3 transactions, so blob writes go through an alloy
//! provider with a local wallet. Calls are ABI-encoded by the ethers
//! client so both paths send identical calldata.

use std::time::Duration;

use alloy::eips::eip4844::BlobTransactionSidecar;
use alloy::network::{EthereumWallet, TransactionBuilder, TransactionBuilder4844};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::Context;
use ethfs_protocol::{B256, DirectoryCall, TxOptions, TxReceipt};
use ethfs_transfer::BLOB_DATA_SIZE;
use ethfs_uploader::{Blob, BlobClient, ClientFuture, UploadError};
use tracing::debug;

use crate::client::{encode_directory_call, rpc_error};

/// Bytes in one blob.
pub const BLOB_SIZE: usize = 131_072;
/// Field elements hold 31 payload bytes behind a zero high byte.
const FIELD_ELEMENT_SIZE: usize = 32;
const FIELD_PAYLOAD_SIZE: usize = 31;
/// Leading bytes of the versioned hash kept by the contract.
const STORED_HASH_LEN: usize = 24;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Sends blob-carrying writes to one flat directory contract.
pub struct AlloyBlobClient {
    provider: DynProvider,
    contract: Address,
    chain_id: u64,
}

impl AlloyBlobClient {
    pub fn connect(
        rpc_url: &str,
        private_key: &str,
        contract: [u8; 20],
        chain_id: u64,
    ) -> anyhow::Result<Self> {
        let key = private_key.strip_prefix("0x").unwrap_or(private_key);
        let signer: PrivateKeySigner = key.parse().context("invalid private key")?;
        let url = rpc_url
            .parse()
            .with_context(|| format!("invalid provider url {rpc_url}"))?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();
        Ok(Self {
            provider,
            contract: Address::from(contract),
            chain_id,
        })
    }

    fn request(&self, call: &DirectoryCall, options: &TxOptions) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_to(self.contract)
            .with_input(Bytes::from(encode_directory_call(call).to_vec()))
            .with_value(U256::from(options.value))
            .with_chain_id(self.chain_id);
        if let Some(nonce) = options.nonce {
            tx = tx.with_nonce(nonce);
        }
        if let Some(gas) = options.gas_limit {
            tx = tx.with_gas_limit(gas);
        }
        if let Some(max_fee) = options.max_fee_per_gas {
            tx = tx.with_max_fee_per_gas(max_fee);
        }
        if let Some(priority) = options.max_priority_fee_per_gas {
            tx = tx.with_max_priority_fee_per_gas(priority);
        }
        tx
    }
}

impl BlobClient for AlloyBlobClient {
    fn encode_blobs(&self, data: &[u8]) -> Result<Vec<Blob>, UploadError> {
        Ok(encode_blobs(data))
    }

    fn blob_hash(&self, blob: &Blob) -> Result<B256, UploadError> {
        let sidecar = sidecar(std::slice::from_ref(blob))?;
        let versioned = sidecar
            .versioned_hashes()
            .next()
            .ok_or_else(|| UploadError::Rpc("no commitment for blob".into()))?;
        Ok(stored_blob_hash(versioned.0))
    }

    fn send_blob_tx(
        &self,
        call: DirectoryCall,
        options: TxOptions,
        blobs: Vec<Blob>,
    ) -> ClientFuture<'_, B256> {
        Box::pin(async move {
            let sidecar = sidecar(&blobs)?;
            let blob_fee = self.provider.get_blob_base_fee().await.map_err(rpc_error)?;
            let tx = self
                .request(&call, &options)
                .with_max_fee_per_blob_gas(blob_fee)
                .with_blob_sidecar(sidecar);

            let pending = self.provider.send_transaction(tx).await.map_err(rpc_error)?;
            let tx_hash = B256(pending.tx_hash().0);
            debug!(tx = %tx_hash, blobs = blobs.len(), "blob transaction sent");
            Ok(tx_hash)
        })
    }

    fn wait_receipt(&self, tx_hash: B256) -> ClientFuture<'_, TxReceipt> {
        Box::pin(async move {
            let hash = alloy::primitives::B256::from(tx_hash.0);
            loop {
                let receipt = self
                    .provider
                    .get_transaction_receipt(hash)
                    .await
                    .map_err(rpc_error)?;
                if let Some(receipt) = receipt {
                    return Ok(TxReceipt {
                        tx_hash,
                        success: receipt.status(),
                    });
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
    }
}

/// Packs `data` into blobs of `BLOB_DATA_SIZE` payload bytes. Empty input
/// gives one zero blob.
pub fn encode_blobs(data: &[u8]) -> Vec<Blob> {
    if data.is_empty() {
        return vec![Blob(vec![0u8; BLOB_SIZE])];
    }
    data.chunks(BLOB_DATA_SIZE as usize)
        .map(|piece| {
            let mut blob = vec![0u8; BLOB_SIZE];
            for (i, payload) in piece.chunks(FIELD_PAYLOAD_SIZE).enumerate() {
                let start = i * FIELD_ELEMENT_SIZE + 1;
                blob[start..start + payload.len()].copy_from_slice(payload);
            }
            Blob(blob)
        })
        .collect()
}

/// Keeps the leading bytes of a versioned hash and zeroes the rest.
pub fn stored_blob_hash(versioned: [u8; 32]) -> B256 {
    let mut hash = [0u8; 32];
    hash[..STORED_HASH_LEN].copy_from_slice(&versioned[..STORED_HASH_LEN]);
    B256(hash)
}

fn sidecar(blobs: &[Blob]) -> Result<BlobTransactionSidecar, UploadError> {
    BlobTransactionSidecar::try_from_blobs_bytes(blobs.iter().map(|b| b.0.as_slice()))
        .map_err(|e| UploadError::Rpc(format!("failed to commit to blob: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_fits_blob_layout() {
        assert_eq!(BLOB_DATA_SIZE as usize, BLOB_SIZE / FIELD_ELEMENT_SIZE * FIELD_PAYLOAD_SIZE);
    }

    #[test]
    fn field_elements_keep_high_byte_zero() {
        let data: Vec<u8> = (1..=100u8).collect();
        let blobs = encode_blobs(&data);
        assert_eq!(blobs.len(), 1);
        let blob = &blobs[0].0;
        assert_eq!(blob.len(), BLOB_SIZE);

        assert_eq!(blob[0], 0);
        assert_eq!(&blob[1..32], &data[..31]);
        assert_eq!(blob[32], 0);
        assert_eq!(&blob[33..64], &data[31..62]);
        // 100 bytes fill three elements and seven bytes of the fourth.
        assert_eq!(&blob[97..104], &data[93..100]);
        assert!(blob[104..].iter().all(|&b| b == 0));
    }

    #[test]
    fn one_blob_per_payload_size() {
        let size = BLOB_DATA_SIZE as usize;
        assert_eq!(encode_blobs(&vec![7u8; size]).len(), 1);
        assert_eq!(encode_blobs(&vec![7u8; size + 1]).len(), 2);
        assert_eq!(encode_blobs(&vec![7u8; size * 3]).len(), 3);

        let blobs = encode_blobs(&vec![7u8; size + 1]);
        assert_eq!(blobs[1].0[1], 7);
        assert!(blobs[1].0[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_input_gives_one_zero_blob() {
        let blobs = encode_blobs(&[]);
        assert_eq!(blobs.len(), 1);
        assert!(blobs[0].0.iter().all(|&b| b == 0));
    }

    #[test]
    fn stored_hash_keeps_first_24_bytes() {
        let versioned = [0xabu8; 32];
        let stored = stored_blob_hash(versioned);
        assert_eq!(&stored.0[..24], &[0xab; 24]);
        assert_eq!(&stored.0[24..], &[0u8; 8]);
    }

    #[test]
    fn blob_hash_is_versioned_and_truncated() {
        let blobs = encode_blobs(b"hello blob");
        let sidecar = sidecar(&blobs).unwrap();
        let versioned = sidecar.versioned_hashes().next().unwrap();
        assert_eq!(versioned.0[0], 0x01);

        let stored = stored_blob_hash(versioned.0);
        assert_eq!(stored.0[0], 0x01);
        assert_eq!(&stored.0[..24], &versioned.0[..24]);
        assert_eq!(&stored.0[24..], &[0u8; 8]);
    }
}
