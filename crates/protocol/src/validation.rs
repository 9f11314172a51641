//! Validation of user-supplied keys and directory addresses.

use crate::ProtocolError;
use crate::constants::chain_id_for_short_name;

/// A flat directory contract address, optionally pinned to a chain by an
/// EIP-3770 prefix (`sep:0x...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryAddress {
    pub chain_id: Option<u64>,
    pub address: String,
}

/// Returns `true` if `key` is 32 bytes of hex, with or without `0x`.
pub fn is_private_key(key: &str) -> bool {
    let hex_part = strip_hex_prefix(key);
    hex_part.len() == 64 && hex_part.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns `true` for a `0x`-prefixed 20-byte hex address.
pub fn is_address(value: &str) -> bool {
    value.len() == 42
        && value.starts_with("0x")
        && value[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parses `0x...` or `shortName:0x...`.
pub fn parse_directory_address(input: &str) -> Result<DirectoryAddress, ProtocolError> {
    let (chain_id, address) = match input.split_once(':') {
        Some((short_name, address)) => {
            let chain_id = chain_id_for_short_name(short_name)
                .ok_or_else(|| ProtocolError::UnknownShortName(short_name.to_string()))?;
            (Some(chain_id), address)
        }
        None => (None, input),
    };

    if !is_address(address) {
        return Err(ProtocolError::InvalidAddress(input.to_string()));
    }
    if address[2..].bytes().all(|b| b == b'0') {
        return Err(ProtocolError::InvalidAddress(input.to_string()));
    }

    Ok(DirectoryAddress {
        chain_id,
        address: address.to_string(),
    })
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}
