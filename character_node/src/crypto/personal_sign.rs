//! EIP-191 `personal_sign` hashing, signing and signer recovery over secp256k1.

use super::{keccak256, CryptoError, Result};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Hash `message` the way wallets do before a `personal_sign`.
pub fn eip191_hash(message: &[u8]) -> [u8; 32] {
    let mut prefixed =
        Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 20 + message.len());
    prefixed.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    prefixed.extend_from_slice(message.len().to_string().as_bytes());
    prefixed.extend_from_slice(message);
    keccak256(&prefixed)
}

/// Decode a 65-byte `r || s || v` hex signature.
///
/// `v` may be the raw recovery id (0/1) or the legacy 27/28 form.
pub fn parse_signature(signature: &str) -> Result<RecoverableSignature> {
    let trimmed = signature.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(hex_part)?;
    if bytes.len() != 65 {
        return Err(CryptoError::InvalidLength(bytes.len()));
    }

    let v = match bytes[64] {
        0 | 1 => bytes[64],
        27 | 28 => bytes[64] - 27,
        other => return Err(CryptoError::InvalidRecoveryId(other)),
    };
    let recovery_id = RecoveryId::from_i32(i32::from(v))?;
    Ok(RecoverableSignature::from_compact(&bytes[..64], recovery_id)?)
}

/// Recover the address that produced `signature` over `message`.
pub fn recover_address(message: &[u8], signature: &str) -> Result<String> {
    let signature = parse_signature(signature)?;
    let digest = Message::from_digest(eip191_hash(message));
    let public_key = Secp256k1::verification_only().recover_ecdsa(&digest, &signature)?;
    Ok(address_from_public_key(&public_key))
}

/// EIP-55 address of a secp256k1 public key.
pub fn address_from_public_key(public_key: &PublicKey) -> String {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    super::to_checksum_address(&address)
}

/// Produce a wallet-compatible `personal_sign` signature (`0x`, 65 bytes, v=27/28).
pub fn sign_personal_message(secret_key: &[u8], message: &[u8]) -> Result<String> {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(secret_key)?;
    let digest = Message::from_digest(eip191_hash(message));
    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&digest, &secret_key)
        .serialize_compact();

    let mut bytes = Vec::with_capacity(65);
    bytes.extend_from_slice(&compact);
    bytes.push(recovery_id.to_i32() as u8 + 27);
    Ok(format!("0x{}", hex::encode(bytes)))
}

/// Address controlled by `secret_key`.
pub fn address_of_secret(secret_key: &[u8]) -> Result<String> {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(secret_key)?;
    Ok(address_from_public_key(&PublicKey::from_secret_key(
        &secp,
        &secret_key,
    )))
}
