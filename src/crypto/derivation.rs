//! HD key derivation for Terra accounts.
//!
//! Path format: m/44'/330'/0'/0/address_index (Terra coin type 330).
//! Seed and raw key bytes never outlive the derivation call.

use coins_bip32::xkeys::{Parent, XPriv};
use cosmrs::crypto::secp256k1::SigningKey;
use cosmrs::crypto::PublicKey;
use cosmrs::AccountId;
use std::fmt;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::core::errors::{ClientError, Result};

/// Bech32 prefix of Terra account addresses.
pub const TERRA_PREFIX: &str = "terra";

/// SLIP-44 coin type of Terra.
pub const TERRA_COIN_TYPE: u32 = 330;

const HARDENED: u32 = 0x8000_0000;

/// Hardened/normal child indices of `m/44'/330'/0'/0/{index}`.
pub fn derivation_path(index: u32) -> [u32; 5] {
    [44 | HARDENED, TERRA_COIN_TYPE | HARDENED, HARDENED, 0, index]
}

/// A derived secp256k1 account key.
pub struct TerraKey {
    signing_key: SigningKey,
    public_key: PublicKey,
    address: AccountId,
    index: u32,
}

impl TerraKey {
    /// Derives the key at `index` from a BIP39 phrase (empty passphrase).
    pub fn from_phrase(phrase: &str, index: u32) -> Result<Self> {
        let mnemonic = bip39::Mnemonic::parse(phrase.trim())
            .map(Zeroizing::new)
            .map_err(|e| ClientError::Mnemonic(format!("Invalid mnemonic: {}", e)))?;
        let seed = Zeroizing::new(mnemonic.to_seed(""));

        let mut xprv = XPriv::root_from_seed(&seed[..], None)
            .map_err(|e| ClientError::KeyDerivation(format!("root key: {}", e)))?;
        for child in derivation_path(index) {
            xprv = xprv
                .derive_child(child)
                .map_err(|e| ClientError::KeyDerivation(format!("child {:#x}: {}", child, e)))?;
        }
        let sk_ref: &k256::ecdsa::SigningKey = xprv.as_ref();
        let mut field_bytes = sk_ref.to_bytes();
        let key_bytes = Zeroizing::new(field_bytes.to_vec());
        field_bytes.as_mut_slice().zeroize();
        Self::from_secret_bytes(&key_bytes, index)
    }

    /// Builds a key from 32 raw secret bytes.
    pub fn from_secret_bytes(bytes: &[u8], index: u32) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(ClientError::KeyDerivation("Private key must be 32 bytes".to_string()));
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| ClientError::KeyDerivation(format!("Invalid private key: {}", e)))?;
        let public_key = signing_key.public_key();
        let address = public_key
            .account_id(TERRA_PREFIX)
            .map_err(|e| ClientError::KeyDerivation(format!("address encoding: {}", e)))?;
        debug!(index, address = %address, "Derived Terra key");
        Ok(Self { signing_key, public_key, address, index })
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn account_id(&self) -> &AccountId {
        &self.address
    }

    /// bech32(`terra`, ripemd160(sha256(compressed pubkey)))
    pub fn address(&self) -> String {
        self.address.to_string()
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Debug for TerraKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerraKey")
            .field("address", &self.address.to_string())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Parses a `terra1...` account address.
pub fn parse_address(address: &str) -> Result<AccountId> {
    let account: AccountId = address
        .trim()
        .parse()
        .map_err(|e| ClientError::InvalidAddress(format!("'{}': {}", address, e)))?;
    if account.prefix() != TERRA_PREFIX {
        return Err(ClientError::InvalidAddress(format!(
            "'{}' has prefix '{}', expected '{}'",
            address,
            account.prefix(),
            TERRA_PREFIX
        )));
    }
    Ok(account)
}

pub fn validate_address(address: &str) -> bool {
    parse_address(address).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_derivation_path() {
        let path = derivation_path(7);
        assert_eq!(path[0], 0x8000002C); // 44'
        assert_eq!(path[1], 0x8000014A); // 330'
        assert_eq!(path[2], 0x80000000); // 0'
        assert_eq!(path[3], 0);
        assert_eq!(path[4], 7);
    }

    #[test]
    fn test_derive_is_deterministic_per_index() {
        let a0 = TerraKey::from_phrase(PHRASE, 0).unwrap();
        let again = TerraKey::from_phrase(PHRASE, 0).unwrap();
        let a1 = TerraKey::from_phrase(PHRASE, 1).unwrap();

        assert_eq!(a0.address(), again.address());
        assert_ne!(a0.address(), a1.address());
        assert!(a0.address().starts_with("terra1"));
        assert_eq!(a0.address().len(), 44);
        assert!(validate_address(&a1.address()));
    }

    #[test]
    fn test_invalid_mnemonic() {
        let err = TerraKey::from_phrase("not a real phrase", 0).unwrap_err();
        assert!(matches!(err, ClientError::Mnemonic(_)));
    }

    #[test]
    fn test_secret_bytes_length() {
        let err = TerraKey::from_secret_bytes(&[1u8; 16], 0).unwrap_err();
        assert!(err.to_string().contains("32"));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = TerraKey::from_secret_bytes(&[0x11u8; 32], 0).unwrap();
        let dbg = format!("{:?}", key);
        assert!(dbg.contains("terra1"));
        assert!(!dbg.contains("signing_key"));
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("terra1h6t6a8fkzcklgrdql4avpsyk7whak5umxmmek0"));
        assert!(validate_address("terra13zeuy5c6hrcwv2u7a73jket2ujhf5e5us4m956"));
        assert!(!validate_address("terra1h6t6a8fkzcklgrdql4avpsyk7whak5umxmmek1"));
        assert!(!validate_address("cosmos1j5f60735tg604tjd0ts7z22hsmva6nznz8na6q"));
        assert!(!validate_address("not-an-address"));
        assert!(!validate_address(""));
    }
}
