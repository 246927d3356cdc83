// Copyright 2019 Stichting Organism
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! BLS Private Key generation

use crate::curve::{Scalar, SCALAR_LENGTH, WIDE_SCALAR_LENGTH};
use crate::keys::PublicKey;
use crate::BlsError;
use core::fmt::Debug;
use rand::{CryptoRng, RngCore};
use std::str::FromStr;
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, Zeroizing};

/// The length of a BLS12-381 `PrivateKey`, in bytes.
pub const PRIVATE_KEY_LENGTH: usize = SCALAR_LENGTH;

/// A BLS private key: a non-zero scalar below the group order.
///
/// The scalar is overwritten with zeroes when the key is dropped.
#[derive(Clone)]
pub struct PrivateKey(pub(crate) Scalar);

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
        write!(f, "PrivateKey( {:?} )", self.public_key())
    }
}

impl Eq for PrivateKey {}
impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).unwrap_u8() == 1u8
    }
}
impl ConstantTimeEq for PrivateKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl PrivateKey {
    const DESCRIPTION: &'static str = "A BLS12-381 private key as 32 big-endian bytes.";

    /// Convert this private key to its big-endian encoding.
    #[inline]
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.0.to_be_bytes()
    }

    /// Construct a `PrivateKey` from a slice of bytes.
    ///
    /// # Returns
    ///
    /// A `Result` whose okay value is a `PrivateKey`, or an
    /// `InvalidEncoding` error if the slice is not 32 bytes or encodes zero
    /// or a value not below the group order.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<PrivateKey, BlsError> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(BlsError::encoding("PrivateKey"));
        }

        let mut bits = Zeroizing::new([0u8; PRIVATE_KEY_LENGTH]);
        bits.copy_from_slice(bytes);

        Scalar::from_be_bytes(&bits)
            .map(PrivateKey)
            .ok_or_else(|| BlsError::encoding("PrivateKey"))
    }

    /// Construct a `PrivateKey` from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<PrivateKey, BlsError> {
        let bytes = Zeroizing::new(
            hex::decode(hex_str).map_err(|_| BlsError::encoding("PrivateKey"))?,
        );
        PrivateKey::from_bytes(&bytes)
    }

    /// Generate a `PrivateKey` from a `csprng`.
    pub fn generate<T>(csprng: &mut T) -> PrivateKey
    where
        T: CryptoRng + RngCore,
    {
        let mut wide = Zeroizing::new([0u8; WIDE_SCALAR_LENGTH]);
        loop {
            csprng.fill_bytes(&mut wide[..]);
            let s = Scalar::from_wide(&wide);
            if !s.is_zero() {
                return PrivateKey(s);
            }
        }
    }

    /// Wrap a scalar, rejecting zero.
    pub(crate) fn from_scalar(s: Scalar) -> Result<PrivateKey, BlsError> {
        if s.is_zero() {
            return Err(BlsError::InvalidDerivation);
        }
        Ok(PrivateKey(s))
    }

    /// View this key as a scalar.
    pub(crate) fn as_scalar(&self) -> &Scalar {
        &self.0
    }

    /// Derive the `PublicKey` for this key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_private(self)
    }
}

impl FromStr for PrivateKey {
    type Err = BlsError;

    fn from_str(s: &str) -> Result<PrivateKey, BlsError> {
        PrivateKey::from_hex(s)
    }
}

serde_boilerplate!(PrivateKey);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    #[test]
    fn bytes_roundtrip() {
        let mut rng = ChaChaRng::from_seed([7u8; 32]);
        let sk = PrivateKey::generate(&mut rng);
        let decoded = PrivateKey::from_bytes(&sk.to_bytes()).unwrap();
        assert_eq!(sk, decoded);
        assert_eq!(sk.public_key(), decoded.public_key());
    }

    #[test]
    fn hex_roundtrip() {
        let sk: PrivateKey = "0000000000000000000000000000000000000000000000000000000000000001"
            .parse()
            .unwrap();
        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(sk.to_bytes(), one);
    }

    #[test]
    fn rejects_invalid_scalars() {
        assert_eq!(
            PrivateKey::from_bytes(&[0u8; 32]),
            Err(BlsError::encoding("PrivateKey"))
        );
        assert!(PrivateKey::from_bytes(&[0xffu8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        assert!(PrivateKey::from_hex("zz").is_err());
    }

    #[test]
    fn generation_is_seeded() {
        let a = PrivateKey::generate(&mut ChaChaRng::from_seed([1u8; 32]));
        let b = PrivateKey::generate(&mut ChaChaRng::from_seed([1u8; 32]));
        let c = PrivateKey::generate(&mut ChaChaRng::from_seed([2u8; 32]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn debug_does_not_leak_scalar() {
        let sk = PrivateKey::generate(&mut ChaChaRng::from_seed([3u8; 32]));
        let printed = format!("{:?}", sk);
        assert!(!printed.contains(&hex::encode(sk.to_bytes())));
    }
}
