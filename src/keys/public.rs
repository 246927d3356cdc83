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

//! BLS Public Keys, points of G1.

use crate::curve::{G1Point, G1_COMPRESSED_LENGTH};
use crate::keys::PrivateKey;
use crate::BlsError;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// The length of a BLS12-381 `PublicKey`, in bytes.
pub const PUBLIC_KEY_LENGTH: usize = G1_COMPRESSED_LENGTH;

/// A BLS public key.
#[derive(Copy, Clone)]
pub struct PublicKey(pub(crate) G1Point);

impl Debug for PublicKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
        write!(f, "PublicKey( {} )", hex::encode(self.to_bytes()))
    }
}

impl PublicKey {
    const DESCRIPTION: &'static str = "A BLS12-381 G1 public key as 48 compressed bytes.";

    pub(crate) fn from_point(point: G1Point) -> PublicKey {
        PublicKey(point)
    }

    pub(crate) fn as_point(&self) -> &G1Point {
        &self.0
    }

    /// Convert this public key to its canonical compressed encoding.
    #[inline]
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.compress()
    }

    /// Construct a `PublicKey` from a slice of bytes.
    ///
    /// # Returns
    ///
    /// A `Result` whose okay value is a `PublicKey`, or an
    /// `InvalidEncoding` error if the slice has the wrong length or does not
    /// hold a point of the G1 subgroup.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<PublicKey, BlsError> {
        G1Point::decompress(bytes)
            .map(PublicKey)
            .ok_or_else(|| BlsError::encoding("PublicKey"))
    }

    /// Construct a `PublicKey` from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<PublicKey, BlsError> {
        let bytes = hex::decode(hex_str).map_err(|_| BlsError::encoding("PublicKey"))?;
        PublicKey::from_bytes(&bytes)
    }

    /// Derive this public key from its corresponding `PrivateKey`.
    pub fn from_private(private_key: &PrivateKey) -> PublicKey {
        PublicKey(G1Point::mul_generator(private_key.as_scalar()))
    }

    /// The first four bytes of the serialized key, read big-endian.
    ///
    /// Only an identifier: two keys may share a fingerprint. Bytes 4..48 of
    /// the encoding do not enter it, so keys differing only there collide.
    pub fn fingerprint(&self) -> u32 {
        fingerprint_of(&self.to_bytes())
    }
}

fn fingerprint_of(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

impl From<&PrivateKey> for PublicKey {
    fn from(source: &PrivateKey) -> PublicKey {
        PublicKey::from_private(source)
    }
}

impl FromStr for PublicKey {
    type Err = BlsError;

    fn from_str(s: &str) -> Result<PublicKey, BlsError> {
        PublicKey::from_hex(s)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &PublicKey) -> bool {
        self.0 == other.0
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

serde_boilerplate!(PublicKey);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn random_key(seed: u8) -> PublicKey {
        let mut rng = ChaChaRng::from_seed([seed; 32]);
        PrivateKey::generate(&mut rng).public_key()
    }

    #[test]
    fn bytes_roundtrip() {
        let pk = random_key(1);
        let decoded = PublicKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(pk, decoded);
        assert_eq!(pk.to_bytes(), decoded.to_bytes());
    }

    #[test]
    fn hex_roundtrip() {
        let pk = random_key(2);
        let encoded = hex::encode(pk.to_bytes());
        assert_eq!(PublicKey::from_hex(&encoded).unwrap(), pk);
        assert_eq!(encoded.parse::<PublicKey>().unwrap(), pk);
    }

    #[test]
    fn rejects_bad_input() {
        let pk = random_key(3);
        let bytes = pk.to_bytes();

        assert_eq!(
            PublicKey::from_bytes(&bytes[..47]),
            Err(BlsError::encoding("PublicKey"))
        );
        assert!(PublicKey::from_bytes(&[0u8; 48]).is_err());
        assert!(PublicKey::from_hex("not hex").is_err());
    }

    #[test]
    fn equality_is_point_equality() {
        let a = random_key(4);
        let b = random_key(5);
        assert_ne!(a, b);

        // the same point reached through different group operations
        let sum1 = PublicKey::from_point(a.as_point().add(b.as_point()));
        let sum2 = PublicKey::from_point(b.as_point().add(a.as_point()));
        assert_eq!(sum1, sum2);
    }

    #[test]
    fn fingerprint_is_serialization_prefix() {
        let pk = random_key(6);
        let bytes = pk.to_bytes();
        let expected = ((bytes[0] as u32) << 24)
            | ((bytes[1] as u32) << 16)
            | ((bytes[2] as u32) << 8)
            | (bytes[3] as u32);
        assert_eq!(pk.fingerprint(), expected);

        let copy = PublicKey::from_bytes(&bytes).unwrap();
        assert_eq!(copy.fingerprint(), pk.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_prefix_bytes() {
        let bytes = random_key(7).to_bytes();
        let fp = fingerprint_of(&bytes);

        for i in 0..4 {
            let mut flipped = bytes;
            flipped[i] ^= 0x01;
            assert_ne!(fingerprint_of(&flipped), fp, "byte {}", i);
        }
        for i in 4..PUBLIC_KEY_LENGTH {
            let mut flipped = bytes;
            flipped[i] ^= 0x01;
            assert_eq!(fingerprint_of(&flipped), fp, "byte {}", i);
        }
    }

    #[test]
    fn fingerprints_spot_check() {
        let fingerprints: Vec<u32> = (10..20).map(|i| random_key(i).fingerprint()).collect();
        for (i, a) in fingerprints.iter().enumerate() {
            for b in fingerprints.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
