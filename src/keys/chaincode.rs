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

//! Chain codes, the extra entropy carried by every node of the key tree.

use crate::BlsError;
use core::fmt::Debug;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// The length of a `ChainCode`, in bytes.
pub const CHAIN_CODE_LENGTH: usize = 32;

/// The 32 bytes of entropy mixed into every child derivation.
///
/// Produced by seed expansion and derivation; outside the crate it can only be
/// obtained by deserializing one.
#[derive(Clone, Zeroize)]
pub struct ChainCode([u8; CHAIN_CODE_LENGTH]);

impl ChainCode {
    pub(crate) fn new(bytes: [u8; CHAIN_CODE_LENGTH]) -> ChainCode {
        ChainCode(bytes)
    }

    /// Construct a `ChainCode` from exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<ChainCode, BlsError> {
        if bytes.len() != CHAIN_CODE_LENGTH {
            return Err(BlsError::encoding("ChainCode"));
        }
        let mut cc = [0u8; CHAIN_CODE_LENGTH];
        cc.copy_from_slice(bytes);
        Ok(ChainCode(cc))
    }

    /// Copy out the raw bytes.
    pub fn to_bytes(&self) -> [u8; CHAIN_CODE_LENGTH] {
        self.0
    }

    /// View the raw bytes.
    pub fn as_bytes(&self) -> &[u8; CHAIN_CODE_LENGTH] {
        &self.0
    }
}

impl Debug for ChainCode {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "ChainCode( {} )", hex::encode(self.0))
    }
}

impl ConstantTimeEq for ChainCode {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl PartialEq for ChainCode {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for ChainCode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_checks_length() {
        assert!(ChainCode::from_bytes(&[1u8; 31]).is_err());
        assert!(ChainCode::from_bytes(&[1u8; 33]).is_err());

        let cc = ChainCode::from_bytes(&[9u8; 32]).unwrap();
        assert_eq!(cc.to_bytes(), [9u8; 32]);
        assert_eq!(cc, ChainCode::new([9u8; 32]));
        assert_ne!(cc, ChainCode::new([8u8; 32]));
    }
}
