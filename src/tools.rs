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

//! The Extra Sauce
//! Defines a `TranscriptProtocol` trait for using a Merlin transcript
//! as the domain-separated hash behind key derivation and aggregation.
//!
//! Every use opens its own transcript with one of the labels below, so a
//! derivation tweak can never be replayed as an aggregation weight.

use crate::curve::{Scalar, WIDE_SCALAR_LENGTH};
use crate::keys::{ChainCode, PublicKey, CHAIN_CODE_LENGTH};
use merlin::Transcript;
use zeroize::Zeroize;

/// Transcript label for expanding a seed into the master key.
pub const MASTER_LABEL: &[u8] = b"BLS.HD.master";

/// Transcript label for child key derivation.
pub const DERIVATION_LABEL: &[u8] = b"BLS.HD.derivation";

/// Transcript label for secure public key aggregation weights.
pub const AGGREGATION_LABEL: &[u8] = b"BLS.aggregation";

/// Extension trait to the Merlin transcript API that allows committing keys
/// and integers and squeezing scalars of the BLS12-381 field.
pub trait TranscriptProtocol {
    /// Commit a domain separator for the protocol in use.
    fn proto_name(&mut self, label: &'static [u8]);
    /// Commit a raw byte string.
    fn commit_message(&mut self, label: &'static [u8], bytes: &[u8]);
    /// Commit a `u32`, e.g. a child index.
    fn commit_u32(&mut self, label: &'static [u8], x: u32);
    /// Commit a public key by its canonical encoding.
    fn commit_key(&mut self, label: &'static [u8], key: &PublicKey);
    /// Compute a challenge scalar using 512 bits of transcript output.
    fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar;
    /// Squeeze a fresh chain code.
    fn challenge_chain_code(&mut self, label: &'static [u8]) -> ChainCode;
}

impl TranscriptProtocol for Transcript {
    fn proto_name(&mut self, label: &'static [u8]) {
        self.append_message(b"dom-sep", label);
    }

    fn commit_message(&mut self, label: &'static [u8], bytes: &[u8]) {
        self.append_message(label, bytes);
    }

    fn commit_u32(&mut self, label: &'static [u8], x: u32) {
        self.append_message(label, &x.to_be_bytes());
    }

    fn commit_key(&mut self, label: &'static [u8], key: &PublicKey) {
        self.append_message(label, &key.to_bytes());
    }

    fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar {
        let mut buf = [0u8; WIDE_SCALAR_LENGTH];
        self.challenge_bytes(label, &mut buf);
        let s = Scalar::from_wide(&buf);
        buf.zeroize();
        s
    }

    fn challenge_chain_code(&mut self, label: &'static [u8]) -> ChainCode {
        let mut buf = [0u8; CHAIN_CODE_LENGTH];
        self.challenge_bytes(label, &mut buf);
        let cc = ChainCode::new(buf);
        buf.zeroize();
        cc
    }
}
