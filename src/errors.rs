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

//! Errors which may occur when parsing keys to or from wire formats, or when
//! deriving and aggregating them.

use thiserror::Error;

/// Represents an error in key parsing, derivation or aggregation.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum BlsError {
    /// Bytes (or hex) that do not decode to a valid key of the named type.
    #[error("Invalid encoding for {name}")]
    InvalidEncoding {
        /// The type that failed to decode
        name: &'static str,
    },

    /// Aggregation was called with no keys.
    #[error("Cannot aggregate an empty set of keys")]
    EmptyInput,

    /// Hardened derivation needs the private key.
    #[error("Cannot derive hardened child {index:#x} from a public key")]
    HardenedChildFromPublicKey {
        /// The rejected child index
        index: u32,
    },

    /// The parent already sits at the maximum depth of 255.
    #[error("Cannot derive further than 255 levels")]
    DepthExceeded,

    /// A derived or aggregated scalar came out as zero.
    #[error("Derived key material is zero")]
    InvalidDerivation,

    /// A derivation path string that could not be parsed.
    #[error("Invalid derivation path {path:?}")]
    InvalidPath {
        /// The offending input
        path: String,
    },
}

impl BlsError {
    pub(crate) fn encoding(name: &'static str) -> BlsError {
        BlsError::InvalidEncoding { name }
    }
}

/// Convert `BlsError` into `::serde::de::Error` aka `SerdeError`
///
/// We should do this with `From` but right now the orphan rules prohibit
/// `impl From<BlsError> for E where E: ::serde::de::Error`.
pub(crate) fn serde_error_from_bls_error<E>(err: BlsError) -> E
where
    E: ::serde::de::Error,
{
    match err {
        BlsError::InvalidEncoding { name } => E::custom(format!("invalid {} encoding", name)),
        other => E::custom(other),
    }
}
