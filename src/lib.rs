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

//
// Hierarchical deterministic BLS keys
//

//! BIP-32 style key trees over the G1 group of BLS12-381, plus rogue key
//! resistant public key aggregation.
//!
//! ```
//! use bls_keytree::*;
//!
//! let master = ExtendedPrivateKey::from_seed(b"correct horse battery staple").unwrap();
//! let account = master.private_child(HARDENED_INDEX + 44).unwrap();
//!
//! // watch-only wallets derive normal children from the public side
//! let xpub = account.extended_public_key();
//! assert_eq!(
//!     xpub.public_child(0).unwrap(),
//!     account.private_child(0).unwrap().extended_public_key()
//! );
//! ```

//Useful links:
//https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki
//https://eprint.iacr.org/2018/483

#[macro_use]
mod ser;

mod errors;
pub use errors::BlsError;
pub mod curve;
pub mod tools;
pub mod keys;

pub use crate::keys::*;
