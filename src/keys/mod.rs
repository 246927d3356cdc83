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

//! Keys to the kingdom

mod public;
pub use public::{PublicKey, PUBLIC_KEY_LENGTH};

mod private;
pub use private::{PrivateKey, PRIVATE_KEY_LENGTH};

mod chaincode;
pub use chaincode::{ChainCode, CHAIN_CODE_LENGTH};

/// Rogue key resistant aggregation
mod aggregation;
pub use aggregation::{
    aggregate_insecure, aggregate_private_keys, aggregate_private_keys_insecure, aggregate_secure,
};

mod extended;
pub use extended::{
    is_hardened, ExtendedPrivateKey, ExtendedPublicKey, EXTENDED_PRIVATE_KEY_LENGTH,
    EXTENDED_PUBLIC_KEY_LENGTH, HARDENED_INDEX, MAX_DEPTH, VERSION,
};

mod path;
pub use path::DerivationPath;
