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

//! Implementation of the key tree protocol: BIP-32 style extended keys.
//!
//! A child is derived by committing the parent chain code, the parent key
//! and the child index into a Merlin transcript, then squeezing a blinding
//! factor `f` and the child chain code:
//!
//! * public child: `parent.point + f·G`
//! * private child: `parent.scalar + f`
//!
//! Normal indices (`i < 2^31`) commit the parent public key, so both sides
//! arrive at the same child. Hardened indices commit the parent private key
//! and can only be taken from an `ExtendedPrivateKey`.

use core::fmt::Debug;
use std::str::FromStr;

use crate::curve::G1Point;
use crate::keys::{
    ChainCode, DerivationPath, PrivateKey, PublicKey, CHAIN_CODE_LENGTH, PRIVATE_KEY_LENGTH,
    PUBLIC_KEY_LENGTH,
};
use crate::tools::{TranscriptProtocol, DERIVATION_LABEL, MASTER_LABEL};
use crate::BlsError;
use merlin::Transcript;
use subtle::{Choice, ConstantTimeEq};
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

/// Version written into every extended key produced by this crate.
pub const VERSION: u32 = 1;

/// The first hardened child index, `2^31`.
pub const HARDENED_INDEX: u32 = 1 << 31;

/// Extended keys at this depth have no children.
pub const MAX_DEPTH: u8 = 255;

/// `version(4) || depth(1) || parent_fingerprint(4) || child_number(4) || chain_code(32)`
const HEADER_LENGTH: usize = 4 + 1 + 4 + 4 + CHAIN_CODE_LENGTH;

/// The length of a serialized `ExtendedPublicKey`, in bytes.
pub const EXTENDED_PUBLIC_KEY_LENGTH: usize = HEADER_LENGTH + PUBLIC_KEY_LENGTH;

/// The length of a serialized `ExtendedPrivateKey`, in bytes.
pub const EXTENDED_PRIVATE_KEY_LENGTH: usize = HEADER_LENGTH + PRIVATE_KEY_LENGTH;

/// True for indices that need the private key to derive.
pub fn is_hardened(index: u32) -> bool {
    index >= HARDENED_INDEX
}

/// Derivation bookkeeping. Not part of a key's identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Metadata {
    version: u32,
    depth: u8,
    parent_fingerprint: u32,
    child_number: u32,
}

impl Metadata {
    fn root() -> Metadata {
        Metadata {
            version: VERSION,
            depth: 0,
            parent_fingerprint: 0,
            child_number: 0,
        }
    }

    fn child(&self, parent_fingerprint: u32, index: u32) -> Result<Metadata, BlsError> {
        if self.depth >= MAX_DEPTH {
            debug!(index, "derivation refused at maximum depth");
            return Err(BlsError::DepthExceeded);
        }

        Ok(Metadata {
            version: self.version,
            depth: self.depth + 1,
            parent_fingerprint,
            child_number: index,
        })
    }

    fn write(&self, chain_code: &ChainCode, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.version.to_be_bytes());
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint.to_be_bytes());
        out[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        out[13..HEADER_LENGTH].copy_from_slice(chain_code.as_bytes());
    }

    fn read(bytes: &[u8], name: &'static str) -> Result<(Metadata, ChainCode), BlsError> {
        let be_u32 = |at: usize| {
            u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        let meta = Metadata {
            version: be_u32(0),
            depth: bytes[4],
            parent_fingerprint: be_u32(5),
            child_number: be_u32(9),
        };

        // a root node has no parent and no index
        if meta.depth == 0 && (meta.parent_fingerprint != 0 || meta.child_number != 0) {
            return Err(BlsError::encoding(name));
        }

        let chain_code = ChainCode::from_bytes(&bytes[13..HEADER_LENGTH])?;
        Ok((meta, chain_code))
    }
}

/// What the parent contributes to a child derivation.
enum ParentMaterial<'a> {
    Public(&'a PublicKey),
    Private(&'a PrivateKey),
}

/// Runs the derivation transcript, returning the blinding factor and the
/// child chain code.
fn derive_child_material(
    chain_code: &ChainCode,
    parent: ParentMaterial<'_>,
    index: u32,
) -> Result<(PrivateKey, ChainCode), BlsError> {
    let mut prf = Transcript::new(DERIVATION_LABEL);
    prf.commit_message(b"chain_code", chain_code.as_bytes());

    match parent {
        ParentMaterial::Public(pk) => {
            prf.proto_name(b"normal");
            prf.commit_key(b"public_key", pk);
        }
        ParentMaterial::Private(sk) => {
            prf.proto_name(b"hardened");
            let sk_bytes = Zeroizing::new(sk.to_bytes());
            prf.commit_message(b"private_key", &sk_bytes[..]);
        }
    }
    prf.commit_u32(b"index", index);

    let f = PrivateKey::from_scalar(prf.challenge_scalar(b"f"))?;
    let child_chain_code = prf.challenge_chain_code(b"chain_code");
    Ok((f, child_chain_code))
}

/// An extended public key: a node of the key tree without its private key.
///
/// Can derive every normal child, which is enough for watch-only wallets.
#[derive(Clone)]
pub struct ExtendedPublicKey {
    meta: Metadata,
    chain_code: ChainCode,
    key: PublicKey,
}

impl Debug for ExtendedPublicKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(
            f,
            "ExtendedPublicKey {{ key: {:?}, chain_code: {:?}, meta: {:?} }}",
            &self.key, &self.chain_code, &self.meta
        )
    }
}

/// Only the key and chain code are compared.
impl PartialEq for ExtendedPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.chain_code == other.chain_code
    }
}

impl Eq for ExtendedPublicKey {}

impl ExtendedPublicKey {
    const DESCRIPTION: &'static str = "A BLS extended public key as 93 bytes.";

    /// Derive the normal child at `index`.
    ///
    /// Fails with `HardenedChildFromPublicKey` for `index >= 2^31` and with
    /// `DepthExceeded` at depth 255.
    pub fn public_child(&self, index: u32) -> Result<ExtendedPublicKey, BlsError> {
        // Hardened children have i >= 2^31. Non-hardened have i < 2^31
        if is_hardened(index) {
            debug!(index, "hardened derivation refused on a public key");
            return Err(BlsError::HardenedChildFromPublicKey { index });
        }
        let meta = self.meta.child(self.key.fingerprint(), index)?;

        let (f, chain_code) =
            derive_child_material(&self.chain_code, ParentMaterial::Public(&self.key), index)?;

        // child = parent.point + f·G
        let point = self.key.as_point().add(&G1Point::mul_generator(f.as_scalar()));
        if point.is_identity() {
            return Err(BlsError::InvalidDerivation);
        }

        let child = ExtendedPublicKey {
            meta,
            chain_code,
            key: PublicKey::from_point(point),
        };
        debug!(
            depth = meta.depth,
            index,
            fingerprint = child.fingerprint(),
            "derived public child"
        );
        Ok(child)
    }

    /// Derive every index of `path` in turn.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<ExtendedPublicKey, BlsError> {
        path.iter()
            .try_fold(self.clone(), |node, index| node.public_child(index))
    }

    /// The public key of this node.
    pub fn public_key(&self) -> PublicKey {
        self.key
    }

    /// The chain code mixed into every child derivation.
    pub fn chain_code(&self) -> &ChainCode {
        &self.chain_code
    }

    /// Version carried over from the root of the tree.
    pub fn version(&self) -> u32 {
        self.meta.version
    }

    /// Number of derivations from the root, 0 for a master key.
    pub fn depth(&self) -> u8 {
        self.meta.depth
    }

    /// Fingerprint of the parent, 0 for a master key.
    pub fn parent_fingerprint(&self) -> u32 {
        self.meta.parent_fingerprint
    }

    /// The index this node was derived at, 0 for a master key.
    pub fn child_number(&self) -> u32 {
        self.meta.child_number
    }

    /// Fingerprint of this node's public key, i.e. the parent fingerprint of
    /// its children.
    pub fn fingerprint(&self) -> u32 {
        self.key.fingerprint()
    }

    /// Serializes this key as
    /// `version || depth || parent_fingerprint || child_number || chain_code || public_key`.
    pub fn to_bytes(&self) -> [u8; EXTENDED_PUBLIC_KEY_LENGTH] {
        let mut buf = [0u8; EXTENDED_PUBLIC_KEY_LENGTH];
        self.meta.write(&self.chain_code, &mut buf[..HEADER_LENGTH]);
        buf[HEADER_LENGTH..].copy_from_slice(&self.key.to_bytes());
        buf
    }

    /// Decodes an extended public key, failing on the wrong length, an
    /// invalid point, or a depth 0 key that claims a parent.
    pub fn from_bytes(bytes: &[u8]) -> Result<ExtendedPublicKey, BlsError> {
        if bytes.len() != EXTENDED_PUBLIC_KEY_LENGTH {
            return Err(BlsError::encoding("ExtendedPublicKey"));
        }

        let (meta, chain_code) = Metadata::read(bytes, "ExtendedPublicKey")?;
        let key = PublicKey::from_bytes(&bytes[HEADER_LENGTH..])?;

        Ok(ExtendedPublicKey {
            meta,
            chain_code,
            key,
        })
    }

    pub fn from_hex(hex_str: &str) -> Result<ExtendedPublicKey, BlsError> {
        let bytes = hex::decode(hex_str).map_err(|_| BlsError::encoding("ExtendedPublicKey"))?;
        ExtendedPublicKey::from_bytes(&bytes)
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = BlsError;

    fn from_str(s: &str) -> Result<ExtendedPublicKey, BlsError> {
        ExtendedPublicKey::from_hex(s)
    }
}

serde_boilerplate!(ExtendedPublicKey);

/// An extended private key: a private key plus the chain code and
/// bookkeeping of its position in the tree.
#[derive(Clone)]
pub struct ExtendedPrivateKey {
    meta: Metadata,
    chain_code: ChainCode,
    key: PrivateKey,
}

impl Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(
            f,
            "ExtendedPrivateKey {{ key: {:?}, meta: {:?} }}",
            &self.key, &self.meta
        )
    }
}

/// Overwrite secret key material with null bytes when it goes out of scope.
impl Drop for ExtendedPrivateKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.chain_code.zeroize();
    }
}

impl ConstantTimeEq for ExtendedPrivateKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.key.ct_eq(&other.key) & self.chain_code.ct_eq(&other.chain_code)
    }
}

/// Only the private key and chain code are compared.
impl PartialEq for ExtendedPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).unwrap_u8() == 1u8
    }
}

impl Eq for ExtendedPrivateKey {}

impl ExtendedPrivateKey {
    const DESCRIPTION: &'static str = "A BLS extended private key as 77 bytes.";

    /// Generate the master key and chain code of a tree from a seed.
    pub fn from_seed(seed: &[u8]) -> Result<ExtendedPrivateKey, BlsError> {
        let mut t = Transcript::new(MASTER_LABEL);
        t.commit_message(b"seed", seed);

        let key = PrivateKey::from_scalar(t.challenge_scalar(b"private_key"))?;
        let chain_code = t.challenge_chain_code(b"chain_code");

        let master = ExtendedPrivateKey {
            meta: Metadata::root(),
            chain_code,
            key,
        };
        debug!(fingerprint = master.fingerprint(), "derived master key");
        Ok(master)
    }

    /// Derive the child at `index`, hardened or not.
    ///
    /// Fails with `DepthExceeded` at depth 255.
    pub fn private_child(&self, index: u32) -> Result<ExtendedPrivateKey, BlsError> {
        let public_key = self.key.public_key();
        let meta = self.meta.child(public_key.fingerprint(), index)?;

        let parent = if is_hardened(index) {
            ParentMaterial::Private(&self.key)
        } else {
            ParentMaterial::Public(&public_key)
        };
        let (f, chain_code) = derive_child_material(&self.chain_code, parent, index)?;

        // child = parent.scalar + f
        let scalar = self
            .key
            .as_scalar()
            .add(f.as_scalar())
            .ok_or(BlsError::InvalidDerivation)?;

        let child = ExtendedPrivateKey {
            meta,
            chain_code,
            key: PrivateKey::from_scalar(scalar)?,
        };
        debug!(
            depth = meta.depth,
            index,
            hardened = is_hardened(index),
            fingerprint = child.fingerprint(),
            "derived private child"
        );
        Ok(child)
    }

    /// Derive every index of `path` in turn.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<ExtendedPrivateKey, BlsError> {
        path.iter()
            .try_fold(self.clone(), |node, index| node.private_child(index))
    }

    /// The extended public key of this node; same chain code and bookkeeping.
    pub fn extended_public_key(&self) -> ExtendedPublicKey {
        ExtendedPublicKey {
            meta: self.meta,
            chain_code: self.chain_code.clone(),
            key: self.key.public_key(),
        }
    }

    /// The public key of this node.
    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    /// The private key of this node.
    pub fn private_key(&self) -> &PrivateKey {
        &self.key
    }

    /// The chain code mixed into every child derivation.
    pub fn chain_code(&self) -> &ChainCode {
        &self.chain_code
    }

    /// Version carried over from the root of the tree.
    pub fn version(&self) -> u32 {
        self.meta.version
    }

    /// Number of derivations from the root, 0 for a master key.
    pub fn depth(&self) -> u8 {
        self.meta.depth
    }

    /// Fingerprint of the parent, 0 for a master key.
    pub fn parent_fingerprint(&self) -> u32 {
        self.meta.parent_fingerprint
    }

    /// The index this node was derived at, 0 for a master key.
    pub fn child_number(&self) -> u32 {
        self.meta.child_number
    }

    /// Fingerprint of this node's public key.
    pub fn fingerprint(&self) -> u32 {
        self.public_key().fingerprint()
    }

    /// Serializes this key as
    /// `version || depth || parent_fingerprint || child_number || chain_code || private_key`.
    pub fn to_bytes(&self) -> [u8; EXTENDED_PRIVATE_KEY_LENGTH] {
        let mut buf = [0u8; EXTENDED_PRIVATE_KEY_LENGTH];
        self.meta.write(&self.chain_code, &mut buf[..HEADER_LENGTH]);
        let key = Zeroizing::new(self.key.to_bytes());
        buf[HEADER_LENGTH..].copy_from_slice(&key[..]);
        buf
    }

    /// Decodes an extended private key, failing on the wrong length, an
    /// invalid scalar, or a depth 0 key that claims a parent.
    pub fn from_bytes(bytes: &[u8]) -> Result<ExtendedPrivateKey, BlsError> {
        if bytes.len() != EXTENDED_PRIVATE_KEY_LENGTH {
            return Err(BlsError::encoding("ExtendedPrivateKey"));
        }

        let (meta, chain_code) = Metadata::read(bytes, "ExtendedPrivateKey")?;
        let key = PrivateKey::from_bytes(&bytes[HEADER_LENGTH..])?;

        Ok(ExtendedPrivateKey {
            meta,
            chain_code,
            key,
        })
    }

    pub fn from_hex(hex_str: &str) -> Result<ExtendedPrivateKey, BlsError> {
        let bytes = Zeroizing::new(
            hex::decode(hex_str).map_err(|_| BlsError::encoding("ExtendedPrivateKey"))?,
        );
        ExtendedPrivateKey::from_bytes(&bytes)
    }
}

impl FromStr for ExtendedPrivateKey {
    type Err = BlsError;

    fn from_str(s: &str) -> Result<ExtendedPrivateKey, BlsError> {
        ExtendedPrivateKey::from_hex(s)
    }
}

serde_boilerplate!(ExtendedPrivateKey);
