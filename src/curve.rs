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

//! BLS12-381 group tooling.
//!
//! Thin safe wrappers over the `blst` bindings: a scalar of the prime order
//! field and a point of G1, the group public keys live in. Everything above
//! this module works with these two types only, so swapping the primitive
//! library means rewriting this file and nothing else.

use blst::{blst_p1, blst_p1_affine, blst_scalar, BLST_ERROR};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// The length of a big-endian encoded scalar, in bytes.
pub const SCALAR_LENGTH: usize = 32;

/// The length of a compressed G1 point, in bytes.
pub const G1_COMPRESSED_LENGTH: usize = 48;

/// The length of the input to wide scalar reduction, in bytes.
pub const WIDE_SCALAR_LENGTH: usize = 64;

/// An element of the scalar field of BLS12-381.
#[derive(Clone, Default)]
pub struct Scalar(blst_scalar);

impl Scalar {
    /// Parse a canonical big-endian scalar. Returns `None` for zero or for
    /// values not below the group order.
    pub fn from_be_bytes(bytes: &[u8; SCALAR_LENGTH]) -> Option<Scalar> {
        let mut s = blst_scalar::default();
        let valid = unsafe {
            blst::blst_scalar_from_bendian(&mut s, bytes.as_ptr());
            blst::blst_sk_check(&s)
        };

        if valid {
            Some(Scalar(s))
        } else {
            s.b.zeroize();
            None
        }
    }

    /// Reduce 64 uniformly random bytes modulo the group order.
    ///
    /// The result may be zero; callers that need a key must check.
    pub fn from_wide(bytes: &[u8; WIDE_SCALAR_LENGTH]) -> Scalar {
        let mut s = blst_scalar::default();
        unsafe {
            blst::blst_scalar_from_be_bytes(&mut s, bytes.as_ptr(), bytes.len());
        }
        Scalar(s)
    }

    /// Canonical big-endian encoding.
    pub fn to_be_bytes(&self) -> [u8; SCALAR_LENGTH] {
        let mut out = [0u8; SCALAR_LENGTH];
        unsafe { blst::blst_bendian_from_scalar(out.as_mut_ptr(), &self.0) };
        out
    }

    pub fn is_zero(&self) -> bool {
        self.0.b[..].ct_eq(&[0u8; SCALAR_LENGTH][..]).into()
    }

    /// `self + other mod r`, `None` if either side is zero or the sum is.
    pub fn add(&self, other: &Scalar) -> Option<Scalar> {
        let mut out = blst_scalar::default();
        let ok = unsafe { blst::blst_sk_add_n_check(&mut out, &self.0, &other.0) };
        Scalar::checked(ok, out)
    }

    /// `self * other mod r`, `None` if either side is zero.
    pub fn mul(&self, other: &Scalar) -> Option<Scalar> {
        let mut out = blst_scalar::default();
        let ok = unsafe { blst::blst_sk_mul_n_check(&mut out, &self.0, &other.0) };
        Scalar::checked(ok, out)
    }

    fn checked(ok: bool, out: blst_scalar) -> Option<Scalar> {
        let s = Scalar(out);
        if ok && !s.is_zero() {
            Some(s)
        } else {
            None
        }
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.b[..].ct_eq(&other.0.b[..])
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.b.zeroize();
    }
}

impl Drop for Scalar {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// A point of the G1 subgroup, kept in projective form.
#[derive(Clone, Copy)]
pub struct G1Point(blst_p1);

impl G1Point {
    /// The point at infinity.
    pub fn identity() -> G1Point {
        G1Point(blst_p1::default())
    }

    /// `s·G` for the fixed generator of G1.
    pub fn mul_generator(s: &Scalar) -> G1Point {
        let mut out = blst_p1::default();
        unsafe { blst::blst_sk_to_pk_in_g1(&mut out, &s.0) };
        G1Point(out)
    }

    /// `s·self`.
    pub fn mul(&self, s: &Scalar) -> G1Point {
        let mut out = blst_p1::default();
        unsafe { blst::blst_p1_mult(&mut out, &self.0, s.0.b.as_ptr(), 255) };
        G1Point(out)
    }

    /// `self + other`.
    pub fn add(&self, other: &G1Point) -> G1Point {
        let mut out = blst_p1::default();
        unsafe { blst::blst_p1_add_or_double(&mut out, &self.0, &other.0) };
        G1Point(out)
    }

    pub fn is_identity(&self) -> bool {
        unsafe { blst::blst_p1_is_inf(&self.0) }
    }

    /// Canonical compressed encoding.
    pub fn compress(&self) -> [u8; G1_COMPRESSED_LENGTH] {
        let mut out = [0u8; G1_COMPRESSED_LENGTH];
        unsafe { blst::blst_p1_compress(out.as_mut_ptr(), &self.0) };
        out
    }

    /// Decode a compressed point, checking both the curve equation and
    /// subgroup membership.
    pub fn decompress(bytes: &[u8]) -> Option<G1Point> {
        if bytes.len() != G1_COMPRESSED_LENGTH {
            return None;
        }

        let mut affine = blst_p1_affine::default();
        if unsafe { blst::blst_p1_uncompress(&mut affine, bytes.as_ptr()) }
            != BLST_ERROR::BLST_SUCCESS
        {
            return None;
        }
        if !unsafe { blst::blst_p1_affine_in_g1(&affine) } {
            return None;
        }

        let mut point = blst_p1::default();
        unsafe { blst::blst_p1_from_affine(&mut point, &affine) };
        Some(G1Point(point))
    }
}

impl PartialEq for G1Point {
    fn eq(&self, other: &G1Point) -> bool {
        unsafe { blst::blst_p1_is_equal(&self.0, &other.0) }
    }
}

impl Eq for G1Point {}
