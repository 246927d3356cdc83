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

//! Implementation of BLS public key aggregation.
//!
//! Secure aggregation weights each key by `a_i = H(<L>, X_i)` where `<L>` is
//! the sorted list of every key in the set, so nobody can pick a key that
//! cancels out the others. Insecure aggregation is the plain sum and is only
//! safe once every key has a proof of possession.

use crate::curve::{G1Point, Scalar};
use crate::keys::{PrivateKey, PublicKey, PUBLIC_KEY_LENGTH};
use crate::tools::{TranscriptProtocol, AGGREGATION_LABEL};
use crate::BlsError;
use merlin::Transcript;
use tracing::trace;

/// Commits the key set into a transcript.
///
/// Keys are committed in sorted byte order, making the weights independent
/// of the order callers list them in.
fn key_set_transcript(pubkeys: &[PublicKey]) -> Transcript {
    let mut encoded: Vec<[u8; PUBLIC_KEY_LENGTH]> =
        pubkeys.iter().map(|p| p.to_bytes()).collect();
    encoded.sort_unstable();

    let mut prf = Transcript::new(AGGREGATION_LABEL);
    prf.proto_name(b"aggregated-key");
    prf.append_u64(b"n", encoded.len() as u64);

    // <L> = H(X_1 || X_2 || ... || X_n)
    for x in encoded.iter() {
        prf.commit_message(b"X", x);
    }
    prf
}

/// Returns `a_i` factor for component key in aggregated key.
/// a_i = H(<L>, X_i). The list of pubkeys, <L>, has already been committed to the transcript.
fn compute_factor(prf: &Transcript, key: &PublicKey) -> Scalar {
    let mut a_i_prf = prf.clone();
    a_i_prf.commit_key(b"X_i", key);
    a_i_prf.challenge_scalar(b"a_i")
}

/// Securely aggregates public keys: `sum_i ( a_i * X_i )`.
///
/// A single key is returned unchanged, without a weight applied.
pub fn aggregate_secure(pubkeys: &[PublicKey]) -> Result<PublicKey, BlsError> {
    trace!(keys = pubkeys.len(), "secure public key aggregation");
    match pubkeys {
        [] => return Err(BlsError::EmptyInput),
        [single] => return Ok(*single),
        _ => {}
    }

    let prf = key_set_transcript(pubkeys);
    let point = sum_points(
        pubkeys
            .iter()
            .map(|x| x.as_point().mul(&compute_factor(&prf, x))),
    );

    Ok(PublicKey::from_point(point))
}

/// Aggregates public keys by plain addition.
///
/// Vulnerable to rogue key attacks unless every key has been proven to be
/// held by its owner.
pub fn aggregate_insecure(pubkeys: &[PublicKey]) -> Result<PublicKey, BlsError> {
    trace!(keys = pubkeys.len(), "insecure public key aggregation");
    if pubkeys.is_empty() {
        return Err(BlsError::EmptyInput);
    }

    Ok(PublicKey::from_point(sum_points(
        pubkeys.iter().map(|x| *x.as_point()),
    )))
}

/// Creates the private key matching `aggregate_secure` over the public keys
/// of `privkeys`.
pub fn aggregate_private_keys(privkeys: &[PrivateKey]) -> Result<PrivateKey, BlsError> {
    trace!(keys = privkeys.len(), "secure private key aggregation");
    match privkeys {
        [] => return Err(BlsError::EmptyInput),
        [single] => return Ok(single.clone()),
        _ => {}
    }

    // Derive public keys from privkeys
    let pubkeys = privkeys
        .iter()
        .map(PrivateKey::public_key)
        .collect::<Vec<_>>();
    let prf = key_set_transcript(&pubkeys);

    let mut terms = privkeys.iter().zip(pubkeys.iter()).map(|(sk, pk)| {
        compute_factor(&prf, pk)
            .mul(sk.as_scalar())
            .ok_or(BlsError::InvalidDerivation)
    });
    sum_scalars(&mut terms)
}

/// Sums private keys, matching `aggregate_insecure` over their public keys.
pub fn aggregate_private_keys_insecure(privkeys: &[PrivateKey]) -> Result<PrivateKey, BlsError> {
    trace!(keys = privkeys.len(), "insecure private key aggregation");
    let mut terms = privkeys.iter().map(|sk| Ok(sk.as_scalar().clone()));
    sum_scalars(&mut terms)
}

fn sum_points(mut points: impl Iterator<Item = G1Point>) -> G1Point {
    match points.next() {
        Some(first) => points.fold(first, |acc, p| acc.add(&p)),
        None => G1Point::identity(),
    }
}

fn sum_scalars(
    terms: &mut dyn Iterator<Item = Result<Scalar, BlsError>>,
) -> Result<PrivateKey, BlsError> {
    let mut acc = match terms.next() {
        Some(term) => term?,
        None => return Err(BlsError::EmptyInput),
    };
    for term in terms {
        acc = acc.add(&term?).ok_or(BlsError::InvalidDerivation)?;
    }
    PrivateKey::from_scalar(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtendedPrivateKey;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn private_key(seed: u8) -> PrivateKey {
        PrivateKey::generate(&mut ChaChaRng::from_seed([seed; 32]))
    }

    fn public_keys(seeds: &[u8]) -> Vec<PublicKey> {
        seeds.iter().map(|s| private_key(*s).public_key()).collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(aggregate_secure(&[]), Err(BlsError::EmptyInput));
        assert_eq!(aggregate_insecure(&[]), Err(BlsError::EmptyInput));
        assert_eq!(aggregate_private_keys(&[]), Err(BlsError::EmptyInput));
        assert_eq!(aggregate_private_keys_insecure(&[]), Err(BlsError::EmptyInput));
    }

    #[test]
    fn singleton_has_unit_weight() {
        // fixed fixture: master key of the all-zero seed
        let xprv = ExtendedPrivateKey::from_seed(&[0u8; 32]).unwrap();
        let pk = xprv.public_key();

        assert_eq!(aggregate_secure(&[pk]).unwrap(), pk);
        assert_eq!(aggregate_insecure(&[pk]).unwrap(), pk);
        assert_eq!(
            aggregate_private_keys(&[xprv.private_key().clone()]).unwrap(),
            *xprv.private_key()
        );
    }

    #[test]
    fn secure_differs_from_insecure() {
        let keys = public_keys(&[1, 2]);
        assert_ne!(
            aggregate_secure(&keys).unwrap(),
            aggregate_insecure(&keys).unwrap()
        );
    }

    #[test]
    fn insecure_is_plain_sum() {
        let keys = public_keys(&[1, 2, 3]);
        let expected = keys[0].as_point().add(keys[1].as_point()).add(keys[2].as_point());
        assert_eq!(aggregate_insecure(&keys).unwrap(), PublicKey::from_point(expected));
    }

    #[test]
    fn private_aggregation_matches_public() {
        let sks: Vec<PrivateKey> = [4u8, 5, 6].iter().map(|s| private_key(*s)).collect();
        let pks: Vec<PublicKey> = sks.iter().map(PrivateKey::public_key).collect();

        assert_eq!(
            aggregate_private_keys(&sks).unwrap().public_key(),
            aggregate_secure(&pks).unwrap()
        );
        assert_eq!(
            aggregate_private_keys_insecure(&sks).unwrap().public_key(),
            aggregate_insecure(&pks).unwrap()
        );
    }

    #[test]
    fn rogue_key_does_not_cancel_honest_key() {
        let honest = private_key(8).public_key();
        let target = private_key(9).public_key();

        // rogue = target - honest, so the plain sum is a key the attacker owns
        let minus_one = {
            let order_minus_one = hex::decode(
                "73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000000",
            )
            .unwrap();
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&order_minus_one);
            Scalar::from_be_bytes(&bytes).unwrap()
        };
        let rogue =
            PublicKey::from_point(target.as_point().add(&honest.as_point().mul(&minus_one)));

        assert_eq!(aggregate_insecure(&[honest, rogue]).unwrap(), target);
        assert_ne!(aggregate_secure(&[honest, rogue]).unwrap(), target);
    }

    #[test]
    fn duplicate_keys_are_accepted() {
        let pk = private_key(10).public_key();
        let twice = aggregate_secure(&[pk, pk]).unwrap();
        assert_ne!(twice, pk);
        assert_eq!(twice, aggregate_secure(&[pk, pk]).unwrap());
    }

    proptest! {
        #[test]
        fn aggregation_ignores_order(
            seeds in prop::collection::vec(1u8..=255, 2..6),
            rotation in 0usize..6,
        ) {
            let keys = public_keys(&seeds);
            let mut permuted = keys.clone();
            permuted.reverse();
            let len = permuted.len();
            permuted.rotate_left(rotation % len);

            prop_assert_eq!(aggregate_secure(&keys).unwrap(), aggregate_secure(&permuted).unwrap());
            prop_assert_eq!(
                aggregate_insecure(&keys).unwrap(),
                aggregate_insecure(&permuted).unwrap()
            );
        }
    }
}
