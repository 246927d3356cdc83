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

//! Serde Support
//!
//! Every key type serializes as its canonical byte string.

macro_rules! serde_boilerplate { ($t:ty) => {
    impl ::serde::Serialize for $t {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: ::serde::Serializer {
            serializer.serialize_bytes(&self.to_bytes()[..])
        }
    }

    impl<'d> ::serde::Deserialize<'d> for $t {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: ::serde::Deserializer<'d> {
            struct MyVisitor;

            impl<'d> ::serde::de::Visitor<'d> for MyVisitor {
                type Value = $t;

                fn expecting(&self, formatter: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    formatter.write_str(<$t>::DESCRIPTION)
                }

                fn visit_bytes<E>(self, bytes: &[u8]) -> Result<$t, E> where E: ::serde::de::Error {
                    <$t>::from_bytes(bytes).map_err(crate::errors::serde_error_from_bls_error)
                }
            }
            deserializer.deserialize_bytes(MyVisitor)
        }
    }
} } // macro_rules! serde_boilerplate


#[cfg(test)]
mod test {
    use std::vec::Vec;

    use bincode::{deserialize, serialize, serialized_size};

    use crate::*;

    fn master() -> ExtendedPrivateKey {
        ExtendedPrivateKey::from_seed(b"serde roundtrip seed").unwrap()
    }

    #[test]
    fn serialize_deserialize_public_key() {
        let public_key = master().public_key();
        let encoded: Vec<u8> = serialize(&public_key).unwrap();
        let decoded: PublicKey = deserialize(&encoded).unwrap();

        assert_eq!(public_key, decoded);
    }

    #[test]
    fn serialize_deserialize_private_key() {
        let private_key = master().private_key().clone();
        let encoded: Vec<u8> = serialize(&private_key).unwrap();
        let decoded: PrivateKey = deserialize(&encoded).unwrap();

        assert_eq!(private_key, decoded);
    }

    #[test]
    fn serialize_deserialize_extended_keys() {
        let xprv = master().private_child(HARDENED_INDEX + 3).unwrap();
        let xpub = xprv.extended_public_key();

        let decoded_xprv: ExtendedPrivateKey = deserialize(&serialize(&xprv).unwrap()).unwrap();
        let decoded_xpub: ExtendedPublicKey = deserialize(&serialize(&xpub).unwrap()).unwrap();

        assert_eq!(xprv, decoded_xprv);
        assert_eq!(xpub, decoded_xpub);
        assert_eq!(decoded_xpub.child_number(), HARDENED_INDEX + 3);
    }

    #[test]
    fn deserialize_rejects_bad_point() {
        let encoded: Vec<u8> = serialize(&[0xffu8; PUBLIC_KEY_LENGTH][..]).unwrap();
        assert!(deserialize::<PublicKey>(&encoded).is_err());
    }

    #[test]
    fn serialize_public_key_size() {
        let public_key = master().public_key();
        // bincode prefixes byte strings with a u64 length
        assert_eq!(serialized_size(&public_key).unwrap() as usize, PUBLIC_KEY_LENGTH + 8);
    }

    #[test]
    fn serialize_extended_private_key_size() {
        assert_eq!(
            serialized_size(&master()).unwrap() as usize,
            EXTENDED_PRIVATE_KEY_LENGTH + 8
        );
    }
}
