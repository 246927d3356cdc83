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

//! Derivation paths in the familiar `m/44'/0/1h` notation.

use crate::keys::{is_hardened, HARDENED_INDEX};
use crate::BlsError;
use std::fmt;
use std::str::FromStr;

/// A sequence of child indices leading down from some node of the key tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// The empty path, `m`.
    pub fn master() -> DerivationPath {
        DerivationPath(Vec::new())
    }

    /// This path extended by one more index.
    pub fn child(&self, index: u32) -> DerivationPath {
        let mut path = self.0.clone();
        path.push(index);
        DerivationPath(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// True if every step can be taken from an extended public key.
    pub fn is_hardened_free(&self) -> bool {
        !self.0.iter().any(|i| is_hardened(*i))
    }
}

impl From<Vec<u32>> for DerivationPath {
    fn from(indices: Vec<u32>) -> DerivationPath {
        DerivationPath(indices)
    }
}

impl From<&[u32]> for DerivationPath {
    fn from(indices: &[u32]) -> DerivationPath {
        DerivationPath(indices.to_vec())
    }
}

impl AsRef<[u32]> for DerivationPath {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

fn parse_index(part: &str) -> Option<u32> {
    let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
        Some(digits) => (digits, true),
        None => (part, false),
    };

    // u32::from_str takes a leading '+'
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let index: u32 = digits.parse().ok()?;
    if is_hardened(index) {
        return None;
    }
    Some(if hardened { index | HARDENED_INDEX } else { index })
}

impl FromStr for DerivationPath {
    type Err = BlsError;

    fn from_str(path: &str) -> Result<DerivationPath, BlsError> {
        let invalid = || BlsError::InvalidPath {
            path: path.to_string(),
        };

        let mut parts = path.split('/');
        // First part must be `m`.
        if parts.next() != Some("m") {
            return Err(invalid());
        }

        parts
            .map(|part| parse_index(part).ok_or_else(invalid))
            .collect::<Result<Vec<u32>, BlsError>>()
            .map(DerivationPath)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in self.iter() {
            if is_hardened(index) {
                write!(f, "/{}'", index ^ HARDENED_INDEX)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_master() {
        let path: DerivationPath = "m".parse().unwrap();
        assert!(path.is_empty());
        assert_eq!(path, DerivationPath::master());
    }

    #[test]
    fn parses_mixed_path() {
        let path: DerivationPath = "m/44'/0/1h/7".parse().unwrap();
        assert_eq!(
            path.as_ref(),
            &[44 | HARDENED_INDEX, 0, 1 | HARDENED_INDEX, 7][..]
        );
        assert!(!path.is_hardened_free());
        assert_eq!(path.to_string(), "m/44'/0/1'/7");
    }

    #[test]
    fn display_roundtrip() {
        let path = DerivationPath::master().child(3).child(HARDENED_INDEX + 5).child(2147483647);
        let reparsed: DerivationPath = path.to_string().parse().unwrap();
        assert_eq!(path, reparsed);
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in &[
            "",
            "n/0",
            "m/",
            "m//1",
            "m/x",
            "m/-1",
            "m/+1",
            "m/1''",
            "m/2147483648",
            "m/2147483648'",
            "m/4294967296",
            "0/1",
        ] {
            assert_eq!(
                bad.parse::<DerivationPath>(),
                Err(BlsError::InvalidPath {
                    path: bad.to_string()
                }),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn hardened_free_paths() {
        let path: DerivationPath = "m/0/1/2".parse().unwrap();
        assert!(path.is_hardened_free());
        assert_eq!(path.len(), 3);
    }
}
