//! Avatar identity derivation
//!
//! A name like `alice#1234` is normalized, hashed with SHA-256 and the
//! digest is mapped to a short display code and a cosmetic rank. The hash
//! is only a deterministic seed; nothing here is meant to be secure.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Symbols used for the display code
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Prefix of every display code
pub const CODE_MARKER: char = '#';
/// Hex digits consumed for the code (code is marker + this many symbols)
pub const CODE_DIGITS: usize = 10;
/// Hex char range holding the rank byte
const RANK_BYTE: std::ops::Range<usize> = 2..4;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 32;
const TAG_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Invalid format! Use username#1234")]
    InvalidFormat,
    #[error("malformed digest: {0}")]
    MalformedDigest(String),
}

/// Cosmetic rank tiers, common to rare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rank {
    pub const ALL: [Rank; 4] = [Rank::Common, Rank::Rare, Rank::Epic, Rank::Legendary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Common => "Common",
            Rank::Rare => "Rare",
            Rank::Epic => "Epic",
            Rank::Legendary => "Legendary",
        }
    }

    /// Avatar artwork for this tier
    pub fn image_path(&self) -> &'static str {
        match self {
            Rank::Common => "ai/common.png",
            Rank::Rare => "ai/rare.png",
            Rank::Epic => "ai/epic.png",
            Rank::Legendary => "ai/legendary.png",
        }
    }

    fn from_byte(byte: u8) -> Self {
        Self::ALL[byte as usize % Self::ALL.len()]
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of deriving a digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub rank: Rank,
    pub code: String,
}

impl Avatar {
    /// Text offered to the share sheet / clipboard
    pub fn share_text(&self) -> String {
        format!("My Encrypted Code: {} (Rank: {})", self.code, self.rank)
    }

    /// File name for the exported avatar card
    pub fn download_filename(&self) -> String {
        format!("{}_avatar_{}.png", self.rank, self.code)
    }
}

/// Trim and lower-case raw user input
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Check a normalized name against `username#1234`
///
/// The username is 2-32 chars of `a-z`, `0-9`, `.` or `_`.
pub fn validate_name(name: &str) -> Result<(), IdentityError> {
    let (user, tag) = name.split_once('#').ok_or(IdentityError::InvalidFormat)?;

    let user_ok = (NAME_MIN..=NAME_MAX).contains(&user.len())
        && user
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'_');
    let tag_ok = tag.len() == TAG_LEN && tag.bytes().all(|b| b.is_ascii_digit());

    if user_ok && tag_ok {
        Ok(())
    } else {
        Err(IdentityError::InvalidFormat)
    }
}

/// Lowercase hex SHA-256 of the input
pub fn digest_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Map the leading hex digits of a digest onto the code alphabet
pub fn shorten_digest(digest: &str) -> Result<String, IdentityError> {
    let mut code = String::with_capacity(CODE_DIGITS + 1);
    code.push(CODE_MARKER);

    let mut digits = digest.chars();
    for _ in 0..CODE_DIGITS {
        let value = digits
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| IdentityError::MalformedDigest(digest.to_string()))?;
        code.push(CODE_ALPHABET[value as usize % CODE_ALPHABET.len()] as char);
    }

    Ok(code)
}

/// Pick the rank tier from the digest's second byte
pub fn rank_for_digest(digest: &str) -> Result<Rank, IdentityError> {
    digest
        .get(RANK_BYTE)
        .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        .map(Rank::from_byte)
        .ok_or_else(|| IdentityError::MalformedDigest(digest.to_string()))
}

/// Derive the avatar for an already computed digest
pub fn derive_avatar(digest: &str) -> Result<Avatar, IdentityError> {
    Ok(Avatar {
        rank: rank_for_digest(digest)?,
        code: shorten_digest(digest)?,
    })
}

/// Full pipeline: normalize, validate, hash, derive
///
/// Returns the normalized name alongside the avatar, since that is what
/// gets stored in the gallery.
pub fn generate_avatar(raw: &str) -> Result<(String, Avatar), IdentityError> {
    let name = normalize_name(raw);
    validate_name(&name)?;
    let avatar = derive_avatar(&digest_hex(&name))?;
    log::debug!("Derived {} {} for {}", avatar.rank, avatar.code, name);
    Ok((name, avatar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_digest_known_vector() {
        assert_eq!(
            digest_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_shorten_maps_hex_digits() {
        // b=11 -> L, a=10 -> K, 7 -> H, 8 -> I, 1 -> B, 6 -> G, f=15 -> P, 0 -> A
        let code = shorten_digest("ba7816bf8f01cfea").unwrap();
        assert_eq!(code, "#LKHIBGLPIP");
    }

    #[test]
    fn test_rank_uses_second_byte() {
        // 0x78 = 120, 120 % 4 = 0
        assert_eq!(rank_for_digest("ba78").unwrap(), Rank::Common);
        assert_eq!(rank_for_digest("0001").unwrap(), Rank::Rare);
        assert_eq!(rank_for_digest("00fe").unwrap(), Rank::Epic);
        assert_eq!(rank_for_digest("00ff").unwrap(), Rank::Legendary);
    }

    #[test]
    fn test_short_digest_rejected() {
        assert!(matches!(
            derive_avatar("abc"),
            Err(IdentityError::MalformedDigest(_))
        ));
        assert!(shorten_digest("0123zz6789").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("alice#1234").is_ok());
        assert!(validate_name("a.b_c9#0000").is_ok());
        assert!(validate_name("al").is_err());
        assert!(validate_name("a#1234").is_err());
        assert!(validate_name("alice#123").is_err());
        assert!(validate_name("alice#12345").is_err());
        assert!(validate_name("ali ce#1234").is_err());
        assert!(validate_name("Alice#1234").is_err());
        assert!(validate_name("alice#12a4").is_err());
        assert!(validate_name(&format!("{}#1234", "x".repeat(33))).is_err());
        assert!(validate_name(&format!("{}#1234", "x".repeat(32))).is_ok());
    }

    #[test]
    fn test_generate_normalizes_before_hashing() {
        let (name, a) = generate_avatar("  Alice#1234 ").unwrap();
        let (_, b) = generate_avatar("alice#1234").unwrap();
        assert_eq!(name, "alice#1234");
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_rejects_invalid_input() {
        assert_eq!(
            generate_avatar("nobody").unwrap_err(),
            IdentityError::InvalidFormat
        );
        assert_eq!(
            IdentityError::InvalidFormat.to_string(),
            "Invalid format! Use username#1234"
        );
    }

    #[test]
    fn test_alice_scenario() {
        let (_, first) = generate_avatar("alice#1234").unwrap();
        assert!(first.code.starts_with('#'));
        assert_eq!(first.code.chars().count(), 11);
        assert!(Rank::ALL.contains(&first.rank));

        for _ in 0..5 {
            let (_, again) = generate_avatar("alice#1234").unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_share_and_download_text() {
        let avatar = Avatar {
            rank: Rank::Epic,
            code: "#ABCDEFGHIJ".to_string(),
        };
        assert_eq!(avatar.share_text(), "My Encrypted Code: #ABCDEFGHIJ (Rank: Epic)");
        assert_eq!(avatar.download_filename(), "Epic_avatar_#ABCDEFGHIJ.png");
    }

    proptest! {
        #[test]
        fn prop_digest_is_deterministic(input in ".{0,64}") {
            let a = digest_hex(&input);
            prop_assert_eq!(a.len(), 64);
            prop_assert_eq!(a, digest_hex(&input));
        }

        #[test]
        fn prop_derive_is_total_over_digests(input in ".{0,64}") {
            let avatar = derive_avatar(&digest_hex(&input)).unwrap();
            prop_assert!(avatar.code.starts_with(CODE_MARKER));
            prop_assert_eq!(avatar.code.len(), CODE_DIGITS + 1);
            prop_assert!(avatar.code[1..].bytes().all(|b| CODE_ALPHABET.contains(&b)));
            prop_assert!(Rank::ALL.contains(&avatar.rank));
        }

        #[test]
        fn prop_valid_names_always_generate(user in "[a-z0-9._]{2,32}", tag in "[0-9]{4}") {
            let raw = format!("{user}#{tag}");
            prop_assert!(generate_avatar(&raw).is_ok());
        }
    }
}
