//! Internal implementation of job identifier generation and validation.

use crate::{IdError, IdResult};
use rand::rngs::OsRng;
use rand::RngCore;
use std::{fmt, str::FromStr};

/// Symbols a job identifier is built from.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Number of symbols in a job identifier.
pub const JOB_ID_LENGTH: usize = 8;

/// Random bytes read per batch. A quarter more than needed so one batch is almost always enough.
const BATCH_LEN: usize = JOB_ID_LENGTH + JOB_ID_LENGTH / 4;

/// Bytes at or above this value are rejected so `byte % 62` stays uniform.
const REJECT_FROM: usize = 256 - (256 % ALPHABET.len());

/// A job identifier in canonical form (8 characters from [`ALPHABET`]).
///
/// Once constructed the value is guaranteed canonical, so it is always safe to use as a single
/// directory name under the storage root.
///
/// # Construction
/// - [`JobId::generate`] draws a fresh identifier from the OS random source.
/// - [`JobId::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Generates a new identifier from the operating system's secure random source.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::RandomSource`] if the random source cannot be read.
    pub fn generate() -> IdResult<Self> {
        Self::generate_with(&mut OsRng)
    }

    /// Generates a new identifier from the given random source.
    ///
    /// Bytes are read in batches; each byte at or above the largest multiple of the alphabet
    /// size that fits in a byte is discarded, the rest are mapped with `byte % 62`. Batches are
    /// read until the identifier is complete.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::RandomSource`] if `rng` fails to fill a batch.
    pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> IdResult<Self> {
        let mut id = String::with_capacity(JOB_ID_LENGTH);
        let mut batch = [0u8; BATCH_LEN];

        loop {
            rng.try_fill_bytes(&mut batch)?;
            for &byte in &batch {
                let value = usize::from(byte);
                if value >= REJECT_FROM {
                    continue;
                }
                id.push(char::from(ALPHABET[value % ALPHABET.len()]));
                if id.len() == JOB_ID_LENGTH {
                    return Ok(Self(id));
                }
            }
        }
    }

    /// Validates and wraps an identifier that must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not exactly 8 alphanumeric ASCII
    /// characters.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_canonical(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(IdError::InvalidInput(format!(
            "job id must be {} alphanumeric characters, got: '{}'",
            JOB_ID_LENGTH, input
        )))
    }

    /// Returns true if `input` is a canonical job identifier.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == JOB_ID_LENGTH && input.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobId::parse(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for JobId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        JobId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Replays a fixed byte sequence, cycling when exhausted.
    struct SequenceRng {
        bytes: Vec<u8>,
        pos: usize,
        batches: usize,
    }

    impl SequenceRng {
        fn new(bytes: Vec<u8>) -> Self {
            Self {
                bytes,
                pos: 0,
                batches: 0,
            }
        }
    }

    impl RngCore for SequenceRng {
        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.batches += 1;
            for slot in dest.iter_mut() {
                *slot = self.bytes[self.pos % self.bytes.len()];
                self.pos += 1;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "entropy source closed",
            )))
        }
    }

    #[test]
    fn test_generate_produces_canonical_id() {
        for _ in 0..100 {
            let id = JobId::generate().unwrap();
            assert_eq!(id.as_str().len(), JOB_ID_LENGTH);
            assert!(id.as_str().bytes().all(|b| ALPHABET.contains(&b)));
            assert!(JobId::is_canonical(id.as_str()));
        }
    }

    #[test]
    fn test_generate_with_maps_bytes_modulo_alphabet() {
        let mut rng = SequenceRng::new(vec![0, 1, 25, 26, 51, 52, 61, 62, 0, 0]);
        let id = JobId::generate_with(&mut rng).unwrap();

        assert_eq!(id.as_str(), "ABZaz09A");
        assert_eq!(rng.batches, 1);
    }

    #[test]
    fn test_generate_with_rejects_biased_bytes() {
        // 248..=255 would over-represent the first eight symbols.
        let mut rng = SequenceRng::new(vec![248, 255, 250, 0, 1, 2, 3, 4, 5, 6]);
        let id = JobId::generate_with(&mut rng).unwrap();

        // Seven symbols from the first batch, the eighth from the (cycled) second batch.
        assert_eq!(id.as_str(), "ABCDEFGA");
        assert_eq!(rng.batches, 2);
    }

    #[test]
    fn test_generate_with_reads_more_batches_when_needed() {
        // First batch has only three usable bytes.
        let mut bytes = vec![255u8; BATCH_LEN];
        bytes[0] = 3;
        bytes[4] = 4;
        bytes[9] = 5;
        bytes.extend_from_slice(&[10, 11, 12, 13, 14, 15, 16, 17, 18, 19]);
        let mut rng = SequenceRng::new(bytes);

        let id = JobId::generate_with(&mut rng).unwrap();

        assert_eq!(id.as_str(), "DEFKLMNO");
        assert_eq!(rng.batches, 2);
    }

    #[test]
    fn test_generate_with_is_deterministic_for_seeded_rng() {
        let a = JobId::generate_with(&mut StdRng::seed_from_u64(7)).unwrap();
        let b = JobId::generate_with(&mut StdRng::seed_from_u64(7)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_with_surfaces_random_source_error() {
        let result = JobId::generate_with(&mut BrokenRng);

        assert!(matches!(result, Err(IdError::RandomSource(_))));
    }

    #[test]
    fn test_parse_valid_id() {
        let id = JobId::parse("AbCd1234").unwrap();
        assert_eq!(id.to_string(), "AbCd1234");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(JobId::parse("AbCd123").is_err());
        assert!(JobId::parse("AbCd12345").is_err());
        assert!(JobId::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        for input in ["../../et", "AbCd/234", "AbCd.234", "AbCd 234", "AbCd-234"] {
            match JobId::parse(input) {
                Err(IdError::InvalidInput(msg)) => assert!(msg.contains("alphanumeric")),
                other => panic!("expected InvalidInput for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_rejects_non_ascii() {
        // Eight bytes, but not eight ASCII characters.
        assert!(JobId::parse("AbCdé12").is_err());
    }

    #[test]
    fn test_from_str_matches_parse() {
        let id: JobId = "ZZzz0099".parse().unwrap();
        assert_eq!(id.as_str(), "ZZzz0099");
        assert!("nope".parse::<JobId>().is_err());
    }

    #[test]
    fn test_serde_roundtrip_and_validation() {
        let id = JobId::parse("AbCd1234").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"AbCd1234\"");

        let back: JobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<JobId>("\"../etc\"").is_err());
    }
}
