//! USR hashing
//!
//! The front end hands out USR strings; the index stores their keyed
//! SipHash-2-4. Emitted index files are named after their source path with
//! xxHash64 (seed 0).

use std::fmt;

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher24;

/// SipHash key shared by every index; changing it invalidates stored USRs.
const USR_KEY: [u8; 16] = [
    0xd0, 0xe5, 0x4d, 0x61, 0x74, 0x63, 0x68, 0x52, 0x61, 0x79, 0xea, 0x70, 0xca, 0x70, 0xf0, 0x0d,
];

const PRIME64_1: u64 = 0x9E3779B185EBCA87;
const PRIME64_2: u64 = 0xC2B2AE3D27D4EB4F;
const PRIME64_3: u64 = 0x165667B19E3779F9;
const PRIME64_4: u64 = 0x85EBCA77C2B2AE63;
const PRIME64_5: u64 = 0x27D4EB2F165667C5;

/// Hashed USR, the cross-translation-unit join key for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usr(pub u64);

impl Usr {
    pub fn from_usr_string(usr: &str) -> Self {
        Usr(SipHasher24::new_with_key(&USR_KEY).hash(usr.as_bytes()))
    }
}

impl fmt::Display for Usr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Usr {
    fn from(usr: &str) -> Self {
        Usr::from_usr_string(usr)
    }
}

pub fn xxhash64(data: &[u8], seed: u64) -> u64 {
    let len = data.len() as u64;
    let mut chunks = data.chunks_exact(32);

    let mut h64 = if data.len() >= 32 {
        let mut acc = [
            seed.wrapping_add(PRIME64_1).wrapping_add(PRIME64_2),
            seed.wrapping_add(PRIME64_2),
            seed,
            seed.wrapping_sub(PRIME64_1),
        ];
        for stripe in chunks.by_ref() {
            for (lane, word) in acc.iter_mut().zip(stripe.chunks_exact(8)) {
                *lane = round(*lane, read_u64_le(word));
            }
        }
        let mut h = acc[0]
            .rotate_left(1)
            .wrapping_add(acc[1].rotate_left(7))
            .wrapping_add(acc[2].rotate_left(12))
            .wrapping_add(acc[3].rotate_left(18));
        for lane in acc {
            h = merge_round(h, lane);
        }
        h
    } else {
        seed.wrapping_add(PRIME64_5)
    };

    h64 = h64.wrapping_add(len);

    let mut tail = chunks.remainder();
    while tail.len() >= 8 {
        h64 ^= round(0, read_u64_le(&tail[..8]));
        h64 = h64
            .rotate_left(27)
            .wrapping_mul(PRIME64_1)
            .wrapping_add(PRIME64_4);
        tail = &tail[8..];
    }
    if tail.len() >= 4 {
        h64 ^= (read_u32_le(&tail[..4]) as u64).wrapping_mul(PRIME64_1);
        h64 = h64
            .rotate_left(23)
            .wrapping_mul(PRIME64_2)
            .wrapping_add(PRIME64_3);
        tail = &tail[4..];
    }
    for &byte in tail {
        h64 ^= (byte as u64).wrapping_mul(PRIME64_5);
        h64 = h64.rotate_left(11).wrapping_mul(PRIME64_1);
    }

    avalanche(h64)
}

fn round(acc: u64, input: u64) -> u64 {
    acc.wrapping_add(input.wrapping_mul(PRIME64_2))
        .rotate_left(31)
        .wrapping_mul(PRIME64_1)
}

fn merge_round(acc: u64, val: u64) -> u64 {
    (acc ^ round(0, val))
        .wrapping_mul(PRIME64_1)
        .wrapping_add(PRIME64_4)
}

fn avalanche(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(PRIME64_2);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME64_3);
    h ^ (h >> 32)
}

fn read_u32_le(data: &[u8]) -> u32 {
    u32::from_le_bytes([data[0], data[1], data[2], data[3]])
}

fn read_u64_le(data: &[u8]) -> u64 {
    u64::from_le_bytes([
        data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xxhash64_reference_vectors() {
        assert_eq!(xxhash64(b"", 0), 0xEF46DB3751D8E999);
        assert_eq!(xxhash64(b"a", 0), 0xD24EC4F1A98C6E5B);
        assert_eq!(xxhash64(b"abc", 0), 0x44BC2CF5AD770999);
        assert_eq!(xxhash64(b"message digest", 0), 0x066ED728FCEEB3BE);
        assert_eq!(
            xxhash64(b"abcdefghijklmnopqrstuvwxyz", 0),
            0xCFE1F278FA89835C
        );
        assert_eq!(
            xxhash64(b"/home/user/project/main.cpp", 0),
            0x29BD10997380DC29
        );
    }

    #[test]
    fn test_usr_matches_stored_hashes() {
        assert_eq!(Usr::from("c:@U@vector3").0, 17937907487590875128);
        assert_eq!(Usr::from("c:@U@vector3@Sa").0, 1428566502523368801);
        assert_eq!(Usr::from("c:@U@Foo").0, 8501689086387244262);
        assert_eq!(Usr::from("c:@U@Foo@FI@a").0, 9529311430721959843);
        assert_eq!(Usr::from("c:@F@act#*$@U@Foo#").0, 13982179977217945200);
        assert_eq!(Usr::from("c:@f").0, 2933643612409209903);
        assert_eq!(Usr::from("c:@N@hello@S@Foo@F@foo#").0, 10487325150128053272);
    }

    #[test]
    fn test_usr_is_stable_and_distinct() {
        let a = Usr::from_usr_string("c:@U@vector3");
        assert_eq!(a, Usr::from("c:@U@vector3"));
        assert_ne!(a, Usr::from_usr_string("c:@U@Foo"));
        assert_eq!(serde_json::to_string(&a).unwrap(), a.0.to_string());
    }

    #[test]
    fn test_long_input_uses_stripe_path() {
        let long = "c:@N@hello@S@Foo@F@foo#&1$@N@hello@S@Foo#";
        assert!(long.len() >= 32);
        assert_eq!(
            xxhash64(long.as_bytes(), 0),
            xxhash64(long.as_bytes(), 0)
        );
        assert_ne!(xxhash64(long.as_bytes(), 0), xxhash64(long.as_bytes(), 1));
    }
}
