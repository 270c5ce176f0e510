// Lottery Slots - Utility Functions
use rand::Rng;
use solana_program::hash::hashv;

/// Pick an index uniformly from `0..len`; `None` for an empty range
pub fn random_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(rng.gen_range(0..len))
}

/// One-way hash of a slot password, salted with the slot id
pub fn hash_password(slot_id: &str, plaintext: &str) -> String {
    hashv(&[slot_id.as_bytes(), b":", plaintext.as_bytes()]).to_string()
}

/// Number of decimal digits in `n`
pub fn digits(n: u64) -> u8 {
    let mut count = 1;
    let mut rest = n / 10;
    while rest > 0 {
        count += 1;
        rest /= 10;
    }
    count
}
