// ------------------------------------------------------------------------------------------------
// --- IdGenerator
// ------------------------------------------------------------------------------------------------

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub trait IdGenerator {
    fn next(&self) -> String;
}

/// Base-36 millisecond timestamp followed by a 5 character random base-36 suffix.
#[derive(Debug, Default)]
pub struct TimestampIdGenerator;

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn next(&self) -> String {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let mut rng = rand::thread_rng();
        let suffix = (0..5)
            .map(|_| char::from(BASE36_DIGITS[rng.gen_range(0..36)]))
            .collect::<String>();
        format!("{}{suffix}", to_base36(millis))
    }
}

/// Deterministic `<prefix><n>` ids, starting at 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    value: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            value: AtomicU64::new(0),
        }
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next(&self) -> String {
        let value = self.value.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{value}", self.prefix)
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&d| char::from(d)).collect()
}
