use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Issues booking references of the form `TBB-<BASE36>`, derived from the
/// creation timestamp in milliseconds. The value is forced to be strictly
/// increasing, so two creations landing in the same millisecond get
/// consecutive values instead of the same reference.
pub struct ReferenceGenerator {
    prefix: &'static str,
    last: AtomicI64,
}

impl ReferenceGenerator {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            last: AtomicI64::new(0),
        }
    }

    pub fn next(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return format!("{}-{}", self.prefix, base36(candidate)),
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new("TBB")
    }
}

fn base36(mut n: i64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    if n <= 0 {
        return "0".to_string();
    }
    let mut out = vec![];
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
