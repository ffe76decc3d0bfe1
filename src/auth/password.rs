use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash a password as `<work_factor>$<salt>$<hex digest>`, salting with a
/// fresh random value and iterating the digest `work_factor` times.
pub fn hash_password(password: &str, work_factor: u32) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = digest_password(password, &salt, work_factor);
    format!("{}${}${}", work_factor, salt, digest)
}

/// Check a candidate password against a stored hash. Returns false for any
/// malformed stored value rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(factor), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(factor) = factor.parse::<u32>() else {
        return false;
    };

    let candidate = digest_password(password, salt, factor);
    constant_time_eq(candidate.as_bytes(), expected.as_bytes())
}

fn digest_password(password: &str, salt: &str, work_factor: u32) -> String {
    let mut digest = {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hasher.finalize()
    };

    for _ in 1..work_factor.max(1) {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        digest = hasher.finalize();
    }

    format!("{:x}", digest)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let stored = hash_password("hunter2", 2);
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("hunter2", 2);
        let b = hash_password("hunter2", 2);
        assert_ne!(a, b);
        assert!(verify_password("hunter2", &a));
        assert!(verify_password("hunter2", &b));
    }

    #[test]
    fn malformed_stored_value_fails_closed() {
        assert!(!verify_password("hunter2", ""));
        assert!(!verify_password("hunter2", "not-a-hash"));
        assert!(!verify_password("hunter2", "x$y$z"));
    }
}
