use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_MIN_MUTATION_INTERVAL_SECS: u64 = 2;

/// Password, kill-switch and cooldown policy for mutating operations.
///
/// The configured password is only kept as an HMAC tag under a key generated for this process,
/// so candidates are checked in constant time and the plain password never sits in memory
/// after construction.
pub struct AccessGuard {
    mac_key: [u8; 32],
    password_tag: Option<Vec<u8>>,
    locked: bool,
    last_mutation: Option<DateTime<Utc>>,
    min_interval: Duration,
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("password_configured", &self.is_password_configured())
            .field("locked", &self.locked)
            .field("last_mutation", &self.last_mutation)
            .field("min_interval", &self.min_interval)
            .finish()
    }
}

impl AccessGuard {
    /// An empty password counts as not configured.
    pub fn new(password: Option<&str>, min_interval: std::time::Duration) -> Self {
        let mut guard = Self {
            mac_key: rand::random(),
            password_tag: None,
            locked: false,
            last_mutation: None,
            min_interval: Duration::from_std(min_interval)
                .unwrap_or_else(|_| Duration::seconds(DEFAULT_MIN_MUTATION_INTERVAL_SECS as i64)),
        };

        guard.password_tag = password
            .filter(|password| !password.is_empty())
            .and_then(|password| guard.tag(password));

        guard
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.mac_key).ok()
    }

    fn tag(&self, password: &str) -> Option<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(password.as_bytes());
        Some(mac.finalize().into_bytes().to_vec())
    }

    pub fn is_password_configured(&self) -> bool {
        self.password_tag.is_some()
    }

    /// True iff a password is configured and `candidate` matches it exactly.
    pub fn check_password(&self, candidate: &str) -> bool {
        let (Some(expected), Some(mut mac)) = (self.password_tag.as_deref(), self.mac()) else {
            return false;
        };
        mac.update(candidate.as_bytes());
        mac.verify_slice(expected).is_ok()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Flips the lock and returns the new state.
    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        self.locked
    }

    /// A locked guard denies even the correct password.
    pub fn authorize(&self, candidate: &str) -> bool {
        !self.locked && self.check_password(candidate)
    }

    /// Consumes the mutation budget: true (and `now` recorded) unless the previous allowed
    /// mutation happened less than the minimum interval ago.
    pub fn allow_mutation(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_mutation {
            if now - last < self.min_interval {
                return false;
            }
        }
        self.last_mutation = Some(now);
        true
    }
}
