//! Graph API session context
//!
//! Built once at startup from the CLI/environment and handed by reference to
//! whatever needs to issue authenticated requests.

use chrono::{DateTime, TimeZone, Utc};

/// An OAuth access token plus its expiry
#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a session from a token and a unix timestamp
    ///
    /// An expiry of `0` (or none) means the token never expires.
    pub fn new(access_token: &str, expires_at: Option<i64>) -> Self {
        let expires_at = expires_at
            .filter(|secs| *secs > 0)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

        Self {
            access_token: access_token.trim().to_string(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// A session is valid when it carries a token that has not expired
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expiry) => expiry > now,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_empty_token_is_invalid() {
        assert!(!Session::new("   ", None).is_valid());
    }

    #[test]
    fn test_zero_expiry_never_expires() {
        let session = Session::new("token", Some(0));
        assert!(session.expires_at().is_none());
        assert!(session.is_valid());
    }

    #[test]
    fn test_expiry_is_checked() {
        let now = Utc::now();
        let session = Session::new("token", Some(now.timestamp() + 60));
        assert!(session.is_valid_at(now));
        assert!(!session.is_valid_at(now + Duration::seconds(120)));
    }
}
