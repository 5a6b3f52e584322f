use anyhow::Result;
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};
use uuid::Uuid;

/// The opaque capability a verified session token grants: the caller's
/// identity and nothing else. Issuance of sessions (login, signup) lives in
/// the external identity provider; this service only mints and verifies the
/// token format it hands us.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
}

#[derive(Clone)]
pub struct SessionService {
    key: [u8; 32],
    ttl_hours: u64,
}

impl SessionService {
    pub fn new(key: [u8; 32], ttl_hours: u64) -> Self {
        Self { key, ttl_hours }
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String> {
        let duration = std::time::Duration::from_secs(self.ttl_hours * 60 * 60);
        let mut claims = Claims::new_expires_in(&duration)?;
        claims.issuer("chirp")?;
        claims.audience("chirp")?;
        claims.subject(&user_id.to_string())?;
        claims.add_additional("typ", "session")?;

        let key = SymmetricKey::<V4>::from(&self.key)?;
        Ok(local::encrypt(&key, &claims, None, None)?)
    }

    /// Returns `None` for any token that fails to parse, decrypt, or
    /// validate; the distinction is not useful to callers.
    pub fn authenticate(&self, token: &str) -> Result<Option<Session>> {
        let key = SymmetricKey::<V4>::from(&self.key)?;
        let mut rules = ClaimsValidationRules::new();
        rules.validate_issuer_with("chirp");
        rules.validate_audience_with("chirp");

        let untrusted = match UntrustedToken::<Local, V4>::try_from(token) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        let trusted = match local::decrypt(&key, &untrusted, &rules, None, None) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        let claims = match trusted.payload_claims() {
            Some(claims) => claims,
            None => return Ok(None),
        };

        if !has_token_type(claims, "session") {
            return Ok(None);
        }
        let Some(user_id) = claim_uuid(claims, "sub") else {
            return Ok(None);
        };
        Ok(Some(Session { user_id }))
    }
}

fn claim_uuid(claims: &Claims, name: &str) -> Option<Uuid> {
    claims
        .get_claim(name)
        .and_then(|value| value.as_str())
        .and_then(|value| Uuid::parse_str(value).ok())
}

fn has_token_type(claims: &Claims, expected: &str) -> bool {
    claims
        .get_claim("typ")
        .and_then(|value| value.as_str())
        .map(|value| value == expected)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";

    #[test]
    fn round_trip() {
        let service = SessionService::new(KEY, 1);
        let user_id = Uuid::new_v4();
        let token = service.issue_token(user_id).unwrap();

        let session = service.authenticate(&token).unwrap().unwrap();
        assert_eq!(session.user_id, user_id);
    }

    #[test]
    fn garbage_token_rejected() {
        let service = SessionService::new(KEY, 1);
        assert!(service.authenticate("not-a-token").unwrap().is_none());
    }

    fn encrypt_session_claims(claims: &Claims) -> String {
        let key = SymmetricKey::<V4>::from(&KEY).unwrap();
        local::encrypt(&key, claims, None, None).unwrap()
    }

    #[test]
    fn non_uuid_subject_rejected() {
        let service = SessionService::new(KEY, 1);

        let mut claims = Claims::new().unwrap();
        claims.issuer("chirp").unwrap();
        claims.audience("chirp").unwrap();
        claims.subject("not-a-uuid").unwrap();
        claims.add_additional("typ", "session").unwrap();

        let token = encrypt_session_claims(&claims);
        assert!(service.authenticate(&token).unwrap().is_none());
    }

    #[test]
    fn missing_subject_rejected() {
        let service = SessionService::new(KEY, 1);

        let mut claims = Claims::new().unwrap();
        claims.issuer("chirp").unwrap();
        claims.audience("chirp").unwrap();
        claims.add_additional("typ", "session").unwrap();

        let token = encrypt_session_claims(&claims);
        assert!(service.authenticate(&token).unwrap().is_none());
    }

    #[test]
    fn wrong_key_rejected() {
        let service = SessionService::new(KEY, 1);
        let token = service.issue_token(Uuid::new_v4()).unwrap();

        let other = SessionService::new(*b"fedcba9876543210fedcba9876543210", 1);
        assert!(other.authenticate(&token).unwrap().is_none());
    }
}
