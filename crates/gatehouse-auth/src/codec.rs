//! Signing and verification of bearer tokens.
//!
//! [`TokenCodec`] owns the HS256 key pair derived from the configured secret
//! and the default token lifetime. It holds no other state and is shared
//! behind an `Arc` by every request.
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_auth::{ClaimSet, TokenCodec};
//! use gatehouse_config::JwtConfig;
//!
//! let codec = TokenCodec::new(&JwtConfig::from_env()?)?;
//! let token = codec.issue_for(&identity)?;
//! let claims = codec.decode(token.as_str())?;
//! assert_eq!(claims.sub, identity.login_name);
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::Value;
use tracing::warn;

use gatehouse_config::{ConfigError, JwtConfig};

use crate::claims::{CLAIMS_VERSION, ClaimSet, Claims, RESERVED_CLAIMS, Token};
use crate::error::TokenError;
use crate::identity::{Identity, UserId};
use crate::role::AuthoritySet;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("ttl_ms", &self.ttl.num_milliseconds())
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Builds a codec from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecret`] when the secret is empty. Short
    /// secrets and non-positive lifetimes are logged and accepted.
    pub fn new(config: &JwtConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let secret = config.secret.as_bytes();

        // Expiry is checked against the millisecond claims in `decode_at`;
        // the library's second-granularity check would round it away.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::milliseconds(config.expiration_millis),
        })
    }

    /// Default lifetime for tokens issued by [`TokenCodec::issue_for`].
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(
        &self,
        subject: &str,
        claims: ClaimSet,
        ttl: Duration,
    ) -> Result<Token, TokenError> {
        self.issue_at(subject, claims, ttl, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    ///
    /// Extra claims that collide with a reserved name are dropped with a
    /// warning. An empty subject or role set is refused.
    pub fn issue_at(
        &self,
        subject: &str,
        claims: ClaimSet,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::Internal("token subject is empty".into()));
        }
        if claims.roles.is_empty() {
            return Err(TokenError::Internal(format!(
                "no roles to embed for subject {}",
                subject
            )));
        }

        // Claims carry milliseconds; the returned token must match them.
        let now = DateTime::from_timestamp_millis(now.timestamp_millis())
            .ok_or_else(|| TokenError::Internal("issue time out of range".into()))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Internal("token lifetime out of range".into()))?;

        let mut extra = claims.extra;
        extra.retain(|name, _| {
            let reserved = RESERVED_CLAIMS.contains(&name.as_str());
            if reserved {
                warn!(claim = %name, "Dropping extra claim that shadows a reserved claim");
            }
            !reserved
        });

        let payload = Claims {
            sub: subject.to_string(),
            user_id: claims.user_id,
            roles: claims.roles.to_claim_values(),
            role: None,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            issued_at_millis: Some(now.timestamp_millis()),
            expires_at_millis: Some(expires_at.timestamp_millis()),
            ver: CLAIMS_VERSION,
            extra,
        };

        let value = encode(&Header::new(ALGORITHM), &payload, &self.encoding_key)
            .map_err(|e| TokenError::Internal(format!("failed to sign token: {}", e)))?;

        Ok(Token {
            value,
            subject: payload.sub,
            issued_at: now,
            expires_at,
        })
    }

    /// Issues a token for `identity` using the configured lifetime.
    pub fn issue_for(&self, identity: &Identity) -> Result<Token, TokenError> {
        self.issue(
            &identity.login_name,
            ClaimSet::for_identity(identity),
            self.ttl,
        )
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Verifies signature, structure and lifetime against `now`.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::EmptyOrNull);
        }

        if has_unsupported_algorithm(token) {
            return Err(TokenError::UnsupportedFormat);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)?;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.decode(token).map(|claims| claims.sub)
    }

    pub fn extract_expiry(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        self.decode(token).map(|claims| claims.expires_at())
    }

    /// Returns `Ok(None)` when the token is valid but lacks the claim.
    pub fn extract_claim(&self, token: &str, name: &str) -> Result<Option<Value>, TokenError> {
        self.decode(token).map(|claims| claims.get(name))
    }

    pub fn extract_roles(&self, token: &str) -> Result<AuthoritySet, TokenError> {
        self.decode(token).map(|claims| claims.authorities())
    }

    pub fn extract_user_id(&self, token: &str) -> Result<UserId, TokenError> {
        self.decode(token).map(|claims| claims.user_id)
    }
}

/// True when the header names an algorithm jsonwebtoken cannot represent,
/// such as `none` for unsecured tokens. Those would otherwise surface as a
/// JSON error and read as malformed.
fn has_unsupported_algorithm(token: &str) -> bool {
    let Some(header) = token.split('.').next() else {
        return false;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(header) else {
        return false;
    };
    let Ok(header) = serde_json::from_slice::<Value>(&bytes) else {
        return false;
    };

    match header.get("alg").and_then(Value::as_str) {
        Some(alg) => alg.parse::<Algorithm>().is_err(),
        None => false,
    }
}

fn classify(err: JwtError) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature => TokenError::UnsupportedFormat,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed,
        other => TokenError::Internal(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use serde_json::json;

    const SECRET: &str = "an-hs256-secret-that-is-long-enough!";

    fn codec() -> TokenCodec {
        TokenCodec::new(&JwtConfig::new(SECRET, 3_600_000)).unwrap()
    }

    fn student() -> Identity {
        Identity::new(42, "s@x.com", "hash", Role::Student)
    }

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn sign_raw(header: Header, payload: &Value, secret: &str) -> String {
        encode(&header, payload, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_empty_secret_is_refused() {
        let err = TokenCodec::new(&JwtConfig::new("  ", 1000)).unwrap_err();
        assert_eq!(err, ConfigError::EmptySecret);
    }

    #[test]
    fn test_short_secret_is_accepted() {
        assert!(TokenCodec::new(&JwtConfig::new("short", 1000)).is_ok());
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        let token = codec.issue_for(&student()).unwrap();

        let claims = codec.decode(token.as_str()).unwrap();
        assert_eq!(claims.sub, "s@x.com");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.roles, vec!["ROLE_STUDENT"]);
        assert_eq!(claims.ver, CLAIMS_VERSION);
        assert_eq!(claims.expires_at(), token.expires_at);
    }

    #[test]
    fn test_lifetime_is_millisecond_precise() {
        let codec = codec();
        let issued = at(1_700_000_000_000);
        let token = codec
            .issue_at(
                "s@x.com",
                ClaimSet::for_identity(&student()),
                Duration::milliseconds(1000),
                issued,
            )
            .unwrap();

        assert!(codec.decode_at(token.as_str(), at(1_700_000_000_999)).is_ok());
        assert_eq!(
            codec.decode_at(token.as_str(), at(1_700_000_001_100)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let token = codec
            .issue_at(
                "s@x.com",
                ClaimSet::for_identity(&student()),
                Duration::hours(1),
                Utc::now() - Duration::hours(2),
            )
            .unwrap();

        assert_eq!(codec.decode(token.as_str()), Err(TokenError::Expired));
    }

    #[test]
    fn test_foreign_secret_is_bad_signature() {
        let other = TokenCodec::new(&JwtConfig::new("some-other-secret-of-sufficient-len", 60_000))
            .unwrap();
        let token = other.issue_for(&student()).unwrap();

        assert_eq!(codec().decode(token.as_str()), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_other_algorithm_is_unsupported() {
        let now = Utc::now().timestamp();
        let token = sign_raw(
            Header::new(Algorithm::HS512),
            &json!({"sub": "s@x.com", "userId": 1, "roles": ["ROLE_ADMIN"], "iat": now, "exp": now + 60}),
            SECRET,
        );

        assert_eq!(codec().decode(&token), Err(TokenError::UnsupportedFormat));
    }

    #[test]
    fn test_unsecured_token_is_unsupported() {
        let now = Utc::now().timestamp();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            json!({"sub": "s@x.com", "userId": 1, "roles": ["ROLE_ADMIN"], "iat": now, "exp": now + 60})
                .to_string(),
        );
        let token = format!("{}.{}.", header, payload);

        assert_eq!(codec().decode(&token), Err(TokenError::UnsupportedFormat));
    }

    #[test]
    fn test_issued_times_are_whole_milliseconds() {
        let codec = codec();
        let issued = at(1_700_000_000_123) + Duration::nanoseconds(456_789);
        let token = codec
            .issue_at(
                "s@x.com",
                ClaimSet::for_identity(&student()),
                Duration::seconds(30),
                issued,
            )
            .unwrap();

        assert_eq!(token.issued_at, at(1_700_000_000_123));
        assert_eq!(token.expires_at, at(1_700_000_030_123));

        let claims = codec.decode_at(token.as_str(), issued).unwrap();
        assert_eq!(claims.issued_at(), token.issued_at);
        assert_eq!(claims.expires_at(), token.expires_at);
    }

    #[test]
    fn test_empty_and_blank_tokens() {
        let codec = codec();
        assert_eq!(codec.decode(""), Err(TokenError::EmptyOrNull));
        assert_eq!(codec.decode("   "), Err(TokenError::EmptyOrNull));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.decode("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(codec.decode("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_user_id_is_malformed() {
        let now = Utc::now().timestamp();
        let token = sign_raw(
            Header::new(ALGORITHM),
            &json!({"sub": "s@x.com", "roles": ["ROLE_ADMIN"], "iat": now, "exp": now + 60}),
            SECRET,
        );

        assert_eq!(codec().decode(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_legacy_singular_role_token_is_accepted() {
        let now = Utc::now().timestamp();
        let token = sign_raw(
            Header::new(ALGORITHM),
            &json!({"sub": "a@x.com", "userId": 7, "role": "ADMIN", "iat": now, "exp": now + 60}),
            SECRET,
        );

        let codec = codec();
        let roles = codec.extract_roles(&token).unwrap();
        assert!(roles.contains(Role::Admin));
        assert!(codec.decode(&token).unwrap().is_legacy());
    }

    #[test]
    fn test_projections() {
        let codec = codec();
        let identity = student().with_flag("hasPaidApplicationFee", true);
        let claims = ClaimSet::for_identity(&identity).with_claim("hasPaidApplicationFee", true);
        let token = codec
            .issue("s@x.com", claims, Duration::minutes(5))
            .unwrap();

        assert_eq!(codec.extract_subject(token.as_str()).unwrap(), "s@x.com");
        assert_eq!(codec.extract_user_id(token.as_str()).unwrap(), 42);
        assert_eq!(codec.extract_expiry(token.as_str()).unwrap(), token.expires_at);
        assert_eq!(
            codec
                .extract_claim(token.as_str(), "hasPaidApplicationFee")
                .unwrap(),
            Some(json!(true))
        );
        assert_eq!(codec.extract_claim(token.as_str(), "nope").unwrap(), None);
        assert_eq!(
            codec.extract_subject("garbage"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_reserved_extra_claims_are_dropped() {
        let codec = codec();
        let claims = ClaimSet::for_identity(&student()).with_claim("sub", "intruder@x.com");
        let token = codec
            .issue("s@x.com", claims, Duration::minutes(5))
            .unwrap();

        assert_eq!(codec.extract_subject(token.as_str()).unwrap(), "s@x.com");
    }

    #[test]
    fn test_issue_requires_roles_and_subject() {
        let codec = codec();
        let empty_roles = ClaimSet::new(1, AuthoritySet::default());
        assert!(matches!(
            codec.issue("s@x.com", empty_roles, Duration::minutes(1)),
            Err(TokenError::Internal(_))
        ));
        assert!(matches!(
            codec.issue("", ClaimSet::for_identity(&student()), Duration::minutes(1)),
            Err(TokenError::Internal(_))
        ));
    }

    #[test]
    fn test_debug_hides_keys() {
        let rendered = format!("{:?}", codec());
        assert!(!rendered.contains(SECRET));
    }
}
