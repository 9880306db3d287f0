use anyhow::Result;
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::app::communities::CommunityService;
use crate::domain::community::Community;
use crate::infra::db::Db;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Private,
    Master,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Private => "private",
            Scope::Master => "master",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "private" => Some(Scope::Private),
            "master" => Some(Scope::Master),
            _ => None,
        }
    }
}

/// Why a bearer token was rejected. Each variant maps to its own 401
/// message at the HTTP boundary.
#[derive(Debug)]
pub enum AuthFailure {
    /// Signature/decryption failure, or not a token at all.
    InvalidToken,
    /// Decrypts fine but the claims are unusable: unknown audience,
    /// missing subject, or an issued-at in the future.
    Malformed,
    UnknownCommunity,
    /// Issued before the community's `tokenInvalidBefore` cutoff.
    Revoked,
    Internal(anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub community: Community,
    pub scope: Scope,
}

/// Mints and verifies community API keys: PASETO v4.local over
/// {aud, sub, iat}, non-expiring. There is no refresh flow; keys are
/// minted out-of-band and die only when the community's
/// `tokenInvalidBefore` is rotated past their issue instant.
#[derive(Clone)]
pub struct ApiKeyService {
    db: Db,
    key: [u8; 32],
}

impl ApiKeyService {
    pub fn new(db: Db, key: [u8; 32]) -> Self {
        Self { db, key }
    }

    pub fn create_api_key(&self, community_id: &str, scope: Scope) -> Result<String> {
        let mut claims = Claims::new()?;
        claims.non_expiring();
        claims.audience(scope.as_str())?;
        claims.subject(community_id)?;

        let key = SymmetricKey::<V4>::from(&self.key)?;
        Ok(local::encrypt(&key, &claims, None, None)?)
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthSession, AuthFailure> {
        let key = SymmetricKey::<V4>::from(&self.key)
            .map_err(|err| AuthFailure::Internal(err.into()))?;

        let mut rules = ClaimsValidationRules::new();
        rules.allow_non_expiring();

        let untrusted = UntrustedToken::<Local, V4>::try_from(token)
            .map_err(|_| AuthFailure::InvalidToken)?;
        let trusted = match local::decrypt(&key, &untrusted, &rules, None, None) {
            Ok(trusted) => trusted,
            Err(pasetors::errors::Error::ClaimValidation(_)) => {
                return Err(AuthFailure::Malformed)
            }
            Err(_) => return Err(AuthFailure::InvalidToken),
        };

        let claims = trusted.payload_claims().ok_or(AuthFailure::Malformed)?;
        let scope = claim_str(claims, "aud")
            .and_then(Scope::parse)
            .ok_or(AuthFailure::Malformed)?;
        let community_id = claim_str(claims, "sub")
            .ok_or(AuthFailure::Malformed)?
            .to_string();
        let issued_at = claim_str(claims, "iat")
            .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())
            .ok_or(AuthFailure::Malformed)?;

        let community = CommunityService::new(self.db.clone())
            .get(&community_id)
            .await
            .map_err(AuthFailure::Internal)?
            .ok_or(AuthFailure::UnknownCommunity)?;

        if community.token_invalid_before > issued_at {
            return Err(AuthFailure::Revoked);
        }

        Ok(AuthSession { community, scope })
    }
}

fn claim_str<'a>(claims: &'a Claims, name: &str) -> Option<&'a str> {
    claims.get_claim(name).and_then(|value| value.as_str())
}

/// Opaque digest stored as a guild's key material. The raw key itself is
/// never persisted.
pub fn key_material_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
