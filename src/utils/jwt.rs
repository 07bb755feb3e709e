use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use actix_web::dev::{Payload, ServiceRequest};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use std::future::{ready, Ready};

use crate::config::JwtSettings;
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Validates a JWT token and returns the claims if valid.
pub fn validate_token(token: &str, settings: &JwtSettings) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.set_audience(&[settings.audience.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// Validator function for the `HttpAuthentication::bearer` middleware.
/// Valid claims are stored in the request extensions for `OwnerId`.
pub async fn validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let settings = match req.app_data::<web::Data<JwtSettings>>() {
        Some(settings) => settings.clone(),
        None => {
            log::error!("JWT settings are not registered as app data");
            return Err((actix_web::error::ErrorInternalServerError("Authentication unavailable"), req));
        }
    };

    match validate_token(credentials.token(), &settings) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(_) => Err((actix_web::error::ErrorUnauthorized("Invalid token"), req)),
    }
}

/// The authenticated owner of the request, taken from the `sub` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerId(pub Uuid);

impl FromRequest for OwnerId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let owner = req
            .extensions()
            .get::<Claims>()
            .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))
            .and_then(|claims| {
                Uuid::parse_str(&claims.sub)
                    .map(OwnerId)
                    .map_err(|_| AppError::Unauthorized("Invalid subject".to_string()))
            });
        ready(owner)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) fn settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret".to_string(),
            audience: "authenticated".to_string(),
        }
    }

    /// Mints a token the way the identity service does.
    pub(crate) fn token_for(owner: Uuid) -> String {
        let claims = Claims {
            sub: owner.to_string(),
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
            aud: Some("authenticated".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(settings().secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_tokens_signed_with_the_shared_secret() {
        let owner = Uuid::new_v4();
        let claims = validate_token(&token_for(owner), &settings()).unwrap();
        assert_eq!(claims.sub, owner.to_string());
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let other = JwtSettings {
            secret: "another-secret".to_string(),
            ..settings()
        };
        assert!(validate_token(&token_for(Uuid::new_v4()), &other).is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
            aud: Some("authenticated".to_string()),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(settings().secret.as_bytes()),
        )
        .unwrap();
        assert!(validate_token(&token, &settings()).is_err());
    }
}
