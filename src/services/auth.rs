// src/services/auth.rs

use chrono::DateTime;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Claims, SessionUser},
};

/// Valida os tokens emitidos pelo provedor de autenticação (HS256, segredo compartilhado).
/// Este backend não emite tokens: login e cadastro ficam com o provedor.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    audience: String,
}

impl AuthService {
    pub fn new(jwt_secret: String, audience: String) -> Self {
        Self { jwt_secret, audience }
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        let expires_at = DateTime::from_timestamp(claims.exp as i64, 0).ok_or(AppError::InvalidToken)?;

        Ok(SessionUser {
            id: claims.sub,
            email: claims.email,
            token: token.to_string(),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use uuid::Uuid;

    const SECRET: &str = "segredo-de-teste";

    fn token(sub: Uuid, exp: i64, aud: &str) -> String {
        let claims = json!({
            "sub": sub,
            "exp": exp,
            "aud": aud,
            "email": "usta@example.com",
        });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_ref())).unwrap()
    }

    fn service() -> AuthService {
        AuthService::new(SECRET.to_string(), "authenticated".to_string())
    }

    #[test]
    fn valid_token_becomes_a_session() {
        let id = Uuid::new_v4();
        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        let raw = token(id, exp, "authenticated");

        let user = service().validate_token(&raw).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("usta@example.com"));
        assert_eq!(user.token, raw);
        assert_eq!(user.expires_at.timestamp(), exp);
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let id = Uuid::new_v4();
        let expired = token(id, (Utc::now() - chrono::Duration::hours(2)).timestamp(), "authenticated");
        let foreign = token(id, (Utc::now() + chrono::Duration::hours(1)).timestamp(), "anon");

        assert!(matches!(service().validate_token(&expired), Err(AppError::InvalidToken)));
        assert!(matches!(service().validate_token(&foreign), Err(AppError::InvalidToken)));
        assert!(matches!(service().validate_token("lixo"), Err(AppError::InvalidToken)));
    }
}
