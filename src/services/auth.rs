// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{AdminUser, Claims},
};

// Conta única: credenciais vindas da configuração, não do banco
#[derive(Clone)]
pub struct AuthService {
    admin_username: String,
    admin_password_hash: String,
    jwt_secret: String,
    session_ttl_secs: i64,
}

impl AuthService {
    pub fn new(
        admin_username: String,
        admin_password_hash: String,
        jwt_secret: String,
        session_ttl_secs: i64,
    ) -> Self {
        Self { admin_username, admin_password_hash, jwt_secret, session_ttl_secs }
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.session_ttl_secs
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        if username != self.admin_username {
            tracing::warn!("Tentativa de login com usuário desconhecido: {}", username);
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = self.admin_password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            tracing::warn!("Senha incorreta para o usuário {}", username);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("🔑 Login do administrador {}", username);
        self.create_token()
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Token assinado para outro usuário (ex: ADMIN_USERNAME alterado)
        if token_data.claims.sub != self.admin_username {
            return Err(AppError::InvalidToken);
        }

        Ok(AdminUser { username: token_data.claims.sub })
    }

    fn create_token(&self) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.session_ttl_secs);

        let claims = Claims {
            sub: self.admin_username.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let hash = bcrypt::hash("secret", 4).unwrap();
        AuthService::new("admin".into(), hash, "test-key".into(), 3600)
    }

    #[tokio::test]
    async fn login_issues_a_token_for_the_admin() {
        let auth = service();
        let token = auth.login("admin", "secret").await.unwrap();

        let user = auth.validate_token(&token).unwrap();
        assert_eq!(user.username, "admin");
    }

    #[tokio::test]
    async fn wrong_credentials_are_rejected() {
        let auth = service();
        assert!(matches!(auth.login("admin", "nope").await, Err(AppError::InvalidCredentials)));
        assert!(matches!(auth.login("root", "secret").await, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn tokens_from_another_key_or_user_are_invalid() {
        let auth = service();
        let other_key = AuthService::new("admin".into(), String::new(), "other-key".into(), 3600);
        let token = other_key.create_token().unwrap();
        assert!(matches!(auth.validate_token(&token), Err(AppError::InvalidToken)));

        let other_user = AuthService::new("bob".into(), String::new(), "test-key".into(), 3600);
        let token = other_user.create_token().unwrap();
        assert!(matches!(auth.validate_token(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_tokens_are_invalid() {
        let auth = service();
        let expired = AuthService::new("admin".into(), String::new(), "test-key".into(), -3600);
        let token = expired.create_token().unwrap();
        assert!(matches!(auth.validate_token(&token), Err(AppError::InvalidToken)));
    }
}
