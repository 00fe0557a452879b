// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CatalogRepository, ClientRepository, DashboardRepository, InvoiceRepository,
        QuoteRepository, SettingsRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService, client_service::ClientService,
        dashboard_service::DashboardService, document_service::DocumentService,
        invoice_service::InvoiceService, quote_service::QuoteService,
    },
};

// Configuração lida do ambiente (.env)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub secret_key: String,
    pub admin_username: String,
    pub admin_password_hash: String,
    pub bind_addr: String,
    pub fonts_dir: String,
    pub font_family: String,
    pub session_ttl_secs: i64,
    pub cookie_secure: bool,
    pub db_max_connections: u32,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} deve ser definida", name))
}

fn optional<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{} tem um valor inválido: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            secret_key: required("SECRET_KEY")?,
            admin_username: required("ADMIN_USERNAME")?,
            admin_password_hash: required("ADMIN_PASSWORD_HASH")?,
            bind_addr: optional("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            fonts_dir: optional("FONTS_DIR", "./fonts".to_string())?,
            font_family: optional("FONT_FAMILY", "Roboto".to_string())?,
            session_ttl_secs: optional("SESSION_TTL_SECS", 3600)?,
            cookie_secure: optional("COOKIE_SECURE", false)?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", 5)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub catalog_service: CatalogService,
    pub quote_service: QuoteService,
    pub invoice_service: InvoiceService,
    pub dashboard_service: DashboardService,
    pub document_service: DocumentService,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(config: AppConfig, db_pool: PgPool) -> Self {
        let client_repo = ClientRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let quote_repo = QuoteRepository::new(db_pool.clone());
        let invoice_repo = InvoiceRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            config.admin_username.clone(),
            config.admin_password_hash.clone(),
            config.secret_key.clone(),
            config.session_ttl_secs,
        );
        let client_service = ClientService::new(
            client_repo.clone(),
            quote_repo.clone(),
            invoice_repo.clone(),
            db_pool.clone(),
        );
        let catalog_service = CatalogService::new(catalog_repo.clone());
        let quote_service = QuoteService::new(
            quote_repo.clone(),
            invoice_repo.clone(),
            client_repo.clone(),
            catalog_repo,
            db_pool.clone(),
        );
        let invoice_service = InvoiceService::new(invoice_repo.clone(), db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo, quote_repo.clone());
        let document_service = DocumentService::new(
            quote_repo,
            invoice_repo,
            client_repo,
            settings_repo.clone(),
            db_pool.clone(),
            config.fonts_dir.clone(),
            config.font_family.clone(),
        );

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            client_service,
            catalog_service,
            quote_service,
            invoice_service,
            dashboard_service,
            document_service,
            settings_repo,
        }
    }
}
