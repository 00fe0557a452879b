// src/services/client_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, InvoiceRepository, QuoteRepository},
    models::client::{Client, ClientPayload},
};

#[derive(Clone)]
pub struct ClientService {
    client_repo: ClientRepository,
    quote_repo: QuoteRepository,
    invoice_repo: InvoiceRepository,
    pool: PgPool,
}

impl ClientService {
    pub fn new(
        client_repo: ClientRepository,
        quote_repo: QuoteRepository,
        invoice_repo: InvoiceRepository,
        pool: PgPool,
    ) -> Self {
        Self { client_repo, quote_repo, invoice_repo, pool }
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Client>, AppError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.client_repo.list(search).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Client, AppError> {
        self.client_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("client".into()))
    }

    pub async fn create(&self, payload: ClientPayload) -> Result<Client, AppError> {
        let client = self.client_repo.create(&payload.normalized()).await?;
        tracing::info!("Cliente criado: {} ({})", client.name, client.id);
        Ok(client)
    }

    pub async fn update(&self, id: Uuid, payload: ClientPayload) -> Result<Client, AppError> {
        self.client_repo
            .update(id, &payload.normalized())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("client".into()))
    }

    /// Remove o cliente com todas as faturas e devis dele, numa transação.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let client = self.client_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("client".into()))?;

        // Ordem: faturas -> linhas -> devis -> cliente
        let invoices = self.invoice_repo.delete_by_client(&mut *tx, id).await?;
        self.quote_repo.delete_lines_by_client(&mut *tx, id).await?;
        let quotes = self.quote_repo.delete_by_client(&mut *tx, id).await?;
        self.client_repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!(
            "Cliente removido: {} ({}) com {} devis e {} faturas",
            client.name, id, quotes, invoices
        );
        Ok(())
    }
}
