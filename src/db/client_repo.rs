// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::client::{Client, ClientPayload},
};

const CLIENT_COLUMNS: &str =
    "id, name, company, address, city, postal_code, phone, email, created_at";

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lista os clientes em ordem alfabética, com busca opcional por
    /// nome, empresa ou e-mail.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Client>, AppError> {
        let sql = format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE $1::text IS NULL
               OR name ILIKE '%' || $1 || '%'
               OR company ILIKE '%' || $1 || '%'
               OR email ILIKE '%' || $1 || '%'
            ORDER BY name ASC
            "#
        );

        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(search)
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    pub async fn create(&self, payload: &ClientPayload) -> Result<Client, AppError> {
        let sql = format!(
            r#"
            INSERT INTO clients (name, company, address, city, postal_code, phone, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLIENT_COLUMNS}
            "#
        );

        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(&payload.name)
            .bind(&payload.company)
            .bind(&payload.address)
            .bind(&payload.city)
            .bind(&payload.postal_code)
            .bind(&payload.phone)
            .bind(&payload.email)
            .fetch_one(&self.pool)
            .await?;

        Ok(client)
    }

    pub async fn update(&self, id: Uuid, payload: &ClientPayload) -> Result<Option<Client>, AppError> {
        let sql = format!(
            r#"
            UPDATE clients
            SET name = $2, company = $3, address = $4, city = $5,
                postal_code = $6, phone = $7, email = $8
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        );

        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(&payload.name)
            .bind(&payload.company)
            .bind(&payload.address)
            .bind(&payload.city)
            .bind(&payload.postal_code)
            .bind(&payload.phone)
            .bind(&payload.email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
