// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::settings::{CompanyConfig, UpdateCompanyConfigRequest},
};

const CONFIG_COLUMNS: &str = "company_name, address, city, postal_code, phone, email, siret, \
     vat_number, iban, bic, bank_name, legal_notice, logo_path, updated_at";

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_settings(&self) -> Result<CompanyConfig, AppError> {
        self.get_settings_with(&self.pool).await
    }

    // Registro único. Enquanto não for salvo, devolve a configuração vazia.
    pub async fn get_settings_with<'e, E>(&self, executor: E) -> Result<CompanyConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CONFIG_COLUMNS} FROM company_config WHERE id = TRUE");
        let settings = sqlx::query_as::<_, CompanyConfig>(&sql)
            .fetch_optional(executor)
            .await?;

        Ok(settings.unwrap_or_default())
    }

    pub async fn update_settings(&self, input: &UpdateCompanyConfigRequest) -> Result<CompanyConfig, AppError> {
        // UPSERT (Insert or Update)
        let sql = format!(
            r#"
            INSERT INTO company_config (
                id, company_name, address, city, postal_code, phone, email, siret,
                vat_number, iban, bic, bank_name, legal_notice, logo_path, updated_at
            )
            VALUES (TRUE, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                company_name = EXCLUDED.company_name,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                postal_code = EXCLUDED.postal_code,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                siret = EXCLUDED.siret,
                vat_number = EXCLUDED.vat_number,
                iban = EXCLUDED.iban,
                bic = EXCLUDED.bic,
                bank_name = EXCLUDED.bank_name,
                legal_notice = EXCLUDED.legal_notice,
                logo_path = EXCLUDED.logo_path,
                updated_at = NOW()
            RETURNING {CONFIG_COLUMNS}
            "#
        );

        let settings = sqlx::query_as::<_, CompanyConfig>(&sql)
            .bind(&input.company_name)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.postal_code)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.siret)
            .bind(&input.vat_number)
            .bind(&input.iban)
            .bind(&input.bic)
            .bind(&input.bank_name)
            .bind(&input.legal_notice)
            .bind(&input.logo_path)
            .fetch_one(&self.pool)
            .await?;

        Ok(settings)
    }
}
