// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::{DashboardRepository, QuoteRepository},
    models::dashboard::DashboardSummary,
};

const LATEST_QUOTES: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    quote_repo: QuoteRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, quote_repo: QuoteRepository) -> Self {
        Self { repo, quote_repo }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        let (client_count, quote_count, invoice_count) = self.repo.get_counts().await?;
        let latest_quotes = self.quote_repo.list(None, None, Some(LATEST_QUOTES)).await?;

        Ok(DashboardSummary { client_count, quote_count, invoice_count, latest_quotes })
    }
}
