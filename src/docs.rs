// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Catalog ---
        handlers::catalog::list_prices,
        handlers::catalog::create_price,
        handlers::catalog::get_price_by_code,
        handlers::catalog::get_price,
        handlers::catalog::update_price,
        handlers::catalog::delete_price,

        // --- Quotes ---
        handlers::quotes::list_quotes,
        handlers::quotes::create_quote,
        handlers::quotes::get_quote,
        handlers::quotes::update_quote,
        handlers::quotes::change_quote_status,
        handlers::quotes::convert_quote,
        handlers::quotes::delete_quote,

        // --- Invoices ---
        handlers::invoices::list_invoices,
        handlers::invoices::get_invoice,
        handlers::invoices::record_payment,
        handlers::invoices::delete_invoice,

        // --- Documents ---
        handlers::documents::quote_pdf,
        handlers::documents::invoice_pdf,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::AdminUser,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,

            // --- Clients ---
            models::client::Client,
            models::client::ClientPayload,

            // --- Catalog ---
            models::catalog::CatalogCategory,
            models::catalog::CatalogPrice,
            models::catalog::CatalogPricePayload,

            // --- Quotes ---
            models::quote::QuoteStatus,
            models::quote::Quote,
            models::quote::QuoteLine,
            models::quote::QuoteSummary,
            models::quote::QuoteDetail,
            models::quote::QuoteLinePayload,
            models::quote::QuotePayload,
            models::quote::QuoteStatusPayload,

            // --- Invoices ---
            models::invoice::PaymentState,
            models::invoice::PaymentMethod,
            models::invoice::Invoice,
            models::invoice::InvoiceSummary,
            models::invoice::InvoiceDetail,
            models::invoice::RecordPaymentPayload,

            // --- Settings ---
            models::settings::CompanyConfig,
            models::settings::UpdateCompanyConfigRequest,
        )
    ),
    tags(
        (name = "Auth", description = "Sessão do administrador"),
        (name = "Dashboard", description = "Página inicial"),
        (name = "Clients", description = "Gestão de clientes"),
        (name = "Catalog", description = "Catálogo de preços"),
        (name = "Quotes", description = "Devis, status e conversão em fatura"),
        (name = "Invoices", description = "Faturas e pagamentos"),
        (name = "Documents", description = "Exportação em PDF"),
        (name = "Settings", description = "Dados da empresa")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
