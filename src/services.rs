pub mod auth;
pub mod pricing;
pub mod numbering;
pub mod lifecycle;
pub mod payment;
pub mod client_service;
pub mod catalog_service;
pub mod quote_service;
pub mod invoice_service;
pub mod dashboard_service;
pub mod document_service;
