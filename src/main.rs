//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    // Rotas protegidas pelo middleware de autenticação
    let api_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .route("/dashboard", get(handlers::dashboard::get_summary))
        .route("/clients"
               ,get(handlers::clients::list_clients)
               .post(handlers::clients::create_client)
        )
        .route("/clients/{id}"
               ,get(handlers::clients::get_client)
               .put(handlers::clients::update_client)
               .delete(handlers::clients::delete_client)
        )
        .route("/catalog"
               ,get(handlers::catalog::list_prices)
               .post(handlers::catalog::create_price)
        )
        .route("/catalog/code/{code}", get(handlers::catalog::get_price_by_code))
        .route("/catalog/{id}"
               ,get(handlers::catalog::get_price)
               .put(handlers::catalog::update_price)
               .delete(handlers::catalog::delete_price)
        )
        .route("/quotes"
               ,get(handlers::quotes::list_quotes)
               .post(handlers::quotes::create_quote)
        )
        .route("/quotes/{id}"
               ,get(handlers::quotes::get_quote)
               .put(handlers::quotes::update_quote)
               .delete(handlers::quotes::delete_quote)
        )
        .route("/quotes/{id}/status", post(handlers::quotes::change_quote_status))
        .route("/quotes/{id}/invoice", post(handlers::quotes::convert_quote))
        .route("/quotes/{id}/pdf", get(handlers::documents::quote_pdf))
        .route("/invoices", get(handlers::invoices::list_invoices))
        .route("/invoices/{id}"
               ,get(handlers::invoices::get_invoice)
               .delete(handlers::invoices::delete_invoice)
        )
        .route("/invoices/{id}/payments", post(handlers::invoices::record_payment))
        .route("/invoices/{id}/pdf", get(handlers::documents::invoice_pdf))
        .route("/settings"
               ,get(handlers::settings::get_settings)
               .put(handlers::settings::update_settings)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Sem configuração válida a aplicação não deve iniciar
    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Pool preguiçoso: as rotas testadas aqui não chegam ao banco
    fn test_state() -> AppState {
        let config = AppConfig {
            database_url: "postgres://localhost/devis_test".into(),
            secret_key: "test-secret".into(),
            admin_username: "admin".into(),
            admin_password_hash: bcrypt::hash("secret", 4).unwrap(),
            bind_addr: "127.0.0.1:0".into(),
            fonts_dir: "./fonts".into(),
            font_family: "Roboto".into(),
            session_ttl_secs: 3600,
            cookie_secure: false,
            db_max_connections: 1,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState::with_pool(config, pool)
    }

    fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/login", json!({"username": "admin", "password": "secret"}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_a_session() {
        let app = build_router(test_state());
        for uri in ["/api/clients", "/api/quotes", "/api/auth/me", "/api/settings"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request("POST", "/api/auth/login", json!({"username": "admin", "password": "wrong"}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Identifiants incorrects. Veuillez réessayer.");
    }

    #[tokio::test]
    async fn login_sets_an_http_only_session_cookie() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request("POST", "/api/auth/login", json!({"username": "admin", "password": "secret"}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("HttpOnly"));

        let body = body_json(response).await;
        assert_eq!(body["expiresIn"], 3600);
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn token_and_cookie_both_open_the_api() {
        let app = build_router(test_state());
        let token = login(&app).await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/auth/me").header(header::AUTHORIZATION, format!("Bearer {}", token)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["username"], "admin");

        let response = app
            .oneshot(Request::builder().uri("/api/auth/me").header(header::COOKIE, format!("session={}", token)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_client_payload_lists_field_errors() {
        let app = build_router(test_state());
        let token = login(&app).await;

        let response = app
            .oneshot(json_request("POST", "/api/clients", json!({"name": "", "email": "pas-un-email"}), Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["details"]["name"][0], "Le nom est requis");
        assert_eq!(body["details"]["email"][0], "Email invalide");
    }

    #[tokio::test]
    async fn oversized_quote_lines_are_a_bad_request() {
        let app = build_router(test_state());
        let token = login(&app).await;
        let body = json!({
            "clientId": uuid::Uuid::new_v4(),
            "lines": [{ "quantity": 1e20, "unitPriceHt": 1e11, "vatPercent": 20 }]
        });

        let response = app
            .oneshot(json_request("POST", "/api/quotes", body, Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["details"]["lines[0].quantity"].is_array());
        assert!(body["details"]["lines[0].unit_price_ht"].is_array());
    }

    #[tokio::test]
    async fn payments_must_be_positive() {
        let app = build_router(test_state());
        let token = login(&app).await;
        let uri = format!("/api/invoices/{}/payments", uuid::Uuid::new_v4());

        for amount in [json!(0), json!(-5.0)] {
            let response = app
                .clone()
                .oneshot(json_request("POST", &uri, json!({"amount": amount}), Some(&token)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn english_clients_get_english_errors() {
        let app = build_router(test_state());
        let mut request = json_request("POST", "/api/auth/login", json!({"username": "admin", "password": "nope"}), None);
        request.headers_mut().insert(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_json(response).await["error"], "Invalid username or password.");
    }

    #[test]
    fn openapi_lists_the_api() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/quotes/{id}/invoice"));
        assert!(doc.paths.paths.contains_key("/api/invoices/{id}/payments"));
    }
}
