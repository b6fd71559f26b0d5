//! Integration tests for the public endpoints

mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use ticketing_client::{ClientError, PaymentQr};
use ticketing_core::payment::upi_payment_uri;
use ticketing_core::{PaymentConfig, RegistrationType};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_registration_status_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/registration/status/jo%40x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "name": "Jo",
            "email": "jo@x.com",
            "status": "pending",
            "created_at": "2025-09-20T09:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = api_client(&server).registration_status("jo@x.com").await.unwrap();
    assert_eq!(status.id, 7);
    assert_eq!(status.status, "pending");
}

#[tokio::test]
async fn test_registration_status_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/registration/status/nobody%40x.com"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"detail": "No registration found for this email"})),
        )
        .mount(&server)
        .await;

    let err = api_client(&server)
        .registration_status("nobody@x.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
    assert_eq!(err.to_string(), "No registration found for this email");
}

#[tokio::test]
async fn test_payment_qr_prefers_static_asset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/payment-qr/bulk.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
        .mount(&server)
        .await;

    let qr = api_client(&server)
        .resolve_payment_qr(RegistrationType::Bulk, &PaymentConfig::default())
        .await;
    assert_eq!(qr, PaymentQr::Asset(format!("{}/payment-qr/bulk.png", server.uri())));
}

#[tokio::test]
async fn test_payment_qr_falls_back_to_upi_uri() {
    let server = MockServer::start().await;
    let payment = PaymentConfig::default();

    let qr = api_client(&server)
        .resolve_payment_qr(RegistrationType::Individual, &payment)
        .await;
    assert_eq!(
        qr,
        PaymentQr::Generated(upi_payment_uri(&payment, RegistrationType::Individual))
    );

    let qr = unreachable_client()
        .resolve_payment_qr(RegistrationType::Bulk, &payment)
        .await;
    assert!(matches!(qr, PaymentQr::Generated(uri) if uri.contains("am=2000.00")));
}
