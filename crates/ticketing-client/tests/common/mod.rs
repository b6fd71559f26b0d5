//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use serde_json::{Value, json};
use ticketing_client::{ApiClient, HttpSubmitter, Session, Wizard};
use ticketing_core::validation::Field;
use ticketing_core::{ApiConfig, PaymentScreenshot, RegistrationType, UploadPolicy};
use wiremock::MockServer;

/// Smallest PNG signature the sniffer accepts
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// API client pointed at a mock backend
pub fn api_client(server: &MockServer) -> ApiClient {
    let config = ApiConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
    };
    ApiClient::new(config).expect("client builds")
}

/// API client pointed at a port nothing listens on
pub fn unreachable_client() -> ApiClient {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        request_timeout_secs: 2,
        connect_timeout_secs: 1,
    };
    ApiClient::new(config).expect("client builds")
}

/// A valid payment screenshot
pub fn png_screenshot() -> PaymentScreenshot {
    PaymentScreenshot::new("payment.png", "image/png", PNG_BYTES.to_vec())
}

/// Wizard that has passed both gates and sits on the review step
pub fn wizard_at_review(
    client: ApiClient,
    registration_type: RegistrationType,
) -> Wizard<HttpSubmitter> {
    let wizard = Wizard::new(HttpSubmitter::new(client), UploadPolicy::default());
    wizard.select_type(registration_type).expect("type");
    wizard.set_field(Field::Name, "Jo").expect("name");
    wizard.set_field(Field::Email, "jo@x.com").expect("email");
    wizard.set_field(Field::Phone, "9876543210").expect("phone");
    if registration_type == RegistrationType::Bulk {
        wizard.set_field(Field::TeamName, "Tech Wizards").expect("team name");
        wizard
            .set_field(Field::TeamMembers, "Ann, Ben, Cat, Dan")
            .expect("members");
    }
    wizard.advance().expect("details gate");
    wizard.attach_screenshot(png_screenshot()).expect("screenshot");
    wizard.advance().expect("payment gate");
    wizard
}

/// Names of the multipart parts in a request body, in order
pub fn multipart_part_names(body: &[u8]) -> Vec<String> {
    let body = String::from_utf8_lossy(body);
    body.match_indices("name=\"")
        .filter(|(idx, _)| !body[..*idx].ends_with("file"))
        .filter_map(|(idx, marker)| {
            let start = idx + marker.len();
            body[start..].find('"').map(|end| body[start..start + end].to_string())
        })
        .collect()
}

/// Backend acknowledgement body
pub fn acknowledgement() -> Value {
    json!({
        "id": 42,
        "name": "Jo",
        "email": "jo@x.com",
        "status": "pending",
        "message": "Registration successful! Please wait for admin approval."
    })
}

/// Backend login body
pub fn login_body(token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "user": {"id": 1, "name": "Ana", "email": "ana@x.com", "role": "superadmin"}
    })
}

/// Backend registration list body
pub fn registration_list() -> Value {
    json!({
        "total": 3,
        "pending": 1,
        "approved": 1,
        "rejected": 1,
        "registrations": [{
            "id": 7,
            "name": "Jo",
            "email": "jo@x.com",
            "phone": "9876543210",
            "team_name": null,
            "members": null,
            "status": "approved",
            "created_at": "2025-09-20T09:00:00"
        }]
    })
}

/// Session restored from a token
pub fn session(token: &str) -> Session {
    Session::from_token(token)
}
