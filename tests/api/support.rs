use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use wiremock::{
    matchers::{header_exists, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::{message_of, TestApp, MAIL_DOMAIN};

fn valid_body() -> serde_json::Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "subject": "bug",
        "message": "Something broke.",
    })
}

/// Parses the form-encoded message and hands the fields to a closure.
struct FormFieldsMatcher<F>(F);

impl<F> wiremock::Match for FormFieldsMatcher<F>
where
    F: Fn(&[(String, String)]) -> bool + Send + Sync,
{
    fn matches(&self, request: &wiremock::Request) -> bool {
        let Ok(body) = std::str::from_utf8(&request.body) else {
            return false;
        };
        match serde_urlencoded::from_str::<Vec<(String, String)>>(body) {
            Ok(fields) => (self.0)(&fields),
            Err(_) => false,
        }
    }
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn api_support_ok() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("POST"))
        .and(path(format!("/v3/{MAIL_DOMAIN}/messages")))
        .and(header_exists("Authorization"))
        .and(FormFieldsMatcher(|fields: &[(String, String)]| {
            field(fields, "h:Reply-To") == Some("jane@example.com")
                && field(fields, "subject") == Some("[Support] Bug Report: from Jane Doe")
                && field(fields, "to") == Some("support@example.com")
        }))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.mail_server)
        .await;

    let res = app.post_support(&valid_body()).await?;

    assert_eq!(StatusCode::OK, res.status());
    assert_eq!("Message sent successfully", message_of(res).await?);

    Ok(())
}

#[tokio::test]
async fn api_support_escapes_html_but_not_text() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("POST"))
        .and(FormFieldsMatcher(|fields: &[(String, String)]| {
            let html = field(fields, "html").unwrap_or_default();
            let text = field(fields, "text").unwrap_or_default();
            html.contains("&lt;script&gt;")
                && !html.contains("<script>")
                && text.contains("<script>")
        }))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.mail_server)
        .await;

    let mut body = valid_body();
    body["message"] = json!("hello <script>alert(1)</script>");
    let res = app.post_support(&body).await?;

    assert_eq!(StatusCode::OK, res.status());

    Ok(())
}

#[tokio::test]
async fn api_support_unknown_subject_passes_through() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("POST"))
        .and(FormFieldsMatcher(|fields: &[(String, String)]| {
            field(fields, "subject") == Some("[Support] partnership: from Jane Doe")
        }))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.mail_server)
        .await;

    let mut body = valid_body();
    body["subject"] = json!("partnership");
    let res = app.post_support(&body).await?;

    assert_eq!(StatusCode::OK, res.status());

    Ok(())
}

#[tokio::test]
async fn api_support_missing_fields_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    for missing in ["name", "email", "subject", "message"] {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove(missing);

        let res = app.post_support(&body).await?;
        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "Missing {missing} should have been rejected"
        );
        assert_eq!("All fields are required", message_of(res).await?);
    }

    Ok(())
}

#[tokio::test]
async fn api_support_invalid_email_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    for email in ["a@b", "noat.com", ""] {
        let mut body = valid_body();
        body["email"] = json!(email);

        let res = app.post_support(&body).await?;
        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "Email {email:?} should have been rejected"
        );
    }

    Ok(())
}

#[tokio::test]
async fn api_support_provider_failure_is_500() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.mail_server)
        .await;

    let res = app.post_support(&valid_body()).await?;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    assert_eq!("Failed to send email", message_of(res).await?);

    Ok(())
}

#[tokio::test]
async fn api_support_unconfigured_provider_is_500() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.mail_config = None).await?;

    let res = app.post_support(&valid_body()).await?;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    assert_eq!("Email service not configured", message_of(res).await?);

    Ok(())
}
