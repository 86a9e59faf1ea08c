//! The support contact form: validate, render a plain-text and an
//! HTML-escaped body, dispatch through the mail provider.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    clients::mail,
    utils::escape_html,
    web::{
        data::{DeserSupportReq, ValidSupportReq},
        WebResult,
    },
    AppState,
};

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SupportError {
    #[error("mail credentials are not configured")]
    NotConfigured,
    #[error("mail client error: {0}")]
    Mail(#[from] mail::Error),
}

// ###################################
// ->   DATA
// ###################################
#[derive(Debug, Serialize)]
pub struct SupportResponse {
    message: &'static str,
}

// ###################################
// ->   HANDLER
// ###################################
#[tracing::instrument(name = "Handling support request", skip(app_state, support_req))]
pub async fn support(
    State(app_state): State<AppState>,
    Json(support_req): Json<DeserSupportReq>,
) -> WebResult<Json<SupportResponse>> {
    let support_req: ValidSupportReq = support_req.try_into()?;

    let client = app_state
        .mail_client
        .as_ref()
        .ok_or(SupportError::NotConfigured)?;

    let label = subject_label(&support_req.subject);
    let subject_line = format!("[Support] {label}: from {}", support_req.name);
    let text_body = text_body(&support_req, label);
    let html_body = html_body(&support_req, label);

    client
        .send_support_email(&support_req.email, &subject_line, &text_body, &html_body)
        .await
        .map_err(SupportError::Mail)?;

    Ok(Json(SupportResponse {
        message: "Message sent successfully",
    }))
}

// ###################################
// ->   HELPERS
// ###################################

/// Maps a form subject code to a human label. Unknown codes pass through
/// verbatim so the mail still says what the user picked.
fn subject_label(code: &str) -> &str {
    match code {
        "general" => "General Question",
        "bug" => "Bug Report",
        "feature" => "Feature Request",
        "enterprise" => "Enterprise Inquiry",
        "billing" => "Billing Question",
        "other" => "Other",
        unknown => unknown,
    }
}

fn text_body(req: &ValidSupportReq, label: &str) -> String {
    format!(
        "Name: {}\nEmail: {}\nSubject: {}\n\nMessage:\n{}",
        req.name,
        req.email.as_ref(),
        label,
        req.message
    )
}

/// User-controlled fields are escaped before interpolation, message newlines
/// become `<br>`.
fn html_body(req: &ValidSupportReq, label: &str) -> String {
    let name = escape_html(&req.name);
    let email = escape_html(req.email.as_ref());
    let subject = escape_html(label);
    let message = escape_html(&req.message).replace('\n', "<br>");

    format!(
        "<h2>New Support Request</h2>\n\
         <p><strong>Name:</strong> {name}</p>\n\
         <p><strong>Email:</strong> <a href=\"mailto:{email}\">{email}</a></p>\n\
         <p><strong>Subject:</strong> {subject}</p>\n\
         <hr>\n\
         <h3>Message:</h3>\n\
         <p>{message}</p>"
    )
}
