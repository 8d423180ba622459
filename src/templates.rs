//! Email templates.
//!
//! A fixed table looked up by id, rendered with Handlebars:
//! `{{key}}` is HTML-escaped, `{{{key}}}` is inserted as is, block helpers
//! such as `{{#if key}}` work, and keys missing from the data render as
//! nothing.

use std::sync::LazyLock;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::ApiError;

/// A template as stored in the table.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub template_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<&'static str>,
    pub html: &'static str,
    pub text: &'static str,
}

/// A template with its placeholders filled.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplateData {
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub html: String,
    pub text: String,
}

pub static EMAIL_TEMPLATES: &[EmailTemplate] = &[
    EmailTemplate {
        template_id: "welcome",
        subject: Some("Welcome aboard"),
        html: "<p>Hi {{name}},</p><p>Your account is ready. Sign in at <a href=\"{{{loginUrl}}}\">{{loginUrl}}</a>.</p>",
        text: "Hi {{name}},\n\nYour account is ready. Sign in at {{{loginUrl}}}.",
    },
    EmailTemplate {
        template_id: "password-reset",
        subject: Some("Reset your password"),
        html: "<p>Hi {{name}},</p><p>Use code <strong>{{code}}</strong> to reset your password.{{#if minutes}} It expires in {{minutes}} minutes.{{/if}}</p>",
        text: "Hi {{name}},\n\nUse code {{code}} to reset your password.{{#if minutes}} It expires in {{minutes}} minutes.{{/if}}",
    },
];

// Every table entry compiled once, as `<id>.html` and `<id>.text`.
static REGISTRY: LazyLock<Handlebars<'static>> = LazyLock::new(|| {
    let mut registry = Handlebars::new();
    for template in EMAIL_TEMPLATES {
        registry
            .register_template_string(&format!("{}.html", template.template_id), template.html)
            .expect("valid html template");
        registry
            .register_template_string(&format!("{}.text", template.template_id), template.text)
            .expect("valid text template");
    }
    registry
});

pub fn get_email_template(template_id: &str) -> Option<&'static EmailTemplate> {
    EMAIL_TEMPLATES.iter().find(|t| t.template_id == template_id)
}

/// Looks up `template_id` and renders its html and text with `data`.
///
/// `Ok(None)` for an unknown id. A render failure is an internal error.
pub fn get_email_template_data<T: Serialize>(
    template_id: &str,
    data: &T,
) -> Result<Option<EmailTemplateData>, ApiError> {
    let Some(template) = get_email_template(template_id) else {
        return Ok(None);
    };
    let render = |part: &str| {
        REGISTRY
            .render(&format!("{template_id}.{part}"), data)
            .map_err(|e| ApiError::Internal(format!("rendering template '{template_id}': {e}")))
    };
    Ok(Some(EmailTemplateData {
        template_id: template.template_id.to_owned(),
        subject: template.subject.map(ToOwned::to_owned),
        html: render("html")?,
        text: render("text")?,
    }))
}
