use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::CreateMessage;
use crate::repositories::MessageRepository;
use crate::state::AppState;

use super::pages::{escape_html, layout};

/// Raw contact form submission, before validation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactSubmission {
    /// Checks the submission, returning insertable data or the list of
    /// problems to show the visitor.
    fn validate(&self) -> Result<CreateMessage, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("Please enter your name.".to_string());
        }
        let email = self.email.trim();
        if !is_plausible_email(email) {
            errors.push("Enter a valid email address.".to_string());
        }
        let message = self.message.trim();
        if message.is_empty() {
            errors.push("Please write a message.".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let subject = self.subject.trim();
        Ok(CreateMessage {
            name: name.to_string(),
            email: email.to_string(),
            subject: (!subject.is_empty()).then(|| subject.to_string()),
            message: message.to_string(),
        })
    }
}

/// Good enough for a contact form: something before and after an `@`, a dot
/// somewhere in the domain part, no whitespace.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactPageQuery {
    /// Present after the post-submission redirect
    pub sent: Option<String>,
}

/// GET /contact
pub async fn contact_page(Query(query): Query<ContactPageQuery>) -> Html<String> {
    Html(render_contact_page(
        &ContactSubmission::default(),
        &[],
        query.sent.is_some(),
    ))
}

/// POST /contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Form(submission): Form<ContactSubmission>,
) -> AppResult<Response> {
    match submission.validate() {
        Ok(data) => {
            MessageRepository::create(&state.db, data).await?;
            Ok(Redirect::to("/contact?sent=1").into_response())
        }
        Err(errors) => Ok(Html(render_contact_page(&submission, &errors, false)).into_response()),
    }
}

fn render_contact_page(prefill: &ContactSubmission, errors: &[String], sent: bool) -> String {
    let mut body = String::from("<h1>Contact</h1>\n");
    if sent {
        body.push_str("<p class=\"success\">Thanks! Your message has been sent.</p>\n");
    }
    if !errors.is_empty() {
        body.push_str("<ul class=\"errors\">\n");
        for error in errors {
            body.push_str(&format!("<li>{}</li>\n", escape_html(error)));
        }
        body.push_str("</ul>\n");
    }
    body.push_str(&format!(
        r#"<form action="/contact" method="post">
  <label>Name <input type="text" name="name" value="{name}"></label><br>
  <label>Email <input type="text" name="email" value="{email}"></label><br>
  <label>Subject <input type="text" name="subject" value="{subject}"></label><br>
  <label>Message <textarea name="message" rows="6" cols="50">{message}</textarea></label><br>
  <button type="submit">Send</button>
</form>
"#,
        name = escape_html(&prefill.name),
        email = escape_html(&prefill.email),
        subject = escape_html(&prefill.subject),
        message = escape_html(&prefill.message),
    ));
    layout("Contact", &body)
}
