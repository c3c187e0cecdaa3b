use super::handlers::{health, pages, password_reset, root, session};
use utoipa::{
    openapi::{Contact, InfoBuilder, License},
    OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        root::root,
        root::login_page,
        session::login,
        session::register,
        session::logout,
        session::current,
        password_reset::send_code,
        password_reset::verify_code,
        pages::home,
        pages::budgets,
        pages::budget,
        pages::expenses,
        pages::expense,
    ),
    tags(
        (name = "session", description = "Cookie-backed browser session"),
        (name = "password-reset", description = "Forgot-password code relay"),
        (name = "pages", description = "Protected dashboard data"),
        (name = "health", description = "Build and liveness information"),
    )
)]
struct ApiDoc;

/// `OpenAPI` document for every route the server mounts.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info = cargo_info();
    doc
}

fn cargo_info() -> utoipa::openapi::Info {
    // Use Cargo.toml metadata instead of the utoipa crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact(env!("CARGO_PKG_AUTHORS"));
    info.license = optional_str(env!("CARGO_PKG_LICENSE")).map(|identifier| {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        license
    });
    info
}

fn cargo_contact(authors: &str) -> Option<Contact> {
    // Cargo authors are `:` separated in the env var and may include "Name <email>".
    let primary = authors.split([':', ';']).next().map(str::trim)?;
    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn optional_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, email)) => (
            optional_str(name),
            optional_str(email.trim_end_matches('>')),
        ),
        None => (optional_str(author), None),
    }
}
