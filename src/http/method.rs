//! The fixed HTTP verb vocabulary understood by route discovery.

use std::fmt;

use axum::http::Method;

/// Verbs a route file can bind.
///
/// A file named `get.rs`, `post.rs`, ... inside the routes directory binds a
/// handler for the matching verb. The file stem must match the token
/// case-exactly; `GET.rs` or `Get.rs` are skipped by discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

/// All verbs, in the order they are documented and logged.
pub const VERBS: [Verb; 7] = [
    Verb::Get,
    Verb::Post,
    Verb::Put,
    Verb::Patch,
    Verb::Delete,
    Verb::Head,
    Verb::Options,
];

impl Verb {
    /// The lowercase token as it appears in route file stems and in the
    /// `Allow` header.
    pub fn token(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
            Verb::Head => "head",
            Verb::Options => "options",
        }
    }

    /// Uppercase name for route listings.
    pub fn as_upper(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
        }
    }

    /// Parses a route file stem. Case-sensitive by contract.
    pub fn from_stem(stem: &str) -> Option<Verb> {
        match stem {
            "get" => Some(Verb::Get),
            "post" => Some(Verb::Post),
            "put" => Some(Verb::Put),
            "patch" => Some(Verb::Patch),
            "delete" => Some(Verb::Delete),
            "head" => Some(Verb::Head),
            "options" => Some(Verb::Options),
            _ => None,
        }
    }

    /// Maps a wire method onto the verb vocabulary.
    ///
    /// Methods outside the vocabulary (e.g. `TRACE`) have no verb and can
    /// never be bound, so requests using them fall into the 405 path.
    pub fn from_method(method: &Method) -> Option<Verb> {
        match *method {
            Method::GET => Some(Verb::Get),
            Method::POST => Some(Verb::Post),
            Method::PUT => Some(Verb::Put),
            Method::PATCH => Some(Verb::Patch),
            Method::DELETE => Some(Verb::Delete),
            Method::HEAD => Some(Verb::Head),
            Method::OPTIONS => Some(Verb::Options),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
