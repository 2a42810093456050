//! Path matching rules
//!
//! Pure string predicates over the request path; no filesystem access.

use crate::http::mime;

/// Page parameter injected for every auth action
pub const AUTH_PAGE: &str = "auth";

/// Auth routes in evaluation order. The callback prefix must precede the
/// plain google prefix since it is a longer form of it.
const AUTH_ROUTES: [(&str, &str); 3] = [
    ("/auth/google/callback", "callback"),
    ("/auth/google", "google"),
    ("/auth/logout", "logout"),
];

/// Match an auth action route by path prefix, returning the action name
pub fn match_auth_route(path: &str) -> Option<&'static str> {
    AUTH_ROUTES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, action)| *action)
}

/// Extension of the last path segment if it is a recognized static asset type
pub fn static_extension(path: &str) -> Option<&str> {
    let (_, ext) = path.rsplit_once('.')?;
    mime::is_static_extension(ext).then_some(ext)
}

/// A path that cannot name a file below the server root.
///
/// Covers parent-directory segments, NUL bytes and backslashes. Such paths are
/// left for the application to validate.
pub fn is_malformed(path: &str) -> bool {
    !path.starts_with('/')
        || path.contains('\0')
        || path.contains('\\')
        || path.split('/').any(|segment| segment == "..")
}
