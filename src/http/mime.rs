//! MIME type detection module
//!
//! Fixed extension table for the static assets the router serves.

/// Extensions the router treats as static assets.
///
/// Matching is case-sensitive: `logo.PNG` is not a static asset.
pub const STATIC_EXTENSIONS: [&str; 12] = [
    "css", "js", "png", "jpg", "jpeg", "gif", "ico", "svg", "woff", "woff2", "ttf", "eot",
];

/// Whether `extension` is one of [`STATIC_EXTENSIONS`]
pub fn is_static_extension(extension: &str) -> bool {
    STATIC_EXTENSIONS.contains(&extension)
}

/// Get MIME Content-Type based on file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("css") => "text/css",
        Some("js") => "application/javascript",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("svg") => "image/svg+xml",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("eot") => "application/vnd.ms-fontobject",

        _ => "application/octet-stream",
    }
}
