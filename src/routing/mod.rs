//! Request routing module
//!
//! Classifies a request path into one of four decisions. Evaluation order,
//! first match wins:
//!
//! 1. `/auth/google/callback*` -> auth action `callback`
//! 2. `/auth/google*` -> auth action `google`
//! 3. `/auth/logout*` -> auth action `logout`
//! 4. recognized static extension -> file under the root, else under `public/`,
//!    else not found
//! 5. anything else -> passthrough to the application

pub mod matcher;

use std::path::{Path, PathBuf};

use crate::config::RootConfig;
use crate::error::{Error, Result};
use crate::http::mime;

/// Outcome of classifying one request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Forward to the application with `page` and `action` injected
    AuthAction {
        page: &'static str,
        action: &'static str,
    },
    /// Stream this file back verbatim
    StaticFile {
        absolute_path: PathBuf,
        content_type: &'static str,
    },
    /// Static asset requested but present at neither candidate location
    NotFound,
    /// Forward to the application unchanged
    Passthrough,
}

impl RouteDecision {
    /// Short label used in access logs
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AuthAction { .. } => "auth",
            Self::StaticFile { .. } => "static",
            Self::NotFound => "not_found",
            Self::Passthrough => "passthrough",
        }
    }
}

/// Path classifier bound to a server root
#[derive(Debug, Clone)]
pub struct Router {
    document_root: PathBuf,
    public_root: PathBuf,
}

impl Router {
    /// Create a router over `document_root`, falling back to
    /// `document_root/public_dir` for static assets
    pub fn new(document_root: impl Into<PathBuf>, public_dir: impl AsRef<Path>) -> Self {
        let document_root = document_root.into();
        let public_root = document_root.join(public_dir);
        Self {
            document_root,
            public_root,
        }
    }

    /// Build from configuration, resolving the root to an absolute path
    pub fn from_config(root: &RootConfig) -> Result<Self> {
        let document_root =
            Path::new(&root.document_root)
                .canonicalize()
                .map_err(|source| Error::DocumentRoot {
                    path: root.document_root.clone(),
                    source,
                })?;
        Ok(Self::new(document_root, &root.public_dir))
    }

    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    /// Classify a request path
    pub fn classify(&self, path: &str) -> RouteDecision {
        if let Some(action) = matcher::match_auth_route(path) {
            return RouteDecision::AuthAction {
                page: matcher::AUTH_PAGE,
                action,
            };
        }

        if matcher::is_malformed(path) {
            return RouteDecision::Passthrough;
        }

        match matcher::static_extension(path) {
            Some(ext) => self.resolve_static(path, ext),
            None => RouteDecision::Passthrough,
        }
    }

    /// Root candidate first, `public/` candidate only if the root one is absent
    fn resolve_static(&self, path: &str, ext: &str) -> RouteDecision {
        let relative = path.trim_start_matches('/');
        [&self.document_root, &self.public_root]
            .into_iter()
            .map(|base| base.join(relative))
            .find(|candidate| candidate.is_file())
            .map_or(RouteDecision::NotFound, |absolute_path| {
                RouteDecision::StaticFile {
                    absolute_path,
                    content_type: mime::get_content_type(Some(ext)),
                }
            })
    }
}
