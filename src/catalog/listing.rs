//! Directory listing sources for the model catalog
//!
//! The catalog only needs file names (and an optional download URL), so the
//! remote GitHub contents API and a local folder are interchangeable behind
//! [`ListingSource`].

use std::path::PathBuf;

use serde::Deserialize;

use super::{CatalogError, ModelFormat};
use crate::config::CatalogSource;

/// Kind of a listing row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    File,
    Dir,
    Other,
}

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub name: String,
    pub kind: ListingKind,
    pub download_url: Option<String>,
}

impl ListingEntry {
    pub fn file(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ListingKind::File,
            download_url: None,
        }
    }

    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ListingKind::Dir,
            download_url: None,
        }
    }
}

/// Anything that can list the model folder
pub trait ListingSource {
    fn list(&self) -> Result<Vec<ListingEntry>, CatalogError>;

    /// Short description for status messages and logs
    fn describe(&self) -> String;

    /// Model formats this source can serve
    fn formats(&self) -> &'static [ModelFormat] {
        &[ModelFormat::Glb]
    }
}

/// Row of the GitHub "repository contents" response
#[derive(Debug, Deserialize)]
struct GitHubContent {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    download_url: Option<String>,
}

impl From<GitHubContent> for ListingEntry {
    fn from(content: GitHubContent) -> Self {
        let kind = match content.kind.as_str() {
            "file" => ListingKind::File,
            "dir" => ListingKind::Dir,
            _ => ListingKind::Other,
        };
        Self {
            name: content.name,
            kind,
            download_url: content.download_url,
        }
    }
}

/// Parses a GitHub contents API response body
pub fn parse_github_listing(body: &str) -> Result<Vec<ListingEntry>, CatalogError> {
    let contents: Vec<GitHubContent> =
        serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;
    Ok(contents.into_iter().map(ListingEntry::from).collect())
}

/// Lists the model folder of a GitHub repository through the contents API
pub struct GitHubListing {
    source: CatalogSource,
}

impl GitHubListing {
    pub fn new(source: CatalogSource) -> Self {
        Self { source }
    }

    pub fn url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.source.api_base.trim_end_matches('/'),
            self.source.user,
            self.source.repo,
            self.source.folder,
            self.source.branch
        )
    }
}

impl ListingSource for GitHubListing {
    fn list(&self) -> Result<Vec<ListingEntry>, CatalogError> {
        let url = self.url();
        log::info!("Fetching model listing from {}", url);

        let response = ureq::get(&url)
            .set("Accept", "application/vnd.github.v3+json")
            .set("User-Agent", concat!("room-arranger/", env!("CARGO_PKG_VERSION")))
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => CatalogError::Status(code),
                ureq::Error::Transport(transport) => CatalogError::Transport {
                    url: url.clone(),
                    message: transport.to_string(),
                },
            })?;

        let body = response
            .into_string()
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        let entries = parse_github_listing(&body)?;
        log::debug!("GitHub listing returned {} rows", entries.len());
        Ok(entries)
    }

    fn describe(&self) -> String {
        format!(
            "github.com/{}/{} ({}/{})",
            self.source.user, self.source.repo, self.source.branch, self.source.folder
        )
    }
}

/// Lists model files in a local folder
pub struct LocalListing {
    root: PathBuf,
}

impl LocalListing {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ListingSource for LocalListing {
    fn list(&self) -> Result<Vec<ListingEntry>, CatalogError> {
        let io_error = |source| CatalogError::Io {
            path: self.root.display().to_string(),
            source,
        };

        let mut entries = Vec::new();
        for dir_entry in std::fs::read_dir(&self.root).map_err(io_error)? {
            let dir_entry = dir_entry.map_err(io_error)?;
            let file_type = dir_entry.file_type().map_err(io_error)?;
            let kind = if file_type.is_file() {
                ListingKind::File
            } else if file_type.is_dir() {
                ListingKind::Dir
            } else {
                ListingKind::Other
            };
            entries.push(ListingEntry {
                name: dir_entry.file_name().to_string_lossy().into_owned(),
                kind,
                download_url: None,
            });
        }

        Ok(entries)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    /// OBJ material libraries can only be resolved next to a local file
    fn formats(&self) -> &'static [ModelFormat] {
        &[ModelFormat::Glb, ModelFormat::Obj]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_listing() {
        let body = r#"[
            {"name": "sofa.glb", "type": "file", "download_url": "https://example.com/sofa.glb", "size": 10},
            {"name": "textures", "type": "dir", "download_url": null},
            {"name": "link", "type": "symlink"}
        ]"#;

        let entries = parse_github_listing(body).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, ListingKind::File);
        assert_eq!(
            entries[0].download_url.as_deref(),
            Some("https://example.com/sofa.glb")
        );
        assert_eq!(entries[1].kind, ListingKind::Dir);
        assert_eq!(entries[2].kind, ListingKind::Other);
    }

    #[test]
    fn test_parse_rejects_error_object() {
        let body = r#"{"message": "Not Found"}"#;
        assert!(matches!(
            parse_github_listing(body),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_github_url() {
        let listing = GitHubListing::new(CatalogSource::default());
        assert_eq!(
            listing.url(),
            "https://api.github.com/repos/Tossengames/3DRoom/contents/models?ref=main"
        );
    }

    #[test]
    fn test_local_listing_missing_folder() {
        let listing = LocalListing::new("/definitely/not/a/model/folder");
        assert!(matches!(listing.list(), Err(CatalogError::Io { .. })));
    }
}
