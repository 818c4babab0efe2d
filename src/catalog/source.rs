use std::future::Future;
use std::path::PathBuf;

use crate::catalog::store::CatalogError;

/// The sample catalog compiled into the binary (validated by build.rs)
pub const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/sample_catalog.json");

/// Anything that can produce the raw catalog document
///
/// The store calls `fetch` at most once per successful load.
pub trait CatalogFetch {
    fn fetch(&self) -> impl Future<Output = Result<String, CatalogError>> + Send;

    /// Where the document comes from, for log messages
    fn describe(&self) -> String;
}

/// Configured location of the catalog document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The sample catalog compiled into the binary
    Embedded,
    /// A local JSON file
    File(PathBuf),
    /// An `http://` or `https://` URL
    Url(String),
}

impl CatalogSource {
    /// Interpret a command-line value: URLs by scheme, anything else as a path
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    /// Embedded catalog unless a location was given
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        arg.map_or(Self::Embedded, Self::parse)
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded sample catalog"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

impl CatalogFetch for CatalogSource {
    fn fetch(&self) -> impl Future<Output = Result<String, CatalogError>> + Send {
        let source = self.clone();
        async move {
            match source {
                CatalogSource::Embedded => Ok(EMBEDDED_CATALOG.to_string()),
                CatalogSource::File(path) => Ok(tokio::fs::read_to_string(&path).await?),
                CatalogSource::Url(url) => fetch_url(&url).await,
            }
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

async fn fetch_url(url: &str) -> Result<String, CatalogError> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Load {
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            CatalogSource::parse("https://example.org/catalog.json"),
            CatalogSource::Url("https://example.org/catalog.json".to_string())
        );
        assert_eq!(
            CatalogSource::parse("HTTP://example.org/c.json"),
            CatalogSource::Url("HTTP://example.org/c.json".to_string())
        );
        assert_eq!(
            CatalogSource::parse("data/catalog.json"),
            CatalogSource::File(PathBuf::from("data/catalog.json"))
        );
        assert_eq!(CatalogSource::from_arg(None), CatalogSource::Embedded);
    }

    #[tokio::test]
    async fn test_fetch_embedded() {
        let text = CatalogSource::Embedded.fetch().await.unwrap();
        assert!(text.contains("\"datasets\""));
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_read_error() {
        let source = CatalogSource::File(PathBuf::from("/nonexistent/catalog.json"));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, CatalogError::Read(_)));
    }
}
