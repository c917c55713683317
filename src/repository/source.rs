//! Transport for agency CSV exports.

use std::path::PathBuf;

use crate::repository::errors::{LoadError, LoadResult};

/// Location agency files are fetched from.
#[derive(Clone, Debug)]
pub enum CsvSource {
    /// Files on local disk, the same directory exposed as static assets.
    Directory(PathBuf),
    /// Files behind a static-file HTTP server.
    Http {
        client: reqwest::Client,
        base_url: String,
    },
}

impl CsvSource {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        CsvSource::Directory(path.into())
    }

    pub fn http(base_url: impl Into<String>) -> Self {
        CsvSource::Http {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Human readable location of `file`, used in logs and error messages.
    pub fn location(&self, file: &str) -> String {
        match self {
            CsvSource::Directory(dir) => dir.join(file).display().to_string(),
            CsvSource::Http { base_url, .. } => {
                format!("{}/{}", base_url.trim_end_matches('/'), file)
            }
        }
    }

    /// Fetches the raw bytes of one file; a single attempt, no retry.
    pub async fn fetch(&self, file: &str) -> LoadResult<Vec<u8>> {
        match self {
            CsvSource::Directory(dir) => Ok(tokio::fs::read(dir.join(file)).await?),
            CsvSource::Http { client, .. } => {
                let response = client
                    .get(self.location(file))
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// Rejects bodies that cannot be a CSV export.
///
/// Misconfigured static hosting answers missing files with an HTML page and
/// status 200, so an HTML prologue or a tiny body counts as a failure.
pub fn check_body(body: &[u8], min_bytes: usize, file: &str) -> LoadResult<()> {
    if body.len() < min_bytes {
        return Err(LoadError::Content(format!(
            "{file}: body has {} bytes, expected at least {min_bytes}",
            body.len()
        )));
    }

    let head = String::from_utf8_lossy(&body[..body.len().min(256)]);
    let head = head.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
    if head.starts_with("<!doctype") || head.starts_with("<html") {
        return Err(LoadError::Content(format!("{file}: received HTML instead of CSV")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &[u8] = b"SERIE,MODELO,ANIO\n3VW1K7AJ5FM000001,Jetta,2019\n";

    #[test]
    fn accepts_csv_body() {
        assert!(check_body(CSV, 20, "a.csv").is_ok());
    }

    #[test]
    fn rejects_html_body() {
        let body = b"  <!DOCTYPE html><html><body>Not found</body></html>";
        assert!(matches!(
            check_body(body, 10, "a.csv"),
            Err(LoadError::Content(_))
        ));
    }

    #[test]
    fn rejects_short_body() {
        assert!(matches!(
            check_body(b"SERIE\n", 50, "a.csv"),
            Err(LoadError::Content(_))
        ));
    }

    #[test]
    fn http_location_joins_base_url() {
        let source = CsvSource::http("http://assets.local/csv/");
        assert_eq!(source.location("a.csv"), "http://assets.local/csv/a.csv");
    }
}
