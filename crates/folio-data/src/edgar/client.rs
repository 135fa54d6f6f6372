//! SEC EDGAR client with rate limiting.

use crate::error::{DataError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// SEC EDGAR API base URL
const EDGAR_DATA_URL: &str = "https://data.sec.gov";

/// SEC EDGAR archives base URL
const EDGAR_ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// Default rate limit: 5 requests per second, well under the SEC's 10
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(200);

/// Pads a CIK to the 10 digits the SEC APIs expect.
///
/// # Errors
/// Returns `DataError::InvalidCik` unless `cik` is 1 to 10 ASCII digits.
pub fn pad_cik(cik: &str) -> Result<String> {
    let cik = cik.trim();
    if cik.is_empty() || cik.len() > 10 || !cik.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DataError::InvalidCik(cik.to_string()));
    }
    Ok(format!("{cik:0>10}"))
}

/// Archive folder URL of one filing, with a trailing slash.
///
/// The folder uses the unpadded CIK and the accession number without dashes.
pub fn archive_url(cik: &str, accession: &str) -> Result<String> {
    let padded = pad_cik(cik)?;
    let unpadded = padded.trim_start_matches('0');
    let accession: String = accession.chars().filter(|c| *c != '-').collect();
    Ok(format!("{EDGAR_ARCHIVES_URL}/{unpadded}/{accession}/"))
}

/// Checks that `name` is a plain file name inside an archive folder.
///
/// # Errors
/// Returns `DataError::InvalidFileName` for empty names, `.`/`..`, and
/// anything with a path separator.
pub fn archive_file_name(name: &str) -> Result<&str> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name() == Some(OsStr::new(name));
    if plain {
        Ok(name)
    } else {
        Err(DataError::InvalidFileName(name.to_string()))
    }
}

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// SEC EDGAR client with rate limiting
#[derive(Debug)]
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    data_url: String,
}

impl EdgarClient {
    /// Create a new client with the default rate limit.
    ///
    /// The SEC requires a User-Agent naming the requester, formatted as
    /// "Company Name contact@email.com".
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_rate_limit(user_agent, DEFAULT_RATE_LIMIT)
    }

    /// Create a new client with a custom minimum interval between requests.
    pub fn with_rate_limit(user_agent: &str, min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            data_url: EDGAR_DATA_URL.to_string(),
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;

        tracing::debug!(url, "GET");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }
        Ok(response)
    }

    /// Fetches the raw companyfacts JSON for a CIK.
    pub async fn fetch_company_facts_json(&self, cik: &str) -> Result<String> {
        let url = format!(
            "{}/api/xbrl/companyfacts/CIK{}.json",
            self.data_url,
            pad_cik(cik)?
        );
        Ok(self.get(&url).await?.text().await?)
    }

    /// Downloads one URL to `dest`, returning the number of bytes written.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<usize> {
        let bytes = self.get(url).await?.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(bytes.len())
    }

    /// Downloads `files` from an archive folder into `out_dir`.
    ///
    /// Every name must be a plain file name (see [`archive_file_name`]);
    /// otherwise nothing is downloaded. A file that fails to download is
    /// logged and skipped; the others are still fetched. Returns the paths
    /// that were written.
    pub async fn download_files(
        &self,
        base_url: &str,
        files: &[String],
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        for name in files {
            archive_file_name(name)?;
        }
        tokio::fs::create_dir_all(out_dir).await?;

        let mut written = Vec::with_capacity(files.len());
        for name in files {
            let url = format!("{}/{}", base_url.trim_end_matches('/'), name);
            let dest = out_dir.join(name);
            match self.download(&url, &dest).await {
                Ok(size) => {
                    tracing::info!(file = %name, bytes = size, "downloaded");
                    written.push(dest);
                }
                Err(e) => tracing::warn!(url = %url, error = %e, "download failed"),
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_cik() {
        assert_eq!(pad_cik("1801368").unwrap(), "0001801368");
        assert_eq!(pad_cik("0001801368").unwrap(), "0001801368");
        assert_eq!(pad_cik(" 320193 ").unwrap(), "0000320193");
    }

    #[test]
    fn test_pad_cik_invalid() {
        assert!(matches!(pad_cik(""), Err(DataError::InvalidCik(_))));
        assert!(matches!(pad_cik("AAPL"), Err(DataError::InvalidCik(_))));
        assert!(matches!(pad_cik("12345678901"), Err(DataError::InvalidCik(_))));
    }

    #[test]
    fn test_archive_url() {
        assert_eq!(
            archive_url("0001801368", "0001801368-25-000009").unwrap(),
            "https://www.sec.gov/Archives/edgar/data/1801368/000180136825000009/"
        );
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(archive_file_name("mp-20241231_pre.xml").unwrap(), "mp-20241231_pre.xml");
        for bad in ["", ".", "..", "../x", "/etc/passwd", "sub/file.xml", "..\\x"] {
            assert!(
                matches!(archive_file_name(bad), Err(DataError::InvalidFileName(_))),
                "{bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_download_files_rejects_escaping_names() {
        let client = EdgarClient::new("Folio Tests tests@example.com").unwrap();
        let out = std::env::temp_dir().join("folio-download-test-unused");
        let files = vec!["ok.xml".to_string(), "../escape.xml".to_string()];

        let result = client
            .download_files("http://127.0.0.1:9/archive/", &files, &out)
            .await;
        assert!(matches!(result, Err(DataError::InvalidFileName(name)) if name == "../escape.xml"));
        assert!(!out.exists());
    }

    #[test]
    fn test_client_creation() {
        let client = EdgarClient::new("Folio Tests tests@example.com");
        assert!(client.is_ok());
    }
}
