//! SEC EDGAR retrieval.
//!
//! A thin, rate-limited wrapper for pulling the documents an extraction
//! needs: the linkbase/schema/instance files of one filing from the EDGAR
//! archives, and the company facts JSON for a CIK.
//!
//! # Example
//!
//! ```no_run
//! use folio_data::edgar::{EdgarClient, archive_url};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdgarClient::new("Jane Analyst jane@example.com")?;
//!     let json = client.fetch_company_facts_json("1801368").await?;
//!     println!("{} bytes of company facts", json.len());
//!
//!     let base = archive_url("1801368", "0001801368-25-000009")?;
//!     let files = vec!["mp-20241231_pre.xml".to_string(), "mp-20241231_lab.xml".to_string()];
//!     client.download_files(&base, &files, Path::new("mp_2024_10k_xbrl")).await?;
//!     Ok(())
//! }
//! ```

pub mod client;

pub use client::{EdgarClient, archive_file_name, archive_url, pad_cik};
