//! `folio fetch`: download filing documents and company facts from EDGAR.

use crate::FetchArgs;
use folio_data::edgar::{EdgarClient, archive_file_name, archive_url, pad_cik};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub(crate) async fn run(args: &FetchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cik = pad_cik(&args.cik)?;
    for name in &args.files {
        archive_file_name(name)?;
    }
    let client = EdgarClient::new(&args.user_agent)?;
    tokio::fs::create_dir_all(&args.out).await?;

    let spinner = spinner(format!("Fetching company facts for CIK {cik}..."));
    let json = client.fetch_company_facts_json(&cik).await;
    let json = match json {
        Ok(json) => {
            spinner.finish_with_message(format!("Fetched company facts for CIK {cik}"));
            json
        }
        Err(e) => {
            spinner.finish_with_message("Failed!");
            return Err(e.into());
        }
    };
    let facts_path = args.out.join(format!("CIK{cik}.json"));
    tokio::fs::write(&facts_path, json).await?;
    println!("Saved {}", facts_path.display());

    let base_url = match (&args.archive_url, &args.accession) {
        (Some(url), _) => Some(url.clone()),
        (None, Some(accession)) => Some(archive_url(&cik, accession)?),
        (None, None) => None,
    };

    match base_url {
        Some(base_url) if !args.files.is_empty() => {
            let spinner = self::spinner(format!("Downloading {} files from {base_url}", args.files.len()));
            let written = client.download_files(&base_url, &args.files, &args.out).await?;
            spinner.finish_with_message(format!("Downloaded {}/{} files", written.len(), args.files.len()));
            for path in &written {
                println!("Saved {}", path.display());
            }
            if written.len() < args.files.len() {
                tracing::warn!(
                    missing = args.files.len() - written.len(),
                    "some filing documents could not be downloaded"
                );
            }
        }
        Some(_) => tracing::warn!("archive given without --file; nothing to download from it"),
        None if !args.files.is_empty() => {
            return Err("--file requires --archive-url or --accession".into());
        }
        None => {}
    }

    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}
