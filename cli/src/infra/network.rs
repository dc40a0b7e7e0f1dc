//! Network infrastructure: implements `Downloader` with `ureq`.
//!
//! Downloads stream into a temp file next to the destination and are renamed
//! into place only once complete, so an interrupted download never leaves a
//! truncated installer at the final path.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::Downloader;

/// Upper bound on a single download.
const MAX_DOWNLOAD_BYTES: u64 = 1024 * 1024 * 1024;

/// Production downloader backed by a blocking `ureq` agent.
pub struct UreqDownloader;

impl Downloader for UreqDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let url = url.to_string();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || download_blocking(&url, &dest))
            .await
            .context("download task panicked")?
    }
}

fn download_blocking(url: &str, dest: &Path) -> Result<u64> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("creating directory {}", parent.display()))?;

    let response = ureq::get(url)
        .call()
        .with_context(|| format!("requesting {url}"))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temp file in {}", parent.display()))?;
    let bytes = copy_bounded(response.into_reader(), tmp.as_file_mut(), MAX_DOWNLOAD_BYTES)
        .with_context(|| format!("reading {url}"))?;
    tmp.as_file_mut().flush().context("flushing download")?;

    if dest.exists() {
        std::fs::remove_file(dest)
            .with_context(|| format!("replacing existing {}", dest.display()))?;
    }
    tmp.persist(dest)
        .map_err(|e| anyhow::anyhow!("saving {}: {}", dest.display(), e.error))?;
    tracing::debug!(url, dest = %dest.display(), bytes, "download complete");
    Ok(bytes)
}

/// Copy `reader` into `writer`, failing once more than `limit` bytes arrive.
fn copy_bounded(reader: impl Read, writer: &mut impl Write, limit: u64) -> Result<u64> {
    let mut bounded = reader.take(limit.saturating_add(1));
    let bytes = std::io::copy(&mut bounded, writer)?;
    if bytes > limit {
        anyhow::bail!("download exceeds {limit} bytes");
    }
    Ok(bytes)
}
