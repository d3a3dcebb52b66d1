use crate::error::UpdateError;
use fs_err as fs;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

pub const BLOCK_SIZE: usize = 8 * 1024;

/// Receives `(blocks so far, block size, total bytes)` during one download.
/// `total` is 0 when the server did not send a length.
pub trait ProgressReporter {
    fn report(&mut self, blocks: u64, block_size: u64, total: u64);
    fn finish(&mut self) {}
}

/// Progress bar state for a single download. Created by the caller and
/// handed to [`fetch`] by reference; nothing outlives the call.
pub struct DownloadProgress {
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl DownloadProgress {
    pub fn new() -> Self {
        Self {
            bar: None,
            hidden: false,
        }
    }

    pub fn hidden() -> Self {
        Self {
            bar: None,
            hidden: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.bar.is_some()
    }

    fn start(&self, total: u64) -> ProgressBar {
        let pb = if total > 0 {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner} {bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        };
        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb
    }
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for DownloadProgress {
    fn report(&mut self, blocks: u64, block_size: u64, total: u64) {
        let bar = match &self.bar {
            Some(b) => b.clone(),
            None => {
                let b = self.start(total);
                self.bar = Some(b.clone());
                b
            }
        };
        let downloaded = blocks.saturating_mul(block_size);
        if total == 0 || downloaded < total {
            bar.set_position(downloaded);
        } else {
            bar.finish();
            self.bar = None;
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

pub fn http_client(timeout_secs: Option<u64>) -> Result<Client, UpdateError> {
    Client::builder()
        .user_agent(concat!("kavita-updater/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout_secs.map(Duration::from_secs))
        .build()
        .map_err(|e| UpdateError::download("<client>", e))
}

/// Streams `url` into `dest`, returning the number of bytes written.
/// A partially written file is left behind on failure.
pub fn fetch(
    client: &Client,
    url: &str,
    dest: &Path,
    reporter: &mut dyn ProgressReporter,
) -> Result<u64, UpdateError> {
    tracing::info!(%url, dest = %dest.display(), "downloading");
    let mut resp = client
        .get(url)
        .send()
        .map_err(|e| UpdateError::download(url, e))?;
    if !resp.status().is_success() {
        return Err(UpdateError::download(url, format!("server returned {}", resp.status())));
    }
    let total = resp.content_length().unwrap_or(0);
    let mut out = fs::File::create(dest).map_err(|e| UpdateError::download(url, e))?;

    let mut buf = vec![0u8; BLOCK_SIZE];
    let mut blocks: u64 = 0;
    let mut written: u64 = 0;
    reporter.report(blocks, BLOCK_SIZE as u64, total);
    loop {
        let n = read_block(&mut resp, &mut buf).map_err(|e| UpdateError::download(url, e))?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])
            .map_err(|e| UpdateError::download(url, e))?;
        written += n as u64;
        blocks += 1;
        reporter.report(blocks, BLOCK_SIZE as u64, total);
    }
    out.flush().map_err(|e| UpdateError::download(url, e))?;
    reporter.finish();

    if total > 0 && written < total {
        return Err(UpdateError::download(
            url,
            format!("connection closed after {written} of {total} bytes"),
        ));
    }
    tracing::debug!(bytes = written, "download complete");
    Ok(written)
}

// Fills `buf` unless the stream ends first, so `blocks * BLOCK_SIZE` only
// reaches the total on the final block.
fn read_block(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
