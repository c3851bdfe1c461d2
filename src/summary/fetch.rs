//! Attachment download and PDF text extraction.

use std::io::Read;
use std::time::Duration;

use crate::summary::error::{SummaryError, SummaryResult};

/// Downloads attachment bytes.
pub trait AttachmentFetcher {
    fn fetch(&self, url: &str) -> SummaryResult<Vec<u8>>;
}

/// Fetcher backed by a `ureq` agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl AttachmentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> SummaryResult<Vec<u8>> {
        let response = self.agent.get(url).call().map_err(|e| SummaryError::Fetch {
            url: url.into(),
            message: e.to_string(),
        })?;

        let mut data = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut data)
            .map_err(|e| SummaryError::Fetch {
                url: url.into(),
                message: format!("read body: {e}"),
            })?;
        Ok(data)
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher").finish_non_exhaustive()
    }
}

/// Extract the text of a PDF, one paragraph per line group.
///
/// `pdf-extract` separates pages with form feeds and breaks lines wherever
/// the layout does; lines inside a paragraph are rejoined with spaces.
pub fn extract_pdf_text(origin: &str, data: &[u8]) -> SummaryResult<String> {
    let raw = pdf_extract::extract_text_from_mem(data).map_err(|e| SummaryError::Extract {
        origin: origin.into(),
        message: e.to_string(),
    })?;

    let text = normalize_extracted(&raw);
    if text.is_empty() {
        return Err(SummaryError::Extract {
            origin: origin.into(),
            message: "no text layer".into(),
        });
    }
    Ok(text)
}

fn normalize_extracted(raw: &str) -> String {
    raw.split('\x0C')
        .flat_map(|page| page.split("\n\n"))
        .map(|para| {
            para.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_pdf_bytes_fail_extraction() {
        let result = extract_pdf_text("memo.pdf", b"This is not a PDF");
        assert!(matches!(result, Err(SummaryError::Extract { .. })));
    }

    #[test]
    fn normalize_joins_wrapped_lines_and_pages() {
        let raw = "QUYẾT ĐỊNH\nVề việc giao\n  chỉ tiêu\n\n\nĐiều 1.\x0CĐiều 2. Thi hành\n";
        assert_eq!(
            normalize_extracted(raw),
            "QUYẾT ĐỊNH Về việc giao chỉ tiêu\n\nĐiều 1.\n\nĐiều 2. Thi hành"
        );
    }

    #[test]
    fn normalize_of_blank_pages_is_empty() {
        assert_eq!(normalize_extracted("\x0C \n \x0C\n\n"), "");
    }

    #[test]
    fn unreachable_url_is_a_fetch_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2));
        let result = fetcher.fetch("http://127.0.0.1:1/file.pdf");
        assert!(matches!(result, Err(SummaryError::Fetch { .. })));
    }
}
