//! Spoken summaries of a document's PDF attachments.
//!
//! [`DocumentSummarizer`] downloads every attachment URL, extracts the text,
//! asks a chat model for a Vietnamese summary and synthesizes it to MP3.
//! Each step sits behind a trait so the pipeline runs without a network in
//! tests.

pub mod error;
pub mod fetch;
pub mod llm;
pub mod speech;

use std::time::Duration;

pub use error::{SummaryError, SummaryResult};
pub use fetch::{AttachmentFetcher, HttpFetcher, extract_pdf_text};
pub use llm::{ChatClient, ChatConfig, LanguageModel};
pub use speech::{GoogleTts, SpeechSynthesizer};

use crate::config::{ConfigResult, SummaryConfig};

/// Instruction sent with every summary request.
pub const SYSTEM_PROMPT: &str = "You are a smart assistant. Please summarize the content of the \
    user's PDF document. Be polite to the user and respond in Vietnamese. Do not add any \
    concluding remarks or additional advice in the summary.";

/// An attachment left out of the summary, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAttachment {
    pub url: String,
    pub reason: String,
}

/// Result of summarizing one document.
#[derive(Debug, Clone)]
pub struct Summary {
    pub text: String,
    /// MP3 bytes; `None` when speech synthesis failed.
    pub audio: Option<Vec<u8>>,
    /// URLs whose text went into the prompt, in input order.
    pub sources: Vec<String>,
    pub skipped: Vec<SkippedAttachment>,
}

/// Turns downloaded attachment bytes into text. The first argument names
/// the source for error messages.
pub type TextExtractor = fn(&str, &[u8]) -> SummaryResult<String>;

/// Summarizes the attachments behind a list of URLs.
pub trait SummaryPipeline {
    fn summarize(&self, urls: &[String]) -> SummaryResult<Summary>;
}

/// Default pipeline: fetch, extract, complete, speak.
pub struct DocumentSummarizer {
    fetcher: Box<dyn AttachmentFetcher>,
    model: Box<dyn LanguageModel>,
    speech: Box<dyn SpeechSynthesizer>,
    extractor: TextExtractor,
    max_input_chars: usize,
}

impl DocumentSummarizer {
    pub fn new(
        fetcher: Box<dyn AttachmentFetcher>,
        model: Box<dyn LanguageModel>,
        speech: Box<dyn SpeechSynthesizer>,
        max_input_chars: usize,
    ) -> Self {
        Self {
            fetcher,
            model,
            speech,
            extractor: extract_pdf_text,
            max_input_chars,
        }
    }

    /// Replace PDF extraction, e.g. for plain-text attachments.
    pub fn with_extractor(mut self, extractor: TextExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Build the HTTP-backed pipeline. Fails when no API key is configured.
    pub fn from_config(config: &SummaryConfig, fetch_timeout: Duration) -> ConfigResult<Self> {
        let chat = ChatClient::new(ChatConfig {
            base_url: config.llm_base_url.clone(),
            model: config.llm_model.clone(),
            api_key: config.require_api_key()?.to_string(),
            timeout_secs: config.llm_timeout_secs,
        });
        let tts = GoogleTts::new(
            config.tts_base_url.clone(),
            config.tts_lang.clone(),
            fetch_timeout,
        );

        Ok(Self::new(
            Box::new(HttpFetcher::new(fetch_timeout)),
            Box::new(chat),
            Box::new(tts),
            config.max_input_chars,
        ))
    }

    /// Summarize already-extracted texts, one per source document.
    pub fn summarize_texts(&self, texts: &[String]) -> SummaryResult<(String, Option<Vec<u8>>)> {
        let prompt = build_prompt(texts, self.max_input_chars);
        if prompt.trim().is_empty() {
            return Err(SummaryError::NoContent {
                message: "the attachments contain no text".into(),
            });
        }

        let text = self.model.complete(SYSTEM_PROMPT, &prompt)?;
        let audio = match self.speech.synthesize(&text) {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::warn!(error = %e, "speech synthesis failed, returning text only");
                None
            }
        };
        Ok((text, audio))
    }
}

impl SummaryPipeline for DocumentSummarizer {
    fn summarize(&self, urls: &[String]) -> SummaryResult<Summary> {
        let mut texts = Vec::new();
        let mut sources = Vec::new();
        let mut skipped = Vec::new();

        for url in urls {
            let extracted = self
                .fetcher
                .fetch(url)
                .and_then(|data| (self.extractor)(url, &data));
            match extracted {
                Ok(text) => {
                    let chars = text.chars().count();
                    tracing::debug!(url = %url, chars, "extracted attachment");
                    texts.push(text);
                    sources.push(url.clone());
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "skipping attachment");
                    skipped.push(SkippedAttachment {
                        url: url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if texts.is_empty() {
            return Err(SummaryError::NoContent {
                message: format!("{} attachment(s), none readable", urls.len()),
            });
        }

        let (text, audio) = self.summarize_texts(&texts)?;
        tracing::info!(
            sources = sources.len(),
            skipped = skipped.len(),
            has_audio = audio.is_some(),
            "summary ready"
        );
        Ok(Summary {
            text,
            audio,
            sources,
            skipped,
        })
    }
}

impl std::fmt::Debug for DocumentSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSummarizer")
            .field("max_input_chars", &self.max_input_chars)
            .finish_non_exhaustive()
    }
}

/// Join document texts into one user message, capped at `max_chars`.
pub fn build_prompt(texts: &[String], max_chars: usize) -> String {
    let sections: Vec<String> = texts
        .iter()
        .filter(|t| !t.trim().is_empty())
        .enumerate()
        .map(|(i, text)| format!("--- Tài liệu {} ---\n{}", i + 1, text.trim()))
        .collect();
    truncate_chars(&sections.join("\n\n"), max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
