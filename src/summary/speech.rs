//! Text-to-speech through the Google Translate TTS endpoint.
//!
//! The endpoint only accepts short inputs, so the text is split into chunks
//! of at most [`MAX_CHUNK_CHARS`] characters and the returned MP3 segments
//! are concatenated. MP3 frames are self-delimiting; the joined bytes play
//! as one file.

use std::io::Read;
use std::time::Duration;

use crate::summary::error::{SummaryError, SummaryResult};

pub const MAX_CHUNK_CHARS: usize = 100;

/// Turns text into audio bytes.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str) -> SummaryResult<Vec<u8>>;
}

/// Google Translate TTS client.
pub struct GoogleTts {
    base_url: String,
    lang: String,
    agent: ureq::Agent,
}

impl GoogleTts {
    pub fn new(base_url: impl Into<String>, lang: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            lang: lang.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Query parameters for chunk `idx` of `total`.
    pub fn chunk_query(
        &self,
        chunk: &str,
        idx: usize,
        total: usize,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("ie", "UTF-8".into()),
            ("client", "tw-ob".into()),
            ("tl", self.lang.clone()),
            ("q", chunk.into()),
            ("total", total.to_string()),
            ("idx", idx.to_string()),
            ("textlen", chunk.chars().count().to_string()),
        ]
    }

    fn fetch_chunk(&self, chunk: &str, idx: usize, total: usize) -> SummaryResult<Vec<u8>> {
        let mut request = self.agent.get(&self.base_url);
        for (key, value) in self.chunk_query(chunk, idx, total) {
            request = request.query(key, &value);
        }

        let response = request.call().map_err(|e| SummaryError::Speech {
            message: format!("chunk {}/{total}: {e}", idx + 1),
        })?;

        let mut audio = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut audio)
            .map_err(|e| SummaryError::Speech {
                message: format!("chunk {}/{total}: read body: {e}", idx + 1),
            })?;
        Ok(audio)
    }
}

impl SpeechSynthesizer for GoogleTts {
    fn synthesize(&self, text: &str) -> SummaryResult<Vec<u8>> {
        let chunks = split_for_speech(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SummaryError::Speech {
                message: "nothing to speak".into(),
            });
        }

        let total = chunks.len();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, idx, total)?);
        }
        tracing::info!(
            chunks = total,
            bytes = audio.len(),
            lang = %self.lang,
            "synthesized speech"
        );
        Ok(audio)
    }
}

impl std::fmt::Debug for GoogleTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTts")
            .field("base_url", &self.base_url)
            .field("lang", &self.lang)
            .finish_non_exhaustive()
    }
}

/// Pack whitespace-separated words greedily into chunks of at most
/// `max_chars` characters. A single word longer than the limit is cut.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.push(word.drain(..max_chars).collect());
        }

        let needed = if current.is_empty() { word.len() } else { word.len() + 1 };
        if current_len + needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
