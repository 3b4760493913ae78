// terminus-core/src/encoding.rs

//! Best-effort decoding of raw subprocess output.
//!
//! Command output arrives as bytes of unknown encoding: the child picks its
//! own locale, and on Windows console tools routinely emit UTF-16. Decoding
//! is modeled as a total function over an ordered candidate list rather than
//! a chain of error handlers, so callers never see a decoding failure.

use encoding_rs::{Encoding, UTF_16LE, UTF_8, WINDOWS_1252};
use tracing::warn;

/// Decodes `bytes` by trying each candidate encoding strictly, in order,
/// followed by the fixed fallback tail: UTF-8 (what most command-line tools
/// emit), UTF-16LE (wide console output), then windows-1252, which maps
/// every byte and so cannot fail (at the price of possible mojibake).
///
/// The final lossy UTF-8 decode keeps the function total even if every
/// candidate rejects the input.
pub fn decode_output(bytes: &[u8], candidates: &[&'static Encoding]) -> String {
    let tail: [&'static Encoding; 3] = [UTF_8, UTF_16LE, WINDOWS_1252];
    for encoding in candidates.iter().chain(tail.iter()) {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return text.into_owned();
        }
    }
    UTF_8.decode(bytes).0.into_owned()
}

/// Candidate encodings derived from the host locale, the closest analogue of
/// the interpreter stdout/stdin encodings the original tool chain consulted.
pub fn host_encoding_candidates() -> Vec<&'static Encoding> {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter_map(|value| encoding_from_locale(&value))
        .collect()
}

/// Resolves configured encoding labels, dropping any the encoding table does
/// not know about.
pub fn resolve_labels(labels: &[String]) -> Vec<&'static Encoding> {
    labels
        .iter()
        .filter_map(|label| {
            let encoding = Encoding::for_label(label.as_bytes());
            if encoding.is_none() {
                warn!(label, "Ignoring unknown encoding label");
            }
            encoding
        })
        .collect()
}

/// Extracts the codeset from a locale string such as `en_US.UTF-8` or
/// `ko_KR.eucKR@dict`. Locales without a codeset (`C`, `POSIX`) yield none.
fn encoding_from_locale(locale: &str) -> Option<&'static Encoding> {
    let codeset = locale.split('.').nth(1)?;
    let codeset = codeset.split('@').next().unwrap_or(codeset);
    Encoding::for_label(codeset.as_bytes())
}
