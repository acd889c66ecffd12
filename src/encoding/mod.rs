//! Byte to text decoding with a fallback chain.
//!
//! Diff output carries file content in whatever encoding the file was saved
//! with, so a single patch can mix encodings hunk by hunk. Decoding never
//! fails: when nothing fits, the preferred encoding is applied lossily and the
//! resolved encoding is reported as `None`.
//!
//! Order of attempts:
//! 1. the preferred encoding
//! 2. the remaining [`CANDIDATES`]
//! 3. the statistical detector's guess, if not tried yet
//! 4. lossy decode with the preferred encoding

use encoding_rs::{Encoding, GB18030, UTF_16BE, UTF_16LE, UTF_8};
use std::borrow::Cow;
use tracing::warn;

/// Encodings tried after the preferred one.
pub const CANDIDATES: [&Encoding; 3] = [UTF_8, GB18030, UTF_16LE];

/// Result of [`decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded text.
    pub text: String,
    /// Encoding that decoded the bytes exactly; `None` when decoding was lossy.
    pub encoding: Option<&'static Encoding>,
}

/// Look up an encoding by its WHATWG label (`utf-8`, `gbk`, `utf-16le`, ...).
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Decode `bytes`, preferring `preferred`.
pub fn decode(bytes: &[u8], preferred: &'static Encoding) -> Decoded {
    if bytes.is_empty() {
        return Decoded {
            text: String::new(),
            encoding: Some(UTF_8),
        };
    }

    if let Some(text) = try_decode(bytes, preferred) {
        return Decoded {
            text,
            encoding: Some(preferred),
        };
    }

    let mut tried: Vec<&'static Encoding> = vec![preferred];
    for candidate in CANDIDATES {
        if tried.contains(&candidate) {
            continue;
        }
        tried.push(candidate);
        if let Some(text) = try_decode(bytes, candidate) {
            return Decoded {
                text,
                encoding: Some(candidate),
            };
        }
    }

    let guess = detect(bytes);
    if !tried.contains(&guess) {
        if let Some(text) = try_decode(bytes, guess) {
            return Decoded {
                text,
                encoding: Some(guess),
            };
        }
    }

    warn!(
        len = bytes.len(),
        preferred = preferred.name(),
        "Can't decode bytes exactly, falling back to lossy decoding"
    );
    let (text, _) = preferred.decode_without_bom_handling(fix_odd_length(bytes, preferred));
    Decoded {
        text: text.into_owned(),
        encoding: None,
    }
}

/// Exact decode or nothing.
fn try_decode(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let data = strip_utf16_bom(fix_odd_length(bytes, encoding), encoding);
    encoding
        .decode_without_bom_handling_and_without_replacement(data)
        .map(Cow::into_owned)
}

/// Drop the stray byte left behind when a 16-bit stream was split on a
/// single-byte separator.
///
/// Splitting UTF-16LE on `\n` leaves the `0x00` high byte of the newline at
/// the start of the next line; for UTF-16BE it sits at the end of the line.
fn fix_odd_length<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> &'a [u8] {
    if encoding == UTF_16LE && bytes.first() == Some(&0x00) {
        &bytes[1..]
    } else if encoding == UTF_16BE && bytes.last() == Some(&0x00) {
        &bytes[..bytes.len() - 1]
    } else {
        bytes
    }
}

fn strip_utf16_bom<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> &'a [u8] {
    match Encoding::for_bom(bytes) {
        Some((bom_encoding, len)) if bom_encoding == encoding => &bytes[len..],
        _ => bytes,
    }
}

fn detect(bytes: &[u8]) -> &'static Encoding {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}
