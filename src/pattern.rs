use crate::codec::{Codec, Decoded};
use crate::compat::compatible_for_match;
use crate::error::{Error, Result};
use crate::{EncodedString, Encoding};
use regex::Regex;
use std::{fmt, ops::Range};

/// Options for [`Pattern::with_options`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatternOptions {
    /// Keep the source's encoding even if the source is ASCII-only, so the
    /// pattern only matches text of that encoding or 7-bit text.
    pub fixed_encoding: bool,
}

/// A compiled regular expression carrying an encoding.
///
/// A pattern whose source is ASCII-only is tagged US-ASCII and may match
/// text of any ASCII-compatible encoding. Otherwise it keeps the source's
/// encoding and is fixed to it.
#[derive(Clone)]
pub struct Pattern {
    source: EncodedString,
    encoding: Encoding,
    fixed_encoding: bool,
    regex: Regex,
}

/// The position of a successful match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    start: usize,
    end: usize,
    byte_range: Range<usize>,
}

impl Match {
    /// Character index where the match starts.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Character index just past the match.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The matched bytes' position in the text.
    pub fn byte_range(&self) -> Range<usize> {
        self.byte_range.clone()
    }
}

/// Text decoded for the regex engine, with the mapping back to the source.
struct DecodedText {
    text: String,
    /// `(offset in text, offset in source bytes)` for every character start,
    /// followed by both lengths.
    boundaries: Vec<(usize, usize)>,
}

impl DecodedText {
    /// Bytes that are well-formed but have no Unicode meaning (binary high
    /// bytes) stand for the Latin-1 character of the same value. Callers
    /// check validity first.
    fn new(bytes: &[u8], codec: Codec) -> Self {
        let mut text = String::with_capacity(bytes.len());
        let mut boundaries = Vec::with_capacity(bytes.len() + 1);
        let mut pos = 0;
        while pos < bytes.len() {
            boundaries.push((text.len(), pos));
            let decoded = codec.decode(&bytes[pos..]);
            match decoded {
                Decoded::Char(ch, _) => text.push(ch),
                Decoded::Unmapped(_) | Decoded::Invalid(_) => text.push(char::from(bytes[pos])),
            }
            pos += decoded.len();
        }
        boundaries.push((text.len(), bytes.len()));
        DecodedText { text, boundaries }
    }

    /// Character index and source byte offset of a text offset that lies on
    /// a character boundary.
    fn locate(&self, text_offset: usize) -> (usize, usize) {
        let idx = self
            .boundaries
            .binary_search_by_key(&text_offset, |(off, _)| *off)
            .unwrap_or_else(|idx| idx);
        let src = self.boundaries.get(idx).map_or(0, |(_, src)| *src);
        (idx, src)
    }
}

impl Pattern {
    /// Compiles `source`.
    pub fn new(source: &EncodedString) -> Result<Self> {
        Self::with_options(source, PatternOptions::default())
    }

    /// Compiles a UTF-8 source.
    pub fn from_utf8(source: &str) -> Result<Self> {
        Self::new(&EncodedString::from(source))
    }

    /// Compiles `source` with `options`.
    ///
    /// The source must be well-formed text in an ASCII-compatible encoding.
    pub fn with_options(source: &EncodedString, options: PatternOptions) -> Result<Self> {
        let source_encoding = source.encoding();
        if !source_encoding.is_ascii_compatible() {
            return Err(Error::InvalidPattern {
                message: format!("{} is not ASCII-compatible", source_encoding),
            });
        }
        if !source.is_valid_encoding() {
            return Err(Error::InvalidPattern {
                message: format!("invalid multibyte character in {}", source_encoding),
            });
        }
        let (encoding, fixed_encoding) = if options.fixed_encoding {
            (source_encoding, true)
        } else if source.is_ascii_only() {
            (Encoding::US_ASCII, false)
        } else {
            (source_encoding, true)
        };
        let decoded = DecodedText::new(source.as_bytes(), source_encoding.codec());
        let regex = Regex::new(&decoded.text).map_err(|err| Error::InvalidPattern {
            message: err.to_string(),
        })?;
        let mut source = source.with_encoding(source_encoding);
        source.freeze();
        Ok(Pattern {
            source,
            encoding,
            fixed_encoding,
            regex,
        })
    }

    /// The pattern's encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Whether the pattern only matches text of its own encoding or
    /// ASCII-only text.
    pub fn is_fixed_encoding(&self) -> bool {
        self.fixed_encoding
    }

    /// The source the pattern was compiled from, frozen.
    pub fn source(&self) -> &EncodedString {
        &self.source
    }

    /// Finds the first match in `text`.
    ///
    /// The whole text must be well-formed in its encoding, even beyond the
    /// point where a match would be found, and must be compatible with the
    /// pattern.
    pub fn match_in(&self, text: &EncodedString) -> Result<Option<Match>> {
        if !text.is_valid_encoding() {
            return Err(Error::InvalidEncoding {
                encoding: text.encoding(),
            });
        }
        compatible_for_match(self, text)?;
        let decoded = DecodedText::new(text.as_bytes(), text.encoding().codec());
        Ok(self.regex.find(&decoded.text).map(|m| {
            let (start, start_byte) = decoded.locate(m.start());
            let (end, end_byte) = decoded.locate(m.end());
            Match {
                start,
                end,
                byte_range: start_byte..end_byte,
            }
        }))
    }

    /// Whether `text` contains a match.
    pub fn is_match(&self, text: &EncodedString) -> Result<bool> {
        Ok(self.match_in(text)?.is_some())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Pattern) -> bool {
        self.source.as_bytes() == other.source.as_bytes()
            && self.encoding == other.encoding
            && self.fixed_encoding == other.fixed_encoding
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/ ({}", self.source, self.encoding)?;
        if self.fixed_encoding {
            write!(f, ", fixed")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::{Pattern, PatternOptions};
    use crate::{EncodedString, Encoding, Error};

    #[test]
    fn test_ascii_source_is_us_ascii() {
        let re = Pattern::from_utf8("h.llo").unwrap();
        assert_eq!(Encoding::US_ASCII, re.encoding());
        assert!(!re.is_fixed_encoding());
        assert_eq!("/h.llo/ (US-ASCII)", format!("{:?}", re));
    }

    #[test]
    fn test_non_ascii_source_is_fixed() {
        let re = Pattern::from_utf8("ß").unwrap();
        assert_eq!(Encoding::UTF_8, re.encoding());
        assert!(re.is_fixed_encoding());
        assert!(re.source().is_frozen());
    }

    #[test]
    fn test_fixed_encoding_option() {
        let re = Pattern::with_options(
            &EncodedString::from("abc"),
            PatternOptions {
                fixed_encoding: true,
            },
        )
        .unwrap();
        assert_eq!(Encoding::UTF_8, re.encoding());
        assert_ne!(re, Pattern::from_utf8("abc").unwrap());
    }

    #[test]
    fn test_rejected_sources() {
        let wide = EncodedString::new(&b"\0a"[..], Encoding::UTF_16BE);
        assert!(matches!(Pattern::new(&wide), Err(Error::InvalidPattern { .. })));
        let bad = EncodedString::new(&b"\xff"[..], Encoding::UTF_8);
        assert!(matches!(Pattern::new(&bad), Err(Error::InvalidPattern { .. })));
        assert!(matches!(Pattern::from_utf8("("), Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_match_reports_char_index() {
        let re = Pattern::from_utf8("er").unwrap();
        let text = EncodedString::from("über");
        let m = re.match_in(&text).unwrap().unwrap();
        assert_eq!(2, m.start());
        assert_eq!(4, m.end());
        assert_eq!(3..5, m.byte_range());

        let latin = EncodedString::new(&b"\xfcber"[..], Encoding::ISO_8859_1);
        let m = re.match_in(&latin).unwrap().unwrap();
        assert_eq!(2, m.start());
        assert_eq!(2..4, m.byte_range());
    }

    #[test]
    fn test_latin1_pattern_matches_latin1_text() {
        let source = EncodedString::new(&b"\xfc."[..], Encoding::ISO_8859_1);
        let re = Pattern::new(&source).unwrap();
        let text = EncodedString::new(&b"gr\xfcn"[..], Encoding::ISO_8859_1);
        let m = re.match_in(&text).unwrap().unwrap();
        assert_eq!(2..4, m.byte_range());
        assert!(re.match_in(&EncodedString::from("grün")).is_err());
    }

    #[test]
    fn test_invalid_text_fails_before_matching() {
        let re = Pattern::from_utf8("hello").unwrap();
        let text = EncodedString::new(&b"hello\xff"[..], Encoding::UTF_8);
        assert!(matches!(
            re.match_in(&text),
            Err(Error::InvalidEncoding {
                encoding: Encoding::UTF_8
            })
        ));
    }

    #[test]
    fn test_binary_text() {
        let re = Pattern::from_utf8("b.").unwrap();
        let text = EncodedString::binary(&b"a\xffb\xfe"[..]);
        let m = text.match_pattern(&re).unwrap().unwrap();
        assert_eq!(2..4, m.byte_range());
        assert!(re.is_match(&EncodedString::from("abc")).unwrap());
        assert!(!re.is_match(&EncodedString::from("ab")).unwrap());
    }
}
