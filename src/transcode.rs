//! Converting text from one encoding to another.

use crate::codec::{Codec, Decoded};
use crate::error::{escape_bytes, Error, Result};
use crate::{EncodedString, Encoding};
use tracing::debug;

/// What to do when transcoding meets a problem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnError {
    /// Fail with an error.
    #[default]
    Raise,
    /// Write the replacement text instead.
    Replace,
}

/// XML escaping applied while transcoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XmlEscape {
    /// Escape `&`, `<` and `>`.
    Text,
    /// Escape `&`, `<`, `>` and `"`, and wrap the result in double quotes.
    Attr,
}

/// Options for [`EncodedString::encode`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Policy for bytes that are ill-formed in the source encoding.
    pub invalid: OnError,
    /// Policy for characters the target encoding cannot represent.
    pub undef: OnError,
    /// Replacement text. Defaults to U+FFFD for Unicode targets and `?`
    /// otherwise.
    pub replace: Option<String>,
    /// XML escaping. Characters the target cannot represent are then written
    /// as numeric character references, whatever `undef` says.
    pub xml: Option<XmlEscape>,
}

impl EncodeOptions {
    /// Replace both ill-formed and unrepresentable input.
    pub fn replace_all() -> Self {
        EncodeOptions {
            invalid: OnError::Replace,
            undef: OnError::Replace,
            ..EncodeOptions::default()
        }
    }
}

struct Transcoder<'o> {
    from: Encoding,
    to: Encoding,
    source: Codec,
    target: Codec,
    options: &'o EncodeOptions,
    out: Vec<u8>,
}

impl Transcoder<'_> {
    fn push_str(&mut self, s: &str) -> Result<()> {
        for ch in s.chars() {
            match self.target.encode(ch) {
                Some(bytes) => self.out.extend_from_slice(&bytes),
                None => return Err(self.undefined_char(ch)),
            }
        }
        Ok(())
    }

    fn undefined_char(&self, ch: char) -> Error {
        Error::UndefinedConversion {
            what: format!("U+{:04X}", u32::from(ch)),
            from: self.from,
            to: self.to,
        }
    }

    fn push_replacement(&mut self) -> Result<()> {
        let replacement = match &self.options.replace {
            Some(replacement) => replacement.as_str(),
            None if self.to.is_unicode() => "\u{FFFD}",
            None => "?",
        };
        self.push_str(replacement)
    }

    fn push_char(&mut self, ch: char) -> Result<()> {
        if let Some(xml) = self.options.xml {
            let escaped = match ch {
                '&' => Some("&amp;"),
                '<' => Some("&lt;"),
                '>' => Some("&gt;"),
                '"' if xml == XmlEscape::Attr => Some("&quot;"),
                _ => None,
            };
            if let Some(escaped) = escaped {
                return self.push_str(escaped);
            }
        }
        if let Some(bytes) = self.target.encode(ch) {
            self.out.extend_from_slice(&bytes);
            return Ok(());
        }
        if self.options.xml.is_some() {
            return self.push_str(&format!("&#x{:X};", u32::from(ch)));
        }
        match self.options.undef {
            OnError::Raise => Err(self.undefined_char(ch)),
            OnError::Replace => {
                debug!(from = %self.from, to = %self.to, "U+{:04X} replaced", u32::from(ch));
                self.push_replacement()
            }
        }
    }

    fn push_unmapped(&mut self, bytes: &[u8]) -> Result<()> {
        match self.options.undef {
            OnError::Raise => Err(Error::UndefinedConversion {
                what: escape_bytes(bytes),
                from: self.from,
                to: self.to,
            }),
            OnError::Replace => {
                debug!(from = %self.from, to = %self.to, "\"{}\" replaced", escape_bytes(bytes));
                self.push_replacement()
            }
        }
    }

    fn push_invalid(&mut self, bytes: &[u8]) -> Result<()> {
        match self.options.invalid {
            OnError::Raise => Err(Error::InvalidByteSequence {
                bytes: bytes.to_vec(),
                from: self.from,
                to: self.to,
            }),
            OnError::Replace => {
                debug!(
                    from = %self.from,
                    to = %self.to,
                    "invalid byte sequence \"{}\" replaced",
                    escape_bytes(bytes)
                );
                self.push_replacement()
            }
        }
    }

    fn run(mut self, mut rest: &[u8]) -> Result<Vec<u8>> {
        let attr = self.options.xml == Some(XmlEscape::Attr);
        if attr {
            self.push_str("\"")?;
        }
        while !rest.is_empty() {
            let decoded = self.source.decode(rest);
            let (cur, next) = rest.split_at(decoded.len());
            match decoded {
                Decoded::Char(ch, _) => self.push_char(ch)?,
                Decoded::Unmapped(_) => self.push_unmapped(cur)?,
                Decoded::Invalid(_) => self.push_invalid(cur)?,
            }
            rest = next;
        }
        if attr {
            self.push_str("\"")?;
        }
        Ok(self.out)
    }
}

impl EncodedString {
    /// Returns a copy of this string converted to `target`.
    ///
    /// Converting to the string's own encoding without XML escaping copies
    /// the bytes unchanged, even if they are ill-formed. Dummy encodings
    /// have no converter.
    pub fn encode(&self, target: Encoding, options: &EncodeOptions) -> Result<EncodedString> {
        let from = self.encoding();
        if from == target && options.xml.is_none() {
            return Ok(self.with_encoding(target));
        }
        if from.is_dummy() || target.is_dummy() {
            return Err(Error::ConverterNotFound { from, to: target });
        }
        let transcoder = Transcoder {
            from,
            to: target,
            source: from.codec(),
            target: target.codec(),
            options,
            out: Vec::with_capacity(self.len()),
        };
        let bytes = transcoder.run(self.as_bytes())?;
        Ok(EncodedString::new(bytes, target))
    }

    /// Converts this string to `target` in place. On failure the string is
    /// left untouched.
    pub fn encode_in_place(&mut self, target: Encoding, options: &EncodeOptions) -> Result<()> {
        self.ensure_mutable()?;
        let converted = self.encode(target, options)?;
        self.set_contents(converted.into_bytes(), target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{EncodeOptions, OnError, XmlEscape};
    use crate::{EncodedString, Encoding, Error};

    #[test]
    fn test_utf8_to_latin1() {
        let s = EncodedString::from("groß");
        let t = s.encode(Encoding::ISO_8859_1, &EncodeOptions::default()).unwrap();
        assert_eq!(&[0x67, 0x72, 0x6f, 0xdf][..], t.as_bytes());
        assert_eq!(Encoding::ISO_8859_1, t.encoding());
        let back = t.encode(Encoding::UTF_8, &EncodeOptions::default()).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn test_invalid_bytes() {
        let s = EncodedString::new(&b"hello\xff"[..], Encoding::UTF_8);
        let err = s.encode(Encoding::ISO_8859_1, &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidByteSequence { ref bytes, .. } if bytes == &[0xff]));
        assert_eq!("\"\\xFF\" on UTF-8", err.to_string());

        let opts = EncodeOptions {
            invalid: OnError::Replace,
            ..EncodeOptions::default()
        };
        let t = s.encode(Encoding::ISO_8859_1, &opts).unwrap();
        assert_eq!(b"hello?", t.as_bytes());

        let t = s.encode(Encoding::UTF_16LE, &opts).unwrap();
        assert_eq!(&b"h\0e\0l\0l\0o\0\xfd\xff"[..], t.as_bytes());
    }

    #[test]
    fn test_undefined_conversion() {
        let s = EncodedString::from("hello\u{100}");
        let err = s.encode(Encoding::ISO_8859_1, &EncodeOptions::default()).unwrap_err();
        assert_eq!("U+0100 from UTF-8 to ISO-8859-1", err.to_string());

        let opts = EncodeOptions {
            undef: OnError::Replace,
            ..EncodeOptions::default()
        };
        let t = s.encode(Encoding::ISO_8859_1, &opts).unwrap();
        assert_eq!(b"hello?", t.as_bytes());

        let opts = EncodeOptions {
            undef: OnError::Replace,
            replace: Some("*".to_owned()),
            ..EncodeOptions::default()
        };
        let t = s.encode(Encoding::ISO_8859_1, &opts).unwrap();
        assert_eq!(b"hello*", t.as_bytes());
    }

    #[test]
    fn test_xml_escaping() {
        let s = EncodedString::from("hello\u{100}");
        let opts = EncodeOptions {
            xml: Some(XmlEscape::Text),
            ..EncodeOptions::default()
        };
        let t = s.encode(Encoding::ISO_8859_1, &opts).unwrap();
        assert_eq!(b"hello&#x100;", t.as_bytes());

        let s = EncodedString::from("hello\"\u{100}");
        let opts = EncodeOptions {
            xml: Some(XmlEscape::Attr),
            undef: OnError::Replace,
            ..EncodeOptions::default()
        };
        let t = s.encode(Encoding::ISO_8859_1, &opts).unwrap();
        assert_eq!(&b"\"hello&quot;&#x100;\""[..], t.as_bytes());

        let s = EncodedString::from("<a&b>");
        let opts = EncodeOptions {
            xml: Some(XmlEscape::Text),
            ..EncodeOptions::default()
        };
        let t = s.encode(Encoding::UTF_8, &opts).unwrap();
        assert_eq!(b"&lt;a&amp;b&gt;", t.as_bytes());
    }

    #[test]
    fn test_binary_high_bytes_are_undefined() {
        let s = EncodedString::binary(&b"ab\xff"[..]);
        let err = s.encode(Encoding::UTF_8, &EncodeOptions::default()).unwrap_err();
        assert_eq!("\\xFF from ASCII-8BIT to UTF-8", err.to_string());
        let t = s.encode(Encoding::UTF_8, &EncodeOptions::replace_all()).unwrap();
        assert_eq!("ab\u{FFFD}".as_bytes(), t.as_bytes());
    }

    #[test]
    fn test_same_encoding_copies_bytes() {
        let s = EncodedString::new(&b"hello\xff"[..], Encoding::UTF_8);
        let t = s.encode(Encoding::UTF_8, &EncodeOptions::default()).unwrap();
        assert_eq!(s.as_bytes(), t.as_bytes());
    }

    #[test]
    fn test_dummy_encodings_have_no_converter() {
        let s = EncodedString::from("hello");
        assert!(matches!(
            s.encode(Encoding::ISO_2022_JP, &EncodeOptions::default()),
            Err(Error::ConverterNotFound { .. })
        ));
    }

    #[test]
    fn test_encode_in_place() {
        let mut s = EncodedString::from("groß");
        s.encode_in_place(Encoding::UTF_16BE, &EncodeOptions::default())
            .unwrap();
        assert_eq!(Encoding::UTF_16BE, s.encoding());
        assert_eq!(&b"\0g\0r\0o\0\xdf"[..], s.as_bytes());
        assert!(!s.is_ascii_only());

        let mut bad = EncodedString::from("\u{100}");
        assert!(bad
            .encode_in_place(Encoding::ISO_8859_1, &EncodeOptions::default())
            .is_err());
        assert_eq!("\u{100}".as_bytes(), bad.as_bytes());

        s.freeze();
        assert!(matches!(
            s.encode_in_place(Encoding::UTF_8, &EncodeOptions::default()),
            Err(Error::Frozen)
        ));
    }
}
