//! Encoding-aware stream adapters.
//!
//! A stream has an *external* encoding, the one its data is written in, and
//! optionally an *internal* one that data is transcoded to when read. Where
//! a mode string leaves them out, [`EncodingConfig`] supplies them.

use crate::codec::{CharBytes, Decoded};
use crate::error::{Error, Result};
use crate::{EncodeOptions, EncodedString, Encoding, EncodingConfig};
use std::io::{BufRead, Read, Write};
use std::{fmt, str::FromStr};
use tracing::debug;

/// How a stream is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// `r`
    Read,
    /// `w`
    Write,
    /// `a`
    Append,
}

/// A parsed mode string such as `"r"`, `"rb"`, `"w:UTF-16LE"` or
/// `"r:ISO-8859-1:UTF-8"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mode {
    access: Access,
    binary: bool,
    update: bool,
    external: Option<Encoding>,
    internal: Option<Encoding>,
}

impl Mode {
    /// Parses `access[b|t][+][:external[:internal]]`.
    ///
    /// Binary mode defaults the external encoding to ASCII-8BIT. An internal
    /// encoding equal to the external one is dropped.
    pub fn parse(mode: &str) -> Result<Self> {
        let invalid = || Error::InvalidMode {
            mode: mode.to_owned(),
        };
        let mut parts = mode.split(':');
        let flags = parts.next().unwrap_or_default();
        let mut flag_chars = flags.chars();
        let access = match flag_chars.next() {
            Some('r') => Access::Read,
            Some('w') => Access::Write,
            Some('a') => Access::Append,
            _ => return Err(invalid()),
        };
        let (mut binary, mut text, mut update) = (false, false, false);
        for flag in flag_chars {
            let seen = match flag {
                'b' => &mut binary,
                't' => &mut text,
                '+' => &mut update,
                _ => return Err(invalid()),
            };
            if *seen {
                return Err(invalid());
            }
            *seen = true;
        }
        if binary && text {
            return Err(invalid());
        }
        let mut external = match parts.next() {
            Some(name) => Some(Encoding::find(name)?),
            None => None,
        };
        let mut internal = match parts.next() {
            Some(name) => Some(Encoding::find(name)?),
            None => None,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        if binary && external.is_none() {
            external = Some(Encoding::ASCII_8BIT);
        }
        if internal.is_some() && internal == external {
            internal = None;
        }
        Ok(Mode {
            access,
            binary,
            update,
            external,
            internal,
        })
    }

    /// The access kind.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the `b` flag was given.
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Whether the `+` flag was given.
    pub fn is_update(&self) -> bool {
        self.update
    }

    /// The external encoding named by the mode.
    pub fn external_encoding(&self) -> Option<Encoding> {
        self.external
    }

    /// The internal encoding named by the mode.
    pub fn internal_encoding(&self) -> Option<Encoding> {
        self.internal
    }

    fn readable(&self) -> bool {
        self.access == Access::Read || self.update
    }

    fn writable(&self) -> bool {
        self.access != Access::Read || self.update
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Mode::parse(s)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = match self.access {
            Access::Read => "r",
            Access::Write => "w",
            Access::Append => "a",
        };
        f.write_str(access)?;
        if self.binary {
            f.write_str("b")?;
        }
        if self.update {
            f.write_str("+")?;
        }
        if let Some(external) = self.external {
            write!(f, ":{}", external)?;
            if let Some(internal) = self.internal {
                write!(f, ":{}", internal)?;
            }
        }
        Ok(())
    }
}

/// Reads encoded lines and characters from a buffered byte stream.
#[derive(Debug)]
pub struct EncodedReader<R> {
    inner: R,
    /// Bytes taken from `inner` but not handed out yet.
    pending: CharBytes,
    binary: bool,
    external: Encoding,
    internal: Option<Encoding>,
}

impl<R: BufRead> EncodedReader<R> {
    /// Wraps `inner`. Encodings the mode does not name come from `config`;
    /// binary mode never transcodes.
    pub fn open(inner: R, mode: &Mode, config: &EncodingConfig) -> Result<Self> {
        if !mode.readable() {
            return Err(Error::InvalidMode {
                mode: mode.to_string(),
            });
        }
        let external = mode.external.unwrap_or(config.default_external);
        let internal = if mode.binary {
            None
        } else {
            mode.internal.or(config.default_internal)
        };
        let mut reader = EncodedReader {
            inner,
            pending: CharBytes::new(),
            binary: mode.binary,
            external,
            internal: None,
        };
        reader.set_internal(internal);
        Ok(reader)
    }

    /// The encoding of the data on the stream.
    pub fn external_encoding(&self) -> Encoding {
        self.external
    }

    /// The encoding data is transcoded to after reading, if any.
    pub fn internal_encoding(&self) -> Option<Encoding> {
        self.internal
    }

    fn set_internal(&mut self, internal: Option<Encoding>) {
        self.internal = internal.filter(|enc| *enc != self.external);
    }

    /// Changes the encodings for subsequent reads.
    pub fn set_encoding(&mut self, external: Encoding, internal: Option<Encoding>) {
        debug!(%external, ?internal, "reader encoding changed");
        self.external = external;
        self.set_internal(internal);
    }

    fn finish(&self, bytes: Vec<u8>) -> Result<EncodedString> {
        let text = EncodedString::new(bytes, self.external);
        match self.internal {
            Some(internal) if !self.binary => text.encode(internal, &EncodeOptions::default()),
            _ => Ok(text),
        }
    }

    fn fill_pending(&mut self, len: usize) -> Result<()> {
        while self.pending.len() < len {
            let byte = match self.inner.fill_buf()?.first() {
                Some(byte) => *byte,
                None => break,
            };
            self.inner.consume(1);
            self.pending.push(byte);
        }
        Ok(())
    }

    /// Reads the bytes of one character of the external encoding. An
    /// ill-formed sequence yields the pieces the codec splits it into, the
    /// rest staying pending for the next read.
    fn read_char_bytes(&mut self) -> Result<CharBytes> {
        let codec = self.external.codec();
        let mut len = 1;
        loop {
            self.fill_pending(len)?;
            if self.pending.len() < len {
                len = self.pending.len();
                break;
            }
            if len > 1 && !codec.accepts_next(&self.pending[..len]) {
                len -= 1;
                break;
            }
            if len >= codec.expected_len(&self.pending[..len]) {
                break;
            }
            len += 1;
        }
        if len == 0 {
            return Ok(CharBytes::new());
        }
        let take = match codec.decode(&self.pending[..len]) {
            Decoded::Char(_, n) | Decoded::Unmapped(n) | Decoded::Invalid(n) => n.clamp(1, len),
        };
        Ok(self.pending.drain(..take).collect())
    }

    /// Reads one character, or `None` at end of stream. Malformed data is
    /// returned as is, split into the shortest pieces.
    pub fn read_char(&mut self) -> Result<Option<EncodedString>> {
        let bytes = self.read_char_bytes()?;
        if bytes.is_empty() {
            return Ok(None);
        }
        self.finish(bytes.to_vec()).map(Some)
    }

    /// Reads up to and including the next newline of the external encoding,
    /// or `None` at end of stream.
    pub fn read_line(&mut self) -> Result<Option<EncodedString>> {
        let mut line = Vec::new();
        if self.external.is_ascii_compatible() {
            match self.pending.iter().position(|b| *b == b'\n') {
                Some(pos) => line.extend(self.pending.drain(..=pos)),
                None => {
                    line.extend(self.pending.drain(..));
                    self.inner.read_until(b'\n', &mut line)?;
                }
            }
        } else {
            let newline = self.external.codec().encode('\n');
            loop {
                let bytes = self.read_char_bytes()?;
                if bytes.is_empty() {
                    break;
                }
                line.extend_from_slice(&bytes);
                if Some(&bytes) == newline.as_ref() {
                    break;
                }
            }
        }
        if line.is_empty() {
            return Ok(None);
        }
        self.finish(line).map(Some)
    }

    /// Reads up to `len` raw bytes, tagged ASCII-8BIT whatever the stream's
    /// encodings are.
    pub fn read_bytes(&mut self, len: usize) -> Result<EncodedString> {
        let mut buf = Vec::with_capacity(len);
        let ahead = len.min(self.pending.len());
        buf.extend(self.pending.drain(..ahead));
        let rest = (len - ahead) as u64;
        self.inner.by_ref().take(rest).read_to_end(&mut buf)?;
        Ok(EncodedString::binary(buf))
    }

    /// Unwraps the underlying stream. Bytes already read ahead while
    /// splitting characters are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Writes text to a byte stream, transcoding to the external encoding if
/// one is set.
#[derive(Debug)]
pub struct EncodedWriter<W> {
    inner: W,
    external: Option<Encoding>,
}

impl<W: Write> EncodedWriter<W> {
    /// Wraps `inner`. Binary mode writes bytes untouched.
    pub fn open(inner: W, mode: &Mode) -> Result<Self> {
        if !mode.writable() {
            return Err(Error::InvalidMode {
                mode: mode.to_string(),
            });
        }
        let external = if mode.binary { None } else { mode.external };
        Ok(EncodedWriter { inner, external })
    }

    /// The encoding text is converted to before writing, if any.
    pub fn external_encoding(&self) -> Option<Encoding> {
        self.external
    }

    /// Changes the external encoding for subsequent writes.
    pub fn set_encoding(&mut self, external: Option<Encoding>) {
        debug!(?external, "writer encoding changed");
        self.external = external;
    }

    /// Writes `text`, returning the number of bytes written.
    pub fn write_encoded(&mut self, text: &EncodedString) -> Result<usize> {
        match self.external {
            Some(external) if external != text.encoding() => {
                let converted = text.encode(external, &EncodeOptions::default())?;
                self.inner.write_all(converted.as_bytes())?;
                Ok(converted.len())
            }
            _ => {
                self.inner.write_all(text.as_bytes())?;
                Ok(text.len())
            }
        }
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        Ok(self.inner.write_all(bytes)?)
    }

    /// Flushes the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }

    /// Unwraps the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
