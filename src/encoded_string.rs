use crate::codec::{Codec, Decoded};
use crate::compat::compatible;
use crate::error::{Error, Result};
use crate::{Encoding, Match, Pattern};
use std::{cmp::Ordering, fmt, hash};

/// A growable byte string tagged with an [`Encoding`].
///
/// Whether the content is ASCII-only is maintained eagerly by every
/// mutating operation, so [`is_ascii_only`](Self::is_ascii_only) never
/// reports a stale answer.
///
/// Equality, ordering and hashing follow the compatibility rules: two
/// values are equal when their bytes match and their encodings are
/// compatible.
#[derive(Clone)]
pub struct EncodedString {
    bytes: Vec<u8>,
    encoding: Encoding,
    seven_bit: bool,
    frozen: bool,
}

impl EncodedString {
    /// Creates a value holding `bytes` tagged with `encoding`. The bytes are
    /// not validated.
    pub fn new(bytes: impl Into<Vec<u8>>, encoding: Encoding) -> Self {
        let bytes = bytes.into();
        let seven_bit = bytes.is_ascii();
        EncodedString {
            bytes,
            encoding,
            seven_bit,
            frozen: false,
        }
    }

    /// Creates an empty value tagged with `encoding`.
    pub const fn empty(encoding: Encoding) -> Self {
        EncodedString {
            bytes: Vec::new(),
            encoding,
            seven_bit: true,
            frozen: false,
        }
    }

    /// Creates a UTF-8 value.
    pub fn from_utf8(s: &str) -> Self {
        Self::new(s.as_bytes(), Encoding::UTF_8)
    }

    /// Creates an ASCII-8BIT value.
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, Encoding::ASCII_8BIT)
    }

    /// Creates a one-character value from a code point.
    ///
    /// Without an encoding, codes below 0x80 give US-ASCII and codes below
    /// 0x100 give ASCII-8BIT. With one, `code` is a character of that
    /// encoding: a byte value for single byte encodings, a Unicode scalar
    /// for the Unicode ones.
    pub fn from_char_code(code: u32, encoding: Option<Encoding>) -> Result<Self> {
        let out_of_range = Error::CodepointOutOfRange { code, encoding };
        match encoding {
            None => match u8::try_from(code) {
                Ok(b) if b < 0x80 => Ok(Self::new(vec![b], Encoding::US_ASCII)),
                Ok(b) => Ok(Self::binary(vec![b])),
                Err(_) => Err(out_of_range),
            },
            Some(enc) => match enc.codec().encode_code(code) {
                Some(bytes) => Ok(Self::new(bytes.to_vec(), enc)),
                None => Err(out_of_range),
            },
        }
    }

    /// The encoding tag.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The raw content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the value, returning its raw content.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the encoding is ASCII-compatible and every byte is 7-bit.
    ///
    /// Always false for encodings that are not ASCII-compatible, even when
    /// the value is empty.
    pub fn is_ascii_only(&self) -> bool {
        self.encoding.is_ascii_compatible() && self.seven_bit
    }

    /// Whether the bytes form a well-formed sequence in the encoding.
    pub fn is_valid_encoding(&self) -> bool {
        if self.seven_bit && self.encoding.is_ascii_compatible() {
            return true;
        }
        let codec = self.encoding.codec();
        let mut rest = &self.bytes[..];
        while !rest.is_empty() {
            let decoded = codec.decode(rest);
            if !decoded.is_valid() {
                return false;
            }
            rest = &rest[decoded.len()..];
        }
        true
    }

    /// Iterates over the characters as byte slices. Ill-formed bytes come
    /// out as characters of their own, so iteration never fails.
    pub fn chars(&self) -> Chars<'_> {
        Chars {
            data: &self.bytes,
            codec: self.encoding.codec(),
        }
    }

    /// Number of characters, counted as [`chars`](Self::chars) does.
    pub fn char_count(&self) -> usize {
        if self.seven_bit && self.encoding.is_ascii_compatible() {
            return self.bytes.len();
        }
        self.chars().count()
    }

    /// The character at character index `idx`, as a new string of the same
    /// encoding. Works on ill-formed strings too, where each ill-formed byte
    /// is a character of its own.
    pub fn char_at(&self, idx: usize) -> Option<EncodedString> {
        self.chars()
            .nth(idx)
            .map(|ch| EncodedString::new(ch, self.encoding))
    }

    /// Code of the first character: a Unicode scalar for the Unicode
    /// encodings, the byte value otherwise.
    pub fn ord(&self) -> Result<u32> {
        if self.is_empty() {
            return Err(Error::EmptyString);
        }
        match self.encoding.codec().decode_code(&self.bytes) {
            Some((code, _)) => Ok(code),
            None => Err(Error::InvalidEncoding {
                encoding: self.encoding,
            }),
        }
    }

    /// Whether the value refuses modification.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Makes the value immutable. Clones keep the flag.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            Err(Error::Frozen)
        } else {
            Ok(())
        }
    }

    pub(crate) fn set_contents(&mut self, bytes: Vec<u8>, encoding: Encoding) {
        self.seven_bit = bytes.is_ascii();
        self.bytes = bytes;
        self.encoding = encoding;
    }

    /// Changes the encoding tag without touching the bytes.
    pub fn force_encoding(&mut self, encoding: Encoding) -> Result<()> {
        self.ensure_mutable()?;
        self.encoding = encoding;
        Ok(())
    }

    /// Returns an unfrozen copy carrying a different encoding tag.
    pub fn with_encoding(&self, encoding: Encoding) -> Self {
        EncodedString {
            bytes: self.bytes.clone(),
            encoding,
            seven_bit: self.seven_bit,
            frozen: false,
        }
    }

    /// Removes all bytes, keeping the encoding.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        self.bytes.clear();
        self.seven_bit = true;
        Ok(())
    }

    /// Replaces the content and the encoding with those of `other`.
    pub fn replace(&mut self, other: &EncodedString) -> Result<()> {
        self.ensure_mutable()?;
        self.bytes.clear();
        self.bytes.extend_from_slice(&other.bytes);
        self.encoding = other.encoding;
        self.seven_bit = other.seven_bit;
        Ok(())
    }

    /// Appends `other`, retagging the receiver with the resolved encoding.
    ///
    /// Fails, leaving both values untouched, when the encodings are not
    /// compatible.
    pub fn push_encoded(&mut self, other: &EncodedString) -> Result<()> {
        self.ensure_mutable()?;
        let encoding = compatible(&*self, other)?;
        self.bytes.extend_from_slice(&other.bytes);
        self.seven_bit &= other.seven_bit;
        self.encoding = encoding;
        Ok(())
    }

    /// Returns the concatenation of `self` and `other`.
    pub fn concat(&self, other: &EncodedString) -> Result<EncodedString> {
        let encoding = compatible(self, other)?;
        let mut bytes = Vec::with_capacity(self.len() + other.len());
        bytes.extend_from_slice(&self.bytes);
        bytes.extend_from_slice(&other.bytes);
        Ok(EncodedString {
            bytes,
            encoding,
            seven_bit: self.seven_bit && other.seven_bit,
            frozen: false,
        })
    }

    /// Appends every part in turn to a copy of `self`, as string
    /// interpolation does. Each part must be compatible with the result so
    /// far, not only with `self`.
    pub fn concat_all<'a, I>(&self, parts: I) -> Result<EncodedString>
    where
        I: IntoIterator<Item = &'a EncodedString>,
    {
        let mut out = self.with_encoding(self.encoding);
        for part in parts {
            out.push_encoded(part)?;
        }
        Ok(out)
    }

    /// Character index of the first occurrence of `needle`.
    pub fn find(&self, needle: &EncodedString) -> Result<Option<usize>> {
        compatible(self, needle)?;
        if needle.is_empty() {
            return Ok(Some(0));
        }
        let mut rest = &self.bytes[..];
        let mut char_idx = 0;
        while !rest.is_empty() {
            if rest.starts_with(&needle.bytes) {
                return Ok(Some(char_idx));
            }
            rest = &rest[self.encoding.codec().decode(rest).len()..];
            char_idx += 1;
        }
        Ok(None)
    }

    /// Whether `needle` occurs in `self`.
    pub fn contains(&self, needle: &EncodedString) -> Result<bool> {
        Ok(self.find(needle)?.is_some())
    }

    /// Matches `pattern` against `self`. See [`Pattern::match_in`].
    pub fn match_pattern(&self, pattern: &Pattern) -> Result<Option<Match>> {
        pattern.match_in(self)
    }

    fn collation_encoding(&self) -> Encoding {
        if self.is_ascii_only() {
            Encoding::US_ASCII
        } else {
            self.encoding
        }
    }
}

impl Default for EncodedString {
    /// An empty ASCII-8BIT value.
    fn default() -> Self {
        EncodedString::empty(Encoding::ASCII_8BIT)
    }
}

impl From<&str> for EncodedString {
    fn from(s: &str) -> Self {
        EncodedString::from_utf8(s)
    }
}

impl From<String> for EncodedString {
    fn from(s: String) -> Self {
        EncodedString::new(s.into_bytes(), Encoding::UTF_8)
    }
}

impl PartialEq for EncodedString {
    fn eq(&self, other: &EncodedString) -> bool {
        self.bytes == other.bytes && compatible(self, other).is_ok()
    }
}

impl Eq for EncodedString {}

impl PartialOrd for EncodedString {
    fn partial_cmp(&self, other: &EncodedString) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EncodedString {
    /// Bytewise order. Byte-identical values that are not compatible are
    /// told apart by the order of their encodings; this is not a natural
    /// language collation.
    fn cmp(&self, other: &EncodedString) -> Ordering {
        self.bytes.cmp(&other.bytes).then_with(|| {
            if compatible(self, other).is_ok() {
                Ordering::Equal
            } else {
                self.collation_encoding().cmp(&other.collation_encoding())
            }
        })
    }
}

impl hash::Hash for EncodedString {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        state.write(&self.bytes);
        state.write_u8(0xff);
        if !self.is_empty() && !self.is_ascii_only() {
            hash::Hash::hash(&self.encoding, state);
        }
    }
}

impl fmt::Display for EncodedString {
    /// Renders the content lossily, replacing what cannot be decoded with U+FFFD.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codec = self.encoding.codec();
        let mut rest = &self.bytes[..];
        while !rest.is_empty() {
            let decoded = codec.decode(rest);
            match decoded {
                Decoded::Char(ch, _) => write!(f, "{}", ch)?,
                Decoded::Unmapped(_) | Decoded::Invalid(_) => write!(f, "\u{FFFD}")?,
            }
            rest = &rest[decoded.len()..];
        }
        Ok(())
    }
}

impl fmt::Debug for EncodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"")?;
        for ch in self.chars() {
            match self.encoding.codec().decode(ch) {
                Decoded::Char(c, _) => write!(f, "{}", c.escape_debug())?,
                Decoded::Unmapped(_) | Decoded::Invalid(_) => {
                    for b in ch {
                        write!(f, "\\x{:02X}", b)?;
                    }
                }
            }
        }
        write!(f, "\" ({})", self.encoding)
    }
}

/// An iterator over the characters of an [`EncodedString`], as byte slices.
#[derive(Clone)]
pub struct Chars<'str> {
    data: &'str [u8],
    codec: Codec,
}

impl<'str> Iterator for Chars<'str> {
    type Item = &'str [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        let len = self.codec.decode(self.data).len();
        let (cur, rest) = self.data.split_at(len);
        self.data = rest;
        Some(cur)
    }
}

impl fmt::Debug for Chars<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chars(")?;
        f.debug_list().entries(self.clone()).finish()?;
        write!(f, ")")?;
        Ok(())
    }
}
