use crate::codec::Codec;
use crate::compat::{compatible, Operand};
use crate::encoding_registry::{lookup, EncodingEntry, ENCODING_TABLE};
use crate::error::{Error, Result};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A character encoding: a named byte interpretation tag.
///
/// `Encoding` is a copyable handle to an entry of a static, read-only table,
/// so it can be shared freely across threads. Handles compare and order by
/// their position in that table.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Encoding(u8);

impl Encoding {
    /// Raw bytes. Every byte sequence is valid.
    pub const ASCII_8BIT: Encoding = Encoding(0);
    /// Alias of [`Encoding::ASCII_8BIT`].
    pub const BINARY: Encoding = Encoding::ASCII_8BIT;
    /// UTF-8.
    pub const UTF_8: Encoding = Encoding(1);
    /// 7-bit ASCII.
    pub const US_ASCII: Encoding = Encoding(2);
    /// UTF-16, big endian.
    pub const UTF_16BE: Encoding = Encoding(3);
    /// UTF-16, little endian.
    pub const UTF_16LE: Encoding = Encoding(4);
    /// UTF-32, big endian.
    pub const UTF_32BE: Encoding = Encoding(5);
    /// UTF-32, little endian.
    pub const UTF_32LE: Encoding = Encoding(6);
    /// Latin-1.
    pub const ISO_8859_1: Encoding = Encoding(7);
    /// Latin-9.
    pub const ISO_8859_15: Encoding = Encoding(8);
    /// Windows western european code page.
    pub const WINDOWS_1252: Encoding = Encoding(9);
    /// Stateful japanese encoding (dummy).
    pub const ISO_2022_JP: Encoding = Encoding(10);
    /// Stateful UTF-7 (dummy).
    pub const UTF_7: Encoding = Encoding(11);

    fn entry(self) -> &'static EncodingEntry {
        &ENCODING_TABLE[usize::from(self.0)]
    }

    /// Looks up an encoding by its name or one of its aliases, ignoring ASCII case.
    pub fn find(name: &str) -> Result<Self> {
        lookup(name).map(Encoding).ok_or_else(|| Error::UnknownEncoding {
            name: name.to_owned(),
        })
    }

    /// Iterates over all registered encodings in their canonical order.
    pub fn list() -> impl ExactSizeIterator<Item = Encoding> {
        (0..ENCODING_TABLE.len()).map(|idx| Encoding(idx as u8))
    }

    /// The canonical name.
    pub fn name(self) -> &'static str {
        self.entry().names[0]
    }

    /// The canonical name followed by the aliases.
    pub fn names(self) -> &'static [&'static str] {
        self.entry().names
    }

    /// Whether bytes 0x00-0x7F represent the same characters as ASCII.
    pub fn is_ascii_compatible(self) -> bool {
        self.entry().ascii_compatible
    }

    /// Whether character handling for this encoding is not implemented,
    /// typically because it is stateful.
    pub fn is_dummy(self) -> bool {
        self.entry().dummy
    }

    /// Whether this is one of the Unicode transformation formats.
    pub fn is_unicode(self) -> bool {
        self.codec().is_unicode()
    }

    /// The encoding that combining `a` and `b` would produce, or `None` if
    /// they are incompatible. See [`compatible`](crate::compatible).
    pub fn compatible<'a, 'b>(
        a: impl Into<Operand<'a>>,
        b: impl Into<Operand<'b>>,
    ) -> Option<Encoding> {
        compatible(a, b).ok()
    }

    pub(crate) fn codec(self) -> Codec {
        self.entry().codec
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Encoding:{}", self.name())?;
        if self.is_dummy() {
            write!(f, " (dummy)")?;
        }
        write!(f, ">")
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Encoding::find(s)
    }
}

impl Serialize for Encoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Encoding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Encoding::find(&name).map_err(de::Error::custom)
    }
}
