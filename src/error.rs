use crate::Encoding;
use std::fmt::Write;
use thiserror::Error;

/// The two encodings the compatibility resolver refused to combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("incompatible character encodings: {left} and {right}")]
pub struct IncompatibleEncodings {
    /// Encoding of the left-hand operand.
    pub left: Encoding,
    /// Encoding of the right-hand operand.
    pub right: Encoding,
}

/// Errors produced by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No encoding is registered under this name or alias.
    #[error("unknown encoding name - {name}")]
    UnknownEncoding {
        /// The name that was looked up.
        name: String,
    },
    /// Two values could not be combined.
    #[error(transparent)]
    Incompatible(#[from] IncompatibleEncodings),
    /// Bytes are ill-formed for their declared encoding, and the operation
    /// needed to interpret characters.
    #[error("invalid byte sequence in {encoding}")]
    InvalidEncoding {
        /// The declared encoding.
        encoding: Encoding,
    },
    /// Transcoding met bytes that are ill-formed in the source encoding.
    #[error("\"{}\" on {from}", escape_bytes(.bytes))]
    InvalidByteSequence {
        /// The offending bytes.
        bytes: Vec<u8>,
        /// Source encoding.
        from: Encoding,
        /// Target encoding.
        to: Encoding,
    },
    /// Transcoding met a character the target encoding cannot represent.
    #[error("{what} from {from} to {to}")]
    UndefinedConversion {
        /// The character (`U+XXXX`) or source bytes (`\xXX`) in question.
        what: String,
        /// Source encoding.
        from: Encoding,
        /// Target encoding.
        to: Encoding,
    },
    /// No converter exists between the two encodings.
    #[error("code converter not found ({from} to {to})")]
    ConverterNotFound {
        /// Source encoding.
        from: Encoding,
        /// Target encoding.
        to: Encoding,
    },
    /// The operation needs at least one character.
    #[error("empty string")]
    EmptyString,
    /// The value is frozen.
    #[error("can't modify frozen string")]
    Frozen,
    /// A code point has no character in the requested encoding.
    #[error("{}", describe_code(.code, .encoding))]
    CodepointOutOfRange {
        /// The code point.
        code: u32,
        /// The requested encoding, if any.
        encoding: Option<Encoding>,
    },
    /// A pattern could not be compiled.
    #[error("invalid pattern: {message}")]
    InvalidPattern {
        /// Why compilation failed.
        message: String,
    },
    /// A stream mode string could not be understood.
    #[error("invalid access mode {mode}")]
    InvalidMode {
        /// The offending mode.
        mode: String,
    },
    /// Configuration could not be parsed.
    #[error("invalid encoding configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// The underlying stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shorthand for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for b in bytes {
        let _ = write!(out, "\\x{:02X}", b);
    }
    out
}

fn describe_code(code: &u32, encoding: &Option<Encoding>) -> String {
    match encoding {
        Some(enc) => format!("invalid codepoint 0x{:X} in {}", code, enc),
        None => format!("{} out of char range", code),
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, IncompatibleEncodings};
    use crate::Encoding;

    #[test]
    fn test_messages() {
        let err = Error::from(IncompatibleEncodings {
            left: Encoding::ISO_8859_1,
            right: Encoding::UTF_8,
        });
        assert_eq!(
            "incompatible character encodings: ISO-8859-1 and UTF-8",
            err.to_string()
        );

        let err = Error::InvalidByteSequence {
            bytes: vec![0xff],
            from: Encoding::UTF_8,
            to: Encoding::ISO_8859_1,
        };
        assert_eq!("\"\\xFF\" on UTF-8", err.to_string());

        let err = Error::CodepointOutOfRange {
            code: 322,
            encoding: None,
        };
        assert_eq!("322 out of char range", err.to_string());
    }
}
