#![deny(unsafe_op_in_unsafe_fn)]
#![deny(missing_docs, missing_debug_implementations)]
//! Encoding-tagged byte strings.
//!
//! An `EncodedString` is a sequence of bytes plus an `Encoding` that says how to interpret
//! them. Nothing about the bytes is checked when they are tagged; well-formedness is a property
//! that can be asked for (`is_valid_encoding`) and that some operations require.
//!
//! Whether two encoded values may be combined, and which encoding the combination carries, is
//! decided by a single function, `compatible`. Appending, concatenating, equality, ordering,
//! hashing, substring search and pattern matching all consult it, so they agree with each
//! other.
//!
//! # Compatibility
//!
//! * Values of the same encoding are always compatible.
//! * Empty text is compatible with anything, and takes the other side's encoding.
//! * Otherwise, if either encoding is not ASCII-compatible (UTF-16, UTF-32, stateful
//!   encodings), the values are incompatible.
//! * A pattern or symbol tagged US-ASCII is compatible with any ASCII-compatible value.
//! * Text whose bytes are all 7-bit is compatible with any ASCII-compatible value. The result
//!   takes the encoding of the side that is not 7-bit, or the left side's when both are.
//!
//! Everything else is incompatible, including ASCII-8BIT ("binary") data with high bytes
//! against any other encoding.
//!
//! # Other types
//!
//! `Pattern` is a compiled regular expression carrying an encoding, `Symbol` an interned name.
//! Symbols are registered on a per-thread basis, so they are neither `Send` nor `Sync`.
//!
//! `EncodedReader` and `EncodedWriter` adapt byte streams. Their default encodings come from an
//! explicit `EncodingConfig` rather than from process-wide state.

pub(crate) mod codec;

pub(crate) mod encoding_registry;

pub(crate) mod encoding_ty;

pub(crate) mod compat;

pub(crate) mod encoded_string;

pub(crate) mod transcode;

pub(crate) mod pattern;

pub(crate) mod symbol_table;

pub(crate) mod symbol;

pub(crate) mod io;

pub(crate) mod config;

pub(crate) mod error;

pub use encoding_ty::Encoding;

pub use compat::{compatible, compatible_for_match, Operand};

pub use encoded_string::{Chars, EncodedString};

pub use transcode::{EncodeOptions, OnError, XmlEscape};

pub use pattern::{Match, Pattern, PatternOptions};

pub use symbol::Symbol;

pub use io::{Access, EncodedReader, EncodedWriter, Mode};

pub use config::EncodingConfig;

pub use error::{Error, IncompatibleEncodings, Result};
