use crate::error::{Error, Result};
use crate::symbol_table::THREAD_SYMBOL_TABLE;
use crate::{EncodedString, Encoding};
use std::{cmp::Ordering, fmt, marker::PhantomData, rc::Rc};

/// An interned name carrying an encoding.
///
/// Symbols are registered on a per-thread basis, which means they are neither
/// `Send` nor `Sync`. Two symbols are the same symbol iff they were interned
/// from the same bytes under the same encoding; names whose bytes are all
/// 7-bit are always interned as US-ASCII.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(u32, PhantomData<Rc<()>>);

impl Symbol {
    /// Interns `name`.
    ///
    /// Fails with [`Error::InvalidEncoding`] when the bytes are ill-formed in
    /// their encoding.
    pub fn intern(name: &EncodedString) -> Result<Self> {
        if !name.is_valid_encoding() {
            return Err(Error::InvalidEncoding {
                encoding: name.encoding(),
            });
        }
        let encoding = if name.is_empty() || name.is_ascii_only() {
            Encoding::US_ASCII
        } else {
            name.encoding()
        };
        let idx = THREAD_SYMBOL_TABLE.with(|table| table.intern(name.as_bytes(), encoding));
        Ok(Symbol(idx, PhantomData))
    }

    /// Interns a UTF-8 name. Never fails, since `&str` is always well-formed.
    pub fn intern_str(name: &str) -> Self {
        let encoding = if name.is_ascii() {
            Encoding::US_ASCII
        } else {
            Encoding::UTF_8
        };
        let idx = THREAD_SYMBOL_TABLE.with(|table| table.intern(name.as_bytes(), encoding));
        Symbol(idx, PhantomData)
    }

    /// The encoding the name was interned under.
    pub fn encoding(self) -> Encoding {
        THREAD_SYMBOL_TABLE.with(|table| table.with_existing_name(self.0, |_, enc| enc))
    }

    /// The name as a new, unfrozen string.
    pub fn to_encoded_string(self) -> EncodedString {
        THREAD_SYMBOL_TABLE.with(|table| {
            table.with_existing_name(self.0, |bytes, enc| EncodedString::new(bytes, enc))
        })
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Symbol) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    /// Orders symbols as their names order as strings.
    fn cmp(&self, other: &Symbol) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        self.to_encoded_string().cmp(&other.to_encoded_string())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_encoded_string(), f)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{:?}", self.to_encoded_string())
    }
}
