//! The encoding compatibility resolver.
//!
//! Deciding whether two encoded values may be combined is a pure function of
//! their encodings and, for text, of whether the content is empty or
//! ASCII-only. Rules are tried in order and the first one that matches wins:
//!
//! 1. Same encoding: that encoding.
//! 2. An empty text operand: the other operand's encoding, whatever the
//!    empty operand's encoding is.
//! 3. Different encodings, one of them not ASCII-compatible: incompatible.
//! 4. A non-text operand tagged US-ASCII: the other operand's encoding.
//! 5. ASCII-only text against an ASCII-compatible operand: the encoding of
//!    the operand that is not ASCII-only, or the left one if both are.
//! 6. Anything else is incompatible.

use crate::error::IncompatibleEncodings;
use crate::{EncodedString, Encoding, Pattern, Symbol};

/// A borrowed encoding-aware value, as seen by the resolver.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a> {
    /// Text: bytes plus an encoding.
    Text(&'a EncodedString),
    /// A compiled pattern.
    Pattern(&'a Pattern),
    /// An interned symbol. Symbols are not text for the resolver.
    Symbol(Symbol),
}

impl<'a> From<&'a EncodedString> for Operand<'a> {
    fn from(text: &'a EncodedString) -> Self {
        Operand::Text(text)
    }
}

impl<'a> From<&'a Pattern> for Operand<'a> {
    fn from(pattern: &'a Pattern) -> Self {
        Operand::Pattern(pattern)
    }
}

impl From<Symbol> for Operand<'_> {
    fn from(symbol: Symbol) -> Self {
        Operand::Symbol(symbol)
    }
}

impl From<&Symbol> for Operand<'_> {
    fn from(symbol: &Symbol) -> Self {
        Operand::Symbol(*symbol)
    }
}

impl Operand<'_> {
    /// The operand's encoding tag.
    pub fn encoding(&self) -> Encoding {
        match self {
            Operand::Text(text) => text.encoding(),
            Operand::Pattern(pattern) => pattern.encoding(),
            Operand::Symbol(symbol) => symbol.encoding(),
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, Operand::Text(_))
    }

    fn is_empty_text(&self) -> bool {
        matches!(self, Operand::Text(text) if text.is_empty())
    }

    fn is_ascii_only_text(&self) -> bool {
        matches!(self, Operand::Text(text) if text.is_ascii_only())
    }
}

/// Decides whether `a` and `b` may be combined, and returns the encoding the
/// combination carries.
///
/// The verdict is not symmetric: when both operands are ASCII-only text in
/// different encodings, the left-hand encoding wins.
pub fn compatible<'a, 'b>(
    a: impl Into<Operand<'a>>,
    b: impl Into<Operand<'b>>,
) -> Result<Encoding, IncompatibleEncodings> {
    let (a, b) = (a.into(), b.into());
    let verdict = resolve(&a, &b);
    tracing::trace!(
        left = %a.encoding(),
        right = %b.encoding(),
        ?verdict,
        "resolved encoding compatibility"
    );
    verdict
}

fn resolve(a: &Operand<'_>, b: &Operand<'_>) -> Result<Encoding, IncompatibleEncodings> {
    let (enc_a, enc_b) = (a.encoding(), b.encoding());
    if enc_a == enc_b {
        return Ok(enc_a);
    }
    if a.is_empty_text() {
        return Ok(enc_b);
    }
    if b.is_empty_text() {
        return Ok(enc_a);
    }
    let incompatible = IncompatibleEncodings {
        left: enc_a,
        right: enc_b,
    };
    if !enc_a.is_ascii_compatible() || !enc_b.is_ascii_compatible() {
        return Err(incompatible);
    }
    if !b.is_text() && enc_b == Encoding::US_ASCII {
        return Ok(enc_a);
    }
    if !a.is_text() && enc_a == Encoding::US_ASCII {
        return Ok(enc_b);
    }
    match (a.is_ascii_only_text(), b.is_ascii_only_text()) {
        (true, true) | (false, true) => Ok(enc_a),
        (true, false) => Ok(enc_b),
        (false, false) => Err(incompatible),
    }
}

/// The resolver as used by pattern matching.
///
/// A fixed-encoding pattern only accepts text of its own encoding, empty
/// text, or text whose actual bytes are all 7-bit when both encodings are
/// ASCII-compatible; the match then runs in the pattern's encoding. Other
/// patterns go through [`compatible`].
pub fn compatible_for_match(
    pattern: &Pattern,
    text: &EncodedString,
) -> Result<Encoding, IncompatibleEncodings> {
    if !pattern.is_fixed_encoding() {
        return compatible(pattern, text);
    }
    let (enc_p, enc_t) = (pattern.encoding(), text.encoding());
    let accepted = enc_p == enc_t
        || text.is_empty()
        || (enc_p.is_ascii_compatible()
            && enc_t.is_ascii_compatible()
            && text.as_bytes().is_ascii());
    tracing::trace!(
        pattern = %enc_p,
        text = %enc_t,
        accepted,
        "resolved fixed-encoding pattern compatibility"
    );
    if accepted {
        Ok(enc_p)
    } else {
        Err(IncompatibleEncodings {
            left: enc_p,
            right: enc_t,
        })
    }
}
