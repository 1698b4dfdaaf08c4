use smallvec::SmallVec;

/// Longest character, in bytes, of any registered encoding.
pub(crate) const MAX_CHAR_BYTES: usize = 4;

pub(crate) type CharBytes = SmallVec<[u8; MAX_CHAR_BYTES]>;

const TAG_CONT: u8 = 0b1000_0000;
const CONT_PREFIX_MASK: u8 = 0b1100_0000;
const CONT_VALUE_MASK: u8 = 0b0011_1111;

const END_ONE_B: u32 = 0x80;
const END_TWO_B: u32 = 0x800;
const END_THREE_B: u32 = 0x10000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Endian {
    Big,
    Little,
}

/// A Latin-1 based single byte charset; only the bytes listed in `overrides`
/// differ from ISO-8859-1, `None` marking a byte with no character.
#[derive(Debug)]
pub(crate) struct SingleByteTable {
    overrides: &'static [(u8, Option<char>)],
}

pub(crate) static LATIN_1: SingleByteTable = SingleByteTable { overrides: &[] };

pub(crate) static LATIN_9: SingleByteTable = SingleByteTable {
    overrides: &[
        (0xA4, Some('\u{20AC}')),
        (0xA6, Some('\u{0160}')),
        (0xA8, Some('\u{0161}')),
        (0xB4, Some('\u{017D}')),
        (0xB8, Some('\u{017E}')),
        (0xBC, Some('\u{0152}')),
        (0xBD, Some('\u{0153}')),
        (0xBE, Some('\u{0178}')),
    ],
};

pub(crate) static WINDOWS_1252: SingleByteTable = SingleByteTable {
    overrides: &[
        (0x80, Some('\u{20AC}')),
        (0x81, None),
        (0x82, Some('\u{201A}')),
        (0x83, Some('\u{0192}')),
        (0x84, Some('\u{201E}')),
        (0x85, Some('\u{2026}')),
        (0x86, Some('\u{2020}')),
        (0x87, Some('\u{2021}')),
        (0x88, Some('\u{02C6}')),
        (0x89, Some('\u{2030}')),
        (0x8A, Some('\u{0160}')),
        (0x8B, Some('\u{2039}')),
        (0x8C, Some('\u{0152}')),
        (0x8D, None),
        (0x8E, Some('\u{017D}')),
        (0x8F, None),
        (0x90, None),
        (0x91, Some('\u{2018}')),
        (0x92, Some('\u{2019}')),
        (0x93, Some('\u{201C}')),
        (0x94, Some('\u{201D}')),
        (0x95, Some('\u{2022}')),
        (0x96, Some('\u{2013}')),
        (0x97, Some('\u{2014}')),
        (0x98, Some('\u{02DC}')),
        (0x99, Some('\u{2122}')),
        (0x9A, Some('\u{0161}')),
        (0x9B, Some('\u{203A}')),
        (0x9C, Some('\u{0153}')),
        (0x9D, None),
        (0x9E, Some('\u{017E}')),
        (0x9F, Some('\u{0178}')),
    ],
};

impl SingleByteTable {
    fn decode(&self, byte: u8) -> Option<char> {
        match self.overrides.iter().find(|(b, _)| *b == byte) {
            Some((_, mapped)) => *mapped,
            None => Some(char::from(byte)),
        }
    }

    fn encode(&self, ch: char) -> Option<u8> {
        if let Some((byte, _)) = self.overrides.iter().find(|(_, c)| *c == Some(ch)) {
            return Some(*byte);
        }
        let byte = u8::try_from(u32::from(ch)).ok()?;
        if self.overrides.iter().any(|(b, _)| *b == byte) {
            None
        } else {
            Some(byte)
        }
    }
}

/// How the bytes of an encoding map to characters.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Codec {
    /// Every byte is a character; only 0x00-0x7F have a Unicode meaning.
    Binary,
    /// 7-bit ASCII; bytes with the high bit set are ill-formed.
    Ascii,
    Utf8,
    SingleByte(&'static SingleByteTable),
    Utf16(Endian),
    Utf32(Endian),
    /// Shift-sequence encodings. Characters are not interpreted, every
    /// byte stands on its own.
    Stateful,
}

/// Result of decoding the character at the start of a byte slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Decoded {
    Char(char, usize),
    /// A well-formed character with no Unicode counterpart.
    Unmapped(usize),
    Invalid(usize),
}

impl Decoded {
    pub(crate) fn len(self) -> usize {
        match self {
            Decoded::Char(_, len) | Decoded::Unmapped(len) | Decoded::Invalid(len) => len,
        }
    }

    pub(crate) fn is_valid(self) -> bool {
        !matches!(self, Decoded::Invalid(_))
    }
}

#[inline]
pub(crate) fn is_cont_byte(v: u8) -> bool {
    (v & CONT_PREFIX_MASK) == TAG_CONT
}

fn utf8_len_from_first_byte(v: u8) -> Option<usize> {
    match v {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

#[inline]
fn utf8_first_byte(byte: u8, width: u32) -> u32 {
    (byte & (0x7F >> width)) as u32
}

#[inline]
fn utf8_acc_cont_byte(ch: u32, byte: u8) -> u32 {
    (ch << 6) | (byte & CONT_VALUE_MASK) as u32
}

fn decode_utf8(bytes: &[u8]) -> Decoded {
    let len = match utf8_len_from_first_byte(bytes[0]) {
        Some(len) => len,
        None => return Decoded::Invalid(1),
    };
    if len == 1 {
        return Decoded::Char(char::from(bytes[0]), 1);
    }
    if bytes.len() < len {
        return Decoded::Invalid(1);
    }
    let (head, cont) = (bytes[0], &bytes[1..len]);
    if !cont.iter().copied().all(is_cont_byte) {
        return Decoded::Invalid(1);
    }
    let mut v = utf8_first_byte(head, cont.len() as u32);
    for c in cont.iter().copied() {
        v = utf8_acc_cont_byte(v, c);
    }
    let overlong = match len {
        3 => v < END_TWO_B,
        4 => v < END_THREE_B,
        _ => v < END_ONE_B,
    };
    if overlong {
        return Decoded::Invalid(1);
    }
    // rejects surrogates and anything above U+10FFFF
    match char::from_u32(v) {
        Some(ch) => Decoded::Char(ch, len),
        None => Decoded::Invalid(1),
    }
}

fn read_u16(bytes: &[u8], endian: Endian) -> u32 {
    let pair = [bytes[0], bytes[1]];
    u32::from(match endian {
        Endian::Big => u16::from_be_bytes(pair),
        Endian::Little => u16::from_le_bytes(pair),
    })
}

fn decode_utf16(bytes: &[u8], endian: Endian) -> Decoded {
    if bytes.len() < 2 {
        return Decoded::Invalid(bytes.len());
    }
    let unit = read_u16(bytes, endian);
    match unit {
        0xD800..=0xDBFF => {
            if bytes.len() < 4 {
                return Decoded::Invalid(2);
            }
            let low = read_u16(&bytes[2..], endian);
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Decoded::Invalid(2);
            }
            let v = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(v).map_or(Decoded::Invalid(4), |ch| Decoded::Char(ch, 4))
        }
        0xDC00..=0xDFFF => Decoded::Invalid(2),
        _ => char::from_u32(unit).map_or(Decoded::Invalid(2), |ch| Decoded::Char(ch, 2)),
    }
}

fn decode_utf32(bytes: &[u8], endian: Endian) -> Decoded {
    if bytes.len() < 4 {
        return Decoded::Invalid(bytes.len());
    }
    let quad = [bytes[0], bytes[1], bytes[2], bytes[3]];
    let v = match endian {
        Endian::Big => u32::from_be_bytes(quad),
        Endian::Little => u32::from_le_bytes(quad),
    };
    char::from_u32(v).map_or(Decoded::Invalid(4), |ch| Decoded::Char(ch, 4))
}

impl Codec {
    /// Decodes the character at the start of `bytes`, which must not be empty.
    pub(crate) fn decode(self, bytes: &[u8]) -> Decoded {
        debug_assert!(!bytes.is_empty());
        let head = bytes[0];
        match self {
            Codec::Binary | Codec::Ascii if head < 0x80 => Decoded::Char(char::from(head), 1),
            Codec::Binary => Decoded::Unmapped(1),
            Codec::Ascii => Decoded::Invalid(1),
            Codec::Utf8 => decode_utf8(bytes),
            Codec::SingleByte(table) => match table.decode(head) {
                Some(ch) => Decoded::Char(ch, 1),
                None => Decoded::Unmapped(1),
            },
            Codec::Utf16(endian) => decode_utf16(bytes, endian),
            Codec::Utf32(endian) => decode_utf32(bytes, endian),
            Codec::Stateful => Decoded::Unmapped(1),
        }
    }

    /// Encodes a Unicode character, or `None` if the encoding cannot represent it.
    pub(crate) fn encode(self, ch: char) -> Option<CharBytes> {
        let mut out = CharBytes::new();
        match self {
            Codec::Binary | Codec::Ascii => {
                out.push(u8::try_from(u32::from(ch)).ok().filter(|b| *b < 0x80)?)
            }
            Codec::Utf8 => {
                let mut buf = [0; MAX_CHAR_BYTES];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            Codec::SingleByte(table) => out.push(table.encode(ch)?),
            Codec::Utf16(endian) => {
                let mut units = [0; 2];
                for unit in ch.encode_utf16(&mut units).iter() {
                    match endian {
                        Endian::Big => out.extend_from_slice(&unit.to_be_bytes()),
                        Endian::Little => out.extend_from_slice(&unit.to_le_bytes()),
                    }
                }
            }
            Codec::Utf32(endian) => match endian {
                Endian::Big => out.extend_from_slice(&u32::from(ch).to_be_bytes()),
                Endian::Little => out.extend_from_slice(&u32::from(ch).to_le_bytes()),
            },
            Codec::Stateful => return None,
        }
        Some(out)
    }

    /// Encodes a code point of this encoding's own character set: a byte
    /// value for single byte encodings, a Unicode scalar otherwise.
    pub(crate) fn encode_code(self, code: u32) -> Option<CharBytes> {
        match self {
            Codec::Binary | Codec::SingleByte(_) => {
                u8::try_from(code).ok().map(|b| CharBytes::from_slice(&[b]))
            }
            Codec::Ascii => u8::try_from(code)
                .ok()
                .filter(|b| *b < 0x80)
                .map(|b| CharBytes::from_slice(&[b])),
            Codec::Utf8 | Codec::Utf16(_) | Codec::Utf32(_) => self.encode(char::from_u32(code)?),
            Codec::Stateful => None,
        }
    }

    /// Inverse of [`encode_code`](Self::encode_code) for the character at
    /// the start of `bytes`: its code and length, or `None` if it is
    /// ill-formed.
    pub(crate) fn decode_code(self, bytes: &[u8]) -> Option<(u32, usize)> {
        match self {
            Codec::Binary | Codec::SingleByte(_) | Codec::Stateful => {
                Some((u32::from(bytes[0]), 1))
            }
            Codec::Ascii => (bytes[0] < 0x80).then(|| (u32::from(bytes[0]), 1)),
            Codec::Utf8 | Codec::Utf16(_) | Codec::Utf32(_) => match self.decode(bytes) {
                Decoded::Char(ch, len) => Some((u32::from(ch), len)),
                Decoded::Unmapped(_) | Decoded::Invalid(_) => None,
            },
        }
    }

    /// Number of bytes the character starting with `prefix` should span.
    /// May grow as more of the prefix becomes known.
    pub(crate) fn expected_len(self, prefix: &[u8]) -> usize {
        match self {
            Codec::Utf8 => prefix
                .first()
                .and_then(|b| utf8_len_from_first_byte(*b))
                .unwrap_or(1),
            Codec::Utf16(endian) => {
                if prefix.len() >= 2 && (0xD800..=0xDBFF).contains(&read_u16(prefix, endian)) {
                    4
                } else {
                    2
                }
            }
            Codec::Utf32(_) => 4,
            Codec::Binary | Codec::Ascii | Codec::SingleByte(_) | Codec::Stateful => 1,
        }
    }

    /// Whether the last byte of `prefix` may still belong to the character
    /// started by its first byte.
    pub(crate) fn accepts_next(self, prefix: &[u8]) -> bool {
        match self {
            Codec::Utf8 => prefix.last().copied().map_or(false, is_cont_byte),
            _ => true,
        }
    }

    pub(crate) fn is_unicode(self) -> bool {
        matches!(self, Codec::Utf8 | Codec::Utf16(_) | Codec::Utf32(_))
    }
}
