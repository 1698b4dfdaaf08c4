use crate::codec::{Codec, Endian, LATIN_1, LATIN_9, WINDOWS_1252};

pub(crate) struct EncodingEntry {
    /// Primary name first, then aliases.
    pub(crate) names: &'static [&'static str],
    pub(crate) ascii_compatible: bool,
    pub(crate) dummy: bool,
    pub(crate) codec: Codec,
}

const fn entry(
    names: &'static [&'static str],
    ascii_compatible: bool,
    dummy: bool,
    codec: Codec,
) -> EncodingEntry {
    EncodingEntry {
        names,
        ascii_compatible,
        dummy,
        codec,
    }
}

// The position in this table is the encoding's identity and its rank in
// the collation tie-break order. Append only.
pub(crate) static ENCODING_TABLE: [EncodingEntry; 12] = [
    entry(&["ASCII-8BIT", "BINARY"], true, false, Codec::Binary),
    entry(&["UTF-8", "CP65001"], true, false, Codec::Utf8),
    entry(
        &["US-ASCII", "ASCII", "ANSI_X3.4-1968", "646"],
        true,
        false,
        Codec::Ascii,
    ),
    entry(&["UTF-16BE", "UCS-2BE"], false, false, Codec::Utf16(Endian::Big)),
    entry(&["UTF-16LE"], false, false, Codec::Utf16(Endian::Little)),
    entry(&["UTF-32BE", "UCS-4BE"], false, false, Codec::Utf32(Endian::Big)),
    entry(&["UTF-32LE", "UCS-4LE"], false, false, Codec::Utf32(Endian::Little)),
    entry(&["ISO-8859-1", "ISO8859-1"], true, false, Codec::SingleByte(&LATIN_1)),
    entry(&["ISO-8859-15", "ISO8859-15"], true, false, Codec::SingleByte(&LATIN_9)),
    entry(&["Windows-1252", "CP1252"], true, false, Codec::SingleByte(&WINDOWS_1252)),
    entry(&["ISO-2022-JP", "ISO2022-JP"], false, true, Codec::Stateful),
    entry(&["UTF-7", "CP65000"], false, true, Codec::Stateful),
];

pub(crate) fn lookup(name: &str) -> Option<u8> {
    let idx = ENCODING_TABLE
        .iter()
        .position(|entry| entry.names.iter().any(|n| n.eq_ignore_ascii_case(name)))?;
    u8::try_from(idx).ok()
}

#[cfg(test)]
mod tests {
    use super::{lookup, ENCODING_TABLE};

    #[test]
    fn test_names_are_unique() {
        let mut all = ENCODING_TABLE
            .iter()
            .flat_map(|entry| entry.names.iter())
            .map(|n| n.to_ascii_uppercase())
            .collect::<Vec<_>>();
        let count = all.len();
        all.sort();
        all.dedup();
        assert_eq!(count, all.len());
    }

    #[test]
    fn test_dummy_encodings_are_not_ascii_compatible() {
        for entry in ENCODING_TABLE.iter().filter(|entry| entry.dummy) {
            assert!(!entry.ascii_compatible, "{}", entry.names[0]);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Some(0), lookup("binary"));
        assert_eq!(Some(1), lookup("utf-8"));
        assert_eq!(Some(9), lookup("cp1252"));
        assert_eq!(None, lookup("EBCDIC"));
    }
}
