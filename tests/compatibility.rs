use encstr::{
    compatible, EncodeOptions, EncodedString, Encoding, Error, Pattern, PatternOptions, Symbol,
};

fn text(bytes: &[u8], enc: Encoding) -> EncodedString {
    EncodedString::new(bytes, enc)
}

#[test]
fn same_encoding_resolves_to_it() {
    let a = EncodedString::from("groß");
    let b = EncodedString::from("über");
    assert_eq!(Ok(Encoding::UTF_8), compatible(&a, &b));
    assert_eq!("groß über", a.concat(&" ".into()).unwrap().concat(&b).unwrap().to_string());
}

#[test]
fn empty_text_takes_the_other_encoding() {
    let a = text(b"hello\xff", Encoding::ISO_8859_1);
    let empty = EncodedString::from("");
    assert_eq!(Ok(Encoding::ISO_8859_1), compatible(&a, &empty));

    let wide = EncodedString::empty(Encoding::UTF_16BE);
    assert!(!wide.is_ascii_only());
    assert_eq!(Ok(Encoding::ISO_8859_1), compatible(&wide, &a));

    let mut base = EncodedString::empty(Encoding::UTF_16BE);
    base.push_encoded(&a).unwrap();
    assert_eq!(Encoding::ISO_8859_1, base.encoding());
}

#[test]
fn wide_encodings_do_not_mix() {
    let a = text(b"\0a\0a", Encoding::UTF_16BE);
    let b = EncodedString::from("bb");
    let err = a.concat(&b).unwrap_err();
    assert_eq!(
        "incompatible character encodings: UTF-16BE and UTF-8",
        err.to_string()
    );
}

#[test]
fn ascii_only_operand_yields_to_the_other() {
    let a = EncodedString::from("hello");
    let b = text(b"\xff", Encoding::ISO_8859_1);
    assert_eq!(Encoding::ISO_8859_1, a.concat(&b).unwrap().encoding());
}

#[test]
fn both_ascii_only_left_wins() {
    let a = text(b"hello", Encoding::ISO_8859_1);
    let b = EncodedString::from("world");
    assert_eq!(Encoding::ISO_8859_1, a.concat(&b).unwrap().encoding());
    assert_eq!(Encoding::UTF_8, b.concat(&a).unwrap().encoding());
    let swapped = a.concat(&b.with_encoding(Encoding::ISO_8859_1)).unwrap();
    assert_eq!(Encoding::ISO_8859_1, swapped.encoding());
    assert_eq!(a.concat(&b).unwrap(), swapped);
}

#[test]
fn interpolation_fails_on_conflicting_parts() {
    let latin = text(b"caf\xe9", Encoding::ISO_8859_1);
    let utf8 = EncodedString::from("café");
    let base = EncodedString::from("menu: ");
    assert!(base.concat(&latin).is_ok());
    assert!(base.concat(&utf8).is_ok());
    assert!(matches!(
        base.concat_all([&latin, &utf8]),
        Err(Error::Incompatible(_))
    ));
}

#[test]
fn transcoding_makes_conflicting_parts_compatible() {
    let latin = text(b"caf\xe9", Encoding::ISO_8859_1);
    let utf8 = EncodedString::from("café");
    let converted = latin
        .encode(Encoding::UTF_8, &EncodeOptions::default())
        .unwrap();
    assert_eq!(utf8, converted);
    let joined = converted.concat(&utf8).unwrap();
    assert_eq!("cafécafé", joined.to_string());
}

#[test]
fn equality_requires_compatibility() {
    let a = EncodedString::from("groß");
    let b = a.with_encoding(Encoding::ISO_8859_1);
    assert_eq!(a.as_bytes(), b.as_bytes());
    assert_ne!(a, b);
    assert!(a < b);

    let c = EncodedString::from("hello");
    assert_eq!(c, c.with_encoding(Encoding::US_ASCII));
}

#[test]
fn ordering_is_bytewise_in_utf16() {
    let a = EncodedString::from_char_code(97, Some(Encoding::UTF_16LE)).unwrap();
    let b = EncodedString::from_char_code(257, Some(Encoding::UTF_16LE)).unwrap();
    assert_eq!(&[0x61, 0x00][..], a.as_bytes());
    assert_eq!(&[0x01, 0x01][..], b.as_bytes());
    assert!(a > b);
}

#[test]
fn fixed_pattern_against_latin1() {
    let re = Pattern::with_options(
        &EncodedString::from("gro"),
        PatternOptions {
            fixed_encoding: true,
        },
    )
    .unwrap();
    let plain = text(b"gro", Encoding::ISO_8859_1);
    assert_eq!(0, re.match_in(&plain).unwrap().unwrap().start());
    let high = text(b"gro\xdf", Encoding::ISO_8859_1);
    assert!(matches!(re.match_in(&high), Err(Error::Incompatible(_))));
}

#[test]
fn match_checks_validity_before_compatibility() {
    let re = Pattern::from_utf8("hello").unwrap();
    assert_eq!(Encoding::US_ASCII, re.encoding());
    let bad = text(b"hello\xff", Encoding::UTF_8);
    assert!(matches!(re.match_in(&bad), Err(Error::InvalidEncoding { .. })));

    let wide = text(b"\xff\xfe", Encoding::UTF_16LE);
    assert!(matches!(re.match_in(&wide), Err(Error::Incompatible(_))));
}

#[test]
fn symbols_keep_their_encoding() {
    let a = Symbol::intern(&EncodedString::from("groß")).unwrap();
    let b = Symbol::intern(&text("groß".as_bytes(), Encoding::ISO_8859_1)).unwrap();
    assert_ne!(a, b);
    assert!(a < b);

    let ascii = Symbol::intern_str("name");
    let latin = text(b"caf\xe9", Encoding::ISO_8859_1);
    assert_eq!(Ok(Encoding::ISO_8859_1), compatible(ascii, &latin));
    assert!(compatible(b, &EncodedString::from("ß")).is_err());
}

#[test]
fn binary_data_is_not_exempt() {
    let bin = EncodedString::binary(&b"\xde\xad\xbe\xef"[..]);
    assert!(bin.concat(&EncodedString::from("groß")).is_err());
    assert_eq!(
        Encoding::ASCII_8BIT,
        bin.concat(&EncodedString::from("ok")).unwrap().encoding()
    );
}
