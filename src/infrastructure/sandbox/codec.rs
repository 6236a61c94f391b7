//! Byte encodings behind the sandbox `Buffer`.

use std::str::FromStr;

use base64::{
    Engine, alphabet,
    engine::{
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
        general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    },
};
use boa_engine::{
    Context, JsError, JsNativeError, JsResult, JsString, JsValue, object::builtins::JsArray,
};

/// Accepts padded and unpadded input alike, as Node's decoder does
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Hex,
    Base64,
    Base64Url,
    Latin1,
    Ascii,
}

impl FromStr for Encoding {
    type Err = JsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            "latin1" | "binary" => Ok(Self::Latin1),
            "ascii" => Ok(Self::Ascii),
            _ => Err(JsNativeError::typ()
                .with_message(format!("Unknown encoding: {name}"))
                .into()),
        }
    }
}

/// Bytes of `text` read in `encoding`.
pub fn encode(text: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Hex => hex_bytes(text),
        Encoding::Base64 | Encoding::Base64Url => base64_bytes(text),
        Encoding::Latin1 | Encoding::Ascii => text.encode_utf16().map(|unit| unit as u8).collect(),
    }
}

/// Text of `bytes` written in `encoding`.
pub fn decode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Encoding::Hex => bytes.iter().map(|byte| format!("{byte:02x}")).collect(),
        Encoding::Base64 => STANDARD.encode(bytes),
        Encoding::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
        Encoding::Latin1 => bytes.iter().map(|&byte| char::from(byte)).collect(),
        Encoding::Ascii => bytes.iter().map(|&byte| char::from(byte & 0x7f)).collect(),
    }
}

/// Pairs of hex digits up to the first pair that is not one.
fn hex_bytes(text: &str) -> Vec<u8> {
    text.as_bytes()
        .chunks_exact(2)
        .map_while(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

/// Decodes either base64 alphabet, skipping characters outside it and
/// stopping at padding.
fn base64_bytes(text: &str) -> Vec<u8> {
    let mut digits: String = text
        .chars()
        .take_while(|&c| c != '=')
        .filter_map(|c| match c {
            '-' => Some('+'),
            '_' => Some('/'),
            c if c.is_ascii_alphanumeric() || c == '+' || c == '/' => Some(c),
            _ => None,
        })
        .collect();
    // a lone trailing digit carries no whole byte
    if digits.len() % 4 == 1 {
        digits.pop();
    }
    LENIENT_BASE64.decode(digits).unwrap_or_default()
}

fn encoding_arg(value: Option<&JsValue>, context: &mut Context) -> JsResult<Encoding> {
    match value.filter(|value| !value.is_undefined()) {
        Some(value) => value.to_string(context)?.to_std_string_lossy().parse(),
        None => Ok(Encoding::Utf8),
    }
}

/// `hostEncode(text, encoding)`: the bytes of a string as an array of numbers.
pub fn host_encode(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let text = match args.first() {
        Some(value) => value.to_string(context)?.to_std_string_lossy(),
        None => String::new(),
    };
    let encoding = encoding_arg(args.get(1), context)?;

    let bytes = encode(&text, encoding)
        .into_iter()
        .map(|byte| JsValue::from(i32::from(byte)));
    let array = JsArray::from_iter(bytes, context);
    Ok(array.into())
}

/// `hostDecode(bytes, encoding)`: a string from an array of byte values.
pub fn host_decode(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let array = args
        .first()
        .and_then(JsValue::as_object)
        .cloned()
        .ok_or_else(|| JsNativeError::typ().with_message("Expected an array of bytes"))?;
    let array = JsArray::from_object(array)?;
    let encoding = encoding_arg(args.get(1), context)?;

    let length = array.length(context)?;
    let mut bytes = Vec::with_capacity(length as usize);
    for index in 0..length {
        bytes.push(array.get(index, context)?.to_uint8(context)?);
    }
    Ok(JsString::from(decode(&bytes, encoding)).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_names() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("binary".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert!("utf16le".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_base64_decoding_is_lenient() {
        assert_eq!(encode("aGk=", Encoding::Base64), b"hi");
        assert_eq!(encode("aGk", Encoding::Base64), b"hi");
        assert_eq!(encode("aG k=trailing", Encoding::Base64), b"hi");
        assert_eq!(encode("-_8", Encoding::Base64Url), vec![0xfb, 0xff]);
        assert_eq!(encode("aGkx", Encoding::Base64), b"hi1");
        assert_eq!(encode("aGkxa", Encoding::Base64), b"hi1");
    }

    #[test]
    fn test_hex_stops_at_invalid_pair() {
        assert_eq!(encode("6869zz70", Encoding::Hex), b"hi");
        assert_eq!(encode("686", Encoding::Hex), b"h");
    }

    #[test]
    fn test_decoding() {
        assert_eq!(decode("h\u{e9}llo".as_bytes(), Encoding::Base64), "aMOpbGxv");
        assert_eq!(decode(&[0xfb, 0xff], Encoding::Base64Url), "-_8");
        assert_eq!(decode(&[1, 255, 16], Encoding::Hex), "01ff10");
        assert_eq!(decode(&[0x68, 0xff], Encoding::Utf8), "h\u{fffd}");
        assert_eq!(decode(&[0xe9], Encoding::Latin1), "\u{e9}");
        assert_eq!(decode(&[0xe9], Encoding::Ascii), "i");
    }
}
