use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lopdf::Stream;

/// Photos larger than this are refused when set on the form.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("Photo is not a data URI")]
    NotDataUri,

    #[error("Photo data URI is not base64 encoded")]
    NotBase64,

    #[error("Photo payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Photo could not be decoded as an image: {0}")]
    Image(String),
}

/// Splits a `data:[<mediatype>];base64,<payload>` URI and decodes its payload.
pub fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>, PhotoError> {
    let rest = data_uri
        .trim()
        .strip_prefix("data:")
        .ok_or(PhotoError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(PhotoError::NotDataUri)?;

    if !header.ends_with(";base64") {
        return Err(PhotoError::NotBase64);
    }

    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(payload)?)
}

pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// True for `data:image/<subtype>;base64,...` URIs, whatever the payload.
pub fn is_image_data_uri(data_uri: &str) -> bool {
    let mime_type = data_uri
        .trim()
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .and_then(|(header, _)| header.strip_suffix(";base64"));

    matches!(
        mime_type.and_then(|mime_type| mime_type.split_once('/')),
        Some((kind, subtype)) if kind.eq_ignore_ascii_case("image") && !subtype.is_empty()
    )
}

/// Decoded payload size of a base64 data URI, without decoding it.
pub fn estimated_size(data_uri: &str) -> usize {
    let payload = data_uri.split_once(',').map_or(data_uri, |(_, payload)| payload);
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    (payload.len() / 4 * 3).saturating_sub(padding)
}

/// Turns the record's photo into a PDF image XObject.
pub fn decode_photo(data_uri: &str) -> Result<Stream, PhotoError> {
    let bytes = decode_data_uri(data_uri)?;
    lopdf::xobject::image_from(bytes).map_err(|e| PhotoError::Image(e.to_string()))
}
