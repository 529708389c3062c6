use crate::constants;
use crate::error::{Error, ResultExt};
use encoding_rs::Encoding;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use httparse::Header;
use std::borrow::Cow;

/// Decode header bytes with the configured charset, without replacement.
pub(crate) fn decode_text(bytes: &[u8], charset: &'static Encoding) -> crate::Result<String> {
    charset
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| {
            Error::malformed(format!(
                "header bytes are not valid {}",
                charset.name()
            ))
        })
}

pub(crate) fn convert_raw_headers_to_header_map(
    raw_headers: &[Header<'_>],
    charset: &'static Encoding,
) -> crate::Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(raw_headers.len());

    for raw_header in raw_headers {
        let name = HeaderName::try_from(raw_header.name)
            .context("couldn't convert the raw header name to `HeaderName` type")?;

        // The map exposes charset-decoded text, not raw wire bytes.
        let text = decode_text(raw_header.value, charset)?;
        let value = HeaderValue::from_bytes(text.as_bytes())
            .context("couldn't convert the decoded header value to `HeaderValue` type")?;

        // `append` rather than `insert`: repeated names keep every value in
        // first-occurrence order.
        headers.append(name, value);
    }

    Ok(headers)
}

/// Collapse folded header lines (CRLF followed by SP/HTAB) into a single
/// space so the block parses as plain `name: value` lines.
pub(crate) fn unfold(block: &[u8]) -> Cow<'_, [u8]> {
    let folded = memchr::memmem::find_iter(block, constants::CRLF)
        .any(|idx| matches!(block.get(idx + 2), Some(&b' ') | Some(&b'\t')));

    if !folded {
        return Cow::Borrowed(block);
    }

    let mut out = Vec::with_capacity(block.len());
    let mut idx = 0;

    while idx < block.len() {
        if block[idx] == constants::CR
            && block.get(idx + 1) == Some(&constants::LF)
            && matches!(block.get(idx + 2), Some(&b' ') | Some(&b'\t'))
        {
            out.push(b' ');
            idx += 2;
            while matches!(block.get(idx), Some(&b' ') | Some(&b'\t')) {
                idx += 1;
            }
        } else {
            out.push(block[idx]);
            idx += 1;
        }
    }

    Cow::Owned(out)
}
