use crate::error::{Error, ResultExt};
use http::header::{self, HeaderMap};
use memchr::memchr;

/// The `Content-Disposition: form-data` header of a part, reduced to the
/// two parameters the multipart grammar cares about.
pub(crate) struct ContentDisposition {
    pub(crate) field_name: String,
    pub(crate) file_name: Option<String>,
}

impl ContentDisposition {
    /// RFC 7578 requires the header, the `form-data` disposition and the
    /// `name` parameter; anything else here is malformed data.
    ///
    /// Header values reach the map already charset-decoded, so parameter
    /// bytes are plain UTF-8 by the time they get here.
    pub fn parse(headers: &HeaderMap) -> crate::Result<ContentDisposition> {
        let raw = headers
            .get(header::CONTENT_DISPOSITION)
            .map(|val| val.as_bytes())
            .ok_or_else(|| Error::malformed("Content-Disposition header is missing"))?;

        let (disposition, params) = split_params(raw)?;

        if !trim(disposition).eq_ignore_ascii_case(b"form-data") {
            return Err(Error::malformed(format!(
                "unsupported disposition `{}`, expected `form-data`",
                String::from_utf8_lossy(disposition).trim()
            )));
        }

        let mut field_name = None;
        let mut file_name = None;

        for (key, value) in params {
            if key.eq_ignore_ascii_case(b"name") && field_name.is_none() {
                field_name = Some(param_text(value)?);
            } else if key.eq_ignore_ascii_case(b"filename") && file_name.is_none() {
                file_name = Some(param_text(value)?);
            }
        }

        let field_name = field_name
            .ok_or_else(|| Error::malformed("`name` parameter is missing in Content-Disposition"))?;

        Ok(ContentDisposition { field_name, file_name })
    }
}

fn param_text(bytes: Vec<u8>) -> crate::Result<String> {
    String::from_utf8(bytes).context("invalid bytes in Content-Disposition parameter")
}

/// Split `token; key=value; key="value"` into the leading token and its
/// parameter list. Values may be bare tokens or quoted strings with
/// backslash escapes of `"` and `\`.
fn split_params(raw: &[u8]) -> crate::Result<(&[u8], Vec<(Vec<u8>, Vec<u8>)>)> {
    let (disposition, mut rest) = match memchr(b';', raw) {
        Some(idx) => (&raw[..idx], &raw[idx + 1..]),
        None => (raw, &raw[raw.len()..]),
    };

    let mut params = Vec::new();

    loop {
        rest = trim_start(rest);
        if rest.is_empty() {
            break;
        }

        let eq = memchr(b'=', rest)
            .ok_or_else(|| Error::malformed("parameter without `=` in Content-Disposition"))?;
        if memchr(b';', &rest[..eq]).is_some() {
            return Err(Error::malformed("bare parameter token in Content-Disposition"));
        }
        let key = trim(&rest[..eq]).to_vec();
        rest = trim_start(&rest[eq + 1..]);

        let value = if rest.first() == Some(&b'"') {
            let (unquoted, remaining) = read_quoted(&rest[1..])?;
            rest = trim_start(remaining);
            match rest.first() {
                None => {}
                Some(&b';') => rest = &rest[1..],
                Some(_) => {
                    return Err(Error::malformed(
                        "unexpected bytes after quoted parameter value in Content-Disposition",
                    ))
                }
            }
            unquoted
        } else {
            let (token, remaining) = match memchr(b';', rest) {
                Some(idx) => (&rest[..idx], &rest[idx + 1..]),
                None => (rest, &rest[rest.len()..]),
            };
            rest = remaining;
            trim(token).to_vec()
        };

        params.push((key, value));
    }

    Ok((disposition, params))
}

/// Scan a quoted-string body, resolving `\"` and `\\`. Returns the
/// unescaped bytes and the input past the closing quote.
fn read_quoted(rest: &[u8]) -> crate::Result<(Vec<u8>, &[u8])> {
    let mut out = Vec::with_capacity(rest.len());
    let mut idx = 0;

    while idx < rest.len() {
        match rest[idx] {
            b'\\' if matches!(rest.get(idx + 1), Some(&b'"') | Some(&b'\\')) => {
                out.push(rest[idx + 1]);
                idx += 2;
            }
            b'"' => return Ok((out, &rest[idx + 1..])),
            byte => {
                out.push(byte);
                idx += 1;
            }
        }
    }

    Err(Error::malformed("unterminated quoted string in Content-Disposition"))
}

fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn trim(bytes: &[u8]) -> &[u8] {
    let bytes = trim_start(bytes);
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map(|idx| idx + 1)
        .unwrap_or(0);
    &bytes[..end]
}
