use crate::content_disposition::ContentDisposition;
use bytes::{Bytes, BytesMut};
use encoding_rs::Encoding;
use http::header::{self, HeaderMap};
use std::borrow::Cow;

/// One fragment of a part's body.
///
/// Fragment boundaries carry no meaning beyond "this much was safely
/// emittable"; concatenating every fragment between two [`Part`](crate::Part)
/// events reproduces the body octets exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartData {
    /// The fragment bytes, owned by the caller after emission.
    pub raw: Bytes,
    /// Length of `raw` in bytes.
    pub size: usize,
}

impl PartData {
    pub(crate) fn new(raw: Bytes) -> PartData {
        PartData { size: raw.len(), raw }
    }
}

/// The head of a single multipart section: its headers plus an optional
/// caller-side body accumulator.
#[derive(Debug)]
pub struct Part {
    headers: HeaderMap,
    name: String,
    file_name: Option<String>,
    content_type: Option<mime::Mime>,
    charset: &'static Encoding,
    data: BytesMut,
}

impl Part {
    pub(crate) fn new(headers: HeaderMap, charset: &'static Encoding) -> crate::Result<Part> {
        let content_disposition = ContentDisposition::parse(&headers)?;
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<mime::Mime>().ok());

        Ok(Part {
            headers,
            name: content_disposition.field_name,
            file_name: content_disposition.file_name,
            content_type,
            charset,
            data: BytesMut::new(),
        })
    }

    /// The `name` parameter of the `Content-Disposition` header.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `filename` parameter of the `Content-Disposition` header, present
    /// when this part carries an uploaded file.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The part's `Content-Type`, if one was sent. Callers should treat an
    /// absent value as `text/plain` per RFC 7578.
    pub fn content_type(&self) -> Option<&mime::Mime> {
        self.content_type.as_ref()
    }

    /// All headers of the part, duplicates preserved in wire order. Values
    /// are exposed after decoding with the parser's charset.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Append a body fragment to this part's accumulator.
    ///
    /// The parser never writes to the accumulator itself; materializing the
    /// body is the caller's choice.
    pub fn buffer(&mut self, data: &PartData) {
        self.data.extend_from_slice(&data.raw);
    }

    /// The accumulated body bytes.
    pub fn raw(&self) -> &[u8] {
        &self.data
    }

    /// Length of the accumulated body in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The accumulated body decoded as text, with replacement on undecodable
    /// sequences. A `charset` parameter on the part's own `Content-Type`
    /// takes precedence over the parser-wide charset.
    pub fn text(&self) -> String {
        let encoding = self
            .content_type
            .as_ref()
            .and_then(|mime| mime.get_param(mime::CHARSET))
            .and_then(|charset| Encoding::for_label(charset.as_str().as_bytes()))
            .unwrap_or(self.charset);

        let (text, _, _) = encoding.decode(&self.data);

        match text {
            Cow::Owned(s) => s,
            Cow::Borrowed(s) => String::from(s),
        }
    }
}
