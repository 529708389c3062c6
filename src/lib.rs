//! A sans-I/O event parser for the `multipart/form-data` content-type in Rust.
//!
//! The parser owns no sockets, files or tasks: the caller pushes opaque byte
//! chunks in with [`MultipartParser::feed`] and pulls [`Event`]s out with
//! [`MultipartParser::next_event`], so it can be plugged into any I/O model,
//! blocking or not. Chunks may split a boundary, a header or a body byte at
//! any offset; the parser buffers just enough to never emit bytes that could
//! still turn out to belong to a delimiter.
//!
//! # Examples
//!
//! ```
//! use formpart::{Event, MultipartParser};
//!
//! # fn run() -> formpart::Result<()> {
//! let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
//!
//! let mut parser = MultipartParser::new("X-BOUNDARY");
//! let mut field = None;
//!
//! for event in parser.parse(data.as_bytes())? {
//!     match event {
//!         // The headers of a part are complete; the caller owns it now.
//!         Event::Part(part) => field = Some(part),
//!         // A fragment of the current part's body.
//!         Event::PartData(data) => field.as_mut().expect("part precedes data").buffer(&data),
//!         // Out of buffered bytes, or done.
//!         Event::NeedData | Event::Finished => break,
//!     }
//! }
//!
//! let field = field.expect("one part");
//! assert_eq!(field.name(), "my_field");
//! assert_eq!(field.raw(), b"abcd");
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! Feeding chunk by chunk works the same way; [`MultipartParser::next_event`]
//! returns [`Event::NeedData`] whenever the buffered bytes cannot decide the
//! next structural element:
//!
//! ```
//! use formpart::{Event, MultipartParser};
//!
//! # fn run() -> formpart::Result<()> {
//! let mut parser = MultipartParser::new("X-BOUNDARY");
//!
//! parser.feed(b"--X-BOUN");
//! assert!(matches!(parser.next_event()?, Event::NeedData));
//!
//! parser.feed(b"DARY\r\nContent-Disposition: form-data; name=\"f\"\r\n\r\nhi\r\n--X-BOUNDARY--\r\n");
//! assert!(matches!(parser.next_event()?, Event::Part(_)));
//! assert!(matches!(parser.next_event()?, Event::PartData(_)));
//! assert!(matches!(parser.next_event()?, Event::Finished));
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```

pub use error::Error;
#[doc(hidden)]
pub use error::ResultExt;
pub use multipart::{Event, MultipartParser};
pub use part::{Part, PartData};

mod buffer;
mod constants;
mod content_disposition;
mod error;
mod helpers;
mod multipart;
mod part;
mod state;

/// A Result type often returned from methods that can have `formpart` errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses the `Content-Type` header to extract the boundary value.
///
/// The parser itself takes the boundary as an opaque token; this helper is
/// for callers sitting directly on an HTTP request.
///
/// # Examples
///
/// ```
/// # fn run() {
/// let content_type = "multipart/form-data; boundary=ABCDEFG";
///
/// assert_eq!(formpart::parse_boundary(content_type), Ok("ABCDEFG".to_owned()));
/// # }
/// # run();
/// ```
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> crate::Result<String> {
    let m = content_type
        .as_ref()
        .parse::<mime::Mime>()
        .context("failed to parse the content type as mime type")?;

    if !(m.type_() == mime::MULTIPART && m.subtype() == mime::FORM_DATA) {
        return Err(Error::malformed("content-type is not multipart/form-data"));
    }

    m.get_param(mime::BOUNDARY)
        .map(|name| name.as_str().to_owned())
        .ok_or_else(|| Error::malformed("no boundary value found in content-type"))
}
