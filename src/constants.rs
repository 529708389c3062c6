pub(crate) const MAX_HEADERS: usize = 32;

pub(crate) const BOUNDARY_EXT: &[u8] = b"--";
pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const CRLF: &[u8] = b"\r\n";
pub(crate) const CRLF_CRLF: &[u8] = b"\r\n\r\n";

pub(crate) const DEFAULT_CHARSET: &str = "utf-8";
