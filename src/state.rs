use crate::buffer::RingBuffer;
use crate::constants;
use crate::error::Error;
use crate::helpers;
use crate::multipart::Event;
use crate::part::{Part, PartData};
use encoding_rs::Encoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Preamble,
    DelimiterTail,
    ReadingHeaders,
    ReadingBody,
    Epilogue,
    Finished,
    Errored,
}

/// The automaton over the ring buffer.
///
/// `advance` consumes as far as the buffered bytes allow and produces
/// exactly one event per call; it yields [`Event::NeedData`] when the buffer
/// cannot decide the next structural element.
pub(crate) struct StateMachine {
    buffer: RingBuffer,
    /// `"--" + boundary`, the only form permitted at stream start.
    delimiter: Vec<u8>,
    /// `CRLF + "--" + boundary`, the line that ends a body.
    delimiter_line: Vec<u8>,
    charset: &'static Encoding,
    stage: Stage,
    failure: Option<Error>,
}

impl StateMachine {
    pub fn new(boundary: &[u8], charset: &'static Encoding) -> StateMachine {
        let mut delimiter = Vec::with_capacity(constants::BOUNDARY_EXT.len() + boundary.len());
        delimiter.extend_from_slice(constants::BOUNDARY_EXT);
        delimiter.extend_from_slice(boundary);

        let mut delimiter_line = Vec::with_capacity(constants::CRLF.len() + delimiter.len());
        delimiter_line.extend_from_slice(constants::CRLF);
        delimiter_line.extend_from_slice(&delimiter);

        StateMachine {
            buffer: RingBuffer::new(),
            delimiter,
            delimiter_line,
            charset,
            stage: Stage::Preamble,
            failure: None,
        }
    }

    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished
    }

    /// Append a chunk to the working window. Bytes arriving after the
    /// terminator, or after an error, are dropped.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.stage == Stage::Finished || self.stage == Stage::Errored {
            return;
        }

        self.buffer.append(chunk);
    }

    pub fn advance(&mut self) -> crate::Result<Event> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        loop {
            let step = match self.stage {
                Stage::Preamble => self.read_preamble(),
                Stage::DelimiterTail => self.read_delimiter_tail(),
                Stage::ReadingHeaders => self.read_headers(),
                Stage::ReadingBody => self.read_body(),
                Stage::Epilogue => self.read_epilogue(),
                Stage::Finished => return Ok(Event::Finished),
                Stage::Errored => return Err(Error::malformed("parser is unusable after an error")),
            };

            match step {
                Ok(Some(event)) => return Ok(event),
                Ok(None) => continue,
                Err(err) => {
                    self.stage = Stage::Errored;
                    self.failure = Some(err.clone());
                    return Err(err);
                }
            }
        }
    }

    /// Discard preamble bytes until the first `"--" + boundary`. The final
    /// `len(delimiter) - 1` bytes are retained, since a straddled delimiter
    /// could still begin inside them.
    fn read_preamble(&mut self) -> crate::Result<Option<Event>> {
        match self.buffer.find(&self.delimiter, 0) {
            Some(idx) => {
                log::trace!("first boundary found, discarding {} preamble byte(s)", idx);
                self.buffer.consume(idx + self.delimiter.len());
                self.stage = Stage::DelimiterTail;
                Ok(None)
            }
            None => {
                let keep = self.delimiter.len() - 1;
                if self.buffer.len() > keep {
                    self.buffer.consume(self.buffer.len() - keep);
                }
                Ok(Some(Event::NeedData))
            }
        }
    }

    /// Decide what follows a just-consumed `"--" + boundary`: CRLF opens the
    /// next part's headers, `--` is the terminator. Whitespace in between is
    /// tolerated.
    fn read_delimiter_tail(&mut self) -> crate::Result<Option<Event>> {
        while let Some(&byte) = self.buffer.view().first() {
            if byte == b' ' || byte == b'\t' {
                self.buffer.consume(1);
            } else {
                break;
            }
        }

        let view = self.buffer.view();
        if view.len() < 2 {
            return Ok(Some(Event::NeedData));
        }

        match &view[..2] {
            b"\r\n" => {
                self.buffer.consume(2);
                self.stage = Stage::ReadingHeaders;
                Ok(None)
            }
            b"--" => {
                log::trace!("terminator found");
                self.buffer.consume(2);
                self.stage = Stage::Epilogue;
                Ok(None)
            }
            _ => Err(Error::malformed(
                "expected CRLF or `--` after the boundary",
            )),
        }
    }

    /// Wait for a complete header block, then synthesize the [`Part`].
    fn read_headers(&mut self) -> crate::Result<Option<Event>> {
        // An immediate blank line would mean a part with no headers at all,
        // which cannot satisfy the mandatory Content-Disposition.
        if self.buffer.view().starts_with(constants::CRLF) {
            return Err(Error::malformed("part has no headers"));
        }

        let idx = match self.buffer.find(constants::CRLF_CRLF, 0) {
            Some(idx) => idx,
            None => return Ok(Some(Event::NeedData)),
        };

        let block = self.buffer.split_to(idx + constants::CRLF_CRLF.len());
        let block = helpers::unfold(&block);

        let mut raw_headers = [httparse::EMPTY_HEADER; constants::MAX_HEADERS];
        let headers = match httparse::parse_headers(&block, &mut raw_headers) {
            Ok(httparse::Status::Complete((_, parsed))) => {
                helpers::convert_raw_headers_to_header_map(parsed, self.charset)?
            }
            Ok(httparse::Status::Partial) => {
                return Err(Error::malformed("incomplete part headers"));
            }
            Err(err) => {
                return Err(Error::malformed(format!("unparseable header line: {}", err)));
            }
        };

        let part = Part::new(headers, self.charset)?;
        log::trace!("part `{}` opened", part.name());
        self.stage = Stage::ReadingBody;
        Ok(Some(Event::Part(part)))
    }

    /// Stream body bytes. Without a delimiter line in sight, everything but
    /// a `len(delimiter_line) - 1` byte suspense window is safe to emit; a
    /// shorter tail could still turn out to start the delimiter.
    fn read_body(&mut self) -> crate::Result<Option<Event>> {
        if self.buffer.is_empty() {
            return Ok(Some(Event::NeedData));
        }

        match self.buffer.find(&self.delimiter_line, 0) {
            Some(idx) => {
                let data = if idx > 0 {
                    Some(PartData::new(self.buffer.split_to(idx)))
                } else {
                    None
                };
                self.buffer.consume(self.delimiter_line.len());
                self.stage = Stage::DelimiterTail;
                Ok(data.map(Event::PartData))
            }
            None => {
                let suspense = self.delimiter_line.len() - 1;
                if self.buffer.len() > suspense {
                    let safe = self.buffer.len() - suspense;
                    let data = PartData::new(self.buffer.split_to(safe));
                    Ok(Some(Event::PartData(data)))
                } else {
                    Ok(Some(Event::NeedData))
                }
            }
        }
    }

    /// Everything after the terminator is discarded; the message is over
    /// whether or not the trailing CRLF ever arrives.
    fn read_epilogue(&mut self) -> crate::Result<Option<Event>> {
        self.buffer.consume(self.buffer.len());
        self.stage = Stage::Finished;
        Ok(Some(Event::Finished))
    }
}
