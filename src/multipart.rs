use crate::constants;
use crate::error::Error;
use crate::part::{Part, PartData};
use crate::state::StateMachine;
use encoding_rs::{Encoding, UTF_8};

/// One step of the parser's progress.
#[derive(Debug)]
pub enum Event {
    /// The headers of the next part are complete.
    Part(Part),
    /// A fragment of the current part's body.
    PartData(PartData),
    /// The buffered bytes cannot decide the next structural element; feed
    /// more input.
    NeedData,
    /// The terminator has been parsed; the message is over.
    Finished,
}

/// A push/pull parser for one `multipart/form-data` message.
///
/// The parser performs no I/O: [`feed`](MultipartParser::feed) pushes opaque
/// byte chunks in, [`next_event`](MultipartParser::next_event) pulls
/// structural events out. Chunks may split any delimiter, header or body
/// byte at any offset.
pub struct MultipartParser {
    state: StateMachine,
}

impl MultipartParser {
    /// Create a parser for the given boundary token, decoding header text
    /// as UTF-8.
    pub fn new<B: AsRef<[u8]>>(boundary: B) -> MultipartParser {
        MultipartParser::with_charset(boundary, constants::DEFAULT_CHARSET)
    }

    /// Create a parser that decodes header text with the named charset.
    /// Unrecognized labels fall back to UTF-8.
    pub fn with_charset<B: AsRef<[u8]>>(boundary: B, charset: &str) -> MultipartParser {
        let encoding = Encoding::for_label(charset.as_bytes()).unwrap_or(UTF_8);

        MultipartParser {
            state: StateMachine::new(boundary.as_ref(), encoding),
        }
    }

    /// Append a chunk of the message body to the parser's buffer.
    ///
    /// Feeding never fails and never blocks. Input arriving after
    /// [`Event::Finished`] is silently ignored.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.state.feed(chunk);
    }

    /// Advance the automaton and return exactly one event.
    ///
    /// Returns [`Event::NeedData`] precisely when no further progress is
    /// possible with the buffered bytes, and [`Event::Finished`] forever
    /// once the terminator has been parsed. After an error, every call
    /// returns that same error again.
    pub fn next_event(&mut self) -> crate::Result<Event> {
        self.state.advance()
    }

    /// Feed a chunk, then drain events until the parser asks for more data
    /// or finishes. The trailing [`Event::NeedData`] / [`Event::Finished`]
    /// sentinel is the last element of the returned sequence.
    pub fn parse(&mut self, chunk: &[u8]) -> crate::Result<Vec<Event>> {
        self.feed(chunk);

        let mut events = Vec::new();
        loop {
            let event = self.next_event()?;
            match event {
                Event::NeedData | Event::Finished => {
                    events.push(event);
                    return Ok(events);
                }
                other => events.push(other),
            }
        }
    }

    /// Whether the terminator has been parsed.
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// The charset used to decode header text.
    pub fn charset(&self) -> &'static Encoding {
        self.state.charset()
    }

    /// Release the parser, verifying that the message was complete.
    ///
    /// Returns [`Error::UnexpectedExit`] unless [`Event::Finished`] has been
    /// observed.
    pub fn finish(self) -> crate::Result<()> {
        if self.state.is_finished() {
            Ok(())
        } else {
            Err(Error::UnexpectedExit)
        }
    }

    /// Run `f` with a scoped parser and enforce completion on exit.
    ///
    /// Errors from `f` propagate as-is; an `Ok` return without an observed
    /// terminator becomes [`Error::UnexpectedExit`].
    pub fn session<B, T, F>(boundary: B, f: F) -> crate::Result<T>
    where
        B: AsRef<[u8]>,
        F: FnOnce(&mut MultipartParser) -> crate::Result<T>,
    {
        let mut parser = MultipartParser::new(boundary);
        let value = f(&mut parser)?;
        parser.finish()?;
        Ok(value)
    }
}
