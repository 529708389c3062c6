#![no_main]

use formpart::{Event, MultipartParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut parser = MultipartParser::new("X-BOUNDARY");

    match parser.parse(data) {
        Ok(events) => {
            // A part must precede any of its data fragments.
            let mut seen_part = false;
            for event in events {
                match event {
                    Event::Part(_) => seen_part = true,
                    Event::PartData(_) => assert!(seen_part),
                    Event::NeedData | Event::Finished => {}
                }
            }
        }
        Err(_) => {
            // Errors are latched: every later call must fail too.
            assert!(parser.next_event().is_err());
        }
    }
});
