#![no_main]

use headerless_wire::{HeaderlessProtocol, Message, PubSubProtocol};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz envelope parsing - test for panics and input mutation
    let protocol = HeaderlessProtocol::new();
    let snapshot = data.to_vec();
    let mut msg = Message::default();
    if protocol.decode_header(data, &mut msg).is_ok() {
        assert!(msg.header.is_complete());
    }
    assert_eq!(data, &snapshot[..]);

    // Same bytes treated as an outgoing payload
    if let Ok(outgoing) = Message::new(1, snapshot) {
        let _ = protocol.encode_payload(&outgoing);
    }
});
