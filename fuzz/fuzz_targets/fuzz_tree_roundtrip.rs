#![no_main]

use factura_pe::ubl::DocumentTree;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse → serialize → parse must not panic, and the second
        // serialization must be stable (CDATA whitespace is only trimmed
        // on the first pass).
        if let Ok(tree) = DocumentTree::parse(s) {
            if let Ok(xml) = tree.to_xml() {
                let second = DocumentTree::parse(&xml).expect("serialized tree must parse");
                let xml2 = second.to_xml().expect("reparsed tree must serialize");
                let third = DocumentTree::parse(&xml2).expect("serialized tree must parse");
                assert_eq!(third, second);
            }
        }
    }
});
