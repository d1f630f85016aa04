#![no_main]

use libfuzzer_sys::fuzz_target;
use patmatch::{GuardRegistry, Pattern};

fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };
    let guards = GuardRegistry::builtin();
    if let Ok(pattern) = Pattern::parse(src, &guards) {
        let _ = Pattern::parse(&pattern.to_string(), &guards);
    }
});
