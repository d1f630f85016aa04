#![no_main]

use libfuzzer_sys::fuzz_target;
use patmatch::GuardRegistry;
use patmatch::config::parse_rules;

fuzz_target!(|data: &[u8]| {
    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(file) = parse_rules(yaml, &GuardRegistry::builtin()) {
        for case in &file.cases {
            let _ = file.rules.resolve(case);
        }
    }
});
