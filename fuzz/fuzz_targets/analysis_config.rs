#![no_main]

use libfuzzer_sys::fuzz_target;
use presence_calculus::config::AnalysisConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Any config that parses must also yield a timescale
        if let Ok(config) = AnalysisConfig::from_toml_str(input) {
            assert!(config.timescale().is_ok());
        }
    }
});
