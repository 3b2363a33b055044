#![no_main]

//! Fuzz target for description files
//!
//! Arbitrary text must either load cleanly or fail with a
//! `DescriptionStore` error.

use bean_factory::{BeanError, DescriptionSource, JsonSource, TomlSource};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for result in [
        TomlSource::new(text).load_descriptions(),
        JsonSource::new(text).load_descriptions(),
    ] {
        match result {
            Ok(descriptions) => {
                for description in descriptions {
                    assert!(description.references().len() <= text.len());
                }
            }
            Err(BeanError::DescriptionStore { .. }) => {}
            Err(other) => panic!("unexpected error kind: {other:?}"),
        }
    }
});
