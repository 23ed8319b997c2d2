#![no_main]

use demitasse::jvm::{
    Class,
    parsing::{ParsingOptions, UnknownAttributePolicy},
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = Class::parse(data);
    let lenient = ParsingOptions::default().unknown_attributes(UnknownAttributePolicy::Preserve);
    let _ = Class::parse_with(data, &lenient);
});
