#![allow(dead_code)]

#[path = "../../src/tests/class_bytes.rs"]
mod class_bytes;

pub use class_bytes::ClassBytes;
