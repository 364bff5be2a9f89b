#![allow(dead_code, unused_imports)]

pub mod session_test;
pub mod stream;

pub use session_test::{decode_bits, decode_bits_with, test_config, Decoded};
pub use stream::{diversity_groups, encode_text, groups_to_bits, preamble, INVALID};
