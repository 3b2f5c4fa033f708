#![allow(dead_code)]

pub mod fake_provider;
