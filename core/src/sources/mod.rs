pub mod allowlist;
pub mod catalog;
pub mod fetcher;
pub mod manifest;
