//! Activity logging: append-only JSONL with graceful degradation.

pub mod jsonl;
