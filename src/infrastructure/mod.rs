//! Adapters behind the domain ports.

pub mod fragment;
pub mod in_memory;
#[cfg(test)]
pub mod scripted;
pub mod stub_submitter;
