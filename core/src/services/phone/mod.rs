//! Phone number canonicalization for a single numbering plan

mod normalizer;

pub use normalizer::PhoneNormalizer;
