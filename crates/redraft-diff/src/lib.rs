//! Sentence-level diff engine for redraft.
//!
//! Splits text into sentence tokens and computes a two-way diff over the token
//! sequences, producing contiguous [`DiffSegment`]s that the text merger walks.
//!
//! # Key Types
//!
//! - [`tokenize_sentences`] -- Lossless sentence tokenizer
//! - [`diff_tokens`] / [`diff_sentences`] -- Myers diff over token sequences
//! - [`TokenDiff`] / [`DiffSegment`] -- Ordered changed/unchanged regions
//! - [`ChangeMap`] -- Per-position "changed" flags over the new side of a diff

pub mod segment;
pub mod sentence;

pub use segment::{diff_sentences, diff_tokens, ChangeMap, DiffSegment, TokenDiff};
pub use sentence::{is_terminator, tokenize_sentences};
