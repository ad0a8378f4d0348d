//! BI-Checking Document Analyzer API Library
//!
//! Core functionality for the cooperative-lending BI-Checking analyzer:
//! PDF text extraction, lexical signal scanning, vector-space similarity
//! against labeled reference documents, and the multi-factor decision
//! cascade that produces a traceable eligibility verdict.
//!
//! # Modules
//!
//! - `analyzer`: Analysis pipeline orchestration.
//! - `cache_validator`: Checksummed cache entries for the corpus cache.
//! - `config`: Configuration management.
//! - `corpus`: Labeled reference exemplar loading.
//! - `decision`: Decision cascade and rationale generation.
//! - `errors`: Error handling types.
//! - `extractor`: Document text extraction and normalization.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: API and domain models.
//! - `signals`: Lexical signal extraction rule tables.
//! - `similarity`: Term-frequency cosine similarity classifier.

pub mod analyzer;
pub mod cache_validator;
pub mod config;
pub mod corpus;
pub mod decision;
pub mod errors;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod signals;
pub mod similarity;
