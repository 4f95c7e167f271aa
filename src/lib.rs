//! Asynchronous OCR Processing Pipeline
//!
//! This library provides the core functionality for the ocr-pipeline system:
//! an HTTP API that accepts documents (images or PDFs) for asynchronous text
//! extraction, a Redis-backed job queue, worker processes that invoke the
//! extraction engine, and an expiring result store for status polling.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
