//! Per-role associative memory for AI agents.
//!
//! Each role owns an independent store of **engrams**, discrete units of
//! experience. An engram is indexed by the retrieval cues extracted from its
//! content and optional mind-map schema, and recalled by keyword or, with no
//! query at all, as a DMN overview of the whole network.
//!
//! | Type | Purpose |
//! |------|---------|
//! | **ATOMIC** | Facts, entities, concrete information |
//! | **LINK** | Relationships between concepts |
//! | **PATTERN** | Processes, methods, recurring sequences |
//!
//! # Architecture
//!
//! - **Cues**: regex passes over mixed Latin/CJK text plus schema lines
//! - **Storage**: in-memory records and inverted cue index, written through to
//!   one SQLite file per role
//! - **Recall**: substring cue activation ranked by strength and recency, tuned
//!   by `creative` / `balanced` / `focused` modes
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite schema, migrations and the persistence backend
//! - [`memory`]: Core engine with engrams, cues, store, recall, and the role-keyed service

pub mod config;
pub mod db;
pub mod memory;
