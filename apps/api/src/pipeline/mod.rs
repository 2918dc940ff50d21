//! Structured-generation pipeline: shared utilities (normalize, validate,
//! prompt), the LLM-facing stages (jd_parser, writer, matcher, prep),
//! template resolution, and the orchestrator that sequences a full run.

pub mod error;
pub mod handlers;
pub mod jd_parser;
pub mod matcher;
pub mod normalize;
pub mod orchestrator;
pub mod prep;
pub mod prompt;
pub mod prompts;
pub mod schemas;
pub mod template_resolver;
pub mod validate;
pub mod writer;
