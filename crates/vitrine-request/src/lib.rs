//! Search request assembly for vitrine.
//!
//! A [`RequestAssembler`] turns the configuration of a container plus the
//! [`SearchParams`] of one call into an immutable [`Request`]; rendering it
//! with [`render_request`] produces the engine request body.
//!
//! The builders used along the way are public so that callers can compile
//! pieces on their own:
//!
//! - [`FilterQueryBuilder`]: filter sets to queries, nested-aware
//! - [`FulltextQueryBuilder`]: free text to exact or misspelling-tolerant
//!   queries
//! - [`SortOrderBuilder`]: logical sorts to physical sort orders with
//!   tie-breaks

#![warn(missing_docs)]

mod assembler;
mod error;
mod filter;
mod fulltext;
mod params;
mod request;
mod sort;

pub use assembler::RequestAssembler;
pub use error::RequestError;
pub use filter::FilterQueryBuilder;
pub use fulltext::FulltextQueryBuilder;
pub use params::{
    Collapse, DEFAULT_PAGE_SIZE, InnerHits, SearchParams, SortSpec, SourceConfig, SpellingType,
};
pub use request::{Request, render_request};
pub use sort::SortOrderBuilder;
