//! # credence-resolution
//!
//! Entity resolution within one document/speaker scope.
//!
//! A [`ScopeResolver`] keeps a running distribution over a fixed candidate
//! set plus an explicit Unknown bucket for every reference, updates it on each
//! textual cue, propagates `same_as` / `different_from` constraints, and
//! retroactively resolves coreference chains once any member crosses the
//! resolution threshold. Every update is recorded as an audit step; every
//! retroactive change keeps the value it replaced.
//!
//! One resolver is owned by one task (`&mut self`), so a scope has a single writer.

pub mod audit;
pub mod chain;
pub mod cue;
pub mod distribution;
pub mod outcome;
pub mod registry;
pub mod resolver;
pub mod scope;

pub use audit::{ReasoningTag, Revision, UpdateStep};
pub use cue::{Cue, CueEvent, ScopeEvent};
pub use distribution::Distribution;
pub use outcome::{ReferenceOutcome, ResolvedReference, ScopeResolution};
pub use registry::{CandidateRegistry, CanonicalEntity};
pub use resolver::ScopeResolver;
pub use scope::{resolve_scope, ScopeInput};
