//! Resolve declarative network descriptions into an execution plan.
//!
//! A description is a YAML document with `model.layers` (named layer
//! definitions, possibly parametrized modules) and `model.graph` (an
//! ordered list of `from` / `with` / `to` wiring entries). Resolution runs
//! three stages:
//!
//! 1) [`doc`]: parse, expand `<<` merges, stack documents, apply overrides
//!    and `$(path)` links
//! 2) [`expand`]: inline module instances with their arguments substituted
//!    and their internal names scoped under the instance name
//! 3) [`plan`]: check bindings in declaration order and emit the plan

pub mod doc;
pub mod error;
pub mod expand;
pub mod options;
pub mod plan;
pub mod render;
pub mod resolver;
pub mod spec;

pub use doc::Document;
pub use error::{ResolveError, Result};
pub use options::ResolverOptions;
pub use plan::{Plan, Step};
pub use resolver::{Resolved, Resolver};
pub use spec::{Node, Wiring};
