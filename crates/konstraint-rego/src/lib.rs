//! Annotation parsing for Rego policy headers.
//!
//! A policy declares which Kubernetes resources it targets in its leading
//! comment block:
//!
//! ```text
//! # @title Containers must not run as root
//! # @kinds core/Pod apps/Deployment
//! # @matchlabels team=platform
//! # @matchExpression env In staging,production
//! package container_deny_run_as_root
//! ```
//!
//! [`Rego`] pulls that block out of a source file and [`Rego::matchers`]
//! turns it into [`Matchers`].

pub mod config;
pub mod error;
pub mod header;
pub mod matcher;
pub mod rego;
pub mod tag;

pub use config::{MalformedLabelPolicy, ParserConfig};
pub use error::{AnnotationError, ConfigError};
pub use matcher::{
    parse_matchers, KindMatcher, KindMatchers, MatchExpressionMatcher, MatchLabelsMatcher,
    Matchers,
};
pub use rego::Rego;
pub use tag::string_list;
