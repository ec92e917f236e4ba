use std::path::{Path, PathBuf};

use crate::config::ParserConfig;
use crate::error::Result;
use crate::header;
use crate::matcher::{parse_matchers, Matchers};
use crate::tag::tagged_values;

pub const TITLE_TAG: &str = "@title";
pub const ENFORCEMENT_TAG: &str = "@enforcement";

/// Enforcement action used when the header has no `@enforcement` line.
pub const DEFAULT_ENFORCEMENT: &str = "deny";

/// Header view of one Rego policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rego {
    path: Option<PathBuf>,
    package: Option<String>,
    header_comments: Vec<String>,
}

impl Rego {
    /// Build from header lines that are already stripped of `#`.
    pub fn new<I, S>(header_comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: None,
            package: None,
            header_comments: header_comments.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from the full text of a policy file.
    pub fn parse(source: &str) -> Self {
        Self {
            path: None,
            package: header::package_name(source),
            header_comments: header::header_comments(source),
        }
    }

    /// Like [`Rego::parse`], remembering where the source came from.
    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::parse(source)
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn header_comments(&self) -> &[String] {
        &self.header_comments
    }

    pub fn matchers(&self) -> Result<Matchers> {
        self.matchers_with(&ParserConfig::default())
    }

    pub fn matchers_with(&self, config: &ParserConfig) -> Result<Matchers> {
        if let Some(path) = &self.path {
            tracing::debug!("Parsing matchers for {}", path.display());
        }
        parse_matchers(self.header_comments.as_slice(), config)
    }

    /// Text of the first `@title` line.
    pub fn title(&self) -> Result<Option<String>> {
        Ok(self.first_tagged(TITLE_TAG)?.map(|words| words.join(" ")))
    }

    /// Action of the first `@enforcement` line, `deny` if there is none.
    pub fn enforcement(&self) -> Result<String> {
        let action = self
            .first_tagged(ENFORCEMENT_TAG)?
            .and_then(|values| values.into_iter().next());
        Ok(action.unwrap_or_else(|| DEFAULT_ENFORCEMENT.to_string()))
    }

    fn first_tagged(&self, tag: &str) -> Result<Option<Vec<String>>> {
        for line in &self.header_comments {
            if let Some(values) = tagged_values(tag, line)? {
                return Ok(Some(values));
            }
        }
        Ok(None)
    }
}
