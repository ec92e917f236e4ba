//! Matcher builders for the `@kinds`, `@matchlabels` and `@matchExpression`
//! annotation families.
//!
//! Each builder scans the whole header, picks out the lines carrying its own
//! tag and ignores everything else.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Deref;

use crate::config::{MalformedLabelPolicy, ParserConfig};
use crate::error::{AnnotationError, Result};
use crate::tag::tagged_values;

pub const KINDS_TAG: &str = "@kinds";
pub const MATCH_LABELS_TAG: &str = "@matchlabels";
pub const MATCH_EXPRESSION_TAG: &str = "@matchExpression";

/// How the core API group is spelled in annotation text.
pub const CORE_GROUP_ALIAS: &str = "core";

/// Kinds a policy applies to within one API group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindMatcher {
    /// Empty for the core group
    pub api_group: String,
    pub kinds: Vec<String>,
}

impl KindMatcher {
    pub fn is_core(&self) -> bool {
        self.api_group.is_empty()
    }
}

/// One [`KindMatcher`] per API group, core group first, then groups ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindMatchers(pub Vec<KindMatcher>);

impl Deref for KindMatchers {
    type Target = [KindMatcher];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for KindMatchers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for matcher in &self.0 {
            let group = if matcher.is_core() {
                CORE_GROUP_ALIAS
            } else {
                matcher.api_group.as_str()
            };
            for kind in &matcher.kinds {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{}/{}", group, kind)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Label selector built from every `@matchlabels` line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchLabelsMatcher(pub BTreeMap<String, String>);

impl Deref for MatchLabelsMatcher {
    type Target = BTreeMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for MatchLabelsMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchExpressionMatcher {
    pub key: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl fmt::Display for MatchExpressionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.operator)?;
        if !self.values.is_empty() {
            write!(f, " {}", self.values.join(","))?;
        }
        Ok(())
    }
}

/// Everything the header says about which resources a policy targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchers {
    #[serde(rename = "kinds", default)]
    pub kind_matchers: KindMatchers,

    #[serde(rename = "matchLabels", default)]
    pub match_labels_matcher: MatchLabelsMatcher,

    #[serde(rename = "matchExpressions", default)]
    pub match_expressions_matcher: Vec<MatchExpressionMatcher>,
}

impl Matchers {
    pub fn is_empty(&self) -> bool {
        self.kind_matchers.is_empty()
            && self.match_labels_matcher.is_empty()
            && self.match_expressions_matcher.is_empty()
    }
}

/// Run every builder over `lines`: kinds, then labels, then expressions.
/// The first builder to fail decides the error.
pub fn parse_matchers<S: AsRef<str>>(lines: &[S], config: &ParserConfig) -> Result<Matchers> {
    let matchers = Matchers {
        kind_matchers: kind_matchers(lines)?,
        match_labels_matcher: match_labels_matcher(lines, config.malformed_labels)?,
        match_expressions_matcher: match_expressions_matcher(lines)?,
    };

    tracing::debug!(
        "Parsed matchers: {} api groups, {} labels, {} expressions",
        matchers.kind_matchers.len(),
        matchers.match_labels_matcher.len(),
        matchers.match_expressions_matcher.len()
    );

    Ok(matchers)
}

pub fn kind_matchers<S: AsRef<str>>(lines: &[S]) -> Result<KindMatchers> {
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for line in lines {
        let line = line.as_ref();
        let Some(tokens) = tagged_values(KINDS_TAG, line)? else {
            tracing::trace!("{} skipping line: {:?}", KINDS_TAG, line);
            continue;
        };

        tracing::debug!("{} annotation: {:?}", KINDS_TAG, tokens);
        for token in &tokens {
            let (group, kind) = split_group_kind(token);
            groups
                .entry(group.to_string())
                .or_default()
                .insert(kind.to_string());
        }
    }

    let mut matchers: Vec<KindMatcher> = groups
        .into_iter()
        .map(|(api_group, kinds)| KindMatcher {
            api_group,
            kinds: kinds.into_iter().collect(),
        })
        .collect();

    // Core group always leads
    matchers.sort_by(|a, b| {
        b.is_core()
            .cmp(&a.is_core())
            .then_with(|| a.api_group.cmp(&b.api_group))
    });

    Ok(KindMatchers(matchers))
}

/// `apps/Deployment` -> ("apps", "Deployment"); `Pod` and `core/Pod` -> ("", "Pod")
fn split_group_kind(token: &str) -> (&str, &str) {
    match token.split_once('/') {
        Some((CORE_GROUP_ALIAS, kind)) => ("", kind),
        Some((group, kind)) => (group, kind),
        None => ("", token),
    }
}

pub fn match_labels_matcher<S: AsRef<str>>(
    lines: &[S],
    policy: MalformedLabelPolicy,
) -> Result<MatchLabelsMatcher> {
    let mut labels = BTreeMap::new();

    for line in lines {
        let line = line.as_ref();
        let Some(tokens) = tagged_values(MATCH_LABELS_TAG, line)? else {
            tracing::trace!("{} skipping line: {:?}", MATCH_LABELS_TAG, line);
            continue;
        };

        tracing::debug!("{} annotation: {:?}", MATCH_LABELS_TAG, tokens);
        for token in tokens {
            let (key, value) = match token.split_once('=') {
                // "=x" names no label under either policy
                Some(("", _)) => {
                    return Err(AnnotationError::MalformedLabel {
                        token: token.clone(),
                    });
                }
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => match policy {
                    MalformedLabelPolicy::Reject => {
                        return Err(AnnotationError::MalformedLabel { token });
                    }
                    MalformedLabelPolicy::EmptyValue => (token, String::new()),
                },
            };
            labels.insert(key, value);
        }
    }

    Ok(MatchLabelsMatcher(labels))
}

pub fn match_expressions_matcher<S: AsRef<str>>(
    lines: &[S],
) -> Result<Vec<MatchExpressionMatcher>> {
    let mut expressions = Vec::new();

    for line in lines {
        let line = line.as_ref();
        let tokens = match tagged_values(MATCH_EXPRESSION_TAG, line) {
            Ok(Some(tokens)) => tokens,
            Ok(None) => {
                tracing::trace!("{} skipping line: {:?}", MATCH_EXPRESSION_TAG, line);
                continue;
            }
            Err(AnnotationError::NoArguments { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        let expression = match tokens.as_slice() {
            [key, operator] => MatchExpressionMatcher {
                key: key.clone(),
                operator: operator.clone(),
                values: Vec::new(),
            },
            [key, operator, values] => MatchExpressionMatcher {
                key: key.clone(),
                operator: operator.clone(),
                values: values.split(',').map(str::to_string).collect(),
            },
            _ => {
                return Err(AnnotationError::InvalidExpressionArity {
                    line: line.to_string(),
                    found: tokens.len(),
                });
            }
        };

        tracing::debug!("{} annotation: {}", MATCH_EXPRESSION_TAG, expression);
        expressions.push(expression);
    }

    Ok(expressions)
}
