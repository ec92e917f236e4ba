use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// The line does not carry the tag being probed. Builders treat this as
    /// "not my line" and never surface it.
    #[error("Line does not start with tag {tag}")]
    TagMismatch { tag: String },

    #[error("Annotation {tag} requires at least one value")]
    NoArguments { tag: String },

    #[error("@matchExpression expects 2 or 3 arguments, found {found}: {line:?}")]
    InvalidExpressionArity { line: String, found: usize },

    #[error("Malformed @matchlabels entry, expected key=value: {token}")]
    MalformedLabel { token: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
