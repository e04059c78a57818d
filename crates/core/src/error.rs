use thiserror::Error;

/// A template that cannot be parsed without guessing what the author meant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateSyntaxError {
    #[error("unbalanced braces at position {position}")]
    UnbalancedBraces { position: usize },
    #[error("empty placeholder at position {position}")]
    EmptyPlaceholder { position: usize },
    #[error("unknown conversion '!{conversion}' for field '{field}'")]
    UnknownConversion { field: String, conversion: String },
    #[error("unknown format specifier '{spec}' for field '{field}'")]
    UnknownFormatSpec { field: String, spec: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("issue number padding must be between 0 and {max}, got {value}")]
    IssuePaddingOutOfRange { value: usize, max: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenameError {
    #[error("invalid rename template: {0}")]
    Template(#[from] TemplateSyntaxError),
    #[error("invalid rename configuration: {0}")]
    Config(#[from] ConfigError),
}
