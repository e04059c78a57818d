mod cleanup;
mod config;
mod error;
mod fields;
mod metadata;
mod renamer;
mod replacement;
mod sanitize;
mod template;

pub use cleanup::smart_cleanup;
pub use config::{
    app_paths, load_settings, load_settings_from, save_settings, save_settings_to, AppPaths,
    RenameSettings,
};
pub use error::{ConfigError, RenameError, TemplateSyntaxError};
pub use fields::{available_fields, resolve_fields, BoolTokens, ResolvedFields, ResolvedValue};
pub use metadata::{parse_records, Credit, MetadataRecord, PageInfo};
pub use renamer::{
    normalize_extension, Renamer, RenamerConfig, DEFAULT_TEMPLATE, MAX_ISSUE_PADDING,
};
pub use replacement::{apply_replacements, ReplacementRule, Replacements};
pub use sanitize::{
    replace_illegal_chars, sanitize_filename, truncate_stem, PlatformMode, DEFAULT_STEM,
    MAX_NAME_BYTES, RESERVED_SUFFIX,
};
pub use template::{
    pad_issue, parse_template, render_template, validate_template, Align, Conversion,
    FormatSpec, Modifier, Placeholder, RenderOptions, SpecKind, TemplatePart,
};
