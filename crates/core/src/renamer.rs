use crate::error::{ConfigError, RenameError};
use crate::fields::{resolve_fields, BoolTokens};
use crate::metadata::MetadataRecord;
use crate::replacement::Replacements;
use crate::sanitize::{sanitize_filename, PlatformMode, MAX_NAME_BYTES};
use crate::template::{parse_template, render_template, RenderOptions};
use rayon::prelude::*;

pub const DEFAULT_TEMPLATE: &str = "{series} #{issue} - {title} ({year})";
pub const MAX_ISSUE_PADDING: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct RenamerConfig {
    pub template: String,
    pub platform_mode: PlatformMode,
    pub issue_zero_padding: usize,
    pub smart_cleanup: bool,
    pub move_to_dir: bool,
    pub replacements: Replacements,
    pub bool_tokens: BoolTokens,
    pub max_name_bytes: usize,
}

impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            platform_mode: PlatformMode::Auto,
            issue_zero_padding: 0,
            smart_cleanup: true,
            move_to_dir: false,
            replacements: Replacements::default(),
            bool_tokens: BoolTokens::default(),
            max_name_bytes: MAX_NAME_BYTES,
        }
    }
}

/// Derives filenames from metadata. Holds only configuration: no
/// filesystem access, and every call is a pure function of the config,
/// the record and the extension.
#[derive(Debug, Clone, Default)]
pub struct Renamer {
    config: RenamerConfig,
}

impl Renamer {
    /// The template is not parsed here; a half-typed template only fails
    /// once a name is actually requested.
    pub fn new(config: RenamerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenamerConfig {
        &self.config
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.config.template = template.into();
    }

    pub fn set_issue_zero_padding(&mut self, padding: usize) -> Result<(), ConfigError> {
        check_issue_padding(padding)?;
        self.config.issue_zero_padding = padding;
        Ok(())
    }

    pub fn set_smart_cleanup(&mut self, enabled: bool) {
        self.config.smart_cleanup = enabled;
    }

    pub fn set_platform_mode(&mut self, mode: PlatformMode) {
        self.config.platform_mode = mode;
    }

    pub fn set_move_to_dir(&mut self, enabled: bool) {
        self.config.move_to_dir = enabled;
    }

    pub fn set_replacements(&mut self, replacements: Replacements) {
        self.config.replacements = replacements;
    }

    pub fn set_bool_tokens(&mut self, tokens: BoolTokens) {
        self.config.bool_tokens = tokens;
    }

    /// Renders, cleans and sanitizes the configured template for `metadata`
    /// and appends `extension` (lowercased, with a leading dot).
    ///
    /// With `move_to_dir` set, `/` in the rendered template separates
    /// directories and the result is a relative path.
    pub fn determine_name(
        &self,
        metadata: &MetadataRecord,
        extension: &str,
    ) -> Result<String, RenameError> {
        let config = &self.config;
        check_issue_padding(config.issue_zero_padding)?;
        let parts = parse_template(&config.template)?;

        let fields = resolve_fields(metadata);
        let options = RenderOptions {
            value_rules: &config.replacements.value,
            strict: config.platform_mode.is_strict(),
            issue_zero_padding: config.issue_zero_padding,
            bool_tokens: &config.bool_tokens,
            smart_cleanup: config.smart_cleanup,
        };
        let raw = render_template(&parts, &fields, &options);

        let extension = normalize_extension(extension);
        let stem = if config.move_to_dir {
            self.sanitize_path(&raw, &extension)
        } else {
            self.sanitize_component(&raw, &extension)
        };

        let name = format!("{stem}{extension}");
        tracing::trace!(template = %config.template, name = %name, "derived filename");
        Ok(name)
    }

    /// Names for many records at once, in input order. A failing record
    /// does not stop the others.
    pub fn determine_names(
        &self,
        records: &[MetadataRecord],
        extension: &str,
    ) -> Vec<Result<String, RenameError>> {
        records
            .par_iter()
            .map(|record| self.determine_name(record, extension))
            .collect()
    }

    fn sanitize_component(&self, raw: &str, extension: &str) -> String {
        sanitize_filename(
            raw,
            self.config.platform_mode,
            &self.config.replacements.literal,
            extension,
            self.config.max_name_bytes,
        )
    }

    fn sanitize_path(&self, raw: &str, extension: &str) -> String {
        let components: Vec<&str> = raw
            .split('/')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        let Some((file, dirs)) = components.split_last() else {
            return self.sanitize_component("", extension);
        };

        let mut path: Vec<String> = dirs
            .iter()
            .map(|dir| self.sanitize_component(dir, ""))
            .collect();
        path.push(self.sanitize_component(file, extension));
        path.join("/")
    }
}

fn check_issue_padding(padding: usize) -> Result<(), ConfigError> {
    if padding > MAX_ISSUE_PADDING {
        return Err(ConfigError::IssuePaddingOutOfRange {
            value: padding,
            max: MAX_ISSUE_PADDING,
        });
    }
    Ok(())
}

/// `"CBZ"`, `".cbz"` and `" .Cbz"` all become `".cbz"`; an empty extension
/// stays empty.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(".{}", trimmed.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateSyntaxError;
    use crate::replacement::ReplacementRule;
    use crate::sanitize::DEFAULT_STEM;

    fn spider_geddon() -> MetadataRecord {
        MetadataRecord {
            series: Some("Spider-Geddon".to_string()),
            issue: Some("1".to_string()),
            year: Some(2018),
            publisher: Some("Marvel".to_string()),
            ..Default::default()
        }
    }

    fn renamer(template: &str) -> Renamer {
        let mut renamer = Renamer::default();
        renamer.set_template(template);
        renamer
    }

    #[test]
    fn end_to_end_example() {
        let name = renamer("{series} {issue} ({year})")
            .determine_name(&spider_geddon(), "cbz")
            .expect("must render");
        assert_eq!(name, "Spider-Geddon 1 (2018).cbz");
    }

    #[test]
    fn extension_is_normalized() {
        let r = renamer("{series}");
        let md = spider_geddon();
        assert_eq!(r.determine_name(&md, ".CBR").expect("render"), "Spider-Geddon.cbr");
        assert_eq!(r.determine_name(&md, "").expect("render"), "Spider-Geddon");
        assert_eq!(normalize_extension(" .Cb7"), ".cb7");
    }

    #[test]
    fn issue_padding_applies_and_is_validated() {
        let mut r = renamer("{issue}");
        r.set_issue_zero_padding(3).expect("in range");
        assert_eq!(r.determine_name(&spider_geddon(), "cbz").expect("render"), "001.cbz");
        r.set_template("{issue:d}");
        assert_eq!(r.determine_name(&spider_geddon(), "cbz").expect("render"), "001.cbz");

        let err = r.set_issue_zero_padding(5).expect_err("out of range");
        assert_eq!(err, ConfigError::IssuePaddingOutOfRange { value: 5, max: 4 });
        assert_eq!(r.config().issue_zero_padding, 3);
    }

    #[test]
    fn invalid_padding_from_config_fails_at_render() {
        let r = Renamer::new(RenamerConfig {
            issue_zero_padding: 9,
            ..Default::default()
        });
        let err = r.determine_name(&spider_geddon(), "cbz").expect_err("must fail");
        assert!(matches!(err, RenameError::Config(_)));
    }

    #[test]
    fn malformed_template_is_stored_but_fails_at_render() {
        let mut r = Renamer::default();
        r.set_template("{series");
        assert_eq!(r.config().template, "{series");
        let err = r.determine_name(&spider_geddon(), "cbz").expect_err("must fail");
        assert_eq!(
            err,
            RenameError::Template(TemplateSyntaxError::UnbalancedBraces { position: 0 })
        );
    }

    #[test]
    fn omitted_title_is_cleaned_up() {
        let name = renamer("{series} - {title}")
            .determine_name(&spider_geddon(), "cbz")
            .expect("render");
        assert_eq!(name, "Spider-Geddon.cbz");

        let mut r = renamer("{series} - {title}");
        r.set_smart_cleanup(false);
        assert_eq!(
            r.determine_name(&spider_geddon(), "cbz").expect("render"),
            "Spider-Geddon -.cbz"
        );
    }

    #[test]
    fn illegal_characters_are_removed_in_universal_mode() {
        let mut r = renamer("{series} {issue}");
        r.set_platform_mode(PlatformMode::Universal);
        let md = MetadataRecord {
            series: Some("Who? / What:".to_string()),
            issue: Some("1".to_string()),
            ..Default::default()
        };
        let name = r.determine_name(&md, "cbz").expect("render");
        assert!(!name.contains(|c: char| matches!(c, '?' | '/' | ':')), "{name}");
        assert_eq!(name, "Who What 1.cbz");
    }

    #[test]
    fn strict_only_rules_are_gated_by_platform_mode() {
        let md = MetadataRecord {
            series: Some("Batman & Robin".to_string()),
            ..Default::default()
        };
        let mut r = renamer("{series}");
        r.set_replacements(Replacements {
            literal: vec![ReplacementRule::new("&", "and", true)],
            value: Vec::new(),
        });
        assert_eq!(r.determine_name(&md, "cbz").expect("render"), "Batman & Robin.cbz");

        r.set_platform_mode(PlatformMode::Universal);
        assert_eq!(r.determine_name(&md, "cbz").expect("render"), "Batman and Robin.cbz");
    }

    #[test]
    fn literal_rules_run_in_order_on_the_rendered_name() {
        let md = MetadataRecord {
            series: Some("Rock & Roll".to_string()),
            ..Default::default()
        };
        let mut r = renamer("{series}");
        r.set_replacements(Replacements {
            literal: vec![
                ReplacementRule::new("&", "and", false),
                ReplacementRule::new("and", "AND", false),
            ],
            value: Vec::new(),
        });
        assert_eq!(r.determine_name(&md, "cbz").expect("render"), "Rock AND Roll.cbz");
    }

    #[test]
    fn reserved_names_never_appear_verbatim() {
        let md = MetadataRecord {
            series: Some("NUL".to_string()),
            ..Default::default()
        };
        let name = renamer("{series}").determine_name(&md, "cbz").expect("render");
        assert_ne!(name, "NUL.cbz");
        assert_eq!(name, "NUL_file.cbz");
    }

    #[test]
    fn empty_metadata_still_yields_a_name() {
        let name = Renamer::default()
            .determine_name(&MetadataRecord::default(), "cbz")
            .expect("render");
        assert_eq!(name, format!("{DEFAULT_STEM}.cbz"));

        let name = renamer("").determine_name(&spider_geddon(), "cbz").expect("render");
        assert_eq!(name, format!("{DEFAULT_STEM}.cbz"));
    }

    #[test]
    fn long_names_keep_their_extension() {
        let md = MetadataRecord {
            series: Some("Long ".repeat(100)),
            ..Default::default()
        };
        let name = renamer("{series}").determine_name(&md, "CBZ").expect("render");
        assert!(name.ends_with(".cbz"));
        assert!(name.len() <= MAX_NAME_BYTES);
        assert!(!name.trim_end_matches(".cbz").ends_with(' '));
    }

    #[test]
    fn move_to_dir_splits_components() {
        let mut r = renamer("{publisher}/{series}/{series} {issue}");
        r.set_move_to_dir(true);
        assert_eq!(
            r.determine_name(&spider_geddon(), "cbz").expect("render"),
            "Marvel/Spider-Geddon/Spider-Geddon 1.cbz"
        );

        let mut md = spider_geddon();
        md.publisher = None;
        assert_eq!(
            r.determine_name(&md, "cbz").expect("render"),
            "Spider-Geddon/Spider-Geddon 1.cbz"
        );

        r.set_move_to_dir(false);
        let flat = r.determine_name(&spider_geddon(), "cbz").expect("render");
        assert!(!flat.contains('/'), "{flat}");
    }

    #[test]
    fn output_is_deterministic_across_batch_and_single_calls() {
        let mut r = renamer("{series} #{issue} ({year})");
        r.set_issue_zero_padding(2).expect("in range");
        let records: Vec<MetadataRecord> = (1..=50)
            .map(|n| MetadataRecord {
                issue: Some(n.to_string()),
                ..spider_geddon()
            })
            .collect();

        let batch = r.determine_names(&records, "cbz");
        assert_eq!(batch.len(), records.len());
        for (record, name) in records.iter().zip(&batch) {
            let single = r.determine_name(record, "cbz").expect("render");
            assert_eq!(name.as_ref().expect("render"), &single);
        }
        assert_eq!(
            batch[0].as_ref().expect("render"),
            "Spider-Geddon #01 (2018).cbz"
        );
    }

    #[test]
    fn huge_format_width_is_a_template_error() {
        let err = renamer("{series:99999999999999}")
            .determine_name(&spider_geddon(), "cbz")
            .expect_err("must fail");
        assert!(matches!(
            err,
            RenameError::Template(TemplateSyntaxError::UnknownFormatSpec { .. })
        ));
    }

    #[test]
    fn dotted_reserved_name_is_disambiguated_once() {
        let mut md = spider_geddon();
        md.series = Some("CON".to_string());
        let name = renamer("{series}.{issue}")
            .determine_name(&md, "cbz")
            .expect("render");
        assert_eq!(name, "CON_file.1.cbz");
    }

    #[test]
    fn batch_reports_failures_per_record() {
        let r = renamer("{series");
        let results = r.determine_names(&[spider_geddon(), spider_geddon()], "cbz");
        assert!(results.iter().all(Result::is_err));
    }
}
