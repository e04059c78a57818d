use crate::metadata::{Credit, MetadataRecord, PageInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    StringList(Vec<String>),
    Credits(Vec<Credit>),
    Pages(Vec<PageInfo>),
    Empty,
}

impl ResolvedValue {
    pub fn is_empty(&self) -> bool {
        match self {
            ResolvedValue::Empty => true,
            ResolvedValue::String(s) => s.is_empty(),
            ResolvedValue::StringList(items) => items.is_empty(),
            ResolvedValue::Credits(items) => items.is_empty(),
            ResolvedValue::Pages(items) => items.is_empty(),
            ResolvedValue::Integer(_) | ResolvedValue::Float(_) | ResolvedValue::Boolean(_) => {
                false
            }
        }
    }

    /// Unformatted text of the value. Lists are joined with ", ".
    pub fn to_text(&self, bools: &BoolTokens) -> String {
        match self {
            ResolvedValue::Empty => String::new(),
            ResolvedValue::String(s) => s.clone(),
            ResolvedValue::Integer(n) => n.to_string(),
            ResolvedValue::Float(f) => f.to_string(),
            ResolvedValue::Boolean(b) => bools.token(*b).to_string(),
            ResolvedValue::StringList(items) => items.join(", "),
            ResolvedValue::Credits(credits) => credits
                .iter()
                .map(|c| c.person.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            ResolvedValue::Pages(pages) => pages
                .iter()
                .map(|p| p.image_index.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Text used for boolean fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolTokens {
    pub true_token: String,
    pub false_token: String,
}

impl BoolTokens {
    pub fn token(&self, value: bool) -> &str {
        if value {
            &self.true_token
        } else {
            &self.false_token
        }
    }
}

impl Default for BoolTokens {
    fn default() -> Self {
        Self {
            true_token: "True".to_string(),
            false_token: String::new(),
        }
    }
}

pub type ResolvedFields = HashMap<&'static str, ResolvedValue>;

type FieldFn = fn(&MetadataRecord) -> ResolvedValue;

struct FieldDef {
    name: &'static str,
    resolve: FieldFn,
}

const FIELDS: &[FieldDef] = &[
    FieldDef { name: "is_empty", resolve: |md| ResolvedValue::Boolean(md.is_empty()) },
    FieldDef { name: "tag_origin", resolve: |md| text(&md.tag_origin) },
    FieldDef { name: "series", resolve: |md| text(&md.series) },
    FieldDef { name: "issue", resolve: |md| text(&md.issue) },
    FieldDef { name: "title", resolve: |md| text(&md.title) },
    FieldDef { name: "publisher", resolve: |md| text(&md.publisher) },
    FieldDef { name: "year", resolve: |md| integer(md.year) },
    FieldDef { name: "month", resolve: |md| integer(md.month) },
    FieldDef { name: "day", resolve: |md| integer(md.day) },
    FieldDef { name: "issue_count", resolve: |md| integer(md.issue_count) },
    FieldDef { name: "volume", resolve: |md| integer(md.volume) },
    FieldDef { name: "volume_count", resolve: |md| integer(md.volume_count) },
    FieldDef { name: "genre", resolve: |md| text(&md.genre) },
    FieldDef { name: "language", resolve: |md| text(&md.language) },
    FieldDef { name: "comments", resolve: |md| text(&md.comments) },
    FieldDef { name: "country", resolve: |md| text(&md.country) },
    FieldDef {
        name: "critical_rating",
        resolve: |md| md.critical_rating.map_or(ResolvedValue::Empty, ResolvedValue::Float),
    },
    FieldDef {
        name: "black_and_white",
        resolve: |md| md.black_and_white.map_or(ResolvedValue::Empty, ResolvedValue::Boolean),
    },
    FieldDef { name: "page_count", resolve: |md| integer(md.page_count) },
    FieldDef { name: "maturity_rating", resolve: |md| text(&md.maturity_rating) },
    FieldDef { name: "story_arc", resolve: |md| text(&md.story_arc) },
    FieldDef { name: "series_group", resolve: |md| text(&md.series_group) },
    FieldDef { name: "scan_info", resolve: |md| text(&md.scan_info) },
    FieldDef { name: "alternate_series", resolve: |md| text(&md.alternate_series) },
    FieldDef { name: "alternate_number", resolve: |md| text(&md.alternate_number) },
    FieldDef { name: "alternate_count", resolve: |md| integer(md.alternate_count) },
    FieldDef { name: "imprint", resolve: |md| text(&md.imprint) },
    FieldDef { name: "notes", resolve: |md| text(&md.notes) },
    FieldDef { name: "web_link", resolve: |md| text(&md.web_link) },
    FieldDef { name: "format", resolve: |md| text(&md.format) },
    FieldDef { name: "manga", resolve: |md| text(&md.manga) },
    FieldDef { name: "characters", resolve: |md| text(&md.characters) },
    FieldDef { name: "teams", resolve: |md| text(&md.teams) },
    FieldDef { name: "locations", resolve: |md| text(&md.locations) },
    FieldDef {
        name: "credits",
        resolve: |md| list(&md.credits, ResolvedValue::Credits),
    },
    FieldDef {
        name: "tags",
        resolve: |md| {
            let tags: Vec<String> = md.tags.iter().cloned().collect();
            list(&tags, ResolvedValue::StringList)
        },
    },
    FieldDef {
        name: "pages",
        resolve: |md| list(&md.pages, ResolvedValue::Pages),
    },
    FieldDef { name: "writer", resolve: |md| credit(md, "writer") },
    FieldDef { name: "penciller", resolve: |md| credit(md, "penciller") },
    FieldDef { name: "inker", resolve: |md| credit(md, "inker") },
    FieldDef { name: "colorist", resolve: |md| credit(md, "colorist") },
    FieldDef { name: "letterer", resolve: |md| credit(md, "letterer") },
    FieldDef { name: "cover artist", resolve: |md| credit(md, "cover artist") },
    FieldDef { name: "editor", resolve: |md| credit(md, "editor") },
    FieldDef { name: "translator", resolve: |md| credit(md, "translator") },
];

/// Resolves every known placeholder for `record`. Unset fields map to
/// [`ResolvedValue::Empty`].
pub fn resolve_fields(record: &MetadataRecord) -> ResolvedFields {
    FIELDS
        .iter()
        .map(|def| (def.name, (def.resolve)(record)))
        .collect()
}

/// Placeholder names usable in a template, in help-text order.
pub fn available_fields() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|def| def.name)
}

fn text(value: &Option<String>) -> ResolvedValue {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => ResolvedValue::String(s.to_string()),
        _ => ResolvedValue::Empty,
    }
}

fn integer(value: Option<i32>) -> ResolvedValue {
    value.map_or(ResolvedValue::Empty, |n| ResolvedValue::Integer(i64::from(n)))
}

fn list<T: Clone>(items: &[T], wrap: fn(Vec<T>) -> ResolvedValue) -> ResolvedValue {
    if items.is_empty() {
        ResolvedValue::Empty
    } else {
        wrap(items.to_vec())
    }
}

fn credit(md: &MetadataRecord, role: &str) -> ResolvedValue {
    md.primary_credit(role)
        .map(|c| c.person.trim())
        .filter(|person| !person.is_empty())
        .map_or(ResolvedValue::Empty, |person| {
            ResolvedValue::String(person.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MetadataRecord {
        let mut md = MetadataRecord {
            series: Some("Spider-Geddon".to_string()),
            issue: Some("1".to_string()),
            title: Some("   ".to_string()),
            year: Some(2018),
            critical_rating: Some(4.5),
            ..Default::default()
        };
        md.add_credit("Christos Gage", "Writer", true);
        md.add_credit("Jorge Molina", "Cover Artist", false);
        md.tags.insert("spiders".to_string());
        md.tags.insert("heroes".to_string());
        md
    }

    #[test]
    fn scalars_resolve_to_typed_values() {
        let fields = resolve_fields(&record());
        assert_eq!(fields["series"], ResolvedValue::String("Spider-Geddon".to_string()));
        assert_eq!(fields["year"], ResolvedValue::Integer(2018));
        assert_eq!(fields["critical_rating"], ResolvedValue::Float(4.5));
        assert_eq!(fields["is_empty"], ResolvedValue::Boolean(false));
    }

    #[test]
    fn unset_and_blank_fields_are_empty() {
        let fields = resolve_fields(&record());
        assert_eq!(fields["title"], ResolvedValue::Empty);
        assert_eq!(fields["publisher"], ResolvedValue::Empty);
        assert_eq!(fields["pages"], ResolvedValue::Empty);
        assert_eq!(fields["letterer"], ResolvedValue::Empty);
    }

    #[test]
    fn lists_and_credit_accessors() {
        let fields = resolve_fields(&record());
        let bools = BoolTokens::default();
        assert_eq!(fields["tags"].to_text(&bools), "heroes, spiders");
        assert_eq!(fields["credits"].to_text(&bools), "Christos Gage, Jorge Molina");
        assert_eq!(fields["writer"], ResolvedValue::String("Christos Gage".to_string()));
        assert_eq!(
            fields["cover artist"],
            ResolvedValue::String("Jorge Molina".to_string())
        );
    }

    #[test]
    fn every_available_field_resolves() {
        let fields = resolve_fields(&MetadataRecord::default());
        for name in available_fields() {
            assert!(fields.contains_key(name), "missing {name}");
        }
        assert_eq!(fields["is_empty"], ResolvedValue::Boolean(true));
    }

    #[test]
    fn blank_record_agrees_with_is_empty() {
        let md = MetadataRecord {
            series: Some("  ".to_string()),
            ..Default::default()
        };
        let fields = resolve_fields(&md);
        assert_eq!(fields["series"], ResolvedValue::Empty);
        assert_eq!(fields["is_empty"], ResolvedValue::Boolean(true));
    }

    #[test]
    fn booleans_use_tokens() {
        let bools = BoolTokens {
            true_token: "BW".to_string(),
            false_token: "Color".to_string(),
        };
        assert_eq!(ResolvedValue::Boolean(true).to_text(&bools), "BW");
        assert_eq!(ResolvedValue::Boolean(false).to_text(&bools), "Color");
        assert_eq!(ResolvedValue::Boolean(false).to_text(&BoolTokens::default()), "");
    }
}
