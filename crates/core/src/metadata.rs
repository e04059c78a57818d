use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub role: String,
    pub person: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub image_index: u32,
    #[serde(rename = "type", default)]
    pub page_type: String,
    #[serde(default)]
    pub bookmark: String,
    #[serde(default)]
    pub double_page: bool,
}

/// Tag data read from a comic archive. Every scalar is optional; the
/// renamer only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataRecord {
    pub tag_origin: Option<String>,
    pub series: Option<String>,
    pub issue: Option<String>,
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub issue_count: Option<i32>,
    pub volume: Option<i32>,
    pub volume_count: Option<i32>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub comments: Option<String>,
    pub country: Option<String>,
    pub critical_rating: Option<f64>,
    pub black_and_white: Option<bool>,
    pub page_count: Option<i32>,
    pub maturity_rating: Option<String>,
    pub story_arc: Option<String>,
    pub series_group: Option<String>,
    pub scan_info: Option<String>,
    pub alternate_series: Option<String>,
    pub alternate_number: Option<String>,
    pub alternate_count: Option<i32>,
    pub imprint: Option<String>,
    pub notes: Option<String>,
    pub web_link: Option<String>,
    pub format: Option<String>,
    pub manga: Option<String>,
    pub characters: Option<String>,
    pub teams: Option<String>,
    pub locations: Option<String>,
    pub credits: Vec<Credit>,
    pub tags: BTreeSet<String>,
    pub pages: Vec<PageInfo>,
}

impl MetadataRecord {
    /// True when no scalar is set and every list is empty. Whitespace-only
    /// strings count as unset, matching how fields resolve.
    pub fn is_empty(&self) -> bool {
        let strings = [
            &self.tag_origin,
            &self.series,
            &self.issue,
            &self.title,
            &self.publisher,
            &self.genre,
            &self.language,
            &self.comments,
            &self.country,
            &self.maturity_rating,
            &self.story_arc,
            &self.series_group,
            &self.scan_info,
            &self.alternate_series,
            &self.alternate_number,
            &self.imprint,
            &self.notes,
            &self.web_link,
            &self.format,
            &self.manga,
            &self.characters,
            &self.teams,
            &self.locations,
        ];
        let numbers = [
            self.year,
            self.month,
            self.day,
            self.issue_count,
            self.volume,
            self.volume_count,
            self.page_count,
            self.alternate_count,
        ];

        strings
            .iter()
            .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
            && numbers.iter().all(Option::is_none)
            && self.critical_rating.is_none()
            && self.black_and_white.is_none()
            && self.credits.is_empty()
            && self.tags.is_empty()
            && self.pages.is_empty()
    }

    /// The credit shown for `role`: the first primary credit for that role,
    /// otherwise the first credit for that role at all.
    pub fn primary_credit(&self, role: &str) -> Option<&Credit> {
        let mut by_role = self
            .credits
            .iter()
            .filter(|credit| credit.role.trim().eq_ignore_ascii_case(role));
        let first = by_role.clone().next();
        by_role.find(|credit| credit.primary).or(first)
    }

    pub fn add_credit(&mut self, person: &str, role: &str, primary: bool) {
        self.credits.push(Credit {
            role: role.to_string(),
            person: person.to_string(),
            primary,
        });
    }
}

/// Parses a JSON document holding either one record or an array of records.
pub fn parse_records(json: &str) -> serde_json::Result<Vec<MetadataRecord>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<MetadataRecord>),
        One(Box<MetadataRecord>),
    }

    Ok(match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::Many(records) => records,
        OneOrMany::One(record) => vec![*record],
    })
}
