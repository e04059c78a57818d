use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    pub find: String,
    pub replace: String,
    #[serde(default)]
    pub strict_only: bool,
}

impl ReplacementRule {
    pub fn new(find: &str, replace: &str, strict_only: bool) -> Self {
        Self {
            find: find.to_string(),
            replace: replace.to_string(),
            strict_only,
        }
    }
}

/// Literal rules run over the whole rendered name, value rules over each
/// field before it is substituted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replacements {
    pub literal: Vec<ReplacementRule>,
    pub value: Vec<ReplacementRule>,
}

impl Replacements {
    /// The rule set a fresh settings file starts with.
    pub fn recommended() -> Self {
        Self {
            literal: vec![
                ReplacementRule::new(": ", " - ", true),
                ReplacementRule::new(":", "-", true),
            ],
            value: vec![
                ReplacementRule::new(": ", " - ", true),
                ReplacementRule::new(":", "-", true),
                ReplacementRule::new("/", "-", false),
                ReplacementRule::new("\\", "-", true),
            ],
        }
    }
}

/// Applies `rules` in order. Each rule makes a single leftmost-first pass,
/// so a replacement that reintroduces its own `find` text terminates.
pub fn apply_replacements(rules: &[ReplacementRule], text: &str, strict: bool) -> String {
    let mut out = text.to_string();
    for rule in rules {
        if rule.find.is_empty() || (rule.strict_only && !strict) {
            continue;
        }
        if out.contains(&rule.find) {
            out = out.replace(&rule.find, &rule.replace);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_apply_sequentially() {
        let rules = [
            ReplacementRule::new("&", "and", false),
            ReplacementRule::new("and", "AND", false),
        ];
        assert_eq!(apply_replacements(&rules, "Rock & Roll", false), "Rock AND Roll");
    }

    #[test]
    fn strict_only_rules_need_strict_mode() {
        let rules = [ReplacementRule::new(":", " -", true)];
        assert_eq!(apply_replacements(&rules, "X-Men: Red", false), "X-Men: Red");
        assert_eq!(apply_replacements(&rules, "X-Men: Red", true), "X-Men - Red");
    }

    #[test]
    fn self_reintroducing_rule_runs_once() {
        let rules = [ReplacementRule::new("a", "aa", false)];
        assert_eq!(apply_replacements(&rules, "banana", false), "baanaanaa");
    }

    #[test]
    fn empty_find_is_skipped() {
        let rules = [ReplacementRule::new("", "x", false)];
        assert_eq!(apply_replacements(&rules, "abc", true), "abc");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let rules = [ReplacementRule::new("vol", "Volume", false)];
        assert_eq!(apply_replacements(&rules, "Vol 2 vol", false), "Vol 2 Volume");
    }
}
