//! Smart cleanup: tidies the whitespace and punctuation that omitted
//! placeholders leave behind, e.g. `"Series -  ()"` becomes `"Series"`.

const SEPARATORS: &[char] = &['-', '–', '—', '_', ',', ':', ';', '#', '.', '~'];
const EDGE_PUNCTUATION: &[char] = &['-', '_', ',', ':', ';'];

/// Cleans each `/`-separated segment on its own so directory templates
/// keep their structure.
pub fn smart_cleanup(value: &str) -> String {
    value
        .split('/')
        .map(cleanup_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn cleanup_segment(value: &str) -> String {
    let without_brackets = remove_empty_brackets(value);
    let collapsed = collapse_repeated_separators(&without_brackets);

    let mut words: Vec<&str> = Vec::new();
    for word in collapsed.split_whitespace() {
        let after_separator = words.last().map_or(true, |prev| is_separator_word(prev));
        if is_separator_word(word) && after_separator {
            continue;
        }
        let opens_group = word.starts_with(|c: char| c == '(' || c == '[');
        if opens_group && words.last().is_some_and(|prev| is_separator_word(prev)) {
            words.pop();
        }
        words.push(word);
    }
    while words.last().is_some_and(|word| is_separator_word(word)) {
        words.pop();
    }

    words
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || EDGE_PUNCTUATION.contains(&c))
        .to_string()
}

fn is_separator_word(word: &str) -> bool {
    word.chars().all(|c| SEPARATORS.contains(&c))
}

/// Drops bracket pairs that hold nothing but whitespace or separators,
/// innermost first: `"( [] )"` disappears entirely.
fn remove_empty_brackets(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut open: Vec<(usize, char)> = Vec::new();

    for ch in value.chars() {
        let opener = match ch {
            ')' => '(',
            ']' => '[',
            '}' => '{',
            '(' | '[' | '{' => {
                open.push((out.len(), ch));
                out.push(ch);
                continue;
            }
            _ => {
                out.push(ch);
                continue;
            }
        };

        match open.last() {
            Some(&(start, found)) if found == opener => {
                open.pop();
                let inner = &out[start + opener.len_utf8()..];
                if inner
                    .chars()
                    .all(|c| c.is_whitespace() || SEPARATORS.contains(&c))
                {
                    out.truncate(start);
                } else {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

fn collapse_repeated_separators(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep: Option<char> = None;

    for ch in value.chars() {
        if matches!(ch, '_' | '-' | ' ') {
            if prev_sep == Some(ch) {
                continue;
            }
            prev_sep = Some(ch);
        } else {
            prev_sep = None;
        }
        out.push(ch);
    }

    out
}
