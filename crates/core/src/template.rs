use crate::cleanup::smart_cleanup;
use crate::error::TemplateSyntaxError;
use crate::fields::{BoolTokens, ResolvedFields, ResolvedValue};
use crate::replacement::{apply_replacements, ReplacementRule};
use crate::sanitize::MAX_NAME_BYTES;

/// Field whose numeric part is padded with the configured issue padding.
const ISSUE_FIELD: &str = "issue";
/// Largest width or precision a format spec may ask for. Nothing wider can
/// survive truncation to a single path component.
const MAX_SPEC_NUMBER: usize = MAX_NAME_BYTES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Placeholder(Placeholder),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub field: String,
    pub conversion: Option<Conversion>,
    pub spec: FormatSpec,
    pub modifier: Option<Modifier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Upper,
    Lower,
    Capitalize,
    Title,
    SwapCase,
    Str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// `{field?prefix}`: emit `prefix` and the value, or nothing at all.
    Conditional(String),
    /// `{field|text}`: emit `text` when the value is empty.
    Default(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Str,
    Int,
    Fixed,
}

/// `[[fill]align][0][width][,|_][.precision][type]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSpec {
    pub fill: Option<char>,
    pub align: Option<Align>,
    pub zero: bool,
    pub width: Option<usize>,
    pub grouping: Option<char>,
    pub precision: Option<usize>,
    pub kind: Option<SpecKind>,
}

#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
    pub value_rules: &'a [ReplacementRule],
    pub strict: bool,
    pub issue_zero_padding: usize,
    pub bool_tokens: &'a BoolTokens,
    pub smart_cleanup: bool,
}

pub fn validate_template(input: &str) -> Result<(), TemplateSyntaxError> {
    parse_template(input).map(|_| ())
}

pub fn parse_template(input: &str) -> Result<Vec<TemplatePart>, TemplateSyntaxError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((position, ch)) = chars.next() {
        match ch {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    literal.push('{');
                    continue;
                }
                let mut body = String::new();
                let mut found_close = false;
                for (inner, next) in chars.by_ref() {
                    if next == '}' {
                        found_close = true;
                        break;
                    }
                    if next == '{' {
                        return Err(TemplateSyntaxError::UnbalancedBraces { position: inner });
                    }
                    body.push(next);
                }
                if !found_close {
                    return Err(TemplateSyntaxError::UnbalancedBraces { position });
                }
                if !literal.is_empty() {
                    parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                }
                parts.push(TemplatePart::Placeholder(parse_placeholder(&body, position)?));
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(TemplateSyntaxError::UnbalancedBraces { position });
                }
                literal.push('}');
            }
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }

    Ok(parts)
}

pub fn render_template(
    parts: &[TemplatePart],
    fields: &ResolvedFields,
    options: &RenderOptions<'_>,
) -> String {
    let mut output = String::new();
    for part in parts {
        match part {
            TemplatePart::Literal(s) => output.push_str(s),
            TemplatePart::Placeholder(placeholder) => {
                output.push_str(&render_placeholder(placeholder, fields, options))
            }
        }
    }

    if options.smart_cleanup {
        smart_cleanup(&output)
    } else {
        output
    }
}

fn parse_placeholder(body: &str, position: usize) -> Result<Placeholder, TemplateSyntaxError> {
    let (head, modifier) = match body.find(|c: char| c == '?' || c == '|') {
        Some(idx) => {
            let text = body[idx + 1..].to_string();
            let modifier = if body[idx..].starts_with('?') {
                Modifier::Conditional(text)
            } else {
                Modifier::Default(text)
            };
            (&body[..idx], Some(modifier))
        }
        None => (body, None),
    };

    let (name_part, spec_part) = match head.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (head, None),
    };
    let (name, conversion_part) = match name_part.split_once('!') {
        Some((name, conversion)) => (name.trim(), Some(conversion)),
        None => (name_part.trim(), None),
    };

    if name.is_empty() {
        return Err(TemplateSyntaxError::EmptyPlaceholder { position });
    }

    let conversion = conversion_part
        .map(|raw| {
            parse_conversion(raw).ok_or_else(|| TemplateSyntaxError::UnknownConversion {
                field: name.to_string(),
                conversion: raw.to_string(),
            })
        })
        .transpose()?;

    let spec = match spec_part {
        Some(raw) => parse_format_spec(raw).ok_or_else(|| TemplateSyntaxError::UnknownFormatSpec {
            field: name.to_string(),
            spec: raw.to_string(),
        })?,
        None => FormatSpec::default(),
    };

    Ok(Placeholder {
        field: name.to_string(),
        conversion,
        spec,
        modifier,
    })
}

fn parse_conversion(raw: &str) -> Option<Conversion> {
    match raw {
        "u" => Some(Conversion::Upper),
        "l" => Some(Conversion::Lower),
        "c" => Some(Conversion::Capitalize),
        "t" => Some(Conversion::Title),
        "S" => Some(Conversion::SwapCase),
        "s" => Some(Conversion::Str),
        _ => None,
    }
}

fn parse_align(ch: char) -> Option<Align> {
    match ch {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        _ => None,
    }
}

fn parse_format_spec(raw: &str) -> Option<FormatSpec> {
    let chars: Vec<char> = raw.chars().collect();
    let mut spec = FormatSpec::default();
    let mut i = 0;

    if let Some(align) = chars.get(1).and_then(|&c| parse_align(c)) {
        spec.fill = Some(chars[0]);
        spec.align = Some(align);
        i = 2;
    } else if let Some(align) = chars.first().and_then(|&c| parse_align(c)) {
        spec.align = Some(align);
        i = 1;
    }

    if chars.get(i) == Some(&'0') {
        spec.zero = true;
        i += 1;
    }

    let start = i;
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }
    if i > start {
        spec.width = Some(parse_spec_number(&chars[start..i])?);
    }

    if let Some(&sep @ (',' | '_')) = chars.get(i) {
        spec.grouping = Some(sep);
        i += 1;
    }

    if chars.get(i) == Some(&'.') {
        i += 1;
        let start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        if i == start {
            return None;
        }
        spec.precision = Some(parse_spec_number(&chars[start..i])?);
    }

    spec.kind = match chars.get(i) {
        Some('s') => Some(SpecKind::Str),
        Some('d') => Some(SpecKind::Int),
        Some('f') => Some(SpecKind::Fixed),
        _ => None,
    };
    if spec.kind.is_some() {
        i += 1;
    }

    (i == chars.len()).then_some(spec)
}

fn parse_spec_number(digits: &[char]) -> Option<usize> {
    let n: usize = digits.iter().collect::<String>().parse().ok()?;
    (n <= MAX_SPEC_NUMBER).then_some(n)
}

fn render_placeholder(
    placeholder: &Placeholder,
    fields: &ResolvedFields,
    options: &RenderOptions<'_>,
) -> String {
    let text = match fields.get(placeholder.field.as_str()) {
        Some(value) if !value.is_empty() => format_value(placeholder, value, options),
        Some(_) => String::new(),
        None => {
            tracing::debug!(field = %placeholder.field, "unknown template field rendered as empty");
            String::new()
        }
    };

    match &placeholder.modifier {
        Some(Modifier::Conditional(prefix)) if !text.is_empty() => format!("{prefix}{text}"),
        Some(Modifier::Conditional(_)) => String::new(),
        Some(Modifier::Default(default)) if text.is_empty() => default.clone(),
        _ => text,
    }
}

fn format_value(
    placeholder: &Placeholder,
    value: &ResolvedValue,
    options: &RenderOptions<'_>,
) -> String {
    let spec = &placeholder.spec;
    let finish = |text: &str| {
        let replaced = apply_replacements(options.value_rules, text, options.strict);
        convert_case(&replaced, placeholder.conversion)
    };

    match value {
        ResolvedValue::Integer(n) => finish(&format_integer(*n, spec)),
        ResolvedValue::Float(f) => finish(&format_float(*f, spec)),
        ResolvedValue::String(s) if spec.kind == Some(SpecKind::Int) => match s.parse::<i64>() {
            Ok(n) => finish(&pad_numeric_issue(format_integer(n, spec), placeholder, options)),
            Err(_) => pad_text(&finish(&pad_numeric_issue(s.clone(), placeholder, options)), spec),
        },
        ResolvedValue::String(s) if spec.kind == Some(SpecKind::Fixed) => match s.parse::<f64>() {
            Ok(f) => finish(&pad_numeric_issue(format_float(f, spec), placeholder, options)),
            Err(_) => pad_text(&finish(&pad_numeric_issue(s.clone(), placeholder, options)), spec),
        },
        ResolvedValue::String(issue) if placeholder.field == ISSUE_FIELD => {
            let (width, spec) = issue_padding(spec, options.issue_zero_padding);
            pad_text(&finish(&pad_issue(issue, width)), &spec)
        }
        other => pad_text(&finish(&other.to_text(options.bool_tokens)), spec),
    }
}

/// Configured issue padding for an issue already formatted as a number
/// (`{issue:d}`, `{issue:.1f}`). An explicit width leaves it alone, as does
/// digit grouping, which only kicks in past the largest padding.
fn pad_numeric_issue(
    text: String,
    placeholder: &Placeholder,
    options: &RenderOptions<'_>,
) -> String {
    let spec = &placeholder.spec;
    let grouped = spec.grouping.is_some_and(|sep| text.contains(sep));
    if placeholder.field != ISSUE_FIELD || spec.width.is_some() || grouped {
        return text;
    }
    pad_issue(&text, options.issue_zero_padding)
}

/// An explicit zero-padded width in the template wins over the configured
/// issue padding; any other explicit width means plain alignment.
fn issue_padding(spec: &FormatSpec, configured: usize) -> (usize, FormatSpec) {
    match spec.width {
        Some(width) if spec.zero && spec.align.is_none() => (
            width,
            FormatSpec {
                zero: false,
                width: None,
                ..spec.clone()
            },
        ),
        Some(_) => (0, spec.clone()),
        None => (configured, spec.clone()),
    }
}

/// Zero-pads the leading integer part of an issue number, keeping any sign
/// and suffix: `1.5` -> `001.5`, `12AU` -> `012AU`.
pub fn pad_issue(issue: &str, width: usize) -> String {
    if width == 0 {
        return issue.to_string();
    }
    let (sign, rest) = match issue.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", issue),
    };
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return issue.to_string();
    }
    format!("{sign}{:0>width$}{}", &rest[..digits], &rest[digits..])
}

fn format_integer(n: i64, spec: &FormatSpec) -> String {
    if spec.kind == Some(SpecKind::Fixed) {
        return format_float(n as f64, spec);
    }
    let sign = if n < 0 { "-" } else { "" };
    let body = group_digits(&n.unsigned_abs().to_string(), spec.grouping);
    pad_number(sign, &body, spec)
}

fn format_float(f: f64, spec: &FormatSpec) -> String {
    if spec.kind == Some(SpecKind::Int) {
        return format_integer(f.trunc() as i64, spec);
    }
    let sign = if f.is_sign_negative() && f != 0.0 { "-" } else { "" };
    let digits = match spec.precision {
        Some(precision) => format!("{:.*}", precision, f.abs()),
        None => f.abs().to_string(),
    };
    let body = match digits.split_once('.') {
        Some((whole, fraction)) => format!("{}.{}", group_digits(whole, spec.grouping), fraction),
        None => group_digits(&digits, spec.grouping),
    };
    pad_number(sign, &body, spec)
}

fn pad_number(sign: &str, body: &str, spec: &FormatSpec) -> String {
    match spec.width {
        Some(width) if spec.zero && spec.align.is_none() => {
            let len = sign.len() + body.chars().count();
            format!("{sign}{}{body}", "0".repeat(width.saturating_sub(len)))
        }
        _ => pad_aligned(format!("{sign}{body}"), spec, Align::Right),
    }
}

fn pad_text(text: &str, spec: &FormatSpec) -> String {
    let text = match spec.precision {
        Some(precision) => text.chars().take(precision).collect(),
        None => text.to_string(),
    };
    pad_aligned(text, spec, Align::Left)
}

fn pad_aligned(text: String, spec: &FormatSpec, default_align: Align) -> String {
    let Some(width) = spec.width else {
        return text;
    };
    let len = text.chars().count();
    if len >= width {
        return text;
    }

    let fill = spec.fill.unwrap_or(if spec.zero { '0' } else { ' ' });
    let pad = width - len;
    let (left, right) = match spec.align.unwrap_or(default_align) {
        Align::Left => (0, pad),
        Align::Right => (pad, 0),
        Align::Center => (pad / 2, pad - pad / 2),
    };

    let mut out = String::with_capacity(text.len() + pad * fill.len_utf8());
    out.extend(std::iter::repeat(fill).take(left));
    out.push_str(&text);
    out.extend(std::iter::repeat(fill).take(right));
    out
}

fn group_digits(digits: &str, separator: Option<char>) -> String {
    let Some(separator) = separator else {
        return digits.to_string();
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

fn convert_case(text: &str, conversion: Option<Conversion>) -> String {
    match conversion {
        None | Some(Conversion::Str) => text.to_string(),
        Some(Conversion::Upper) => text.to_uppercase(),
        Some(Conversion::Lower) => text.to_lowercase(),
        Some(Conversion::Capitalize) => {
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        }
        Some(Conversion::Title) => {
            let mut out = String::with_capacity(text.len());
            let mut prev_alpha = false;
            for ch in text.chars() {
                if prev_alpha {
                    out.extend(ch.to_lowercase());
                } else {
                    out.extend(ch.to_uppercase());
                }
                prev_alpha = ch.is_alphabetic();
            }
            out
        }
        Some(Conversion::SwapCase) => text
            .chars()
            .flat_map(|ch| {
                if ch.is_uppercase() {
                    ch.to_lowercase().collect::<Vec<_>>()
                } else {
                    ch.to_uppercase().collect::<Vec<_>>()
                }
            })
            .collect(),
    }
}
