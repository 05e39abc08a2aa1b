//! Locale-aware rendering of entry values.
//!
//! Supports the printf subset instrument definitions use: `%d`, `%s`, `%f`
//! with optional precision, width, and the `-`, `0`, `+` and `,` (grouping)
//! flags, plus `%%`. Unknown conversions are copied through verbatim.

use super::{Data, Entry};
use crate::locale::Locale;

/// Widest field and longest precision honoured; larger requests are capped.
const MAX_FIELD: usize = 64;

pub(crate) fn format_entry(entry: &Entry) -> String {
    let locale = Locale::parse(entry.lang());
    format_data(entry.value(), entry.format(), &locale)
}

/// Renders `data` using `format`, or a plain locale-aware form when empty.
pub fn format_data(data: &Data, format: &str, locale: &Locale) -> String {
    if format.is_empty() {
        return plain(data, locale);
    }

    let mut out = String::with_capacity(format.len() + 8);
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }

        let mut spec = Spec::default();
        let mut raw = String::from('%');
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                ',' => spec.group = true,
                _ => break,
            }
            raw.push(flag);
            chars.next();
        }
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            spec.width = spec.width.saturating_mul(10).saturating_add(digit as usize);
            raw.push(chars.next().unwrap_or('0'));
        }
        if chars.peek() == Some(&'.') {
            raw.push('.');
            chars.next();
            let mut precision = 0usize;
            while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                precision = precision.saturating_mul(10).saturating_add(digit as usize);
                raw.push(chars.next().unwrap_or('0'));
            }
            spec.precision = Some(precision.min(MAX_FIELD));
        }

        spec.width = spec.width.min(MAX_FIELD);

        match chars.next() {
            Some('%') => out.push('%'),
            Some(conversion @ ('d' | 'f' | 's')) => {
                out.push_str(&spec.render(conversion, data, locale));
            }
            Some(other) => {
                raw.push(other);
                out.push_str(&raw);
            }
            None => out.push_str(&raw),
        }
    }

    out
}

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    group: bool,
    width: usize,
    precision: Option<usize>,
}

impl Spec {
    fn render(&self, conversion: char, data: &Data, locale: &Locale) -> String {
        let body = match conversion {
            'd' => match data.as_f64().ok() {
                Some(v) if v.is_finite() => {
                    self.number(&format!("{}", v.round().abs() as i64), v < 0.0, locale)
                }
                _ => data.to_string(),
            },
            'f' => match data.as_f64().ok() {
                Some(v) if v.is_finite() => {
                    let text = format!("{:.*}", self.precision.unwrap_or(6), v.abs());
                    self.number(&text, v < 0.0, locale)
                }
                _ => data.to_string(),
            },
            _ => {
                let text = data.to_string();
                match self.precision {
                    Some(max) => text.chars().take(max).collect(),
                    None => text,
                }
            }
        };
        self.pad(body, conversion != 's')
    }

    fn number(&self, digits: &str, negative: bool, locale: &Locale) -> String {
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits, None),
        };
        let mut text = String::new();
        if negative {
            text.push('-');
        } else if self.plus {
            text.push('+');
        }
        if self.group {
            text.push_str(&group_digits(int_part, locale.grouping_separator()));
        } else {
            text.push_str(int_part);
        }
        if let Some(frac) = frac_part {
            text.push(locale.decimal_separator());
            text.push_str(frac);
        }
        text
    }

    fn pad(&self, body: String, numeric: bool) -> String {
        let len = body.chars().count();
        if len >= self.width {
            return body;
        }
        let fill = self.width - len;
        if self.left {
            format!("{body}{}", " ".repeat(fill))
        } else if self.zero && numeric {
            match body.strip_prefix(['-', '+']) {
                Some(rest) => {
                    let sign = &body[..1];
                    format!("{sign}{}{rest}", "0".repeat(fill))
                }
                None => format!("{}{body}", "0".repeat(fill)),
            }
        } else {
            format!("{}{body}", " ".repeat(fill))
        }
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let count = digits.chars().count();
    let mut out = String::with_capacity(count + count / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (count - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

fn plain(data: &Data, locale: &Locale) -> String {
    match data {
        Data::Double(_) | Data::Float(_) => {
            let text = data.to_string();
            if locale.decimal_separator() == '.' {
                text
            } else {
                text.replace('.', &locale.decimal_separator().to_string())
            }
        }
        Data::List(items) => {
            items.iter().map(|i| plain(i, locale)).collect::<Vec<_>>().join(";")
        }
        other => other.to_string(),
    }
}
