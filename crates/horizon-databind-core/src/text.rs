//! Text conversion for bound values.
//!
//! [`TextValue`] is how a value type takes part in the string-conversion and
//! text-representation capabilities. Both methods have defaults, so a custom
//! type opts in with an empty `impl TextValue for MyType {}` and is rendered
//! as `<unsupported type>` until it provides real conversions.
//!
//! Formatting follows a printf-style subset (`%d %i %u %x %X %f %F %e %g %s
//! %%`, flags `-0+` and a space, width, `.N` precision) and every rendered
//! string is bounded by [`TEXT_BUFFER_SIZE`].

use std::fmt::Write as _;

/// Size of the fixed text buffer; rendered text holds at most
/// `TEXT_BUFFER_SIZE - 1` bytes.
pub const TEXT_BUFFER_SIZE: usize = 128;

/// Placeholder rendered for types without a text representation.
pub const UNSUPPORTED_TYPE: &str = "<unsupported type>";

/// Conversion between a value and its textual form.
pub trait TextValue: Sized {
    /// Render the value, optionally through a printf-style format.
    fn to_text(&self, format: Option<&str>) -> String {
        let _ = format;
        UNSUPPORTED_TYPE.to_string()
    }

    /// Parse a value from text. `None` when the text is not understood.
    fn from_text(text: &str) -> Option<Self> {
        let _ = text;
        None
    }
}

/// A single argument for [`format_value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg<'a> {
    Int(i128),
    Float(f64),
    Str(&'a str),
    Bool(bool),
}

impl FormatArg<'_> {
    fn as_int(&self) -> i128 {
        match *self {
            FormatArg::Int(v) => v,
            FormatArg::Float(v) => v as i128,
            FormatArg::Bool(v) => v as i128,
            FormatArg::Str(s) => s.trim().parse().unwrap_or(0),
        }
    }

    fn as_float(&self) -> f64 {
        match *self {
            FormatArg::Int(v) => v as f64,
            FormatArg::Float(v) => v,
            FormatArg::Bool(v) => f64::from(u8::from(v)),
            FormatArg::Str(s) => s.trim().parse().unwrap_or(0.0),
        }
    }

    fn as_display(&self) -> String {
        match *self {
            FormatArg::Int(v) => v.to_string(),
            FormatArg::Float(v) => v.to_string(),
            FormatArg::Str(s) => s.to_string(),
            FormatArg::Bool(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    width: usize,
    precision: Option<usize>,
}

/// Accumulate one decimal digit, saturating at the buffer size.
fn push_digit(acc: usize, digit: u32) -> usize {
    acc.saturating_mul(10)
        .saturating_add(digit as usize)
        .min(TEXT_BUFFER_SIZE)
}

/// Render `arg` through a printf-style `format`, truncated to the text buffer.
///
/// Every conversion in the format string renders the same argument.
/// Unrecognized conversions are copied through verbatim. Width and precision
/// are capped at [`TEXT_BUFFER_SIZE`].
pub fn format_value(format: &str, arg: FormatArg<'_>) -> String {
    let mut out = String::new();
    let mut chars = format.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if out.len() >= TEXT_BUFFER_SIZE {
            break;
        }
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&(_, flag)) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                _ => break,
            }
            chars.next();
        }
        while let Some(&(_, d)) = chars.peek() {
            let Some(digit) = d.to_digit(10) else { break };
            spec.width = push_digit(spec.width, digit);
            chars.next();
        }
        if let Some(&(_, '.')) = chars.peek() {
            chars.next();
            let mut precision = 0;
            while let Some(&(_, d)) = chars.peek() {
                let Some(digit) = d.to_digit(10) else { break };
                precision = push_digit(precision, digit);
                chars.next();
            }
            spec.precision = Some(precision);
        }
        // Length modifiers carry no meaning here.
        while let Some(&(_, 'l' | 'h' | 'z' | 'L')) = chars.peek() {
            chars.next();
        }

        let Some((end, conv)) = chars.next() else {
            out.push_str(&format[start..]);
            break;
        };

        let body = match conv {
            '%' => {
                out.push('%');
                continue;
            }
            'd' | 'i' => signed(arg.as_int().to_string(), &spec),
            'u' => arg.as_int().max(0).to_string(),
            'x' => format!("{:x}", arg.as_int()),
            'X' => format!("{:X}", arg.as_int()),
            'f' | 'F' => signed(fixed(arg.as_float(), spec.precision.unwrap_or(6)), &spec),
            'e' => signed(scientific(arg.as_float(), spec.precision.unwrap_or(6)), &spec),
            'g' => signed(general(arg.as_float(), spec.precision.unwrap_or(6)), &spec),
            's' => {
                let text = arg.as_display();
                match spec.precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                }
            }
            _ => {
                out.push_str(&format[start..end + conv.len_utf8()]);
                continue;
            }
        };

        let numeric = !matches!(conv, 's');
        pad_into(&mut out, &body, &spec, numeric);
    }

    truncate_to_buffer(out)
}

/// Truncate text so it fits the fixed buffer, respecting char boundaries.
pub fn truncate_to_buffer(mut text: String) -> String {
    let limit = TEXT_BUFFER_SIZE - 1;
    if text.len() > limit {
        let mut cut = limit;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}

fn signed(body: String, spec: &Spec) -> String {
    if body.starts_with('-') {
        body
    } else if spec.plus {
        format!("+{body}")
    } else if spec.space {
        format!(" {body}")
    } else {
        body
    }
}

fn fixed(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

fn scientific(value: f64, precision: usize) -> String {
    let rendered = format!("{value:.precision$e}");
    match rendered.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => rendered,
    }
}

fn general(value: f64, precision: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return if value.is_finite() { "0".to_string() } else { value.to_string() };
    }
    let precision = precision.max(1);
    // The exponent is taken after rounding, as %e would print it.
    let digits = precision - 1;
    let exp = format!("{value:.digits$e}")
        .split_once('e')
        .and_then(|(_, exp)| exp.parse::<i32>().ok())
        .unwrap_or(0);
    let rendered = if exp < -4 || exp >= precision as i32 {
        scientific(value, precision - 1)
    } else {
        fixed(value, (precision as i32 - 1 - exp).max(0) as usize)
    };
    strip_trailing_zeros(rendered)
}

fn strip_trailing_zeros(text: String) -> String {
    let (mantissa, exponent) = match text.find('e') {
        Some(pos) => text.split_at(pos),
        None => (text.as_str(), ""),
    };
    if !mantissa.contains('.') {
        return text;
    }
    let trimmed = mantissa.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}{exponent}")
}

fn pad_into(out: &mut String, body: &str, spec: &Spec, numeric: bool) {
    let len = body.chars().count();
    if len >= spec.width {
        out.push_str(body);
        return;
    }
    let fill = spec.width - len;
    if spec.left {
        out.push_str(body);
        out.extend(std::iter::repeat_n(' ', fill));
    } else if spec.zero && numeric {
        let (sign, digits) = match body.chars().next() {
            Some(s @ ('-' | '+' | ' ')) => (Some(s), &body[1..]),
            _ => (None, body),
        };
        if let Some(s) = sign {
            out.push(s);
        }
        out.extend(std::iter::repeat_n('0', fill));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat_n(' ', fill));
        out.push_str(body);
    }
}

impl TextValue for bool {
    fn to_text(&self, format: Option<&str>) -> String {
        match format {
            Some(f) => format_value(f, FormatArg::Bool(*self)),
            None => self.to_string(),
        }
    }

    fn from_text(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}

macro_rules! impl_text_value_int {
    ($($ty:ty),*) => {
        $(
            impl TextValue for $ty {
                fn to_text(&self, format: Option<&str>) -> String {
                    match format {
                        Some(f) => format_value(f, FormatArg::Int(*self as i128)),
                        None => self.to_string(),
                    }
                }

                fn from_text(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }
            }
        )*
    };
}

impl_text_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_text_value_float {
    ($($ty:ty => $default:literal),*) => {
        $(
            impl TextValue for $ty {
                fn to_text(&self, format: Option<&str>) -> String {
                    format_value(format.unwrap_or($default), FormatArg::Float(f64::from(*self)))
                }

                fn from_text(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }
            }
        )*
    };
}

impl_text_value_float!(f32 => "%.3f", f64 => "%.6f");

impl TextValue for String {
    fn to_text(&self, format: Option<&str>) -> String {
        match format {
            Some(f) => format_value(f, FormatArg::Str(self)),
            None => self.clone(),
        }
    }

    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

impl<T: TextValue + Copy + Default, const N: usize> TextValue for [T; N] {
    fn to_text(&self, format: Option<&str>) -> String {
        let mut out = String::from("(");
        for (i, element) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}", element.to_text(format));
        }
        out.push(')');
        truncate_to_buffer(out)
    }

    fn from_text(text: &str) -> Option<Self> {
        let inner = text
            .trim()
            .trim_start_matches(['(', '['])
            .trim_end_matches([')', ']']);
        let mut values = [T::default(); N];
        let mut parts = inner.split(',');
        for slot in values.iter_mut() {
            *slot = T::from_text(parts.next()?)?;
        }
        if parts.next().is_some() {
            return None;
        }
        Some(values)
    }
}
