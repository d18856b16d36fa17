//! HTML helpers used by the `text` and `html` coercions.
//!
//! NOTE: This is a basic tag filter. Input that must be rendered as rich
//! markup from untrusted sources deserves a dedicated sanitizer.

/// Tags kept by the `html` type when no allow-list is given.
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "b",
    "blockquote",
    "br",
    "code",
    "em",
    "i",
    "li",
    "ol",
    "p",
    "pre",
    "strong",
    "ul",
];

/// Escapes HTML special characters.
///
/// Replaces:
/// - `&` -> `&amp;`
/// - `<` -> `&lt;`
/// - `>` -> `&gt;`
/// - `"` -> `&quot;`
/// - `'` -> `&#039;`
pub fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#039;"),
            _ => output.push(c),
        }
    }
    output
}

/// Elements whose content is dropped along with the tags unless allowed.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Remove every tag not in `allowed`.
///
/// Allowed tags are re-emitted without attributes. A disallowed `script` or
/// `style` element loses its content too, up to the matching closing tag or
/// the end of the input. An unterminated tag at the end of the input is
/// dropped.
pub fn clean_html<S: AsRef<str>>(input: &str, allowed: &[S]) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        push_text(&mut output, &rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('>') else {
            rest = "";
            break;
        };

        let tag = &after[..end];
        let closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        rest = &after[end + 1..];

        if !name.is_empty() && allowed.iter().any(|a| a.as_ref().eq_ignore_ascii_case(&name)) {
            output.push('<');
            if closing {
                output.push('/');
            }
            output.push_str(&name);
            output.push('>');
        } else if !closing && RAW_TEXT_TAGS.contains(&name.as_str()) {
            rest = skip_element(rest, &name);
        }
    }

    push_text(&mut output, rest);
    output
}

/// Input after the closing tag of `name`, or `""` when it is never closed.
fn skip_element<'a>(rest: &'a str, name: &str) -> &'a str {
    let lower = rest.to_ascii_lowercase();
    let closing = format!("</{}", name);

    let mut from = 0;
    while let Some(found) = lower[from..].find(&closing) {
        let start = from + found;
        let after = start + closing.len();
        let boundary = lower[after..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphanumeric());

        if boundary {
            return match rest[after..].find('>') {
                Some(end) => &rest[after + end + 1..],
                None => "",
            };
        }
        from = after;
    }

    ""
}

fn push_text(output: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}
