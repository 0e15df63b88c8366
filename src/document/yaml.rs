//! YAML text with comments.
//!
//! Values are parsed by `serde_yaml`, which drops comments, so comments are
//! recovered by a separate line scan that tracks the key path of each line.
//! Rendering walks the tree itself and lets `serde_yaml` render scalars and
//! sequences, placing comments around them.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::mem;

use serde_yaml::{Mapping, Value};

use super::path::{self, SEPARATOR};
use super::DocumentError;

pub type CommentMap = BTreeMap<String, Vec<String>>;

/// The pieces of a parsed YAML file.
#[derive(Debug, Default)]
pub struct Parsed {
    pub values: Mapping,
    pub header: Vec<String>,
    pub comments: CommentMap,
    pub inline_comments: CommentMap,
}

/// What a render needs besides the tree.
pub struct RenderContext<'a> {
    pub header: &'a [String],
    pub comments: &'a CommentMap,
    pub inline_comments: &'a CommentMap,
    pub indent: usize,
}

pub fn parse(text: &str) -> Result<Parsed, DocumentError> {
    let has_content = text.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#') && line != "---"
    });

    let values = if has_content {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| DocumentError::Parse {
                path: None,
                source: e,
            })?;
        match value {
            Value::Null => Mapping::new(),
            Value::Mapping(map) => path::normalize_keys(map),
            _ => return Err(DocumentError::NotAMapping { path: None }),
        }
    } else {
        Mapping::new()
    };

    let scan = scan_comments(text);
    Ok(Parsed {
        values,
        header: scan.header,
        comments: scan.comments,
        inline_comments: scan.inline_comments,
    })
}

pub fn render(values: &Mapping, ctx: &RenderContext<'_>) -> Result<String, DocumentError> {
    let mut out = String::new();
    if !ctx.header.is_empty() {
        for line in ctx.header {
            push_comment(&mut out, "", line);
        }
        out.push('\n');
    } else if first_comments_hold_blank(values, ctx) {
        // A leading blank line marks the header as empty.
        out.push('\n');
    }
    render_mapping(&mut out, values, "", 0, ctx)?;
    Ok(out)
}

fn render_mapping(
    out: &mut String,
    map: &Mapping,
    prefix: &str,
    depth: usize,
    ctx: &RenderContext<'_>,
) -> Result<(), DocumentError> {
    let pad = " ".repeat(depth * ctx.indent.max(1));
    let child_pad = " ".repeat(ctx.indent.max(1));

    for (key, value) in map {
        let Some(name) = path::key_string(key) else {
            continue;
        };
        let path = path::join(prefix, &name);
        let key_text = render_scalar(key)?;

        if let Some(lines) = ctx.comments.get(&path) {
            for line in lines {
                push_comment(out, &pad, line);
            }
        }
        let inline = match ctx.inline_comments.get(&path) {
            Some(lines) if !lines.is_empty() => format!(" # {}", lines.join(" # ")),
            _ => String::new(),
        };

        match value {
            Value::Mapping(section) if !section.is_empty() => {
                let _ = writeln!(out, "{pad}{key_text}:{inline}");
                render_mapping(out, section, &path, depth + 1, ctx)?;
            }
            Value::Sequence(items) if !items.is_empty() => {
                let _ = writeln!(out, "{pad}{key_text}:{inline}");
                for line in serde_yaml::to_string(value)?.lines() {
                    let _ = writeln!(out, "{pad}{child_pad}{line}");
                }
            }
            Value::Tagged(tagged) if is_block(&tagged.value) => {
                let _ = writeln!(out, "{pad}{key_text}: {}{inline}", tagged.tag);
                for line in serde_yaml::to_string(&tagged.value)?.lines() {
                    let _ = writeln!(out, "{pad}{child_pad}{line}");
                }
            }
            _ => {
                let body = serde_yaml::to_string(value)?;
                let mut lines = body.lines();
                let first = lines.next().unwrap_or_default();
                let _ = writeln!(out, "{pad}{key_text}: {first}{inline}");
                for line in lines {
                    let _ = writeln!(out, "{pad}{line}");
                }
            }
        }
    }

    Ok(())
}

fn is_block(value: &Value) -> bool {
    match value {
        Value::Mapping(map) => !map.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        _ => false,
    }
}

fn first_comments_hold_blank(values: &Mapping, ctx: &RenderContext<'_>) -> bool {
    values
        .keys()
        .find_map(path::key_string)
        .and_then(|first| ctx.comments.get(&first))
        .is_some_and(|lines| lines.iter().any(String::is_empty))
}

fn render_scalar(value: &Value) -> Result<String, DocumentError> {
    Ok(serde_yaml::to_string(value)?.trim_end().to_string())
}

fn push_comment(out: &mut String, pad: &str, line: &str) {
    if line.is_empty() {
        out.push('\n');
    } else {
        let _ = writeln!(out, "{pad}# {line}");
    }
}

#[derive(Debug, Default)]
struct CommentScan {
    header: Vec<String>,
    comments: CommentMap,
    inline_comments: CommentMap,
}

struct Frame {
    indent: usize,
    key: String,
}

/// Attributes comment lines to the key that follows them and trailing
/// comments to the key on the same line.
///
/// A leading comment block terminated by a blank line is the file header,
/// and a blank first line means there is none. Sequence items, block scalar
/// bodies and tagged collections are skipped as opaque.
fn scan_comments(text: &str) -> CommentScan {
    let mut scan = CommentScan::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut seen_key = false;
    let mut header_taken = false;
    let mut opaque: Option<usize> = None;

    for raw in text.lines() {
        let trimmed = raw.trim_start();
        let indent = raw.len() - trimmed.len();

        if let Some(limit) = opaque {
            let inside = trimmed.is_empty()
                || indent > limit
                || (indent == limit && trimmed.starts_with('-') && trimmed != "---");
            if inside {
                continue;
            }
            opaque = None;
        }

        if trimmed.is_empty() {
            if !seen_key && !header_taken {
                scan.header = mem::take(&mut pending);
                header_taken = true;
            } else {
                pending.push(String::new());
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('#') {
            pending.push(strip_one_space(rest).to_string());
            continue;
        }

        if trimmed == "---" || trimmed == "..." {
            continue;
        }

        if trimmed == "-" || trimmed.starts_with("- ") {
            opaque = Some(indent);
            pending.clear();
            continue;
        }

        let Some((key, remainder)) = split_key(trimmed) else {
            pending.clear();
            continue;
        };

        while stack.last().is_some_and(|frame| frame.indent >= indent) {
            stack.pop();
        }

        let mut path = String::new();
        for frame in &stack {
            path.push_str(&frame.key);
            path.push(SEPARATOR);
        }
        path.push_str(&key);

        seen_key = true;
        if !pending.is_empty() {
            scan.comments.insert(path.clone(), mem::take(&mut pending));
        }

        let (value_text, inline) = split_inline_comment(remainder);
        if let Some(inline) = inline {
            let lines = inline.split(" # ").map(str::to_string).collect();
            scan.inline_comments.insert(path, lines);
        }

        let value_text = value_text.trim();
        let bare_tag = value_text.starts_with('!') && !value_text.contains(char::is_whitespace);
        if value_text.starts_with('|') || value_text.starts_with('>') || bare_tag {
            opaque = Some(indent);
        } else if value_text.is_empty() {
            stack.push(Frame { indent, key });
        }
    }

    scan
}

fn strip_one_space(s: &str) -> &str {
    s.strip_prefix(' ').unwrap_or(s)
}

/// Splits a `key: value` line into the unquoted key and the text after `:`.
fn split_key(line: &str) -> Option<(String, &str)> {
    let first = line.chars().next()?;
    if matches!(first, '{' | '[' | '?' | '&' | '*' | '!') {
        return None;
    }

    if first == '"' || first == '\'' {
        let end = closing_quote(line, first)?;
        let rest = line[end + 1..].trim_start();
        let rest = rest.strip_prefix(':')?;
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let key: String = serde_yaml::from_str(&line[..=end]).ok()?;
        return Some((key, rest));
    }

    let bytes = line.as_bytes();
    let colon = (0..bytes.len()).find(|&i| {
        bytes[i] == b':' && bytes.get(i + 1).map_or(true, |b| b.is_ascii_whitespace())
    })?;
    let key = line[..colon].trim_end();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), &line[colon + 1..]))
}

/// Finds the byte index of the quote closing the one at index 0.
fn closing_quote(line: &str, quote: char) -> Option<usize> {
    let mut chars = line.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if quote == '"' => {
                chars.next();
            }
            c if c == quote => {
                if quote == '\'' && chars.peek().is_some_and(|&(_, next)| next == '\'') {
                    chars.next();
                    continue;
                }
                return Some(i);
            }
            _ => {}
        }
    }
    None
}

/// Splits the value part of a line from a trailing `# comment`.
fn split_inline_comment(rest: &str) -> (&str, Option<String>) {
    let mut in_single = false;
    let mut in_double = false;
    let mut prev_blank = true;
    let mut chars = rest.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if in_double => {
                chars.next();
            }
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            '#' if !in_single && !in_double && prev_blank => {
                let comment = strip_one_space(&rest[i + 1..]).trim_end().to_string();
                return (&rest[..i], Some(comment));
            }
            _ => {}
        }
        prev_blank = c.is_whitespace();
    }

    (rest, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_plain(values: &Mapping, comments: &CommentMap, inline: &CommentMap) -> String {
        render(
            values,
            &RenderContext {
                header: &[],
                comments,
                inline_comments: inline,
                indent: 2,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_parse_empty_and_comment_only_text() {
        assert!(parse("").unwrap().values.is_empty());
        assert!(parse("   \n\n").unwrap().values.is_empty());
        assert!(parse("# nothing here\n").unwrap().values.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_mapping_root() {
        assert!(matches!(
            parse("- a\n- b\n"),
            Err(DocumentError::NotAMapping { .. })
        ));
        assert!(matches!(
            parse("key: [unclosed\n"),
            Err(DocumentError::Parse { .. })
        ));
    }

    #[test]
    fn test_scan_attributes_comments_to_nested_keys() {
        let text = "\
# Server settings
server:
  # Port to bind
  port: 8080 # default port
  host: 'localhost' # quoted # twice
";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.comments["server"], ["Server settings"]);
        assert_eq!(parsed.comments["server.port"], ["Port to bind"]);
        assert_eq!(parsed.inline_comments["server.port"], ["default port"]);
        assert_eq!(parsed.inline_comments["server.host"], ["quoted", "twice"]);
    }

    #[test]
    fn test_scan_header_needs_blank_line() {
        let parsed = parse("# My app\n# v2\n\n# first key\nkey: 1\n").unwrap();
        assert_eq!(parsed.header, ["My app", "v2"]);
        assert_eq!(parsed.comments["key"], ["first key"]);

        let parsed = parse("# attached\nkey: 1\n").unwrap();
        assert!(parsed.header.is_empty());
        assert_eq!(parsed.comments["key"], ["attached"]);
    }

    #[test]
    fn test_scan_skips_sequences_and_block_scalars() {
        let text = "\
list:
  - name: a
    value: 1
text: |
  not: a key
  # not a comment
after: true
";
        let parsed = parse(text).unwrap();
        assert!(parsed.comments.is_empty());
        assert!(parsed.inline_comments.is_empty());
        assert_eq!(parsed.values.get("after"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_hash_inside_quotes_is_not_a_comment() {
        let parsed = parse("color: \"#ff0000\"\nchannel: '#general'\n").unwrap();
        assert!(parsed.inline_comments.is_empty());
        assert_eq!(parsed.values.get("color"), Some(&Value::from("#ff0000")));
    }

    #[test]
    fn test_render_places_comments_and_indents_sections() {
        let values: Mapping = serde_yaml::from_str("a:\n  b: 1\nlist: [x, y]\n").unwrap();
        let mut comments = CommentMap::new();
        comments.insert("a.b".into(), vec!["about b".into(), String::new()]);
        let mut inline = CommentMap::new();
        inline.insert("list".into(), vec!["two items".into()]);

        let text = render_plain(&values, &comments, &inline);
        assert_eq!(
            text,
            "a:\n  # about b\n\n  b: 1\nlist: # two items\n  - x\n  - y\n"
        );
    }

    #[test]
    fn test_render_then_parse_keeps_comments() {
        let values: Mapping =
            serde_yaml::from_str("version: '1.0'\nmap:\n  string: string\ntext: \"a\\nb\"\n")
                .unwrap();
        let mut comments = CommentMap::new();
        comments.insert("map.string".into(), vec!["nested".into()]);
        let mut inline = CommentMap::new();
        inline.insert("version".into(), vec!["do not edit".into()]);

        let text = render_plain(&values, &comments, &inline);
        let parsed = parse(&text).unwrap();

        assert_eq!(parsed.values, values);
        assert_eq!(parsed.comments, comments);
        assert_eq!(parsed.inline_comments, inline);
    }

    #[test]
    fn test_blank_line_in_first_comments_is_not_a_header() {
        let values: Mapping = serde_yaml::from_str("first: 1\nsecond: 2\n").unwrap();
        let mut comments = CommentMap::new();
        comments.insert("first".into(), vec!["About first".into(), String::new()]);

        let text = render_plain(&values, &comments, &CommentMap::new());
        assert_eq!(text, "\n# About first\n\nfirst: 1\nsecond: 2\n");

        let parsed = parse(&text).unwrap();
        assert!(parsed.header.is_empty());
        assert_eq!(parsed.comments, comments);
    }

    #[test]
    fn test_inline_comment_containing_separator_splits() {
        let values: Mapping = serde_yaml::from_str("key: 1\n").unwrap();
        let mut inline = CommentMap::new();
        inline.insert("key".into(), vec!["see issue # 12".into()]);

        let text = render_plain(&values, &CommentMap::new(), &inline);
        assert_eq!(text, "key: 1 # see issue # 12\n");
        assert_eq!(parse(&text).unwrap().inline_comments["key"], ["see issue", "12"]);
    }

    #[test]
    fn test_tagged_collections_nest_under_their_key() {
        let values: Mapping =
            serde_yaml::from_str("outer:\n  mode: !Fast\n    level: 3\nafter: 1\n").unwrap();
        let mut inline = CommentMap::new();
        inline.insert("outer.mode".into(), vec!["tagged".into()]);

        let text = render_plain(&values, &CommentMap::new(), &inline);
        assert_eq!(text, "outer:\n  mode: !Fast # tagged\n    level: 3\nafter: 1\n");

        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.values, values);
        assert_eq!(parsed.inline_comments, inline);
    }

    #[test]
    fn test_split_key_handles_quoted_keys() {
        assert_eq!(
            split_key("\"a key\": 1"),
            Some(("a key".to_string(), " 1"))
        );
        assert_eq!(split_key("'it''s': x"), Some(("it's".to_string(), " x")));
        assert_eq!(split_key("url: http://x"), Some(("url".to_string(), " http://x")));
        assert_eq!(split_key("no-colon-here"), None);
    }
}
