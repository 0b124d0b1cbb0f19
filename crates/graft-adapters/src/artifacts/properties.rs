//! Flat `.properties` file codec.
//!
//! Keys are separated from values by `=`, `:` or whitespace, and a line
//! ending in an unescaped `\` continues on the next line. Multi-valued
//! properties are written comma-joined.
//!
//! Writing is line-preserving: comments, blank lines and untouched entries
//! are kept as they are, entries whose value changed are rewritten in place,
//! and new keys are appended at the end.

use std::{ops::Range, path::Path};

use graft_core::{
    application::ApplicationError,
    domain::{PropertyBlock, PropertyKey, PropertyValue},
    error::GraftResult,
};

/// One logical entry and the physical lines it spans.
#[derive(Debug)]
struct Entry<'a> {
    raw_key: &'a str,
    key: String,
    value: String,
    lines: Range<usize>,
}

pub fn parse(path: &Path, content: &str) -> GraftResult<PropertyBlock> {
    let lines: Vec<&str> = content.lines().collect();
    let mut block = PropertyBlock::new();

    for entry in entries(path, &lines)? {
        let key = PropertyKey::new(entry.key)?;
        let value = PropertyValue::new(entry.value.split(','))?;
        block.set(key, value);
    }

    Ok(block)
}

/// Write `block` over `existing`, returning the new file content.
pub fn render(path: &Path, existing: Option<&str>, block: &PropertyBlock) -> GraftResult<String> {
    let content = existing.unwrap_or_default();
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let lines: Vec<&str> = content.lines().collect();
    let entries = entries(path, &lines)?;

    let mut out = String::with_capacity(content.len());
    let mut index = 0;
    let mut pending = entries.iter().peekable();

    while index < lines.len() {
        let entry = pending.next_if(|entry| entry.lines.start == index);
        let changed = entry.and_then(|entry| {
            block
                .iter()
                .find(|(key, _)| key.as_str() == entry.key)
                .map(|(_, value)| value.joined())
                .filter(|value| *value != entry.value)
                .map(|value| (entry, value))
        });

        match (entry, changed) {
            (_, Some((entry, value))) => {
                out.push_str(&format!("{}={}{}", entry.raw_key, value, newline));
                index = entry.lines.end;
            }
            (Some(entry), None) => {
                for line in &lines[entry.lines.clone()] {
                    out.push_str(line);
                    out.push_str(newline);
                }
                index = entry.lines.end;
            }
            (None, _) => {
                out.push_str(lines[index]);
                out.push_str(newline);
                index += 1;
            }
        }
    }

    for (key, value) in block.iter() {
        if !entries.iter().any(|entry| entry.key == key.as_str()) {
            out.push_str(&format!("{}={}{}", key, value.joined(), newline));
        }
    }

    Ok(out)
}

fn entries<'a>(path: &Path, lines: &[&'a str]) -> GraftResult<Vec<Entry<'a>>> {
    let mut entries = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let first = lines[index].trim_start();
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            index += 1;
            continue;
        }

        let start = index;
        let mut logical = String::new();
        loop {
            let piece = lines[index].trim_start();
            index += 1;
            match piece.strip_suffix('\\').filter(|_| continues(piece)) {
                Some(head) if index < lines.len() => logical.push_str(head),
                Some(head) => {
                    logical.push_str(head);
                    break;
                }
                None => {
                    logical.push_str(piece);
                    break;
                }
            }
        }

        let (raw_key, value) = split_entry(first, &logical);
        let key = unescape(raw_key);
        if key.is_empty() {
            return Err(ApplicationError::MalformedArtifact {
                path: path.to_path_buf(),
                reason: format!("line {}: missing key", start + 1),
            }
            .into());
        }

        entries.push(Entry {
            raw_key,
            key,
            value,
            lines: start..index,
        });
    }

    Ok(entries)
}

/// An odd number of trailing backslashes continues the line.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line into its raw key and value.
///
/// The key is borrowed from the first physical line so rewrites keep its
/// original escaping.
fn split_entry<'a>(first: &'a str, logical: &str) -> (&'a str, String) {
    let mut escaped = false;
    let mut separator = None;
    for (offset, c) in logical.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' | ':' => {
                separator = Some((offset, false));
                break;
            }
            c if c.is_whitespace() => {
                separator = Some((offset, true));
                break;
            }
            _ => {}
        }
    }

    let Some((offset, whitespace)) = separator else {
        let key_len = logical.len().min(first.len());
        return (first[..key_len].trim_end_matches('\\'), String::new());
    };

    let rest = &logical[offset + 1..];
    let rest = if whitespace {
        let rest = rest.trim_start();
        rest.strip_prefix(['=', ':']).unwrap_or(rest)
    } else {
        rest
    };

    (&first[..offset.min(first.len())], rest.trim().to_string())
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "application.properties";

    fn key(name: &str) -> PropertyKey {
        PropertyKey::new(name).unwrap()
    }

    fn value(values: &[&str]) -> PropertyValue {
        PropertyValue::new(values.iter().copied()).unwrap()
    }

    fn merged(existing: &str, key_name: &str, values: &[&str]) -> String {
        let mut block = parse(Path::new(PATH), existing).unwrap();
        block.set(key(key_name), value(values));
        render(Path::new(PATH), Some(existing), &block).unwrap()
    }

    #[test]
    fn skips_comments_and_blanks() {
        let content = "# header\n\n! legacy\nserver.port=8080\nspring.profiles.active = local,dev\n";
        let block = parse(Path::new(PATH), content).unwrap();

        assert_eq!(block.len(), 2);
        let profiles = block.get(&key("spring.profiles.active")).unwrap();
        assert_eq!(profiles.values(), ["local", "dev"]);
    }

    #[test]
    fn value_may_contain_equals() {
        let block = parse(Path::new(PATH), "jdbc.url=jdbc:mysql://h/db?a=b\n").unwrap();
        assert_eq!(block.get(&key("jdbc.url")).unwrap().joined(), "jdbc:mysql://h/db?a=b");
    }

    #[test]
    fn colon_and_whitespace_separate_keys() {
        let content = "server.port: 8080\nserver.host localhost\nlogging.level : debug\n";
        let block = parse(Path::new(PATH), content).unwrap();

        assert_eq!(block.get(&key("server.port")).unwrap().joined(), "8080");
        assert_eq!(block.get(&key("server.host")).unwrap().joined(), "localhost");
        assert_eq!(block.get(&key("logging.level")).unwrap().joined(), "debug");
    }

    #[test]
    fn continuation_lines_are_joined() {
        let block = parse(Path::new(PATH), "list=a,\\\n  b\nnext=1\n").unwrap();

        assert_eq!(block.get(&key("list")).unwrap().values(), ["a", "b"]);
        assert_eq!(block.get(&key("next")).unwrap().joined(), "1");
    }

    #[test]
    fn escaped_backslash_does_not_continue() {
        let block = parse(Path::new(PATH), "path=C:\\\\\nnext=1\n").unwrap();

        assert_eq!(block.get(&key("path")).unwrap().joined(), "C:\\\\");
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn key_without_value_is_empty() {
        let block = parse(Path::new(PATH), "feature.flag\n").unwrap();
        assert_eq!(block.get(&key("feature.flag")).unwrap().joined(), "");
    }

    #[test]
    fn missing_key_is_malformed() {
        let err = parse(Path::new(PATH), "a=1\n=orphan\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn new_file_renders_in_block_order() {
        let mut block = PropertyBlock::new();
        block.set(key("b"), value(&["2"]));
        block.set(key("a"), value(&["x", "y"]));

        assert_eq!(render(Path::new(PATH), None, &block).unwrap(), "b=2\na=x,y\n");
    }

    #[test]
    fn merge_keeps_comments_and_blank_lines() {
        let existing = "# Database settings\n\nspring.datasource.url=jdbc:h2:mem\n";

        assert_eq!(
            merged(existing, "server.port", &["8080"]),
            "# Database settings\n\nspring.datasource.url=jdbc:h2:mem\nserver.port=8080\n"
        );
    }

    #[test]
    fn changed_value_is_rewritten_in_place() {
        let existing = "! ports\nserver.port: 8080\n# trailing\n";

        assert_eq!(
            merged(existing, "server.port", &["9090"]),
            "! ports\nserver.port=9090\n# trailing\n"
        );
    }

    #[test]
    fn unchanged_entries_keep_their_formatting() {
        let existing = "list = a,\\\n    b\nserver.port : 8080\n";

        assert_eq!(merged(existing, "server.port", &["8080"]), existing);
    }

    #[test]
    fn continued_entry_is_replaced_as_a_whole() {
        let existing = "list=a,\\\n  b\n# after\n";

        assert_eq!(merged(existing, "list", &["c"]), "list=c\n# after\n");
    }

    #[test]
    fn crlf_files_stay_crlf() {
        let existing = "# header\r\na=1\r\n";

        assert_eq!(merged(existing, "b", &["2"]), "# header\r\na=1\r\nb=2\r\n");
    }
}
