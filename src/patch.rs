//! Strict application of a single-file unified diff.
//!
//! Every hunk must match the original text exactly at the line numbers its
//! header states. There is no fuzz factor and no offset search; a hunk that
//! does not match fails the whole patch.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};

fn hunk_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("hunk pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Context(String),
    Remove(String),
    Add(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Hunk {
    old_start: usize,
    old_count: usize,
    new_start: usize,
    new_count: usize,
    lines: Vec<Line>,
    /// The old side's last line has no trailing newline.
    old_no_eol: bool,
    /// The new side's last line has no trailing newline.
    new_no_eol: bool,
}

impl Hunk {
    fn old_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            Line::Context(s) | Line::Remove(s) => Some(s.as_str()),
            Line::Add(_) => None,
        })
    }

    fn new_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            Line::Context(s) | Line::Add(s) => Some(s.as_str()),
            Line::Remove(_) => None,
        })
    }
}

/// A parsed unified diff for one named file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    filename: String,
    hunks: Vec<Hunk>,
}

impl FilePatch {
    /// Parse `diff` as a patch to `filename`.
    ///
    /// File headers (`Index:`, `diff`, `---`, `+++`) are optional, but when a
    /// `+++` header is present it must name `filename`.
    pub fn parse(filename: &str, diff: &str) -> Result<Self> {
        let error = |message: String| Error::PatchApply {
            file: filename.to_string(),
            message,
        };

        let mut hunks: Vec<Hunk> = Vec::new();
        let mut seen_header = false;
        let mut lines = diff
            .strip_suffix('\n')
            .unwrap_or(diff)
            .split('\n')
            .peekable();

        while let Some(line) = lines.next() {
            if let Some(caps) = hunk_header().captures(line) {
                let number = |i: usize, default: usize| {
                    caps.get(i)
                        .map_or(Ok(default), |m| m.as_str().parse::<usize>())
                        .map_err(|e| error(format!("bad hunk header '{}': {}", line, e)))
                };
                let mut hunk = Hunk {
                    old_start: number(1, 0)?,
                    old_count: number(2, 1)?,
                    new_start: number(3, 0)?,
                    new_count: number(4, 1)?,
                    lines: Vec::new(),
                    old_no_eol: false,
                    new_no_eol: false,
                };

                let (mut old_seen, mut new_seen) = (0, 0);
                while old_seen < hunk.old_count || new_seen < hunk.new_count {
                    let Some(body) = lines.next() else {
                        return Err(error(format!(
                            "hunk at line {} is truncated",
                            hunk.old_start
                        )));
                    };
                    let mut chars = body.chars();
                    let tag = chars.next();
                    let text = chars.as_str().to_string();
                    match tag {
                        None => {
                            hunk.lines.push(Line::Context(String::new()));
                            old_seen += 1;
                            new_seen += 1;
                        }
                        Some('\r') if text.is_empty() => {
                            hunk.lines.push(Line::Context(body.to_string()));
                            old_seen += 1;
                            new_seen += 1;
                        }
                        Some(' ') => {
                            hunk.lines.push(Line::Context(text));
                            old_seen += 1;
                            new_seen += 1;
                        }
                        Some('-') => {
                            hunk.lines.push(Line::Remove(text));
                            old_seen += 1;
                        }
                        Some('+') => {
                            hunk.lines.push(Line::Add(text));
                            new_seen += 1;
                        }
                        Some('\\') => mark_no_eol(&mut hunk),
                        Some(_) => {
                            return Err(error(format!(
                                "unexpected line in hunk at line {}: '{}'",
                                hunk.old_start, body
                            )))
                        }
                    }
                }
                if old_seen != hunk.old_count || new_seen != hunk.new_count {
                    return Err(error(format!(
                        "hunk does not match its header @@ -{},{} +{},{} @@",
                        hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
                    )));
                }
                while lines.peek().is_some_and(|l| l.starts_with('\\')) {
                    lines.next();
                    mark_no_eol(&mut hunk);
                }
                hunks.push(hunk);
            } else if let Some(target) = line.strip_prefix("+++ ") {
                if seen_header {
                    return Err(error("diff touches more than one file".to_string()));
                }
                seen_header = true;
                let target = header_path(target);
                if target != filename && !target.ends_with(&format!("/{}", filename)) {
                    return Err(error(format!("diff is for '{}'", target)));
                }
            } else if !hunks.is_empty() && line.starts_with("--- ") {
                return Err(error("diff touches more than one file".to_string()));
            }
        }

        if hunks.is_empty() {
            return Err(error("diff contains no hunks".to_string()));
        }

        Ok(Self {
            filename: filename.to_string(),
            hunks,
        })
    }

    /// Apply the patch to `original`, returning the patched text.
    pub fn apply(&self, original: &str) -> Result<String> {
        let error = |message: String| Error::PatchApply {
            file: self.filename.clone(),
            message,
        };

        let mut ends_with_newline = original.ends_with('\n');
        let source: Vec<&str> = if original.is_empty() {
            Vec::new()
        } else {
            original
                .strip_suffix('\n')
                .unwrap_or(original)
                .split('\n')
                .collect()
        };

        let mut output: Vec<&str> = Vec::with_capacity(source.len());
        let mut cursor = 0;

        for (index, hunk) in self.hunks.iter().enumerate() {
            let start = if hunk.old_count == 0 {
                hunk.old_start
            } else {
                hunk.old_start.saturating_sub(1)
            };
            if start < cursor {
                return Err(error(format!("hunk #{} overlaps the previous one", index + 1)));
            }
            let end = match start.checked_add(hunk.old_count) {
                Some(end) if end <= source.len() => end,
                _ => {
                    return Err(error(format!(
                        "hunk #{} expects lines {}..{} but the file has {} lines",
                        index + 1,
                        hunk.old_start,
                        hunk.old_start.saturating_add(hunk.old_count),
                        source.len()
                    )))
                }
            };
            for (offset, (expected, actual)) in
                hunk.old_lines().zip(&source[start..end]).enumerate()
            {
                if expected != *actual {
                    return Err(error(format!(
                        "hunk #{} does not apply at line {}: expected '{}', found '{}'",
                        index + 1,
                        start + offset + 1,
                        expected,
                        actual
                    )));
                }
            }

            if end == source.len() && hunk.old_count > 0 && hunk.old_no_eol == ends_with_newline
            {
                return Err(error(format!(
                    "hunk #{} disagrees about the newline at end of file",
                    index + 1
                )));
            }

            output.extend_from_slice(&source[cursor..start]);
            output.extend(hunk.new_lines());
            cursor = end;

            if end == source.len() {
                ends_with_newline = !hunk.new_no_eol;
            }
        }
        output.extend_from_slice(&source[cursor..]);

        debug!(
            "Applied {} hunk(s) to {}",
            self.hunks.len(),
            self.filename
        );

        let mut patched = output.join("\n");
        if ends_with_newline && !output.is_empty() {
            patched.push('\n');
        }
        Ok(patched)
    }
}

/// Record a `\ No newline at end of file` marker against the side(s) of the
/// hunk's last line.
fn mark_no_eol(hunk: &mut Hunk) {
    match hunk.lines.last() {
        Some(Line::Context(_)) => {
            hunk.old_no_eol = true;
            hunk.new_no_eol = true;
        }
        Some(Line::Remove(_)) => hunk.old_no_eol = true,
        Some(Line::Add(_)) => hunk.new_no_eol = true,
        None => {}
    }
}

/// Strip `a/`/`b/` prefixes and trailing timestamps or revisions from a
/// `+++` header path.
fn header_path(raw: &str) -> &str {
    let path = raw
        .split('\t')
        .next()
        .unwrap_or(raw)
        .split(" (")
        .next()
        .unwrap_or(raw)
        .trim();
    path.strip_prefix("b/").unwrap_or(path)
}

/// Patch the file at `source` with `diff` and write the result to `dest`.
///
/// `source` and `dest` may be the same path.
pub fn apply_to_file(source: &Path, diff: &str, dest: &Path) -> Result<()> {
    let filename = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let patch = FilePatch::parse(&filename, diff)?;
    let original = fs::read_to_string(source)?;
    let patched = patch.apply(&original)?;
    fs::write(dest, patched)?;
    Ok(())
}
