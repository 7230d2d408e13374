//! Syntax highlighting for buffer rows.
//!
//! Highlighting is a single left-to-right scan over a row's rendered bytes.
//! The only state carried between rows is whether a block comment is still
//! open at the end of the row; [`crate::editor::TextBuffer`] feeds that flag
//! into the next row and re-runs the scan while it keeps changing.

pub mod spell;

use std::path::Path;

/// Highlight class of a single rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    #[default]
    Normal,
    /// Line comments and block comments, markers included.
    Comment,
    /// Control-flow keyword (`if`, `return`, ...).
    Keyword,
    /// Type keyword (table entries ending in `|`).
    Type,
    String,
    Number,
    /// Temporary search overlay.
    Match,
}

impl Highlight {
    /// ANSI foreground color code used when drawing this class.
    pub const fn color(self) -> u8 {
        match self {
            Self::Comment => 36,
            Self::Keyword => 33,
            Self::Type => 32,
            Self::String => 35,
            Self::Number => 31,
            Self::Match => 34,
            Self::Normal => 37,
        }
    }
}

/// Which optional passes a profile turns on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxFlags {
    pub numbers: bool,
    pub strings: bool,
    pub spellcheck: bool,
}

/// Highlighting rules for one file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxProfile {
    /// Name shown in the status bar.
    pub file_type: &'static str,
    /// Entries starting with `.` match the file extension; others match
    /// anywhere in the file name.
    pub file_match: &'static [&'static str],
    /// Keyword table. A trailing `|` marks a type keyword.
    pub keywords: &'static [&'static str],
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub flags: SyntaxFlags,
}

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "int|", "long|", "double|", "float|", "char|",
    "unsigned|", "signed|", "void|",
];

/// Built-in profile database.
pub static PROFILES: &[SyntaxProfile] = &[
    SyntaxProfile {
        file_type: "c",
        file_match: &[".c", ".h", ".cpp"],
        keywords: C_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: SyntaxFlags {
            numbers: true,
            strings: true,
            spellcheck: false,
        },
    },
    SyntaxProfile {
        file_type: "txt",
        file_match: &[".txt"],
        keywords: &[],
        line_comment: None,
        block_comment: None,
        flags: SyntaxFlags {
            numbers: false,
            strings: false,
            spellcheck: true,
        },
    },
];

/// Pick the profile whose matchers accept `filename`.
pub fn select_profile(filename: &Path) -> Option<SyntaxProfile> {
    let name = filename.to_string_lossy();
    let ext = filename
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()));

    PROFILES
        .iter()
        .find(|profile| {
            profile.file_match.iter().any(|pattern| {
                if pattern.starts_with('.') {
                    ext.as_deref() == Some(*pattern)
                } else {
                    name.contains(pattern)
                }
            })
        })
        .copied()
}

/// Whether `c` ends a word for number and keyword detection.
pub fn is_separator(c: u8) -> bool {
    c.is_ascii_whitespace() || c == 0 || b",.()+-/*=~%<>[];".contains(&c)
}

/// Result of highlighting one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHighlight {
    pub classes: Vec<Highlight>,
    /// Whether a block comment is still open at the end of the row.
    pub open_comment: bool,
}

/// Classify every byte of `render`.
///
/// `entering_comment` is the previous row's `open_comment`.
pub fn highlight_line(
    render: &[u8],
    profile: Option<&SyntaxProfile>,
    entering_comment: bool,
) -> LineHighlight {
    let mut classes = vec![Highlight::Normal; render.len()];
    let Some(profile) = profile else {
        return LineHighlight {
            classes,
            open_comment: false,
        };
    };

    let line_comment = profile
        .line_comment
        .map(str::as_bytes)
        .filter(|marker| !marker.is_empty());
    let block_comment = profile
        .block_comment
        .map(|(start, end)| (start.as_bytes(), end.as_bytes()))
        .filter(|(start, end)| !start.is_empty() && !end.is_empty());

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut in_comment = entering_comment && block_comment.is_some();

    let mut i = 0;
    while i < render.len() {
        let c = render[i];
        let prev_hl = if i > 0 {
            classes[i - 1]
        } else {
            Highlight::Normal
        };

        if let Some(marker) = line_comment {
            if in_string.is_none() && !in_comment && render[i..].starts_with(marker) {
                classes[i..].fill(Highlight::Comment);
                break;
            }
        }

        if let Some((start, end)) = block_comment {
            if in_string.is_none() {
                if in_comment {
                    classes[i] = Highlight::Comment;
                    if render[i..].starts_with(end) {
                        classes[i..i + end.len()].fill(Highlight::Comment);
                        i += end.len();
                        in_comment = false;
                        prev_sep = true;
                    } else {
                        i += 1;
                    }
                    continue;
                } else if render[i..].starts_with(start) {
                    classes[i..i + start.len()].fill(Highlight::Comment);
                    i += start.len();
                    in_comment = true;
                    continue;
                }
            }
        }

        if profile.flags.strings {
            if let Some(quote) = in_string {
                classes[i] = Highlight::String;
                if c == b'\\' && i + 1 < render.len() {
                    classes[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == b'"' || c == b'\'' {
                in_string = Some(c);
                classes[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if profile.flags.numbers
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            classes[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            if let Some((len, class)) = match_keyword(profile.keywords, &render[i..]) {
                classes[i..i + len].fill(class);
                i += len;
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    LineHighlight {
        classes,
        open_comment: in_comment,
    }
}

/// Longest whole-word keyword at the start of `text`.
fn match_keyword(keywords: &[&str], text: &[u8]) -> Option<(usize, Highlight)> {
    keywords
        .iter()
        .filter_map(|keyword| {
            let (word, class) = match keyword.strip_suffix('|') {
                Some(word) => (word.as_bytes(), Highlight::Type),
                None => (keyword.as_bytes(), Highlight::Keyword),
            };
            if word.is_empty() || !text.starts_with(word) {
                return None;
            }
            let whole_word = text.get(word.len()).is_none_or(|&next| is_separator(next));
            whole_word.then_some((word.len(), class))
        })
        .max_by_key(|(len, _)| *len)
}
