// Text-level processing of KIF shogi records. Everything here is heuristic
// line scanning, not a grammar: a move line is "leading integer + space", a
// board diagram is recognized by its border row. All functions are total over
// arbitrary input; missing structure degrades to warnings or empty output.

use serde::Serialize;

use crate::once_cell_regex;
use crate::util::{leading_whitespace_width, strip_chars};

pub const BOARD_BORDER: &str = "+---------------------------+";
pub const SENTE_PREFIX: &str = "先手：";
pub const GOTE_PREFIX: &str = "後手：";
pub const CAPTURED_PIECES_MARKER: &str = "持駒：";
// A result line mentions both "through" and "moves", e.g. "まで76手で先手の勝ち".
const RESULT_MARKERS: [&str; 2] = ["まで", "手で"];

fn move_line_number(line: &str) -> Option<u32> {
    let trimmed = line.trim();
    let re = once_cell_regex!(r"^(\d+)\s+");
    re.captures(trimmed).and_then(|cap| cap[1].parse().ok())
}

pub fn is_move_line(line: &str) -> bool { move_line_number(line).is_some() }

pub fn is_board_line(line: &str) -> bool { line.contains(BOARD_BORDER) }

/// Strips the indentation of the first non-blank line from every line that is
/// at least that wide. Records pasted from HTML often carry a uniform indent
/// that the external widget refuses to parse.
pub fn strip_common_indent(text: &str) -> String {
    let indent = text
        .split('\n')
        .find(|line| !line.trim().is_empty())
        .map_or(0, leading_whitespace_width);
    text.split('\n').map(|line| strip_chars(line, indent)).collect::<Vec<_>>().join("\n")
}

/// Canonical form: common indent stripped, per-line trailing whitespace
/// removed, runs of blank lines collapsed to a single blank line. Idempotent.
pub fn normalize(text: &str) -> String {
    let stripped = strip_common_indent(text);
    let mut result = Vec::new();
    let mut blank_run = 0;
    for line in stripped.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run == 1 {
                result.push(line);
            }
        } else {
            blank_run = 0;
            result.push(line);
        }
    }
    result.join("\n")
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Empty input is the only hard error. A record without a board diagram or
/// without move lines is still loadable, so those only warn.
pub fn validate(text: &str) -> Validation {
    if text.trim().is_empty() {
        return Validation {
            is_valid: false,
            errors: vec!["Record text is empty".to_owned()],
            warnings: Vec::new(),
        };
    }
    let mut has_board = false;
    let mut has_moves = false;
    for line in text.split('\n') {
        has_board |= is_board_line(line);
        has_moves |= is_move_line(line);
    }
    let mut warnings = Vec::new();
    if !has_board {
        warnings.push("No board diagram found".to_owned());
    }
    if !has_moves {
        warnings.push("No move lines found".to_owned());
    }
    Validation { is_valid: true, errors: Vec::new(), warnings }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecordInfo {
    pub sente: String,
    pub gote: String,
    pub result: String,
    /// Highest move number seen, not the number of move lines: out-of-order
    /// or repeated numbering still yields the final move count.
    pub move_count: u32,
    pub has_board: bool,
    pub has_captured_pieces: bool,
}

pub fn extract_info(text: &str) -> RecordInfo {
    let mut info = RecordInfo::default();
    for line in text.split('\n') {
        let trimmed = line.trim();
        if let Some(name) = trimmed.strip_prefix(SENTE_PREFIX) {
            info.sente = name.trim().to_owned();
        }
        if let Some(name) = trimmed.strip_prefix(GOTE_PREFIX) {
            info.gote = name.trim().to_owned();
        }
        if RESULT_MARKERS.iter().all(|marker| trimmed.contains(marker)) {
            info.result = trimmed.to_owned();
        }
        info.has_board |= is_board_line(trimmed);
        info.has_captured_pieces |= trimmed.contains(CAPTURED_PIECES_MARKER);
        if let Some(number) = move_line_number(trimmed) {
            info.move_count = info.move_count.max(number);
        }
    }
    info
}

/// One-line rendering: move descriptions only, joined by single spaces.
/// Trailing parenthesized annotations (origin squares, timestamps) and all
/// non-move lines are dropped.
pub fn to_compact(text: &str) -> String {
    let re = once_cell_regex!(r"^\s*\d+\s+(.+?)(?:\s+\(.*\))?$");
    text.split('\n')
        .filter_map(|line| {
            let trimmed = line.trim();
            if !is_move_line(trimmed) {
                return None;
            }
            re.captures(trimmed).map(|cap| cap[1].trim().to_owned())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Two-space indent on every non-blank line; blank lines stay empty.
pub fn to_detailed(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() { String::new() } else { format!("  {trimmed}") }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// HTML rendering with one container per line. Classification precedence:
/// move line, then board line, then info. Line content is passed through
/// verbatim, matching the historical formatter.
pub fn to_markup(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                "<br>".to_owned()
            } else if is_move_line(trimmed) {
                format!("<div class=\"kifu-move\">{trimmed}</div>")
            } else if is_board_line(trimmed) {
                format!("<div class=\"kifu-board\">{trimmed}</div>")
            } else {
                format!("<div class=\"kifu-info\">{trimmed}</div>")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
