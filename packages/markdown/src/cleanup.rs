//! Normalization passes for canonical Markdown.
//!
//! Each pass is a function `&str -> String` applied in a fixed order; later
//! passes assume earlier ones already ran. The full pipeline is idempotent:
//! running it on its own output changes nothing, which keeps re-normalized
//! content stable across pipeline runs.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full normalization pipeline on markdown-ish text.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = md.to_string();

    result = normalize_line_endings(&result);
    result = ensure_heading_spacing(&result);
    result = canonicalize_bullets(&result);
    result = canonicalize_numbered(&result);
    result = reindent_lists(&result);
    result = merge_list_blocks(&result);
    result = format_blockquotes(&result);
    result = tidy_code_fences(&result);
    result = format_tables(&result);
    result = ensure_trailing_newline(&result);

    result
}

/// An opening or closing fence line.
fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Apply `f` to every line outside fenced code blocks; fence lines and
/// fence interiors pass through untouched.
fn map_lines_outside_fences(md: &str, f: impl Fn(&str) -> String) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_code_block = false;

    for line in md.lines() {
        if is_fence(line) {
            in_code_block = !in_code_block;
            out.push(line.to_string());
        } else if in_code_block {
            out.push(line.to_string());
        } else {
            out.push(f(line));
        }
    }

    out.join("\n")
}

// ---------------------------------------------------------------------------
// Pass 1: Line endings and blank-line runs
// ---------------------------------------------------------------------------

/// Normalize line endings to LF and collapse 3+ consecutive newlines into a
/// single blank line.
fn normalize_line_endings(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    let unified = md.replace("\r\n", "\n").replace('\r', "\n");
    MULTI_BLANK_RE.replace_all(&unified, "\n\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Heading spacing
// ---------------------------------------------------------------------------

/// Ensure exactly one blank line before and after every ATX heading line.
fn ensure_heading_spacing(md: &str) -> String {
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^#{1,6}\s").expect("valid regex"));

    let lines: Vec<&str> = md.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_code_block = false;

    for (i, line) in lines.iter().enumerate() {
        if is_fence(line) {
            in_code_block = !in_code_block;
            out.push((*line).to_string());
            continue;
        }
        if in_code_block || !HEADING_RE.is_match(line) {
            out.push((*line).to_string());
            continue;
        }

        if out.last().is_some_and(|prev| !prev.trim().is_empty()) {
            out.push(String::new());
        }
        out.push((*line).to_string());
        if lines.get(i + 1).is_some_and(|next| !next.trim().is_empty()) {
            out.push(String::new());
        }
    }

    out.join("\n")
}

// ---------------------------------------------------------------------------
// Pass 3: Bullet markers
// ---------------------------------------------------------------------------

/// Convert alternate bullet glyphs and the ASCII hyphen-as-bullet to the
/// canonical `* ` marker. Anchored at column zero; indented items are
/// handled by the re-indent pass.
fn canonicalize_bullets(md: &str) -> String {
    static GLYPH_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[•○◦·➢➤▶►→]\s+").expect("valid regex"));
    static DASH_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[-–—]\s+").expect("valid regex"));

    map_lines_outside_fences(md, |line| {
        if GLYPH_RE.is_match(line) {
            GLYPH_RE.replace(line, "* ").to_string()
        } else if DASH_RE.is_match(line) {
            DASH_RE.replace(line, "* ").to_string()
        } else {
            line.to_string()
        }
    })
}

// ---------------------------------------------------------------------------
// Pass 4: Numbered markers
// ---------------------------------------------------------------------------

/// Normalize `N.` / `N)` / `N]` list markers to `N. `.
fn canonicalize_numbered(md: &str) -> String {
    static NUMBER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(\d+)[.)\]]\s+").expect("valid regex"));

    map_lines_outside_fences(md, |line| {
        NUMBER_RE.replace(line, "${1}. ").to_string()
    })
}

// ---------------------------------------------------------------------------
// Pass 5: List re-indentation and numbering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

/// List-tracking state threaded through the line scan. Counters are kept
/// per nesting level so a numbered list resumes its count after a nested
/// block closes.
#[derive(Debug, Default)]
struct ListState {
    in_list: bool,
    current_indent: usize,
    stack: Vec<ListKind>,
    counters: Vec<usize>,
}

impl ListState {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Enter an item at `level`. The numbered counter restarts when the
    /// level is newly entered or the list kind at this level switched.
    fn enter(&mut self, level: usize, kind: ListKind) {
        if self.stack.len() > level + 1 {
            self.stack.truncate(level + 1);
            self.counters.truncate(level + 1);
        }
        while self.stack.len() <= level {
            self.stack.push(kind);
            self.counters.push(0);
        }
        if self.stack[level] != kind {
            self.stack[level] = kind;
            self.counters[level] = 0;
        }
        self.in_list = true;
        self.current_indent = level;
    }

    fn next_number(&mut self, level: usize) -> usize {
        self.counters[level] += 1;
        self.counters[level]
    }
}

/// Re-indent list items at two spaces per nesting level (level =
/// `floor(leadingSpaces / 2)`) and re-sequence numbered items per level.
/// Indented non-list lines inside a list become continuation lines one
/// level deeper.
fn reindent_lists(md: &str) -> String {
    static BULLET_ITEM_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(\s*)[*+-]\s+(.*)$").expect("valid regex"));
    static NUMBERED_ITEM_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(\s*)\d+\.\s+(.*)$").expect("valid regex"));
    static NUMBERED_START_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+\.").expect("valid regex"));

    let lines: Vec<&str> = md.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut state = ListState::default();
    let mut in_code_block = false;

    for (i, raw) in lines.iter().enumerate() {
        if is_fence(raw) {
            in_code_block = !in_code_block;
            out.push(raw.trim_end().to_string());
            continue;
        }
        if in_code_block {
            out.push((*raw).to_string());
            continue;
        }

        let line = raw.trim_end();

        if line.trim().is_empty() {
            // keep the blank; end the list unless the next line continues it
            let next = lines.get(i + 1).map(|l| l.trim()).unwrap_or("");
            let continues = next.starts_with('*') || NUMBERED_START_RE.is_match(next);
            out.push(String::new());
            if state.in_list && !continues {
                state.reset();
            }
            continue;
        }

        if let Some(caps) = BULLET_ITEM_RE.captures(line) {
            let level = caps[1].len() / 2;
            state.enter(level, ListKind::Bullet);
            out.push(format!("{}* {}", "  ".repeat(level), &caps[2]));
        } else if let Some(caps) = NUMBERED_ITEM_RE.captures(line) {
            let level = caps[1].len() / 2;
            state.enter(level, ListKind::Numbered);
            let n = state.next_number(level);
            out.push(format!("{}{}. {}", "  ".repeat(level), n, &caps[2]));
        } else if state.in_list
            && line.starts_with(char::is_whitespace)
            && !line.trim_start().starts_with('#')
        {
            // indented continuation of the current item
            out.push(format!(
                "{}{}",
                "  ".repeat(state.current_indent + 1),
                line.trim()
            ));
        } else {
            out.push(line.to_string());
            if !line.starts_with('#') && !line.starts_with(char::is_whitespace) {
                state.reset();
            }
        }
    }

    out.join("\n")
}

// ---------------------------------------------------------------------------
// Pass 6: Collapse gaps between list items
// ---------------------------------------------------------------------------

/// Drop blank lines separating consecutive items of the same list type so
/// visually split lists render as one continuous block. Runs to a fixpoint
/// in a single scan.
fn merge_list_blocks(md: &str) -> String {
    static NUMBERED_LINE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*\d+\.\s").expect("valid regex"));

    let kind_of = |line: &str| -> Option<ListKind> {
        if line.trim_start().starts_with("* ") {
            Some(ListKind::Bullet)
        } else if NUMBERED_LINE_RE.is_match(line) {
            Some(ListKind::Numbered)
        } else {
            None
        }
    };

    let lines: Vec<&str> = md.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_code_block = false;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if is_fence(line) {
            in_code_block = !in_code_block;
            out.push(line.to_string());
            i += 1;
            continue;
        }
        if !in_code_block && line.trim().is_empty() && i + 1 < lines.len() {
            let prev_kind = out.last().and_then(|l| kind_of(l));
            let next_kind = kind_of(lines[i + 1]);
            if prev_kind.is_some() && prev_kind == next_kind {
                i += 1;
                continue;
            }
        }
        out.push(line.to_string());
        i += 1;
    }

    out.join("\n")
}

// ---------------------------------------------------------------------------
// Pass 7: Blockquotes
// ---------------------------------------------------------------------------

/// Prefix attributed quote lines (a quoted sentence followed by an em-dash
/// attribution) with `> `.
fn format_blockquotes(md: &str) -> String {
    static QUOTE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"^\s*"[^"]+".*?—"#).expect("valid regex"));

    map_lines_outside_fences(md, |line| {
        if QUOTE_RE.is_match(line) {
            format!("> {line}")
        } else {
            line.to_string()
        }
    })
}

// ---------------------------------------------------------------------------
// Pass 8: Code fence interiors
// ---------------------------------------------------------------------------

/// Strip blank lines just inside fence boundaries (after the opening fence
/// and before the closing fence). Code content itself is untouched.
fn tidy_code_fences(md: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut block: Vec<String> = Vec::new();
    let mut in_code_block = false;

    for line in md.lines() {
        if is_fence(line) {
            if in_code_block {
                while block.first().is_some_and(|l| l.trim().is_empty()) {
                    block.remove(0);
                }
                while block.last().is_some_and(|l| l.trim().is_empty()) {
                    block.pop();
                }
                out.append(&mut block);
            }
            in_code_block = !in_code_block;
            out.push(line.to_string());
            continue;
        }
        if in_code_block {
            block.push(line.to_string());
        } else {
            out.push(line.to_string());
        }
    }
    // unterminated fence: flush the body untouched
    out.append(&mut block);

    out.join("\n")
}

// ---------------------------------------------------------------------------
// Pass 9: Tables
// ---------------------------------------------------------------------------

/// Normalize runs of pipe-bearing lines into well-formed table rows and
/// insert a `| --- |` separator after the header row when missing.
fn format_tables(md: &str) -> String {
    if !md.contains('|') {
        return md.to_string();
    }

    static SEPARATOR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[\s\-|:]+$").expect("valid regex"));

    fn flush(run: &mut Vec<&str>, out: &mut Vec<String>, separator_re: &Regex) {
        if run.len() < 2 {
            out.extend(run.drain(..).map(str::to_string));
            return;
        }
        let mut rows: Vec<String> = run.drain(..).map(normalize_table_row).collect();
        if !separator_re.is_match(&rows[1]) {
            let cols = rows[0].matches('|').count().saturating_sub(1);
            rows.insert(1, format!("| {} |", vec!["---"; cols].join(" | ")));
        }
        out.extend(rows);
    }

    let lines: Vec<&str> = md.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut run: Vec<&str> = Vec::new();
    let mut in_code_block = false;

    for line in lines {
        if is_fence(line) {
            flush(&mut run, &mut out, &SEPARATOR_RE);
            in_code_block = !in_code_block;
            out.push(line.to_string());
            continue;
        }
        if !in_code_block && line.contains('|') && !line.trim().is_empty() {
            run.push(line);
        } else {
            flush(&mut run, &mut out, &SEPARATOR_RE);
            out.push(line.to_string());
        }
    }
    flush(&mut run, &mut out, &SEPARATOR_RE);

    out.join("\n")
}

/// Trim cell whitespace and enforce leading/trailing pipes.
fn normalize_table_row(row: &str) -> String {
    let trimmed = row.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    let cells: Vec<&str> = trimmed.split('|').map(str::trim).collect();
    format!("| {} |", cells.join(" | "))
}

// ---------------------------------------------------------------------------
// Pass 10: Trailing newline
// ---------------------------------------------------------------------------

/// Ensure the output ends with exactly one newline.
fn ensure_trailing_newline(md: &str) -> String {
    let trimmed = md.trim_end_matches('\n');
    format!("{trimmed}\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
