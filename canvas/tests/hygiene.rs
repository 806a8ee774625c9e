//! Source checks over both crates in the workspace.
//!
//! `skycanvas` runs inside browser frame callbacks where a panic takes the
//! page down, so its production files carry no panicking or error-swallowing
//! calls. `skyhost` shares one `RefCell` between local tasks, so no mutable
//! borrow may stay alive across an await point. Numeric `as` casts in either
//! crate need a `clippy::cast_*` allow on the enclosing function.

use std::fs;
use std::path::{Path, PathBuf};

const CANVAS_FORBIDDEN: &[&str] = &[
    ".unwrap()",
    ".expect(",
    "panic!(",
    "unreachable!(",
    "todo!(",
    "unimplemented!(",
    "let _ =",
    ".ok()",
    "#[allow(dead_code)]",
];

// Env lookups in the host legitimately turn `VarError` into `Option`.
const HOST_FORBIDDEN: &[&str] = &[".unwrap()", ".expect(", "panic!(", "todo!(", "unimplemented!("];

const NUMERIC: &[&str] = &[
    "f32", "f64", "u8", "u16", "u32", "u64", "usize", "i8", "i16", "i32", "i64", "isize",
];

/// Lines above a function header searched for its cast allow.
const ALLOW_WINDOW: usize = 3;

struct Source {
    path: PathBuf,
    lines: Vec<String>,
}

impl Source {
    /// Non-comment lines with their 1-based numbers.
    fn code(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| (i + 1, line.as_str()))
            .filter(|(_, line)| !line.trim_start().starts_with("//"))
    }
}

/// Production files of one crate, relative to this package. Both source
/// trees are flat.
fn crate_sources(relative: &str) -> Vec<Source> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(relative);
    let entries = fs::read_dir(&dir).unwrap_or_else(|e| panic!("{}: {e}", dir.display()));
    let mut sources: Vec<Source> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .filter(|path| !path.to_string_lossy().ends_with("_test.rs"))
        .map(|path| {
            let text = fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
            Source { path, lines: text.lines().map(str::to_owned).collect() }
        })
        .collect();
    assert!(!sources.is_empty(), "no sources under {}", dir.display());
    sources.sort_by(|a, b| a.path.cmp(&b.path));
    sources
}

fn find(sources: &[Source], matches: impl Fn(&Source, usize, &str) -> bool) -> Vec<String> {
    let mut found = Vec::new();
    for source in sources {
        for (number, line) in source.code() {
            if matches(source, number, line) {
                found.push(format!("  {}:{number}: {}", source.path.display(), line.trim()));
            }
        }
    }
    found
}

fn assert_none(what: &str, found: &[String]) {
    assert!(found.is_empty(), "{what}:\n{}", found.join("\n"));
}

/// A `let` bound to `borrow_mut()` whose block reaches an `.await`, or an
/// await in the same statement as the borrow.
fn borrow_spans_await(source: &Source, number: usize, line: &str) -> bool {
    if !line.contains("borrow_mut()") {
        return false;
    }
    if line.contains(".await") {
        return true;
    }
    if !line.trim_start().starts_with("let ") {
        return false;
    }
    let mut depth = 0i32;
    for rest in &source.lines[number..] {
        if rest.contains(".await") {
            return true;
        }
        depth += brace_delta(rest);
        if depth < 0 {
            return false;
        }
    }
    false
}

fn brace_delta(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

fn casts_to(line: &str, ty: &str) -> bool {
    let needle = format!(" as {ty}");
    line.match_indices(&needle)
        .any(|(at, _)| !line[at + needle.len()..].starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

fn is_fn_header(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.starts_with("//") && (trimmed.starts_with("fn ") || trimmed.contains(" fn "))
}

fn unallowed_cast(source: &Source, number: usize, line: &str) -> bool {
    if line.trim_start().starts_with("use ") || !NUMERIC.iter().any(|ty| casts_to(line, ty)) {
        return false;
    }
    let Some(header) = (0..number).rev().find(|&i| is_fn_header(&source.lines[i])) else {
        return true;
    };
    let from = header.saturating_sub(ALLOW_WINDOW);
    !source.lines[from..header]
        .iter()
        .any(|l| l.contains("#[allow(clippy::cast_"))
}

// =============================================================================
// skycanvas
// =============================================================================

#[test]
fn canvas_has_no_panics_or_swallowed_errors() {
    let sources = crate_sources("src");
    for pattern in CANVAS_FORBIDDEN {
        let found = find(&sources, |_, _, line| line.contains(pattern));
        assert_none(&format!("`{pattern}` in skycanvas"), &found);
    }
}

#[test]
fn canvas_casts_are_allowed_locally() {
    let sources = crate_sources("src");
    assert_none("numeric cast without a local clippy allow", &find(&sources, unallowed_cast));
}

// =============================================================================
// skyhost
// =============================================================================

#[test]
fn host_has_no_panics() {
    let sources = crate_sources("../src");
    for pattern in HOST_FORBIDDEN {
        let found = find(&sources, |_, _, line| line.contains(pattern));
        assert_none(&format!("`{pattern}` in skyhost"), &found);
    }
}

#[test]
fn host_never_holds_the_core_across_await() {
    let sources = crate_sources("../src");
    assert_none("RefCell borrow alive across an await", &find(&sources, borrow_spans_await));
}

#[test]
fn host_casts_are_allowed_locally() {
    let sources = crate_sources("../src");
    assert_none("numeric cast without a local clippy allow", &find(&sources, unallowed_cast));
}

// =============================================================================
// Checker
// =============================================================================

#[test]
fn borrow_scan_stops_at_block_end() {
    let held = Source {
        path: PathBuf::from("held.rs"),
        lines: ["let mut host = core.borrow_mut();", "host.tick();", "sleep().await;"]
            .map(str::to_owned)
            .to_vec(),
    };
    assert!(borrow_spans_await(&held, 1, &held.lines[0]));

    let scoped = Source {
        path: PathBuf::from("scoped.rs"),
        lines: ["{", "let mut host = core.borrow_mut();", "host.tick();", "}", "sleep().await;"]
            .map(str::to_owned)
            .to_vec(),
    };
    assert!(!borrow_spans_await(&scoped, 2, &scoped.lines[1]));
}

#[test]
fn cast_scan_reads_the_enclosing_allow() {
    let allowed = Source {
        path: PathBuf::from("allowed.rs"),
        lines: ["#[allow(clippy::cast_precision_loss)]", "fn avg(n: usize) -> f64 {", "    n as f64", "}"]
            .map(str::to_owned)
            .to_vec(),
    };
    assert!(!unallowed_cast(&allowed, 3, &allowed.lines[2]));

    let bare = Source {
        path: PathBuf::from("bare.rs"),
        lines: ["fn avg(n: usize) -> f64 {", "    n as f64", "}"].map(str::to_owned).to_vec(),
    };
    assert!(unallowed_cast(&bare, 2, &bare.lines[1]));
    assert!(!casts_to("use std::fmt::Write as f64ish;", "f64"));
}
