//! Text transforms applied to the Claude Code entry file. Pure functions
//! over `&str`; all file I/O stays with the caller so the transforms can be
//! tested against literal fixtures.

use regex::Regex;
use std::sync::LazyLock;

use crate::locate::CLAUDE_CODE_PACKAGE;

const CONTEXT_FILE: &str = "CLAUDE.md";
const CONTEXT_FILE_REPLACEMENT: &str = "AGENTS.md";

static CONTEXT_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CLAUDE\.md").unwrap());

static QUOTED_SPECIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(["']){}(["'])"#,
        regex::escape(CLAUDE_CODE_PACKAGE)
    ))
    .unwrap()
});

/// Full transform applied before dispatch in AGENTS mode. The specifier
/// suffix is only needed for local installs, where a nested copy of the
/// package can shadow the intended one during module resolution.
pub fn apply(source: &str, local_install: bool) -> String {
    let source = if local_install {
        suffix_module_specifier(source)
    } else {
        source.to_string()
    };
    rename_context_file(&source)
}

/// Append a path separator to the bare quoted package specifier. Subpath
/// specifiers (`"@anthropic-ai/claude-code/…"`) are left alone, which also
/// makes the transform idempotent.
pub fn suffix_module_specifier(source: &str) -> String {
    let replacement = format!("${{1}}{CLAUDE_CODE_PACKAGE}/${{2}}");
    QUOTED_SPECIFIER_RE
        .replace_all(source, replacement.as_str())
        .into_owned()
}

/// Replace every `CLAUDE.md` with `AGENTS.md` unless the token is directly
/// preceded by a comma. The comma exclusion is literal and intentional.
/// Matches are filtered on the preceding byte rather than consumed by the
/// pattern so adjacent tokens are each considered on their own.
pub fn rename_context_file(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for m in CONTEXT_FILE_RE.find_iter(source) {
        let after_comma = m.start() > 0 && source.as_bytes()[m.start() - 1] == b',';
        out.push_str(&source[last..m.start()]);
        out.push_str(if after_comma {
            CONTEXT_FILE
        } else {
            CONTEXT_FILE_REPLACEMENT
        });
        last = m.end();
    }
    out.push_str(&source[last..]);
    out
}
