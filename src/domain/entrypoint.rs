//! Entry document rewriting
//!
//! The shared entry file (`app.js`) imports every route module and mounts
//! each one on the Express app. A service bundle only needs its own routes,
//! so the copy placed in each BuildTarget is rewritten:
//!
//! - route imports that don't mention the keyword are dropped
//! - route mounts that don't mention the keyword are commented out
//!
//! The on-disk source file is never touched; only the copy is rewritten.
//!
//! ## Modes
//!
//! [`RewriteMode::Span`] replaces everything from the first route import to
//! the end of the last one with the kept imports, so any comment or
//! statement sitting between two route imports is lost. Mount lines are
//! commented via first-occurrence text replacement, which misfires when the
//! same mount line appears twice. This is what existing bundles were built
//! with and stays the default.
//!
//! [`RewriteMode::Lines`] works line by line: only the dropped import lines
//! disappear and each mount line is commented where it stands.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::Keyword;

/// Route imports: `require('./routes/x')`, `from './routes/x'`, `import './routes/x'`
pub const DEFAULT_IMPORT_PATTERN: &str =
    r#"^.*(?:require\(\s*|from\s+|import\s+)['"][^'"\n]*\broutes/[^'"\n]*['"].*$"#;

/// Route mounts: `app.use('/x', xRoutes)`, with any middleware before the router
/// (`app.use('/x', auth, xRoutes)`) and `xRoutes_1.default` from compiled TypeScript
pub const DEFAULT_MOUNT_PATTERN: &str =
    r#"^.*\bapp\.use\(\s*['"]/[^'"\n]*['"]\s*,\s*(?:[^\n]*,\s*)?[\w$.]*Routes(?:_\d+)?(?:\.default)?\s*\).*$"#;

const REMOVED_SUFFIX: &str = "// Removed by build script";

/// How the import block and mount lines are edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteMode {
    /// Replace the whole import span, comment mounts by text replacement
    #[default]
    Span,
    /// Edit matching lines in place, keep everything else
    Lines,
}

impl RewriteMode {
    pub fn as_str(&self) -> &str {
        match self {
            RewriteMode::Span => "span",
            RewriteMode::Lines => "lines",
        }
    }
}

/// Counts gathered while rewriting, reported per BuildTarget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub imports_found: usize,
    pub imports_kept: usize,
    pub mounts_found: usize,
    pub mounts_kept: usize,
}

/// Result of rewriting an entry document
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub text: String,
    pub stats: RewriteStats,
}

/// Restricts an entry document to one keyword's routes
#[derive(Debug, Clone)]
pub struct EntrypointRewriter {
    imports: Regex,
    mounts: Regex,
    mode: RewriteMode,
}

impl Default for EntrypointRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_IMPORT_PATTERN, DEFAULT_MOUNT_PATTERN, RewriteMode::default())
            .expect("valid regex")
    }
}

impl EntrypointRewriter {
    /// Compiles the line patterns; both are matched per line, with `\r\n` treated as a line end
    pub fn new(
        import_pattern: &str,
        mount_pattern: &str,
        mode: RewriteMode,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            imports: line_regex(import_pattern)?,
            mounts: line_regex(mount_pattern)?,
            mode,
        })
    }

    /// Rewrites `document` so that only `keyword`'s routes stay active
    pub fn rewrite(&self, document: &str, keyword: &Keyword) -> Rewrite {
        match self.mode {
            RewriteMode::Span => self.rewrite_span(document, keyword),
            RewriteMode::Lines => self.rewrite_lines(document, keyword),
        }
    }

    fn rewrite_span(&self, document: &str, keyword: &Keyword) -> Rewrite {
        let mut stats = RewriteStats::default();

        let imports: Vec<_> = self.imports.find_iter(document).collect();
        let kept: Vec<&str> = imports
            .iter()
            .map(|m| m.as_str())
            .filter(|line| keyword.matches(line))
            .collect();
        stats.imports_found = imports.len();
        stats.imports_kept = kept.len();

        let eol = if document.contains("\r\n") { "\r\n" } else { "\n" };
        let mut text = match (imports.first(), imports.last()) {
            (Some(first), Some(last)) => format!(
                "{}{}{}",
                &document[..first.start()],
                kept.join(eol),
                &document[last.end()..]
            ),
            _ => document.to_string(),
        };

        // Mounts are scanned after the import block has been replaced
        let mounts: Vec<String> = self
            .mounts
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect();
        stats.mounts_found = mounts.len();

        for line in &mounts {
            if keyword.matches(line) {
                stats.mounts_kept += 1;
            } else {
                text = text.replacen(line.as_str(), &comment_out(line), 1);
            }
        }

        Rewrite { text, stats }
    }

    fn rewrite_lines(&self, document: &str, keyword: &Keyword) -> Rewrite {
        let mut stats = RewriteStats::default();
        let mut text = String::with_capacity(document.len());

        for line in document.split_inclusive('\n') {
            let (body, eol) = split_eol(line);

            if self.imports.is_match(body) {
                stats.imports_found += 1;
                if keyword.matches(body) {
                    stats.imports_kept += 1;
                    text.push_str(line);
                }
            } else if self.mounts.is_match(body) {
                stats.mounts_found += 1;
                if keyword.matches(body) {
                    stats.mounts_kept += 1;
                    text.push_str(line);
                } else {
                    text.push_str(&comment_out(body));
                    text.push_str(eol);
                }
            } else {
                text.push_str(line);
            }
        }

        Rewrite { text, stats }
    }
}

fn line_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).multi_line(true).crlf(true).build()
}

fn comment_out(line: &str) -> String {
    format!("// {} {}", line, REMOVED_SUFFIX)
}

/// Splits a line into its body and its terminator (`\r\n`, `\n` or nothing)
fn split_eol(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, &line[body.len()..])
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, &line[body.len()..])
    } else {
        (line, "")
    }
}
