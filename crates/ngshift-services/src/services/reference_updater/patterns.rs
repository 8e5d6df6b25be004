//! Reference syntax patterns
//!
//! Every regex the reference scanner relies on lives here, behind one module
//! boundary, so the textual matching can later be swapped for a real parser
//! without touching the rename or conflict logic. Matching raw text instead
//! of an AST is a documented design limitation of the engine, not a bug.

use once_cell::sync::Lazy;
use regex::Regex;

/// Which surface syntax a reference candidate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `from '<path>'` in any quote style (import/export clauses)
    ModuleClause,
    /// Bare side-effect import: `import '<path>'`
    SideEffect,
    /// `templateUrl: '<path>'`
    TemplateUrl,
    /// `styleUrl: '<path>'`
    StyleUrl,
    /// One element of `styleUrls: ['<path>', ...]`
    StyleUrls,
}

impl RefKind {
    /// Module-reference clauses carry import style (relative vs. absolute)
    /// that must be preserved; metadata path fields are always file paths.
    pub fn is_module_clause(&self) -> bool {
        matches!(self, RefKind::ModuleClause | RefKind::SideEffect)
    }
}

/// One quoted path found in file content. `start..end` spans the path text
/// itself, quotes excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefCandidate {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub quote: char,
    pub kind: RefKind,
}

// A quoted string in any of the three quote styles. The regex crate has no
// backreferences, so each style is its own alternate.
const QUOTED: &str = r#"('[^'\n]*'|"[^"\n]*"|`[^`\n]*`)"#;

static FROM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\bfrom\s+{}", QUOTED)).expect("valid regex"));
static SIDE_EFFECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\bimport\s+{}", QUOTED)).expect("valid regex"));
static TEMPLATE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"templateUrl\s*:\s*{}", QUOTED)).expect("valid regex"));
static STYLE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"styleUrl\s*:\s*{}", QUOTED)).expect("valid regex"));
static STYLE_URLS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"styleUrls\s*:\s*\[([^\]]*)\]").expect("valid regex"));
static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(QUOTED).expect("valid regex"));

fn push_quoted(out: &mut Vec<RefCandidate>, offset: usize, quoted: &str, kind: RefKind) {
    if quoted.len() < 2 {
        return;
    }
    let quote = quoted.chars().next().unwrap_or('\'');
    out.push(RefCandidate {
        start: offset + 1,
        end: offset + quoted.len() - 1,
        text: quoted[1..quoted.len() - 1].to_string(),
        quote,
        kind,
    });
}

/// Find every reference candidate in `content` in a single pass over all
/// syntaxes, deduplicated so no two accepted candidates overlap.
///
/// Several patterns can claim the same substring (a `styleUrls` array element
/// is also a quoted path); candidates are processed sorted by position and
/// kept greedily non-overlapping, which prevents corrupted double
/// substitution.
pub fn find_reference_candidates(content: &str) -> Vec<RefCandidate> {
    let mut candidates = Vec::new();

    for captures in FROM_RE.captures_iter(content) {
        let group = captures.get(1).expect("quoted group");
        push_quoted(
            &mut candidates,
            group.start(),
            group.as_str(),
            RefKind::ModuleClause,
        );
    }
    for captures in SIDE_EFFECT_RE.captures_iter(content) {
        let group = captures.get(1).expect("quoted group");
        push_quoted(
            &mut candidates,
            group.start(),
            group.as_str(),
            RefKind::SideEffect,
        );
    }
    for captures in TEMPLATE_URL_RE.captures_iter(content) {
        let group = captures.get(1).expect("quoted group");
        push_quoted(
            &mut candidates,
            group.start(),
            group.as_str(),
            RefKind::TemplateUrl,
        );
    }
    for captures in STYLE_URL_RE.captures_iter(content) {
        let group = captures.get(1).expect("quoted group");
        push_quoted(
            &mut candidates,
            group.start(),
            group.as_str(),
            RefKind::StyleUrl,
        );
    }
    for captures in STYLE_URLS_RE.captures_iter(content) {
        let array = captures.get(1).expect("array group");
        for inner in QUOTED_RE.captures_iter(array.as_str()) {
            let group = inner.get(1).expect("quoted group");
            push_quoted(
                &mut candidates,
                array.start() + group.start(),
                group.as_str(),
                RefKind::StyleUrls,
            );
        }
    }

    // Greedy non-overlapping selection by position
    candidates.sort_by_key(|c| (c.start, c.end));
    let mut accepted: Vec<RefCandidate> = Vec::new();
    for candidate in candidates {
        if accepted
            .last()
            .map(|last| candidate.start >= last.end)
            .unwrap_or(true)
        {
            accepted.push(candidate);
        }
    }
    accepted
}

/// Well-known external package name prefixes that must never be rewritten.
pub const EXTERNAL_PACKAGE_PREFIXES: &[&str] = &[
    "rxjs", "zone.js", "tslib", "moment", "lodash", "jquery", "core-js",
];

/// True when the reference names a registry package rather than a
/// project-local file. Rewriting such a reference would silently break a
/// working build, so the heuristics here are deliberately conservative.
///
/// `project_scope` is the project's own `@scope` prefix, when it has one;
/// references under that scope are treated as project-local.
pub fn is_external_specifier(text: &str, kind: RefKind, project_scope: Option<&str>) -> bool {
    if text.starts_with('@') {
        match project_scope {
            Some(scope) => !text.starts_with(scope),
            None => true,
        }
    } else if EXTERNAL_PACKAGE_PREFIXES
        .iter()
        .any(|prefix| text == *prefix || text.starts_with(&format!("{}/", prefix)))
    {
        true
    } else if kind.is_module_clause() {
        // A bare specifier with no separator and no relative marker is a
        // package import; metadata path fields are always file paths.
        !text.contains('/') && !text.starts_with('.')
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_all_syntaxes_in_one_pass() {
        let content = r#"import { C } from './c.service';
import "./polyfill";
@Component({
  templateUrl: './x.component.html',
  styleUrl: `./solo.css`,
  styleUrls: ['./x.component.css', './shared.css'],
})
export class X {}
"#;
        let candidates = find_reference_candidates(content);
        let found: Vec<(&str, RefKind)> = candidates
            .iter()
            .map(|c| (c.text.as_str(), c.kind))
            .collect();
        assert_eq!(
            found,
            vec![
                ("./c.service", RefKind::ModuleClause),
                ("./polyfill", RefKind::SideEffect),
                ("./x.component.html", RefKind::TemplateUrl),
                ("./solo.css", RefKind::StyleUrl),
                ("./x.component.css", RefKind::StyleUrls),
                ("./shared.css", RefKind::StyleUrls),
            ]
        );
    }

    #[test]
    fn preserves_quote_character_and_span() {
        let content = "import { A } from \"./a\";";
        let candidates = find_reference_candidates(content);
        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.quote, '"');
        assert_eq!(&content[candidate.start..candidate.end], "./a");
    }

    #[test]
    fn overlapping_matches_are_deduplicated() {
        // The array elements must each appear exactly once
        let content = "styleUrls: ['./a.css', './b.css']";
        let candidates = find_reference_candidates(content);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].end <= candidates[1].start);
    }

    #[test]
    fn external_specifiers_are_recognized() {
        assert!(is_external_specifier("moment", RefKind::ModuleClause, None));
        assert!(is_external_specifier("rxjs/operators", RefKind::ModuleClause, None));
        assert!(is_external_specifier("@angular/core", RefKind::ModuleClause, None));
        assert!(!is_external_specifier(
            "@app/shared/user",
            RefKind::ModuleClause,
            Some("@app")
        ));
        assert!(!is_external_specifier("./user", RefKind::ModuleClause, None));
        assert!(!is_external_specifier("app/shared/user", RefKind::ModuleClause, None));
    }
}
