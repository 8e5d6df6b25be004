//! File and content classification heuristics
//!
//! Pattern matching over raw text stands in for parsing here by design. The
//! engine consumes only the discrete outputs: a `FileCategory` per file, a
//! `ContentShape` for conflict resolution, and an optional inferred domain
//! suffix for service naming.

use ngshift_foundation::FileCategory;
use once_cell::sync::Lazy;
use regex::Regex;

/// Structural shape of a file's content, used when a rename target is
/// occupied and the occupant must be judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    /// Model-like: interfaces, enums, type aliases, no framework decorators
    PlainData,
    /// Carries an Angular decorator; the category names which one
    AngularArtifact(FileCategory),
    /// No structural signal found
    Indeterminate,
}

static DECORATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@(Component|Injectable|Directive|Pipe|NgModule)\s*\(").expect("valid regex")
});

static PLAIN_DATA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?(?:interface|enum|type)\s+[A-Za-z_$][\w$]*")
        .expect("valid regex")
});

/// Style extensions recognized as stylesheet files.
pub const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];

/// Classify a file from its name, falling back to structural markers in the
/// content when the name alone is not conclusive.
pub fn classify_file(file_name: &str, content: &str) -> FileCategory {
    if let Some(ext) = file_name.rsplit('.').next() {
        if ext == "html" {
            return FileCategory::Template;
        }
        if STYLE_EXTENSIONS.contains(&ext) {
            return FileCategory::Stylesheet;
        }
    }

    // Spec files first so `foo.component.spec.ts` is not mistaken for a component
    if file_name.ends_with(".spec.ts") {
        return FileCategory::Spec;
    }

    for token in FileCategory::all_suffix_tokens() {
        if file_name.ends_with(&format!(".{}.ts", token)) {
            return category_for_token(token);
        }
    }

    // Structural fallback for files without a dotted suffix
    if let Some(caps) = DECORATOR_RE.captures(content) {
        return match &caps[1] {
            "Component" => FileCategory::Component,
            "Injectable" => FileCategory::Service,
            "Directive" => FileCategory::Directive,
            "Pipe" => FileCategory::Pipe,
            "NgModule" => FileCategory::Module,
            _ => FileCategory::Other,
        };
    }

    FileCategory::Other
}

fn category_for_token(token: &str) -> FileCategory {
    match token {
        "component" => FileCategory::Component,
        "service" => FileCategory::Service,
        "directive" => FileCategory::Directive,
        "pipe" => FileCategory::Pipe,
        "module" => FileCategory::Module,
        "guard" => FileCategory::Guard,
        "interceptor" => FileCategory::Interceptor,
        "resolver" => FileCategory::Resolver,
        _ => FileCategory::Other,
    }
}

/// Judge the content of a file blocking a rename target.
pub fn classify_shape(content: &str) -> ContentShape {
    if let Some(caps) = DECORATOR_RE.captures(content) {
        let category = match &caps[1] {
            "Component" => FileCategory::Component,
            "Injectable" => FileCategory::Service,
            "Directive" => FileCategory::Directive,
            "Pipe" => FileCategory::Pipe,
            "NgModule" => FileCategory::Module,
            _ => FileCategory::Other,
        };
        return ContentShape::AngularArtifact(category);
    }
    if PLAIN_DATA_RE.is_match(content) {
        return ContentShape::PlainData;
    }
    ContentShape::Indeterminate
}

static REMOTE_MARKERS: &[&str] = &["HttpClient", "http.get", "http.post", "fetch(", "https://", "http://"];
static STATE_MARKERS: &[&str] = &["BehaviorSubject", "signal(", "localStorage", "sessionStorage", "new Map("];

/// Guess a semantic suffix for a service-like file from what its content
/// talks to: remote endpoints suggest `api`, local cached state suggests
/// `store`. Scored, not exact; returns `None` without a confident winner.
pub fn infer_domain_suffix(content: &str) -> Option<&'static str> {
    let remote: usize = REMOTE_MARKERS.iter().filter(|m| content.contains(*m)).count();
    let state: usize = STATE_MARKERS.iter().filter(|m| content.contains(*m)).count();

    if remote >= 2 && remote > state {
        Some("api")
    } else if state >= 2 && state > remote {
        Some("store")
    } else {
        None
    }
}
