//! Naming policy: base name + category -> proposed new base name
//!
//! Pure string transformation, no I/O. Components and services drop their
//! dotted category suffix outright; every other recognized category trades
//! the dot segment for a hyphenated token. A name that already conforms
//! yields no proposal.

use ngshift_foundation::FileCategory;

/// Extensions the policy recognizes as real source/style/markup extensions.
/// A final dot segment outside this set is part of the name, not an
/// extension, so the whole name is the unit to transform.
const KNOWN_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "mjs", "html", "css", "scss", "sass", "less",
];

/// Propose a convention-conforming base name for `base_name`, or `None` when
/// the name already conforms (no rename).
///
/// `domain_suffix` is the externally inferred semantic suffix for
/// service-like files (`api`, `store`); it is only consulted for
/// [`FileCategory::Service`].
pub fn propose(
    base_name: &str,
    category: FileCategory,
    domain_suffix: Option<&str>,
) -> Option<String> {
    // Template and stylesheet renames are driven by their sibling source
    // file, never by this policy.
    if matches!(
        category,
        FileCategory::Template | FileCategory::Stylesheet | FileCategory::Other
    ) {
        return None;
    }

    let (stem, ext) = split_extension(base_name);

    let new_stem = if category == FileCategory::Spec {
        propose_spec_stem(stem)?
    } else {
        let token = category.suffix_token()?;
        propose_stem(stem, token, category, domain_suffix)?
    };

    let new_name = match ext {
        Some(ext) => format!("{}.{}", new_stem, ext),
        None => new_stem,
    };
    if new_name == base_name {
        None
    } else {
        Some(new_name)
    }
}

/// Split off a trailing extension only when it is a recognized one.
pub(crate) fn split_extension(base_name: &str) -> (&str, Option<&str>) {
    match base_name.rsplit_once('.') {
        Some((stem, ext)) if KNOWN_EXTENSIONS.contains(&ext) => (stem, Some(ext)),
        _ => (base_name, None),
    }
}

/// Strip the embedded category suffix from a spec stem, keeping the spec
/// marker: `foo.component.spec` -> `foo.spec`.
fn propose_spec_stem(stem: &str) -> Option<String> {
    let inner = stem.strip_suffix(".spec")?;
    for token in FileCategory::all_suffix_tokens() {
        if let Some(stripped) = inner.strip_suffix(&format!(".{}", token)) {
            let stripped = if stripped.is_empty() { token } else { stripped };
            return Some(format!("{}.spec", stripped));
        }
    }
    None
}

fn propose_stem(
    stem: &str,
    token: &str,
    category: FileCategory,
    domain_suffix: Option<&str>,
) -> Option<String> {
    // The bare suffix token collapses to itself, never an empty name.
    if stem == token {
        return None;
    }

    let suffix_free = matches!(category, FileCategory::Component | FileCategory::Service);
    let hyphen_token = format!("-{}", token);

    let stripped = match stem.strip_suffix(&format!(".{}", token)) {
        Some(stripped) => {
            if stripped.is_empty() {
                token.to_string()
            } else {
                stripped.to_string()
            }
        }
        // No dot segment left: the name already conforms.
        None => return None,
    };

    if suffix_free {
        match (category, domain_suffix) {
            (FileCategory::Service, Some(suffix))
                if stripped != token && !stripped.ends_with(&format!("-{}", suffix)) =>
            {
                Some(format!("{}-{}", stripped, suffix).to_lowercase())
            }
            _ => Some(stripped),
        }
    } else if stripped == token || stripped.ends_with(&hyphen_token) {
        Some(stripped)
    } else {
        Some(format!("{}{}", stripped, hyphen_token).to_lowercase())
    }
}
