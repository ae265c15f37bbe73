//! Parameter analysis and comment-tag scanner (C5).
//!
//! The predicates here are exact string-scanning rules ported from
//! `generate_tl.py`'s `endsWithForTag`/`isBotsOnlyLine`/`isBotsOnlyParam`/
//! `isNullableVector`/`isNullableParam`, kept as the small, independently
//! testable state machine rather than approximated with a generic regex —
//! the accepted sentence endings (`.`, `;`, ` if`, ` to`, ` otherwise`,
//! ` unless`) are an exhaustive list the original hardcodes.

/// Scans `comments` for an `@tag ...` segment (terminated by the next `@`
/// or end of string) and reports whether, once trimmed, it ends with
/// `; {ending}` followed by one of the accepted continuations.
pub fn ends_with_for_tag(comments: &str, tag: &str, ending: &str) -> bool {
    let needle = format!("@{tag} ");
    let Some(position) = comments.find(&needle) else {
        return false;
    };
    let tail = &comments[position + tag.len() + 1..];
    let segment = match tail.find('@') {
        Some(till) => &tail[..till],
        None => tail,
    };
    let stripped = segment.trim();
    let full_ending = format!("; {}", ending.trim());
    if stripped.len() < full_ending.len() {
        return false;
    }

    stripped.ends_with(&full_ending)
        || stripped.contains(&format!("{full_ending}."))
        || stripped.contains(&format!("{full_ending};"))
        || stripped.contains(&format!("{full_ending} if"))
        || stripped.contains(&format!("{full_ending} to"))
        || stripped.contains(&format!("{full_ending} otherwise"))
        || stripped.contains(&format!("{full_ending} unless"))
}

/// A param literally named `description` is redirected to the
/// `@param_description` tag so it doesn't collide with the declaration's
/// own `@description` tag.
pub fn param_name_tag(name: &str) -> String {
    if name == "description" {
        "param_description".to_string()
    } else {
        name.to_string()
    }
}

pub fn is_bots_only_line(comments: &str) -> bool {
    ends_with_for_tag(comments, "description", "for bots only")
}

pub fn is_bots_only_param(comments: &str, name: &str) -> bool {
    ends_with_for_tag(comments, &param_name_tag(name), "for bots only")
}

pub fn is_nullable_vector(comments: &str, name: &str) -> bool {
    name.ends_with('s')
        && ends_with_for_tag(comments, &param_name_tag(name), &format!("{name} may be null"))
}

pub fn is_nullable_param(comments: &str, name: &str) -> bool {
    let tag = param_name_tag(name);
    ends_with_for_tag(comments, &tag, "may be null") || ends_with_for_tag(comments, &tag, "pass null")
}
