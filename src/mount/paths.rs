//! Mount path arithmetic for relative references.
//!
//! A node mounted at `a/b` serves its page at `/a/b`, so references it
//! holds resolve against the directory `a/`: `x` names `a/x` and `../x`
//! names `x`.

/// Non-empty segments of a slash-separated path.
pub fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    segments.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("/")
}

/// Directory that references on a page served at `path` resolve against.
pub fn base_of(path: &[String]) -> &[String] {
    match path.split_last() {
        Some((_, parent)) => parent,
        None => path,
    }
}

/// Absolute segments named by `reference` from the directory `base`.
///
/// `..` above the server root stays at the root.
pub fn resolve(base: &[String], reference: &str) -> Vec<String> {
    let mut out: Vec<String> = base.to_vec();
    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other.to_string()),
        }
    }
    out
}

/// Relative reference from the directory `base` to `target`.
pub fn relative(base: &[String], target: &[String]) -> String {
    let common = base.iter().zip(target).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<&str> = vec![".."; base.len() - common];
    parts.extend(target[common..].iter().map(String::as_str));
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Re-express `reference` after its holder moved from `old_base` to `new_base`.
///
/// If the target lay inside the subtree moved from `moved_from` to
/// `moved_to`, the target moves with it. Absolute references and URLs are
/// returned unchanged.
pub fn rebase_reference(
    reference: &str,
    old_base: &[String],
    new_base: &[String],
    moved_from: &[String],
    moved_to: &[String],
) -> String {
    if reference.starts_with('/') || reference.contains("://") {
        return reference.to_string();
    }
    let mut target = resolve(old_base, reference);
    if target.starts_with(moved_from) {
        let rest = target.split_off(moved_from.len());
        target = moved_to.iter().cloned().chain(rest).collect();
    }
    relative(new_base, &target)
}
