//! Logical path manipulation
//!
//! POSIX-only path operations over `&str`, equivalent to the Node.js `path.posix`
//! module. Asset paths requested by the host and by packages are never touched on
//! the real filesystem here: every function is pure and total, so the empty string
//! and strings made only of separators are valid inputs.
//!
//! Every other part of the loader compares canonical paths by equality, so
//! [`normalize`] must be collision-proof: two spellings of the same location always
//! normalize to the same string.

const CHAR_DOT: u8 = b'.';
const CHAR_FORWARD_SLASH: u8 = b'/';

// ============================================================================
// Normalization
// ============================================================================

/// Resolve `.` and `..` segments of a path that has no leading separator.
///
/// With `allow_above_root` a `..` that would climb above the start of the path is
/// kept literally, otherwise it is dropped.
fn normalize_segments(path: &str, allow_above_root: bool) -> String {
    let bytes = path.as_bytes();
    let mut res = String::with_capacity(path.len());
    let mut last_segment_length = 0usize;
    let mut last_slash: isize = -1;
    let mut dots: i32 = 0;
    let mut code = 0u8;

    for i in 0..=bytes.len() {
        if i < bytes.len() {
            code = bytes[i];
        } else if code == CHAR_FORWARD_SLASH {
            break;
        } else {
            code = CHAR_FORWARD_SLASH;
        }

        if code == CHAR_FORWARD_SLASH {
            if last_slash == i as isize - 1 || dots == 1 {
                // empty segment or `.`
            } else if dots == 2 {
                if res.len() < 2 || last_segment_length != 2 || !res.ends_with("..") {
                    if res.len() > 2 {
                        match res.rfind('/') {
                            None => {
                                res.clear();
                                last_segment_length = 0;
                            }
                            Some(idx) => {
                                res.truncate(idx);
                                last_segment_length =
                                    res.len() - res.rfind('/').map_or(0, |p| p + 1);
                            }
                        }
                        last_slash = i as isize;
                        dots = 0;
                        continue;
                    } else if !res.is_empty() {
                        res.clear();
                        last_segment_length = 0;
                        last_slash = i as isize;
                        dots = 0;
                        continue;
                    }
                }
                if allow_above_root {
                    res.push_str(if res.is_empty() { ".." } else { "/.." });
                    last_segment_length = 2;
                }
            } else {
                let segment = &path[(last_slash + 1) as usize..i];
                if !res.is_empty() {
                    res.push('/');
                }
                res.push_str(segment);
                last_segment_length = (i as isize - last_slash - 1) as usize;
            }
            last_slash = i as isize;
            dots = 0;
        } else if code == CHAR_DOT && dots != -1 {
            dots += 1;
        } else {
            dots = -1;
        }
    }

    res
}

/// Normalize a path: collapse repeated separators and resolve `.` and `..`.
///
/// A relative path keeps the `..` segments it cannot resolve; an absolute path never
/// climbs above `/`. A trailing separator is preserved. The empty path is `.`.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let has_root = path.as_bytes()[0] == CHAR_FORWARD_SLASH;
    let trailing_separator = path.as_bytes()[path.len() - 1] == CHAR_FORWARD_SLASH;

    let mut normalized = normalize_segments(path, !has_root);

    if normalized.is_empty() {
        if has_root {
            return "/".to_string();
        }
        return if trailing_separator { "./" } else { "." }.to_string();
    }
    if trailing_separator {
        normalized.push('/');
    }

    if has_root {
        format!("/{}", normalized)
    } else {
        normalized
    }
}

/// Check whether a path starts at the root
pub fn is_absolute(path: &str) -> bool {
    path.as_bytes().first() == Some(&CHAR_FORWARD_SLASH)
}

/// Drop a single leading separator, turning an absolute path into a root-relative one
pub fn strip_root(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

// ============================================================================
// Composition
// ============================================================================

/// Resolve a sequence of segments into an absolute path.
///
/// Segments are scanned right to left; the rightmost absolute segment wins and
/// everything before it is discarded. When no segment is absolute the result is
/// anchored at the logical root `/`.
pub fn resolve<S: AsRef<str>>(segments: &[S]) -> String {
    let mut resolved = String::new();
    let mut resolved_absolute = false;

    for segment in segments.iter().rev() {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        resolved = format!("{}/{}", segment, resolved);
        if is_absolute(segment) {
            resolved_absolute = true;
            break;
        }
    }

    if !resolved_absolute {
        resolved.insert(0, '/');
    }

    format!("/{}", normalize_segments(&resolved, false))
}

/// Join segments with `/` and normalize the result. Empty segments are skipped.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let mut joined: Option<String> = None;
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        match joined.as_mut() {
            Some(path) => {
                path.push('/');
                path.push_str(segment);
            }
            None => joined = Some(segment.to_string()),
        }
    }

    match joined {
        Some(path) => normalize(&path),
        None => ".".to_string(),
    }
}

/// Compute the relative path leading from `from` to `to`.
///
/// Both paths are resolved first. Returns an empty string when they name the same
/// location.
pub fn relative(from: &str, to: &str) -> String {
    if from == to {
        return String::new();
    }

    let from = resolve(&[from]);
    let to = resolve(&[to]);

    if from == to {
        return String::new();
    }

    let from_bytes = from.as_bytes();
    let to_bytes = to.as_bytes();

    let from_start = 1usize;
    let from_end = from_bytes.len();
    let from_len = from_end - from_start;
    let to_start = 1usize;
    let to_len = to_bytes.len() - to_start;

    // Longest common prefix, remembering the last separator inside it
    let length = from_len.min(to_len);
    let mut last_common_sep: isize = -1;
    let mut i = 0usize;
    while i < length {
        let from_code = from_bytes[from_start + i];
        if from_code != to_bytes[to_start + i] {
            break;
        } else if from_code == CHAR_FORWARD_SLASH {
            last_common_sep = i as isize;
        }
        i += 1;
    }

    if i == length {
        if to_len > length {
            if to_bytes[to_start + i] == CHAR_FORWARD_SLASH {
                // `from` is the exact base path of `to`: '/foo/bar' -> '/foo/bar/baz'
                return to[to_start + i + 1..].to_string();
            }
            if i == 0 {
                // `from` is the root: '/' -> '/foo'
                return to[to_start + i..].to_string();
            }
        } else if from_len > length {
            if from_bytes[from_start + i] == CHAR_FORWARD_SLASH {
                // `to` is the exact base path of `from`: '/foo/bar/baz' -> '/foo/bar'
                last_common_sep = i as isize;
            } else if i == 0 {
                // `to` is the root: '/foo/bar' -> '/'
                last_common_sep = 0;
            }
        }
    }

    let mut out = String::new();
    let climb_start = (from_start as isize + last_common_sep + 1) as usize;
    for j in climb_start..=from_end {
        if j == from_end || from_bytes[j] == CHAR_FORWARD_SLASH {
            out.push_str(if out.is_empty() { ".." } else { "/.." });
        }
    }

    let rest_start = (to_start as isize + last_common_sep) as usize;
    out.push_str(&to[rest_start..]);
    out
}

/// Resolve an untrusted request against `root` without ever leaving it.
///
/// `..` segments that would climb above `root` are clamped at `root` instead of
/// failing, and an absolute request is treated as relative to `root`.
pub fn jail_relative(root: &str, request: &str) -> String {
    let clamped = normalize(&format!("/{}", request));
    join(&[root, clamped.as_str()])
}

// ============================================================================
// Component Extraction
// ============================================================================

/// Directory portion of a path, ignoring trailing separators
pub fn dirname(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let bytes = path.as_bytes();
    let has_root = bytes[0] == CHAR_FORWARD_SLASH;
    let mut end: Option<usize> = None;
    let mut matched_slash = true;
    for i in (1..bytes.len()).rev() {
        if bytes[i] == CHAR_FORWARD_SLASH {
            if !matched_slash {
                end = Some(i);
                break;
            }
        } else {
            matched_slash = false;
        }
    }

    match end {
        None if has_root => "/",
        None => ".",
        Some(1) if has_root => "//",
        Some(end) => &path[..end],
    }
}

/// Last component of a path, optionally with `ext` removed from its end.
///
/// The extension is only stripped when it is a proper suffix of the component.
pub fn basename<'a>(path: &'a str, ext: Option<&str>) -> &'a str {
    let bytes = path.as_bytes();
    let mut start = 0usize;
    let mut matched_slash = true;

    if let Some(ext) = ext.filter(|ext| !ext.is_empty() && ext.len() <= path.len()) {
        if ext == path {
            return "";
        }
        let ext_bytes = ext.as_bytes();
        let mut ext_idx = ext_bytes.len() as isize - 1;
        let mut end: isize = -1;
        let mut first_non_slash_end: isize = -1;
        for i in (0..bytes.len()).rev() {
            let code = bytes[i];
            if code == CHAR_FORWARD_SLASH {
                // stop at the first separator that is not part of the trailing run
                if !matched_slash {
                    start = i + 1;
                    break;
                }
            } else {
                if first_non_slash_end == -1 {
                    matched_slash = false;
                    first_non_slash_end = i as isize + 1;
                }
                if ext_idx >= 0 {
                    if code == ext_bytes[ext_idx as usize] {
                        ext_idx -= 1;
                        if ext_idx == -1 {
                            end = i as isize;
                        }
                    } else {
                        // extension mismatch, keep the whole component
                        ext_idx = -1;
                        end = first_non_slash_end;
                    }
                }
            }
        }

        if start as isize == end {
            end = first_non_slash_end;
        } else if end == -1 {
            end = bytes.len() as isize;
        }
        if end < 0 {
            return "";
        }
        return path.get(start..end as usize).unwrap_or_default();
    }

    let mut end: Option<usize> = None;
    for i in (0..bytes.len()).rev() {
        if bytes[i] == CHAR_FORWARD_SLASH {
            if !matched_slash {
                start = i + 1;
                break;
            }
        } else if end.is_none() {
            matched_slash = false;
            end = Some(i + 1);
        }
    }

    match end {
        Some(end) => &path[start..end],
        None => "",
    }
}

/// Extension of the last component, including the dot.
///
/// Names made only of dots, and names whose only dot is the leading one, have no
/// extension.
pub fn extname(path: &str) -> &str {
    let bytes = path.as_bytes();
    let mut start_dot: isize = -1;
    let mut start_part = 0usize;
    let mut end: isize = -1;
    let mut matched_slash = true;
    // 0: nothing seen before the dot yet, 1: only dots, -1: a regular character
    let mut pre_dot_state: i8 = 0;

    for i in (0..bytes.len()).rev() {
        let code = bytes[i];
        if code == CHAR_FORWARD_SLASH {
            if !matched_slash {
                start_part = i + 1;
                break;
            }
            continue;
        }
        if end == -1 {
            matched_slash = false;
            end = i as isize + 1;
        }
        if code == CHAR_DOT {
            if start_dot == -1 {
                start_dot = i as isize;
            } else if pre_dot_state != 1 {
                pre_dot_state = 1;
            }
        } else if start_dot != -1 {
            pre_dot_state = -1;
        }
    }

    if start_dot == -1
        || end == -1
        || pre_dot_state == 0
        || (pre_dot_state == 1 && start_dot == end - 1 && start_dot == start_part as isize + 1)
    {
        return "";
    }
    if bytes[start_part..end as usize].iter().all(|&c| c == CHAR_DOT) {
        return "";
    }
    &path[start_dot as usize..end as usize]
}
