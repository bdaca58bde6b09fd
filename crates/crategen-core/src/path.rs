//! Absolute path classification.
//!
//! Recognizes, in order: Windows drive paths (`C:\data`), UNC paths
//! (`\\server\share`), scheme-qualified locators (`s3://bucket/key`) and
//! POSIX absolute paths. Exotic forms may be missed; a `false` result means
//! "not recognized as absolute", not "malformed".

/// Returns true if `path` is recognized as an absolute locator.
pub fn is_absolute(path: &str) -> bool {
    is_windows_drive(path) || is_unc(path) || is_scheme_qualified(path) || is_posix(path)
}

fn is_windows_drive(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() > 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
}

fn is_unc(path: &str) -> bool {
    let Some(rest) = path.strip_prefix(r"\\") else {
        return false;
    };
    match rest.split_once('\\') {
        Some((server, share)) => !server.is_empty() && !share.is_empty(),
        None => false,
    }
}

fn is_scheme_qualified(path: &str) -> bool {
    let Some((scheme, rest)) = path.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid_scheme && !rest.is_empty()
}

fn is_posix(path: &str) -> bool {
    path.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_paths() {
        for path in [
            "/",
            "/random_path",
            r"C:\Users\user\Document.pdf",
            r"D:\Projects\my_website\index.html",
            "c:/data/file.txt",
            r"\\server\share",
            "s3://my-bucket/data/file.txt",
            "https://example.com/a",
        ] {
            assert!(is_absolute(path), "expected absolute: {path}");
        }
    }

    #[test]
    fn test_not_absolute_paths() {
        for path in [
            "",
            "str",
            "./random_path",
            "..some_path",
            "C:",
            "C:relative",
            r"C:\",
            "D:/",
            r"\\server",
            r"\\\share",
            "s3://",
            "://bucket/key",
            "1abc://host/x",
        ] {
            assert!(!is_absolute(path), "expected not absolute: {path}");
        }
    }
}
