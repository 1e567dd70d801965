use std::fmt;

/// A compiled namespace pattern.
///
/// Patterns are namespace paths in which `*` matches any run of characters. A trailing `:*`
/// also matches the parent itself, so `app:*` matches `app`, `app:db` and `app:db:pool`, but
/// not `apple`. Patterns always match the whole path.
#[derive(Debug, Clone)]
pub(crate) struct FilterOp {
    glob: String,
    #[cfg(feature = "regex")]
    inner: regex::Regex,
}

impl Eq for FilterOp {}
impl PartialEq for FilterOp {
    fn eq(&self, other: &Self) -> bool {
        self.glob == other.glob
    }
}

impl PartialOrd for FilterOp {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FilterOp {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.glob.len().cmp(&other.glob.len()).then_with(|| self.glob.cmp(&other.glob))
    }
}

#[cfg(feature = "regex")]
impl FilterOp {
    pub(crate) fn new(glob: &str) -> Result<Self, String> {
        let (body, children) = split_children(glob);
        let mut pattern = String::from("^");
        for (i, literal) in body.split('*').enumerate() {
            if i > 0 {
                pattern.push_str(".*");
            }
            pattern.push_str(&regex::escape(literal));
        }
        if children {
            pattern.push_str("(?::.*)?");
        }
        pattern.push('$');

        match regex::Regex::new(&pattern) {
            Ok(inner) => Ok(Self {
                glob: glob.to_owned(),
                inner,
            }),
            Err(e) => Err(e.to_string()),
        }
    }

    pub(crate) fn is_match(&self, path: &str) -> bool {
        self.inner.is_match(path)
    }
}

#[cfg(not(feature = "regex"))]
impl FilterOp {
    pub(crate) fn new(glob: &str) -> Result<Self, String> {
        Ok(Self {
            glob: glob.to_owned(),
        })
    }

    pub(crate) fn is_match(&self, path: &str) -> bool {
        let (body, children) = split_children(&self.glob);
        if glob_match(body, path) {
            return true;
        }
        children
            && path
                .char_indices()
                .filter(|&(_, c)| c == ':')
                .any(|(i, _)| glob_match(body, &path[..i]))
    }
}

impl FilterOp {
    pub(crate) fn as_str(&self) -> &str {
        &self.glob
    }
}

/// Strip a trailing `:*`, reporting whether it was present
fn split_children(glob: &str) -> (&str, bool) {
    match glob.strip_suffix(":*") {
        Some(body) => (body, true),
        None => (glob, false),
    }
}

#[cfg(not(feature = "regex"))]
fn glob_match(glob: &str, text: &str) -> bool {
    let mut parts = glob.split('*');
    let first = parts.next().unwrap_or("");
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let parts = parts.collect::<Vec<_>>();
    let Some((last, middle)) = parts.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(i) => rest = &rest[i + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.glob)
    }
}
