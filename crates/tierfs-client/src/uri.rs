//! Validated, normalized namespace paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FsError;

/// Path separator inside the namespace.
pub const SEPARATOR: char = '/';

/// An absolute, normalized path in the storage namespace, optionally qualified
/// with a scheme and authority (`tier://master:19998/a/b`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TierUri {
    scheme: Option<String>,
    authority: Option<String>,
    path: String,
}

impl TierUri {
    /// Parses and normalizes `raw`.
    ///
    /// Repeated separators collapse, `.` components are dropped and `..` pops
    /// the previous component. The result never ends in a separator unless it
    /// is the root.
    pub fn parse(raw: &str) -> Result<Self, FsError> {
        let invalid = |reason: &str| FsError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("path is empty"));
        }

        // A `://` after the first separator belongs to a path component.
        let scheme_end = raw
            .find("://")
            .filter(|&idx| !raw[..idx].contains(SEPARATOR));
        let (scheme, rest) = match scheme_end {
            Some(idx) => {
                let scheme = &raw[..idx];
                if scheme.is_empty()
                    || !scheme
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                {
                    return Err(invalid("malformed scheme"));
                }
                (Some(scheme.to_string()), &raw[idx + 3..])
            }
            None => (None, raw),
        };

        let (authority, path) = if scheme.is_some() {
            match rest.find(SEPARATOR) {
                Some(idx) => (&rest[..idx], &rest[idx..]),
                None => (rest, "/"),
            }
        } else {
            ("", rest)
        };

        if !path.starts_with(SEPARATOR) {
            return Err(invalid("path is not absolute"));
        }
        if path.chars().any(|c| c == '\0') {
            return Err(invalid("path contains a NUL byte"));
        }

        let mut components: Vec<&str> = Vec::new();
        for component in path.split(SEPARATOR) {
            match component {
                "" | "." => {}
                ".." => {
                    if components.pop().is_none() {
                        return Err(invalid("path escapes the namespace root"));
                    }
                }
                c => components.push(c),
            }
        }

        Ok(Self {
            scheme,
            authority: (!authority.is_empty()).then(|| authority.to_string()),
            path: format!("{}{}", SEPARATOR, components.join("/")),
        })
    }

    /// The normalized absolute path, without scheme or authority.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Scheme of an under storage location, e.g. `hdfs`.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// `host:port` part following the scheme, if any.
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// True for `/`.
    pub fn is_root(&self) -> bool {
        self.path.len() == 1
    }

    /// Last path component; empty for the root.
    pub fn name(&self) -> &str {
        match self.path.rfind(SEPARATOR) {
            Some(idx) => &self.path[idx + 1..],
            None => "",
        }
    }

    /// Number of components below the root.
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.path.matches(SEPARATOR).count()
        }
    }

    /// Parent path with the same scheme and authority; `None` for the root.
    pub fn parent(&self) -> Option<TierUri> {
        if self.is_root() {
            return None;
        }
        let idx = self.path.rfind(SEPARATOR)?;
        let parent = if idx == 0 { "/" } else { &self.path[..idx] };
        Some(Self {
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
            path: parent.to_string(),
        })
    }

    /// Appends a relative child path and normalizes the result.
    pub fn join(&self, child: &str) -> Result<TierUri, FsError> {
        let joined = format!("{}/{}", self.path, child);
        let mut uri = Self::parse(&joined)?;
        uri.scheme = self.scheme.clone();
        uri.authority = self.authority.clone();
        Ok(uri)
    }
}

impl fmt::Display for TierUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{}://{}", scheme, self.authority.as_deref().unwrap_or(""))?;
        }
        f.write_str(&self.path)
    }
}

impl FromStr for TierUri {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
