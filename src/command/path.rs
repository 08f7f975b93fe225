//! Command path parsing.
//!
//! Grammar, relative to the API base path:
//! `/{device}[/{id}][/{command}][/{attribute}]`
//!
//! An id segment is `hc<N>`, `wwc<N>`, `dhw<N>`, `id<N>` or a bare number,
//! with `N >= 1`. Segments are matched case-insensitively.

use thiserror::Error;

const ID_PREFIXES: [&str; 4] = ["hc", "wwc", "dhw", "id"];

/// Reasons a path cannot be resolved into a command address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is outside the API base path")]
    OutsideBase,

    #[error("missing device")]
    MissingDevice,

    #[error("too many path segments")]
    TooManySegments,
}

/// A parsed command address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandPath {
    pub device: String,
    pub id: Option<u32>,
    pub command: Option<String>,
    pub attribute: Option<String>,
}

impl CommandPath {
    /// Parse a request path that lives under `base_path`.
    pub fn parse(base_path: &str, path: &str) -> Result<Self, PathError> {
        let rest = strip_base(base_path, path).ok_or(PathError::OutsideBase)?;

        let mut segments = rest
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .peekable();

        let device = segments.next().ok_or(PathError::MissingDevice)?;

        let id = match segments.peek().and_then(|s| parse_id(s)) {
            Some(id) => {
                segments.next();
                Some(id)
            }
            None => None,
        };

        let command = segments.next();
        let attribute = segments.next();
        if segments.next().is_some() {
            return Err(PathError::TooManySegments);
        }

        Ok(Self {
            device,
            id,
            command,
            attribute,
        })
    }
}

fn strip_base<'a>(base_path: &str, path: &'a str) -> Option<&'a str> {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Parse an id segment such as `hc2` or `3`.
pub fn parse_id(segment: &str) -> Option<u32> {
    let digits = ID_PREFIXES
        .iter()
        .find_map(|p| segment.strip_prefix(p))
        .unwrap_or(segment);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|id| *id >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_and_command() {
        let p = CommandPath::parse("/api", "/api/boiler/temp").unwrap();
        assert_eq!(p.device, "boiler");
        assert_eq!(p.id, None);
        assert_eq!(p.command.as_deref(), Some("temp"));
        assert_eq!(p.attribute, None);
    }

    #[test]
    fn test_id_segment() {
        let p = CommandPath::parse("/api", "/api/thermostat/HC2/seltemp").unwrap();
        assert_eq!(p.device, "thermostat");
        assert_eq!(p.id, Some(2));
        assert_eq!(p.command.as_deref(), Some("seltemp"));

        let p = CommandPath::parse("/api", "/api/mixer/3").unwrap();
        assert_eq!(p.id, Some(3));
        assert_eq!(p.command, None);
    }

    #[test]
    fn test_attribute_segment() {
        let p = CommandPath::parse("/api", "/api/boiler/temp/value").unwrap();
        assert_eq!(p.attribute.as_deref(), Some("value"));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(CommandPath::parse("/api", "/api"), Err(PathError::MissingDevice));
        assert_eq!(CommandPath::parse("/api", "/api/"), Err(PathError::MissingDevice));
        assert_eq!(CommandPath::parse("/api", "/apix/boiler"), Err(PathError::OutsideBase));
        assert_eq!(CommandPath::parse("/api", "/other"), Err(PathError::OutsideBase));
        assert_eq!(
            CommandPath::parse("/api", "/api/a/b/c/d"),
            Err(PathError::TooManySegments)
        );
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("hc1"), Some(1));
        assert_eq!(parse_id("wwc10"), Some(10));
        assert_eq!(parse_id("7"), Some(7));
        assert_eq!(parse_id("hc0"), None);
        assert_eq!(parse_id("hc"), None);
        assert_eq!(parse_id("temp"), None);
        assert_eq!(parse_id("id2x"), None);
    }
}
