//! Body format classification from the Content-Type header.

/// How a message body should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyFormat {
    /// Emitted verbatim.
    #[default]
    None,
    Json,
    Xml,
}

impl BodyFormat {
    /// Classify a Content-Type value.
    ///
    /// Substring match, so `application/problem+json` and `text/xml; charset=utf-8`
    /// are both recognized. JSON takes precedence.
    pub fn detect(content_type: &str) -> Self {
        let lowered = content_type.to_ascii_lowercase();
        if lowered.contains("json") {
            BodyFormat::Json
        } else if lowered.contains("xml") {
            BodyFormat::Xml
        } else {
            BodyFormat::None
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            BodyFormat::None => "none",
            BodyFormat::Json => "json",
            BodyFormat::Xml => "xml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_json() {
        assert_eq!(BodyFormat::detect("application/json"), BodyFormat::Json);
        assert_eq!(BodyFormat::detect("application/problem+JSON; charset=utf-8"), BodyFormat::Json);
    }

    #[test]
    fn test_detect_xml() {
        assert_eq!(BodyFormat::detect("text/xml"), BodyFormat::Xml);
        assert_eq!(BodyFormat::detect("application/soap+XML"), BodyFormat::Xml);
    }

    #[test]
    fn test_json_wins_over_xml() {
        assert_eq!(BodyFormat::detect("application/xml+json"), BodyFormat::Json);
    }

    #[test]
    fn test_detect_other() {
        assert_eq!(BodyFormat::detect("text/html"), BodyFormat::None);
        assert_eq!(BodyFormat::detect(""), BodyFormat::None);
    }
}
