use regex::Regex;

/// Pulls page metadata out of raw HTML.
///
/// The extractor only talks to this trait, so the pattern matcher below can
/// be replaced by a real markup parser without touching callers.
pub trait MarkupScanner: Send + Sync {
    /// Text of the first `<title>` element.
    fn title(&self, html: &str) -> Option<String>;

    /// `content` of the first `og:image` meta tag.
    fn og_image(&self, html: &str) -> Option<String>;
}

/// Regex matching against the raw document. Attribute order matters and
/// `<title>` must carry no attributes.
pub struct PatternScanner {
    title: Regex,
    og_image: Regex,
}

impl PatternScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            title: Regex::new(r"(?i)<title>([^<]*)</title>")?,
            og_image: Regex::new(r#"(?i)<meta property="og:image" content="([^"]+)""#)?,
        })
    }

    fn first_capture(pattern: &Regex, html: &str) -> Option<String> {
        pattern
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl MarkupScanner for PatternScanner {
    fn title(&self, html: &str) -> Option<String> {
        Self::first_capture(&self.title, html)
    }

    fn og_image(&self, html: &str) -> Option<String> {
        Self::first_capture(&self.og_image, html)
    }
}
