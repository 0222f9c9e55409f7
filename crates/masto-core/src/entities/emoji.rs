//! Custom emoji entity

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEmoji {
    pub name: String,
    /// `None` for emoji defined on this instance
    pub host: Option<String>,
    pub url: String,
    pub category: Option<String>,
}

impl CustomEmoji {
    pub fn new(name: impl Into<String>, host: Option<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host,
            url: url.into(),
            category: None,
        }
    }
}
