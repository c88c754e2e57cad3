//! Fallback avatar URLs for owners without an uploaded image.

use avatar_core::constants::DEFAULT_PLACEHOLDER_BASE_URL;

/// Maps a display name to a stable placeholder URL.
///
/// Any `Fn(&str) -> String` works, so tests can inject a closure.
pub trait Placeholder: Send + Sync {
    fn url_for(&self, display_name: &str) -> String;
}

impl<F> Placeholder for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn url_for(&self, display_name: &str) -> String {
        self(display_name)
    }
}

/// Generated-initials service: `{base}?name={name}&background=random`.
#[derive(Debug, Clone)]
pub struct UiAvatarsPlaceholder {
    base_url: String,
}

impl UiAvatarsPlaceholder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for UiAvatarsPlaceholder {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_BASE_URL)
    }
}

impl Placeholder for UiAvatarsPlaceholder {
    fn url_for(&self, display_name: &str) -> String {
        format!(
            "{}?name={}&background=random",
            self.base_url,
            urlencoding::encode(display_name.trim())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_avatars_url() {
        let placeholder = UiAvatarsPlaceholder::default();
        assert_eq!(
            placeholder.url_for("Ada Lovelace"),
            "https://ui-avatars.com/api/?name=Ada%20Lovelace&background=random"
        );
    }

    #[test]
    fn test_url_is_deterministic_and_escaped() {
        let placeholder = UiAvatarsPlaceholder::new("https://placeholder.test/");
        let first = placeholder.url_for("Zoë & Co");
        assert_eq!(first, placeholder.url_for("Zoë & Co"));
        assert!(first.starts_with("https://placeholder.test/?name=Zo%C3%AB%20%26%20Co"));
    }

    #[test]
    fn test_closure_is_a_placeholder() {
        let placeholder = |name: &str| format!("stub://{}", name);
        assert_eq!(Placeholder::url_for(&placeholder, "x"), "stub://x");
    }
}
