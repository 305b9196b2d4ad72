//! Languages offered for translation.

/// A language offered by the pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

impl Language {
    const fn new(code: &'static str, name: &'static str) -> Self {
        Self { code, name }
    }

    /// Look up a language by its code (case-insensitive).
    pub fn from_code(code: &str) -> Option<&'static Language> {
        let code = code.trim();
        LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
    }

    /// Display name for `code`, or the code itself when it is not catalogued.
    pub fn display_name(code: &str) -> &str {
        Self::from_code(code).map_or(code, |l| l.name)
    }
}

pub static LANGUAGES: &[Language] = &[
    Language::new("en", "English"),
    Language::new("es", "Spanish"),
    Language::new("fr", "French"),
    Language::new("de", "German"),
    Language::new("it", "Italian"),
    Language::new("pt", "Portuguese"),
    Language::new("ru", "Russian"),
    Language::new("zh", "Chinese"),
    Language::new("ja", "Japanese"),
    Language::new("ko", "Korean"),
    Language::new("ar", "Arabic"),
    Language::new("hi", "Hindi"),
    Language::new("nl", "Dutch"),
    Language::new("pl", "Polish"),
    Language::new("tr", "Turkish"),
    Language::new("vi", "Vietnamese"),
    Language::new("th", "Thai"),
    Language::new("sv", "Swedish"),
    Language::new("da", "Danish"),
    Language::new("fi", "Finnish"),
];
