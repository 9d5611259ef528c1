//! Language code validation and supported languages.

use crate::error::TranslationError;
use crate::ui::Style;

/// The pseudo-code that asks for source-language detection.
pub const AUTO: &str = "auto";

/// A supported language: canonical code, English name, native name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

const fn lang(code: &'static str, name: &'static str, native_name: &'static str) -> Language {
    Language {
        code,
        name,
        native_name,
    }
}

/// Supported language codes (ISO 639-1 plus regional variants).
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    lang("af", "Afrikaans", "Afrikaans"),
    lang("am", "Amharic", "አማርኛ"),
    lang("ar", "Arabic", "العربية"),
    lang("az", "Azerbaijani", "Azərbaycanca"),
    lang("be", "Belarusian", "Беларуская"),
    lang("bg", "Bulgarian", "Български"),
    lang("bn", "Bengali", "বাংলা"),
    lang("bs", "Bosnian", "Bosanski"),
    lang("ca", "Catalan", "Català"),
    lang("cs", "Czech", "Čeština"),
    lang("cy", "Welsh", "Cymraeg"),
    lang("da", "Danish", "Dansk"),
    lang("de", "German", "Deutsch"),
    lang("el", "Greek", "Ελληνικά"),
    lang("en", "English", "English"),
    lang("es", "Spanish", "Español"),
    lang("et", "Estonian", "Eesti"),
    lang("eu", "Basque", "Euskara"),
    lang("fa", "Persian", "فارسی"),
    lang("fi", "Finnish", "Suomi"),
    lang("fil", "Filipino", "Filipino"),
    lang("fr", "French", "Français"),
    lang("ga", "Irish", "Gaeilge"),
    lang("gl", "Galician", "Galego"),
    lang("gu", "Gujarati", "ગુજરાતી"),
    lang("he", "Hebrew", "עברית"),
    lang("hi", "Hindi", "हिन्दी"),
    lang("hr", "Croatian", "Hrvatski"),
    lang("hu", "Hungarian", "Magyar"),
    lang("hy", "Armenian", "Հայերեն"),
    lang("id", "Indonesian", "Bahasa Indonesia"),
    lang("is", "Icelandic", "Íslenska"),
    lang("it", "Italian", "Italiano"),
    lang("ja", "Japanese", "日本語"),
    lang("ka", "Georgian", "ქართული"),
    lang("kk", "Kazakh", "Қазақ"),
    lang("km", "Khmer", "ខ្មែរ"),
    lang("kn", "Kannada", "ಕನ್ನಡ"),
    lang("ko", "Korean", "한국어"),
    lang("la", "Latin", "Latina"),
    lang("lo", "Lao", "ລາວ"),
    lang("lt", "Lithuanian", "Lietuvių"),
    lang("lv", "Latvian", "Latviešu"),
    lang("mk", "Macedonian", "Македонски"),
    lang("ml", "Malayalam", "മലയാളം"),
    lang("mn", "Mongolian", "Монгол"),
    lang("mr", "Marathi", "मराठी"),
    lang("ms", "Malay", "Bahasa Melayu"),
    lang("mt", "Maltese", "Malti"),
    lang("my", "Myanmar (Burmese)", "မြန်မာ"),
    lang("ne", "Nepali", "नेपाली"),
    lang("nl", "Dutch", "Nederlands"),
    lang("no", "Norwegian", "Norsk"),
    lang("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    lang("pl", "Polish", "Polski"),
    lang("ps", "Pashto", "پښتو"),
    lang("pt", "Portuguese", "Português"),
    lang("pt-BR", "Portuguese (Brazil)", "Português (Brasil)"),
    lang("ro", "Romanian", "Română"),
    lang("ru", "Russian", "Русский"),
    lang("si", "Sinhala", "සිංහල"),
    lang("sk", "Slovak", "Slovenčina"),
    lang("sl", "Slovenian", "Slovenščina"),
    lang("sq", "Albanian", "Shqip"),
    lang("sr", "Serbian", "Српски"),
    lang("sv", "Swedish", "Svenska"),
    lang("sw", "Swahili", "Kiswahili"),
    lang("ta", "Tamil", "தமிழ்"),
    lang("te", "Telugu", "తెలుగు"),
    lang("th", "Thai", "ไทย"),
    lang("tl", "Tagalog", "Tagalog"),
    lang("tr", "Turkish", "Türkçe"),
    lang("uk", "Ukrainian", "Українська"),
    lang("ur", "Urdu", "اردو"),
    lang("uz", "Uzbek", "Oʻzbekcha"),
    lang("vi", "Vietnamese", "Tiếng Việt"),
    lang("zh", "Chinese (Simplified)", "简体中文"),
    lang("zh-TW", "Chinese (Traditional)", "繁體中文"),
];

// Alternate spellings accepted on input, lowercase -> canonical.
const ALIASES: &[(&str, &str)] = &[
    ("zh-cn", "zh"),
    ("zh-hans", "zh"),
    ("zh-hant", "zh-TW"),
    ("iw", "he"),
    ("nb", "no"),
    ("pt-pt", "pt"),
];

/// Resolves a user-supplied code to its canonical form.
///
/// Matching is case-insensitive; `"auto"` is not a language and yields `None`.
pub fn normalize_language(code: &str) -> Option<&'static str> {
    let lowered = code.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }
    SUPPORTED_LANGUAGES
        .iter()
        .find(|l| l.code.eq_ignore_ascii_case(&lowered))
        .map(|l| l.code)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == lowered)
                .map(|(_, canonical)| *canonical)
        })
}

pub fn is_auto(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(AUTO)
}

/// English name for a code, or the code itself when unknown.
pub fn language_name(code: &str) -> &str {
    normalize_language(code)
        .and_then(|c| SUPPORTED_LANGUAGES.iter().find(|l| l.code == c))
        .map_or(code, |l| l.name)
}

/// Languages sorted alphabetically by English name.
pub fn sorted_languages() -> Vec<Language> {
    let mut languages = SUPPORTED_LANGUAGES.to_vec();
    languages.sort_by(|a, b| a.name.cmp(b.name));
    languages
}

/// Prints all supported language codes to stdout.
pub fn print_languages() {
    println!("{}", Style::header("Supported languages"));
    for language in sorted_languages() {
        println!(
            "  {:6} {:24} {}",
            Style::code(language.code),
            language.name,
            Style::secondary(language.native_name)
        );
    }
}

/// Validates a language code given on the command line and returns its
/// canonical form. `auto` is accepted only when `allow_auto` is set.
pub fn validate_language(lang: &str, allow_auto: bool) -> Result<&'static str, TranslationError> {
    if allow_auto && is_auto(lang) {
        return Ok(AUTO);
    }
    normalize_language(lang).ok_or_else(|| {
        TranslationError::invalid_with_hint(
            format!("Invalid language code: '{lang}'"),
            "Run 'lingo --list-languages' to see all supported codes.",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_language_valid() {
        assert_eq!(normalize_language("ja"), Some("ja"));
        assert_eq!(normalize_language("EN"), Some("en"));
        assert_eq!(normalize_language("zh-tw"), Some("zh-TW"));
        assert_eq!(normalize_language("pt-br"), Some("pt-BR"));
    }

    #[test]
    fn test_normalize_language_aliases() {
        assert_eq!(normalize_language("zh-CN"), Some("zh"));
        assert_eq!(normalize_language("zh-Hant"), Some("zh-TW"));
        assert_eq!(normalize_language("iw"), Some("he"));
        assert_eq!(normalize_language("nb"), Some("no"));
    }

    #[test]
    fn test_normalize_language_invalid() {
        assert_eq!(normalize_language("invalid"), None);
        assert_eq!(normalize_language(""), None);
        assert_eq!(normalize_language("JP"), None);
        assert_eq!(normalize_language("auto"), None);
    }

    #[test]
    fn test_is_auto() {
        assert!(is_auto("auto"));
        assert!(is_auto(" AUTO "));
        assert!(!is_auto("en"));
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("fr"), "French");
        assert_eq!(language_name("xx"), "xx");
    }

    #[test]
    fn test_sorted_languages_by_name() {
        let languages = sorted_languages();
        assert_eq!(languages.first().map(|l| l.code), Some("af"));
        assert!(languages.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[test]
    fn test_validate_language_message() {
        let err = validate_language("klingon", false).unwrap_err();
        assert!(err.to_string().contains("Invalid language code"));
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_validate_language_auto() {
        assert_eq!(validate_language("AUTO", true).ok(), Some(AUTO));
        assert!(validate_language("auto", false).is_err());
        assert_eq!(validate_language("zh-CN", false).ok(), Some("zh"));
    }
}
