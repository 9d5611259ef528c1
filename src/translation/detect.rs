//! Source-language detection.
//!
//! Detection is best effort: a detector that cannot decide returns `None`
//! and the provider is left to auto-detect.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::provider::ProviderClient;

/// A detected language with a confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub language: String,
    pub confidence: f32,
}

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Option<Detection>;
}

/// Script and stop-word heuristics. Needs no network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicDetector;

#[async_trait]
impl LanguageDetector for HeuristicDetector {
    async fn detect(&self, text: &str) -> Option<Detection> {
        detect_heuristic(text)
    }
}

/// Asks a provider's detection endpoint; any failure degrades to `None`.
pub struct ProviderDetector {
    provider: Arc<dyn ProviderClient>,
}

impl ProviderDetector {
    pub fn new(provider: Arc<dyn ProviderClient>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl LanguageDetector for ProviderDetector {
    async fn detect(&self, text: &str) -> Option<Detection> {
        match self.provider.detect(text).await {
            Ok(detection) => Some(detection),
            Err(e) => {
                debug!(provider = self.provider.name(), error = %e, "Detection failed");
                None
            }
        }
    }
}

/// Tries each detector in order and keeps the first answer.
pub struct DetectorChain {
    detectors: Vec<Arc<dyn LanguageDetector>>,
}

impl DetectorChain {
    pub fn new(detectors: Vec<Arc<dyn LanguageDetector>>) -> Self {
        Self { detectors }
    }
}

#[async_trait]
impl LanguageDetector for DetectorChain {
    async fn detect(&self, text: &str) -> Option<Detection> {
        for detector in &self.detectors {
            if let Some(detection) = detector.detect(text).await {
                return Some(detection);
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Kana,
    Han,
    Hangul,
    Cyrillic,
    Greek,
    Arabic,
    Hebrew,
    Thai,
    Devanagari,
    Georgian,
    Armenian,
    Other,
}

fn script_of(c: char) -> Script {
    match c as u32 {
        0x0041..=0x024F | 0x1E00..=0x1EFF => Script::Latin,
        0x3040..=0x30FF | 0x31F0..=0x31FF => Script::Kana,
        0x4E00..=0x9FFF | 0x3400..=0x4DBF => Script::Han,
        0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F => Script::Hangul,
        0x0400..=0x04FF => Script::Cyrillic,
        0x0370..=0x03FF => Script::Greek,
        0x0600..=0x06FF | 0x0750..=0x077F => Script::Arabic,
        0x0590..=0x05FF => Script::Hebrew,
        0x0E00..=0x0E7F => Script::Thai,
        0x0900..=0x097F => Script::Devanagari,
        0x10A0..=0x10FF => Script::Georgian,
        0x0530..=0x058F => Script::Armenian,
        _ => Script::Other,
    }
}

// Common function words per language; order breaks ties.
const STOP_WORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "is", "are", "of", "to", "in", "it", "you", "that", "this", "with",
            "for", "was", "hello", "world", "what", "how", "my", "your",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "de", "que", "y", "en", "un", "una", "es", "por", "con",
            "para", "hola", "mundo", "gracias", "como", "está", "muy",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "de", "des", "et", "est", "un", "une", "je", "vous", "nous",
            "pas", "que", "bonjour", "merci", "monde", "tout", "comment", "avec",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "nicht", "ein", "eine", "ich", "sie", "zu",
            "mit", "auf", "hallo", "danke", "welt", "wie", "geht", "sehr", "auch",
        ],
    ),
    (
        "it",
        &[
            "il", "lo", "gli", "di", "che", "è", "e", "un", "una", "per", "non", "sono",
            "ciao", "grazie", "mondo", "come", "della", "questo", "molto", "anche",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "as", "de", "que", "e", "é", "um", "uma", "não", "para", "com",
            "olá", "obrigado", "mundo", "você", "muito", "está", "isso", "também",
        ],
    ),
    (
        "nl",
        &[
            "de", "het", "een", "en", "is", "niet", "van", "ik", "je", "dat", "wat", "met",
            "hallo", "dank", "wereld", "hoe", "gaat", "zijn", "ook", "maar",
        ],
    ),
    (
        "sv",
        &[
            "och", "är", "att", "det", "en", "ett", "jag", "inte", "som", "på", "med", "för",
            "hej", "tack", "världen", "hur", "mår", "du", "vi", "också",
        ],
    ),
    (
        "pl",
        &[
            "i", "w", "nie", "się", "na", "jest", "to", "że", "z", "do", "jak", "co",
            "dzień", "dobry", "dziękuję", "świat", "tak", "czy", "jestem", "bardzo",
        ],
    ),
    (
        "tr",
        &[
            "ve", "bir", "bu", "da", "de", "ne", "için", "çok", "ben", "sen", "merhaba",
            "teşekkür", "dünya", "nasıl", "var", "yok", "mi", "evet", "hayır", "ile",
        ],
    ),
];

// Letters that are strong evidence for one language.
const DIACRITIC_HINTS: &[(char, &str)] = &[
    ('ñ', "es"),
    ('¿', "es"),
    ('¡', "es"),
    ('ç', "fr"),
    ('œ', "fr"),
    ('ê', "fr"),
    ('ß', "de"),
    ('ä', "de"),
    ('ü', "de"),
    ('ã', "pt"),
    ('õ', "pt"),
    ('å', "sv"),
    ('ł', "pl"),
    ('ś', "pl"),
    ('ż', "pl"),
    ('ğ', "tr"),
    ('ş', "tr"),
    ('ı', "tr"),
];

const HINT_WEIGHT: f32 = 0.5;

/// Deterministic local detection over Unicode scripts and common words.
pub fn detect_heuristic(text: &str) -> Option<Detection> {
    let mut counts: Vec<(Script, usize)> = Vec::new();
    let mut letters = 0usize;

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        letters += 1;
        let script = script_of(c);
        match counts.iter_mut().find(|(s, _)| *s == script) {
            Some((_, n)) => *n += 1,
            None => counts.push((script, 1)),
        }
    }

    if letters == 0 {
        return None;
    }

    let count = |script: Script| {
        counts
            .iter()
            .find(|(s, _)| *s == script)
            .map_or(0, |(_, n)| *n)
    };

    // Kana marks Japanese even though most of the text may be Han.
    let kana = count(Script::Kana);
    if kana > 0 {
        let share = (kana + count(Script::Han)) as f32 / letters as f32;
        return Some(scored("ja", share));
    }

    let (dominant, dominant_count) = counts
        .iter()
        .copied()
        .max_by_key(|(_, n)| *n)
        .unwrap_or((Script::Other, 0));
    let share = dominant_count as f32 / letters as f32;

    let language = match dominant {
        Script::Latin => return detect_latin(text),
        Script::Han => "zh",
        Script::Hangul => "ko",
        Script::Cyrillic => {
            if text.chars().any(|c| matches!(c, 'і' | 'ї' | 'є' | 'ґ')) {
                "uk"
            } else {
                "ru"
            }
        }
        Script::Greek => "el",
        Script::Arabic => {
            if text.chars().any(|c| matches!(c, 'پ' | 'چ' | 'ژ' | 'گ')) {
                "fa"
            } else {
                "ar"
            }
        }
        Script::Hebrew => "he",
        Script::Thai => "th",
        Script::Devanagari => "hi",
        Script::Georgian => "ka",
        Script::Armenian => "hy",
        Script::Kana | Script::Other => return None,
    };

    Some(scored(language, share))
}

fn scored(language: &str, share: f32) -> Detection {
    Detection {
        language: language.to_string(),
        confidence: share.clamp(0.0, 0.99),
    }
}

fn detect_latin(text: &str) -> Option<Detection> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return None;
    }

    let mut scores: Vec<(&str, f32)> = STOP_WORDS
        .iter()
        .map(|(language, list)| {
            let hits = words.iter().filter(|w| list.contains(w)).count();
            (*language, hits as f32)
        })
        .collect();

    for c in lowered.chars() {
        if let Some((_, language)) = DIACRITIC_HINTS.iter().find(|(hint, _)| *hint == c)
            && let Some((_, score)) = scores.iter_mut().find(|(l, _)| l == language)
        {
            *score += HINT_WEIGHT;
        }
    }

    let mut best: Option<(&str, f32)> = None;
    let mut runner_up = 0.0f32;
    for &(language, score) in &scores {
        match best {
            Some((_, top)) if score > top => {
                runner_up = top;
                best = Some((language, score));
            }
            Some(_) => runner_up = runner_up.max(score),
            None => best = Some((language, score)),
        }
    }

    let (language, top) = best?;
    if top <= 0.0 {
        return None;
    }

    let coverage = (top / words.len() as f32).min(1.0);
    let margin = (top - runner_up) / top;
    let length_factor = (words.len() as f32 / 4.0).clamp(0.6, 1.0);
    let confidence = (0.4 * coverage + 0.6 * margin) * length_factor;

    Some(Detection {
        language: language.to_string(),
        confidence: confidence.clamp(0.0, 0.99),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn language_of(text: &str) -> Option<String> {
        detect_heuristic(text).map(|d| d.language)
    }

    #[test]
    fn test_detects_non_latin_scripts() {
        assert_eq!(language_of("こんにちは、世界"), Some("ja".to_string()));
        assert_eq!(language_of("안녕하세요 세계"), Some("ko".to_string()));
        assert_eq!(language_of("你好世界"), Some("zh".to_string()));
        assert_eq!(language_of("Привет, как дела?"), Some("ru".to_string()));
        assert_eq!(language_of("Привіт, як справи? Її"), Some("uk".to_string()));
        assert_eq!(language_of("Γειά σου κόσμε"), Some("el".to_string()));
        assert_eq!(language_of("שלום עולם"), Some("he".to_string()));
    }

    #[test]
    fn test_detects_latin_languages() {
        assert_eq!(
            language_of("Bonjour tout le monde, comment allez-vous?"),
            Some("fr".to_string())
        );
        assert_eq!(
            language_of("Der Hund und die Katze sind nicht hier"),
            Some("de".to_string())
        );
        assert_eq!(
            language_of("¿Dónde está la biblioteca? Muy bien, gracias"),
            Some("es".to_string())
        );
        assert_eq!(
            language_of("The weather is nice and the sun is shining"),
            Some("en".to_string())
        );
    }

    #[test]
    fn test_confident_on_clear_sentence() {
        let detection = detect_heuristic("Bonjour tout le monde, comment allez-vous?").unwrap();
        assert!(detection.confidence >= 0.5, "{detection:?}");
        assert!(detection.confidence <= 1.0);
    }

    #[test]
    fn test_short_text_is_less_confident() {
        let short = detect_heuristic("Bonjour").unwrap();
        let long = detect_heuristic("Bonjour tout le monde, merci pour tout").unwrap();
        assert!(short.confidence < long.confidence);
    }

    #[test]
    fn test_no_signal_returns_none() {
        assert!(detect_heuristic("12345 !!! ???").is_none());
        assert!(detect_heuristic("").is_none());
        assert!(detect_heuristic("xyzzy plugh").is_none());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let text = "Het is een mooie dag en ik ben blij";
        let first = detect_heuristic(text);
        for _ in 0..10 {
            assert_eq!(detect_heuristic(text), first);
        }
    }

    #[tokio::test]
    async fn test_heuristic_detector_trait() {
        let detector = HeuristicDetector;
        let detection = detector.detect("Hallo Welt, wie geht es dir?").await.unwrap();
        assert_eq!(detection.language, "de");
    }

    struct Fixed(Option<Detection>);

    #[async_trait]
    impl LanguageDetector for Fixed {
        async fn detect(&self, _text: &str) -> Option<Detection> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_chain_returns_first_answer() {
        let chain = DetectorChain::new(vec![
            Arc::new(Fixed(None)),
            Arc::new(Fixed(Some(Detection {
                language: "fr".into(),
                confidence: 0.92,
            }))),
            Arc::new(Fixed(Some(Detection {
                language: "de".into(),
                confidence: 1.0,
            }))),
        ]);

        let detection = chain.detect("Bonjour").await.unwrap();
        assert_eq!(detection.language, "fr");
        assert!(DetectorChain::new(Vec::new()).detect("x").await.is_none());
    }
}
