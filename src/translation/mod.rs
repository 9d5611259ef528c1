mod chunk;
mod detect;
mod language;
mod request;

pub use chunk::{TextChunk, chunk_text};
pub use detect::{
    Detection, DetectorChain, HeuristicDetector, LanguageDetector, ProviderDetector,
    detect_heuristic,
};
pub use language::{
    AUTO, Language, SUPPORTED_LANGUAGES, is_auto, language_name, normalize_language,
    print_languages, sorted_languages, validate_language,
};
pub use request::{MAX_TEXT_CHARS, TranslatedText, TranslationRequest};
