//! Canonical language names for the `#LANGUAGE` header.
//!
//! The upstream database carries free-form language values in several
//! spellings and languages. The table maps lowercased variants to the
//! canonical English name used in rewritten files.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Lowercased spelling -> canonical language name.
pub static LANGUAGE_TRANSLATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("english", "English"),
        ("englisch", "English"),
        ("inglés", "English"),
        ("german", "German"),
        ("deutsch", "German"),
        ("alemán", "German"),
        ("french", "French"),
        ("französisch", "French"),
        ("francais", "French"),
        ("français", "French"),
        ("spanish", "Spanish"),
        ("spanisch", "Spanish"),
        ("espanol", "Spanish"),
        ("español", "Spanish"),
        ("italian", "Italian"),
        ("italienisch", "Italian"),
        ("italiano", "Italian"),
        ("portuguese", "Portuguese"),
        ("portugiesisch", "Portuguese"),
        ("portugues", "Portuguese"),
        ("português", "Portuguese"),
        ("dutch", "Dutch"),
        ("niederländisch", "Dutch"),
        ("nederlands", "Dutch"),
        ("swedish", "Swedish"),
        ("schwedisch", "Swedish"),
        ("svenska", "Swedish"),
        ("norwegian", "Norwegian"),
        ("norwegisch", "Norwegian"),
        ("norsk", "Norwegian"),
        ("danish", "Danish"),
        ("dänisch", "Danish"),
        ("dansk", "Danish"),
        ("finnish", "Finnish"),
        ("finnisch", "Finnish"),
        ("suomi", "Finnish"),
        ("icelandic", "Icelandic"),
        ("isländisch", "Icelandic"),
        ("polish", "Polish"),
        ("polnisch", "Polish"),
        ("polski", "Polish"),
        ("czech", "Czech"),
        ("tschechisch", "Czech"),
        ("slovak", "Slovak"),
        ("slowakisch", "Slovak"),
        ("hungarian", "Hungarian"),
        ("ungarisch", "Hungarian"),
        ("romanian", "Romanian"),
        ("rumänisch", "Romanian"),
        ("bulgarian", "Bulgarian"),
        ("bulgarisch", "Bulgarian"),
        ("croatian", "Croatian"),
        ("kroatisch", "Croatian"),
        ("serbian", "Serbian"),
        ("serbisch", "Serbian"),
        ("slovenian", "Slovenian"),
        ("slowenisch", "Slovenian"),
        ("russian", "Russian"),
        ("russisch", "Russian"),
        ("ukrainian", "Ukrainian"),
        ("ukrainisch", "Ukrainian"),
        ("estonian", "Estonian"),
        ("latvian", "Latvian"),
        ("lithuanian", "Lithuanian"),
        ("greek", "Greek"),
        ("griechisch", "Greek"),
        ("turkish", "Turkish"),
        ("türkisch", "Turkish"),
        ("hebrew", "Hebrew"),
        ("hebräisch", "Hebrew"),
        ("arabic", "Arabic"),
        ("arabisch", "Arabic"),
        ("japanese", "Japanese"),
        ("japanisch", "Japanese"),
        ("korean", "Korean"),
        ("koreanisch", "Korean"),
        ("chinese", "Chinese"),
        ("chinesisch", "Chinese"),
        ("hindi", "Hindi"),
        ("thai", "Thai"),
        ("vietnamese", "Vietnamese"),
        ("indonesian", "Indonesian"),
        ("catalan", "Catalan"),
        ("basque", "Basque"),
        ("galician", "Galician"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_foreign_spelling() {
        assert_eq!(LANGUAGE_TRANSLATIONS.get("deutsch"), Some(&"German"));
    }

    #[test]
    fn test_maps_lowercase_canonical_name() {
        assert_eq!(LANGUAGE_TRANSLATIONS.get("english"), Some(&"English"));
    }

    #[test]
    fn test_unknown_language_absent() {
        assert_eq!(LANGUAGE_TRANSLATIONS.get("klingon"), None);
    }
}
