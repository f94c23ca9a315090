use std::sync::LazyLock;

/// Phrases that mark automated, non-conversational messages (English and
/// Turkish exports). Matched case-insensitively as substrings of the body.
pub const SYSTEM_NOTICE_PHRASES: &[&str] = &[
    // encryption banners
    "Messages and calls are end-to-end encrypted",
    "Mesajlar ve aramalar uçtan uca şifrelidir",
    "uçtan uca şifreleme",
    "end-to-end encryption",
    // membership and subject changes
    "You were added",
    "gruba eklendi",
    "ekledi",
    "changed the subject",
    "konuyu değiştirdi",
    "left",
    "ayrıldı",
    "gruptan ayrıldı",
    "You created group",
    "grubu oluşturdunuz",
    // media placeholders and deletions
    "<Media omitted>",
    "Medya dahil edilmedi",
    "This message was deleted",
    "Bu mesaj silindi",
    "image omitted",
    "video omitted",
    "audio omitted",
    "sticker omitted",
    "document omitted",
    "GIF omitted",
    "Contact card omitted",
    "görüntü dahil edilmedi",
    "video dahil edilmedi",
    "ses dahil edilmedi",
    "belge dahil edilmedi",
    "çıkartma dahil edilmedi",
    // locations and calls
    "konum: https",
    "location:",
    "missed voice call",
    "missed video call",
    "cevapsız sesli arama",
    "cevapsız görüntülü arama",
];

static LOWERCASE_PHRASES: LazyLock<Vec<String>> = LazyLock::new(|| {
    SYSTEM_NOTICE_PHRASES
        .iter()
        .map(|p| p.to_lowercase())
        .collect()
});

/// Check whether a message body is a system notice
pub fn is_system_notice(body: &str) -> bool {
    let body = body.to_lowercase();
    LOWERCASE_PHRASES.iter().any(|p| body.contains(p.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_banner() {
        assert!(is_system_notice(
            "Messages and calls are end-to-end encrypted. No one outside of this chat can read them."
        ));
        assert!(is_system_notice("MESAJLAR VE ARAMALAR UÇTAN UCA ŞIFRELIDIR"));
    }

    #[test]
    fn test_media_placeholders() {
        assert!(is_system_notice("<Media omitted>"));
        assert!(is_system_notice("\u{200E}image omitted"));
        assert!(is_system_notice("görüntü dahil edilmedi"));
        assert!(is_system_notice("This message was deleted"));
    }

    #[test]
    fn test_calls() {
        assert!(is_system_notice("Missed voice call"));
        assert!(is_system_notice("cevapsız görüntülü arama"));
    }

    #[test]
    fn test_regular_messages_pass() {
        assert!(!is_system_notice("Good morning!"));
        assert!(!is_system_notice("Can we talk tonight?"));
        assert!(!is_system_notice("Nasılsın?"));
    }
}
