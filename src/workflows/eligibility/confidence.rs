use super::domain::{AttachmentText, ConfidenceGrade, ExtractionMethod};

/// Attachment text wins over title/description text; no text at all is `None`.
pub fn determine_method(raw_text: &str, attachments: &[AttachmentText]) -> ExtractionMethod {
    if attachments.iter().any(|attachment| !attachment.is_blank()) {
        ExtractionMethod::AnnouncementFile
    } else if !raw_text.trim().is_empty() {
        ExtractionMethod::TitleOnly
    } else {
        ExtractionMethod::None
    }
}

/// Grade a verification from the number of populated dimensions and the source it came from.
///
/// Title-only extraction is capped at MEDIUM no matter how many fields were found.
pub fn grade(fields_extracted: u8, method: ExtractionMethod) -> ConfidenceGrade {
    match (method, fields_extracted) {
        (ExtractionMethod::AnnouncementFile, n) if n >= 3 => ConfidenceGrade::High,
        (ExtractionMethod::AnnouncementFile, 2) => ConfidenceGrade::Medium,
        (ExtractionMethod::TitleOnly, n) if n >= 4 => ConfidenceGrade::Medium,
        _ => ConfidenceGrade::Low,
    }
}
