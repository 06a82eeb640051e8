//! Locates eligibility sections inside announcement text.
//!
//! Korean announcements rarely keep consistent bullets or spacing, so headers are matched
//! anywhere in the text and each hit claims a fixed window of the characters that follow it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Number of characters following a header that are treated as the section body.
pub const SECTION_WINDOW_CHARS: usize = 2000;

/// Fixed vocabulary of headers that introduce eligibility requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionHeader {
    SupportTarget,
    ApplicationQualification,
    ApplicationRequirements,
    ParticipationRequirements,
    ParticipationQualification,
    SupportRequirements,
}

impl SectionHeader {
    pub const ALL: [SectionHeader; 6] = [
        SectionHeader::SupportTarget,
        SectionHeader::ApplicationQualification,
        SectionHeader::ApplicationRequirements,
        SectionHeader::ParticipationRequirements,
        SectionHeader::ParticipationQualification,
        SectionHeader::SupportRequirements,
    ];

    pub const fn keyword(self) -> &'static str {
        match self {
            SectionHeader::SupportTarget => "지원대상",
            SectionHeader::ApplicationQualification => "신청자격",
            SectionHeader::ApplicationRequirements => "신청요건",
            SectionHeader::ParticipationRequirements => "참여요건",
            SectionHeader::ParticipationQualification => "참여자격",
            SectionHeader::SupportRequirements => "지원요건",
        }
    }

    const fn pattern(self) -> &'static str {
        match self {
            SectionHeader::SupportTarget => r"지원\s*대상",
            SectionHeader::ApplicationQualification => r"신청\s*자격",
            SectionHeader::ApplicationRequirements => r"신청\s*요건",
            SectionHeader::ParticipationRequirements => r"참여\s*요건",
            SectionHeader::ParticipationQualification => r"참여\s*자격",
            SectionHeader::SupportRequirements => r"지원\s*요건",
        }
    }
}

static HEADER_PATTERNS: Lazy<Vec<(SectionHeader, Regex)>> = Lazy::new(|| {
    SectionHeader::ALL
        .iter()
        .filter_map(|header| match Regex::new(header.pattern()) {
            Ok(regex) => Some((*header, regex)),
            Err(err) => {
                error!(header = header.keyword(), %err, "section header pattern failed to compile");
                None
            }
        })
        .collect()
});

fn fold_char(ch: char) -> char {
    match ch {
        '\r' => '\n',
        '０'..='９' => char::from_u32(ch as u32 - '０' as u32 + '0' as u32).unwrap_or(ch),
        '～' | '∼' | '〜' => '~',
        '－' | '–' | '—' => '-',
        '，' => ',',
        '．' => '.',
        '：' => ':',
        '\t' | '\u{00A0}' | '\u{3000}' => ' ',
        _ => ch,
    }
}

/// Collapse spacing noise and fold full-width digits and punctuation into ASCII.
///
/// Runs of spaces become one space and runs of line breaks become one line break, so the
/// extractors only ever need `\s*` between tokens.
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut pending: Option<char> = None;

    for ch in text.chars().filter(|ch| *ch != '\u{200B}').map(fold_char) {
        match ch {
            '\n' => pending = Some('\n'),
            ' ' => {
                if pending.is_none() {
                    pending = Some(' ');
                }
            }
            _ => {
                if let Some(separator) = pending.take() {
                    if !normalized.is_empty() {
                        normalized.push(separator);
                    }
                }
                normalized.push(ch);
            }
        }
    }

    normalized
}

/// A window of text believed to describe eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpan {
    /// `None` when no header was found and the span covers the full text.
    pub header: Option<SectionHeader>,
    /// Byte offset of the header (or zero for the unlabeled span).
    pub position: usize,
    pub text: String,
}

/// Output of [`locate_sections`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedSections {
    pub spans: Vec<SectionSpan>,
    /// False when the text had no recognisable header; downstream treats this as lower precision.
    pub structured: bool,
}

impl LocatedSections {
    /// Text the constraint extractors should run against.
    pub fn extraction_input(&self) -> String {
        self.spans
            .iter()
            .map(|span| span.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn headers(&self) -> Vec<SectionHeader> {
        let mut headers: Vec<SectionHeader> =
            self.spans.iter().filter_map(|span| span.header).collect();
        headers.sort();
        headers.dedup();
        headers
    }
}

/// Find every eligibility header and claim the window that follows it.
///
/// The span keeps the header itself so phrases such as "지원대상: 중소기업" stay intact.
pub fn locate_sections(text: &str) -> LocatedSections {
    let mut spans = Vec::new();

    for (header, regex) in HEADER_PATTERNS.iter() {
        for found in regex.find_iter(text) {
            let header_len = found.as_str().chars().count();
            let body: String = text[found.start()..]
                .chars()
                .take(header_len + SECTION_WINDOW_CHARS)
                .collect();
            spans.push(SectionSpan {
                header: Some(*header),
                position: found.start(),
                text: body,
            });
        }
    }

    if spans.is_empty() {
        debug!("no eligibility header found; using full text as a single span");
        return LocatedSections {
            spans: vec![SectionSpan {
                header: None,
                position: 0,
                text: text.to_string(),
            }],
            structured: false,
        };
    }

    spans.sort_by(|a, b| a.position.cmp(&b.position).then(a.header.cmp(&b.header)));

    LocatedSections {
        spans,
        structured: true,
    }
}
