use tracing::{debug, info};

use super::confidence::{determine_method, grade};
use super::domain::{AttachmentText, EligibilityVerification, ExtractionMethod};
use super::extractors::{
    extract_certifications, extract_headcount, extract_investment, extract_operating_years,
    extract_research_institute, extract_revenue, extract_trl, Extracted,
};
use super::rules::Dimension;
use super::sections::{locate_sections, normalize};

fn record_note<T>(notes: &mut Vec<String>, dimension: Dimension, extracted: &Extracted<T>) {
    if let (true, Some(snippet)) = (extracted.is_found(), extracted.snippet.as_deref()) {
        notes.push(format!(
            "{} [{}]: '{}'",
            dimension.label(),
            extracted.rules.join(", "),
            snippet
        ));
    }
}

fn combined_text(raw_text: &str, attachments: &[AttachmentText]) -> String {
    attachments
        .iter()
        .filter(|attachment| !attachment.is_blank())
        .map(|attachment| attachment.text.as_str())
        .chain(std::iter::once(raw_text).filter(|text| !text.trim().is_empty()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn announcement text into structured eligibility constraints.
///
/// Never fails: ambiguous or missing text produces empty fields and a LOW grade. Identical input
/// always produces an identical verification.
pub fn extract_eligibility(
    program_id: &str,
    raw_text: &str,
    attachments: &[AttachmentText],
) -> EligibilityVerification {
    let method = determine_method(raw_text, attachments);
    let source_files: Vec<String> = attachments
        .iter()
        .filter(|attachment| !attachment.is_blank())
        .map(|attachment| attachment.file_name.clone())
        .collect();

    let mut verification = EligibilityVerification {
        program_id: program_id.to_string(),
        required_certifications: Vec::new(),
        preferred_certifications: Vec::new(),
        sme_requirement_inferred: false,
        min_employees: None,
        max_employees: None,
        min_revenue: None,
        max_revenue: None,
        min_investment: None,
        min_operating_years: None,
        max_operating_years: None,
        research_institute_required: false,
        trl_requirement: None,
        confidence: grade(0, method),
        extraction_method: method,
        fields_extracted: 0,
        source_files,
        extraction_notes: Vec::new(),
    };

    if method == ExtractionMethod::None {
        verification
            .extraction_notes
            .push("no announcement text available".to_string());
        info!(program_id, method = method.label(), "eligibility extraction skipped");
        return verification;
    }

    let text = normalize(&combined_text(raw_text, attachments));
    let sections = locate_sections(&text);
    let notes = &mut verification.extraction_notes;

    if sections.structured {
        let headers: Vec<&str> = sections
            .headers()
            .into_iter()
            .map(|header| header.keyword())
            .collect();
        notes.push(format!("sections located: {}", headers.join(", ")));
    } else {
        notes.push(
            "no eligibility section header found; extracted from full text (lower precision)"
                .to_string(),
        );
    }

    let input = sections.extraction_input();
    debug!(program_id, chars = input.chars().count(), "running constraint extractors");

    let certifications = extract_certifications(&input);
    let headcount = extract_headcount(&input);
    let revenue = extract_revenue(&input);
    let investment = extract_investment(&input);
    let operating_years = extract_operating_years(&input);
    let research_institute = extract_research_institute(&input);
    // Target TRL is usually stated in the program purpose rather than the eligibility section.
    let trl = extract_trl(&text);

    let mut fields = 0u8;

    if let Some(found) = &certifications.value {
        if found.sme_inferred {
            if let Some(snippet) = certifications.snippet.as_deref() {
                notes.push(format!(
                    "{} [{}]: '{}' (general SME requirement inferred, not stated)",
                    Dimension::Certifications.label(),
                    certifications.rules.join(", "),
                    snippet
                ));
            }
            verification.sme_requirement_inferred = true;
        } else {
            record_note(notes, Dimension::Certifications, &certifications);
            verification.required_certifications = found.required.clone();
            verification.preferred_certifications = found.preferred.clone();
            fields += 1;
        }
    }

    if let Some(bounds) = headcount.value {
        record_note(notes, Dimension::Headcount, &headcount);
        verification.min_employees = bounds.min;
        verification.max_employees = bounds.max;
        fields += 1;
    }

    if let Some(bounds) = revenue.value {
        record_note(notes, Dimension::Revenue, &revenue);
        verification.min_revenue = bounds.min;
        verification.max_revenue = bounds.max;
        fields += 1;
    }

    if let Some(amount) = investment.value {
        record_note(notes, Dimension::Investment, &investment);
        verification.min_investment = Some(amount);
        fields += 1;
    }

    if let Some(bounds) = operating_years.value {
        record_note(notes, Dimension::OperatingYears, &operating_years);
        verification.min_operating_years = bounds.min;
        verification.max_operating_years = bounds.max;
        fields += 1;
    }

    if research_institute.value == Some(true) {
        record_note(notes, Dimension::ResearchInstitute, &research_institute);
        verification.research_institute_required = true;
        fields += 1;
    }

    if let Some(range) = trl.value {
        record_note(notes, Dimension::Trl, &trl);
        verification.trl_requirement = Some(range);
    }

    verification.fields_extracted = fields;
    verification.confidence = grade(fields, method);

    info!(
        program_id,
        method = method.label(),
        confidence = verification.confidence.label(),
        fields_extracted = fields,
        structured = sections.structured,
        "eligibility extracted"
    );

    verification
}
