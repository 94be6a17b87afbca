//! Keyword relevance classification.

use startupintel_shared::CompanyRecord;

use crate::lexicon::{HEALTHCARE_TERMS, contains_any};

/// Whether the record's name, description, or keywords mention a healthcare term.
pub fn is_healthcare_relevant(record: &CompanyRecord) -> bool {
    let mut text = String::new();
    text.push_str(record.description.as_deref().unwrap_or_default());
    text.push(' ');
    text.push_str(&record.name);
    for keyword in &record.keywords {
        text.push(' ');
        text.push_str(keyword);
    }
    contains_any(&text.to_lowercase(), HEALTHCARE_TERMS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_name_description_or_keywords() {
        assert!(is_healthcare_relevant(&CompanyRecord::new("MedPilot", "t")
            .with_description("Clinical trial matching")));
        assert!(is_healthcare_relevant(&CompanyRecord::new("HealthLoop", "t")));

        let mut tagged = CompanyRecord::new("Loop", "t");
        tagged.keywords.insert("Biotech".into());
        assert!(is_healthcare_relevant(&tagged));
    }

    #[test]
    fn unrelated_company_is_not_relevant() {
        let record = CompanyRecord::new("ShipFast", "t").with_description("Logistics routing");
        assert!(!is_healthcare_relevant(&record));
    }

    #[test]
    fn no_negation_handling() {
        let record = CompanyRecord::new("Acme", "t").with_description("not a healthcare company");
        assert!(is_healthcare_relevant(&record));
    }
}
