// file: src/screening/criteria.rs
// description: inclusion/exclusion criteria evaluation for a single record
// reference: PRISMA eligibility assessment

use crate::models::{Criteria, Record, YearBound};

/// Outcome of checking one record against the criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Include,
    Exclude(&'static str),
}

impl Verdict {
    pub fn is_included(&self) -> bool {
        matches!(self, Verdict::Include)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Verdict::Include => None,
            Verdict::Exclude(reason) => Some(reason),
        }
    }
}

/// Case-insensitive substring match against any non-empty pattern.
pub fn match_any(text: &str, patterns: &[String]) -> bool {
    if text.is_empty() || patterns.is_empty() {
        return false;
    }
    let lowered = text.to_lowercase();
    patterns
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| lowered.contains(&p.to_lowercase()))
}

fn lowered_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_lowercase())
        .collect()
}

fn field(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_lowercase()
}

enum BoundCheck {
    Unset,
    Invalid,
    Value(i32),
}

fn bound(bound: &Option<YearBound>) -> BoundCheck {
    match bound {
        Some(b) if b.is_set() => b.value().map_or(BoundCheck::Invalid, BoundCheck::Value),
        _ => BoundCheck::Unset,
    }
}

/// Exclusion rules run first, then inclusion rules; the first failing rule names the reason.
pub fn check_criteria(record: &Record, criteria: &Criteria) -> Verdict {
    if criteria.is_empty() {
        return Verdict::Include;
    }

    let title = record.title.to_lowercase();
    let abstract_text = record.abstract_text.to_lowercase();
    let keywords = record.keywords.join(" ").to_lowercase();
    let participants = field(&record.participants);
    let pub_type = field(&record.publication_type);
    let study_design = field(&record.study_design);
    let methods = field(&record.methods);
    let species = field(&record.species);
    let language = field(&record.language);
    let year = record.year;

    let exc = &criteria.exclusion;

    if match_any(&methods, &exc.methodologies) {
        return Verdict::Exclude("excl_methodology");
    }
    if match_any(&study_design, &exc.study_designs) {
        return Verdict::Exclude("excl_study_design");
    }
    if match_any(&pub_type, &exc.publication_types) {
        return Verdict::Exclude("excl_publication_type");
    }
    if match_any(&species, &exc.species) {
        return Verdict::Exclude("excl_species");
    }
    if let Some(cutoff) = &exc.year
        && let BoundCheck::Value(before) = bound(&cutoff.before)
        && let Some(year) = year
        && year < before
    {
        return Verdict::Exclude("excl_year_before");
    }
    let excluded_languages = lowered_list(&exc.languages);
    if !language.is_empty() && excluded_languages.contains(&language) {
        return Verdict::Exclude("excl_language");
    }

    let inc = &criteria.inclusion;

    let allowed_designs = lowered_list(&inc.study_designs);
    if !allowed_designs.is_empty()
        && !study_design.is_empty()
        && !allowed_designs.contains(&study_design)
    {
        return Verdict::Exclude("not_allowed_study_design");
    }

    let allowed_pub = lowered_list(&inc.publication_types);
    if !allowed_pub.is_empty() && !pub_type.is_empty() && !allowed_pub.contains(&pub_type) {
        return Verdict::Exclude("not_allowed_pub_type");
    }

    if !inc.comparisons.is_empty()
        && !(match_any(&title, &inc.comparisons)
            || match_any(&abstract_text, &inc.comparisons)
            || match_any(&keywords, &inc.comparisons))
    {
        return Verdict::Exclude("missing_required_comparison");
    }

    if !inc.population_terms.is_empty()
        && !(match_any(&participants, &inc.population_terms)
            || match_any(&title, &inc.population_terms)
            || match_any(&abstract_text, &inc.population_terms))
    {
        return Verdict::Exclude("population_mismatch");
    }

    if let Some(window) = &inc.year {
        let Some(year) = year else {
            return Verdict::Exclude("invalid_year");
        };
        match bound(&window.min) {
            BoundCheck::Invalid => return Verdict::Exclude("invalid_year"),
            BoundCheck::Value(min) if year < min => return Verdict::Exclude("year_too_early"),
            _ => {}
        }
        match bound(&window.max) {
            BoundCheck::Invalid => return Verdict::Exclude("invalid_year"),
            BoundCheck::Value(max) if year > max => return Verdict::Exclude("year_too_recent"),
            _ => {}
        }
    }

    let allowed_languages = lowered_list(&inc.languages);
    if !allowed_languages.is_empty()
        && !language.is_empty()
        && !allowed_languages.contains(&language)
    {
        return Verdict::Exclude("language_mismatch");
    }

    Verdict::Include
}
