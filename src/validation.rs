//! Cross-reference checks between mappings and the catalogs.
//!
//! Every rule runs on every input; nothing short-circuits, so one report
//! lists all problems at once. Discipline keys are checked against the merged
//! (primary + elective) catalog. The validator never mutates the dataset.

use crate::catalog::{CompetencyCode, Dataset, DisciplineCode, ProgramResultCode};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// A catalog section is absent or empty.
    MissingCatalog { section: &'static str },
    UnknownDiscipline { discipline: DisciplineCode },
    UnknownCompetency {
        discipline: DisciplineCode,
        competency: CompetencyCode,
    },
    UnknownProgramResult {
        discipline: DisciplineCode,
        program_result: ProgramResultCode,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingCatalog { section } => {
                write!(f, "missing or empty section '{section}'")
            }
            ValidationError::UnknownDiscipline { discipline } => {
                write!(f, "unknown discipline in mapping: {discipline}")
            }
            ValidationError::UnknownCompetency {
                discipline,
                competency,
            } => write!(f, "unknown competency: {competency} (in {discipline})"),
            ValidationError::UnknownProgramResult {
                discipline,
                program_result,
            } => write!(f, "unknown program result: {program_result} (in {discipline})"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Disciplines without a mapping entry, aggregated into one warning.
    UnfilledDisciplines { count: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::UnfilledDisciplines { count } => {
                write!(f, "{count} disciplines unfilled")
            }
        }
    }
}

/// Whether unfilled disciplines block a gated operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnfilledPolicy {
    #[default]
    Warn,
    Deny,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Valid iff there are no errors; warnings never affect validity.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Gate decision under a policy: errors always fail, warnings fail only
    /// under `UnfilledPolicy::Deny`.
    pub fn passes(&self, policy: UnfilledPolicy) -> bool {
        match policy {
            UnfilledPolicy::Warn => self.is_valid(),
            UnfilledPolicy::Deny => self.is_valid() && self.warnings.is_empty(),
        }
    }

    pub fn unfilled_count(&self) -> usize {
        self.warnings
            .iter()
            .map(|warning| match warning {
                ValidationWarning::UnfilledDisciplines { count } => *count,
            })
            .sum()
    }
}

pub fn validate(dataset: &Dataset) -> ValidationReport {
    let mut report = ValidationReport::default();
    let disciplines = dataset.merged_disciplines();

    if disciplines.is_empty() {
        report.errors.push(ValidationError::MissingCatalog {
            section: "disciplines",
        });
    }
    if dataset.competencies.is_empty() {
        report.errors.push(ValidationError::MissingCatalog {
            section: "competencies",
        });
    }
    if dataset.program_results.is_empty() {
        report.errors.push(ValidationError::MissingCatalog {
            section: "program_results",
        });
    }

    for (discipline, mapping) in dataset.mappings.iter() {
        if !disciplines.contains(discipline) {
            report.errors.push(ValidationError::UnknownDiscipline {
                discipline: discipline.clone(),
            });
        }
        for competency in &mapping.competencies {
            if !dataset.competencies.contains(competency) {
                report.errors.push(ValidationError::UnknownCompetency {
                    discipline: discipline.clone(),
                    competency: competency.clone(),
                });
            }
        }
        for program_result in &mapping.program_results {
            if !dataset.program_results.contains(program_result) {
                report.errors.push(ValidationError::UnknownProgramResult {
                    discipline: discipline.clone(),
                    program_result: program_result.clone(),
                });
            }
        }
    }

    let unfilled = disciplines
        .codes()
        .filter(|code| !dataset.mappings.contains(code))
        .count();
    if unfilled > 0 {
        report
            .warnings
            .push(ValidationWarning::UnfilledDisciplines { count: unfilled });
    }

    report
}
