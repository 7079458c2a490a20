//! Presence matrices and per-discipline summaries derived from mappings.
//!
//! Everything here is a pure function of the dataset. Rows follow catalog
//! declaration order and columns follow the merged discipline order; a cell
//! is `true` iff that discipline's mapping lists the row code, so cell values
//! never depend on ordering.

use crate::catalog::{
    Catalog, CompetencyCode, Dataset, DisciplineCategory, DisciplineCode, MappingEntry,
    ProgramResultCode,
};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Catalog codes × discipline codes, row-major.
pub struct PresenceMatrix<R> {
    pub rows: Vec<R>,
    pub columns: Vec<DisciplineCode>,
    pub cells: Vec<Vec<bool>>,
}

pub type CompetencyMatrix = PresenceMatrix<CompetencyCode>;
pub type ProgramResultMatrix = PresenceMatrix<ProgramResultCode>;

impl<R: PartialEq> PresenceMatrix<R> {
    /// Cell value, or `None` when either code is not an axis label.
    pub fn get(&self, row: &R, column: &DisciplineCode) -> Option<bool> {
        let r = self.rows.iter().position(|candidate| candidate == row)?;
        let c = self.columns.iter().position(|candidate| candidate == column)?;
        Some(self.cells[r][c])
    }

    /// Number of disciplines marked for `row`.
    pub fn row_count(&self, row: &R) -> Option<usize> {
        let r = self.rows.iter().position(|candidate| candidate == row)?;
        Some(self.cells[r].iter().filter(|cell| **cell).count())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// One discipline with its resolved mapping, handed to report generators.
pub struct SummaryRow {
    pub code: DisciplineCode,
    pub name: String,
    pub category: DisciplineCategory,
    pub credits: Option<f64>,
    pub controls: Vec<String>,
    pub competencies: Vec<CompetencyCode>,
    pub program_results: Vec<ProgramResultCode>,
    pub competency_count: usize,
    pub program_result_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatrixReport {
    pub competencies: CompetencyMatrix,
    pub program_results: ProgramResultMatrix,
    pub summary: Vec<SummaryRow>,
}

/// Build both presence matrices and the summary rows.
pub fn build(dataset: &Dataset) -> MatrixReport {
    let disciplines = dataset.merged_disciplines();
    let columns: Vec<DisciplineCode> = disciplines.codes().cloned().collect();

    let competencies = presence(dataset, &dataset.competencies, &columns, |mapping, code| {
        mapping.lists_competency(code)
    });
    let program_results = presence(dataset, &dataset.program_results, &columns, |mapping, code| {
        mapping.lists_program_result(code)
    });

    let summary = disciplines
        .iter()
        .map(|(code, discipline)| {
            let (competencies, program_results) = match dataset.mappings.get(code) {
                Some(mapping) => (
                    dedup(&mapping.competencies),
                    dedup(&mapping.program_results),
                ),
                None => (Vec::new(), Vec::new()),
            };
            SummaryRow {
                code: code.clone(),
                name: discipline.name.clone(),
                category: code.category(),
                credits: discipline.total_credits(),
                controls: discipline.all_controls(),
                competency_count: competencies.len(),
                program_result_count: program_results.len(),
                competencies,
                program_results,
            }
        })
        .collect();

    MatrixReport {
        competencies,
        program_results,
        summary,
    }
}

fn presence<R, F>(
    dataset: &Dataset,
    catalog: &Catalog<R, String>,
    columns: &[DisciplineCode],
    listed: F,
) -> PresenceMatrix<R>
where
    R: Ord + Clone,
    F: Fn(&MappingEntry, &R) -> bool,
{
    let rows: Vec<R> = catalog.codes().cloned().collect();
    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    dataset
                        .mappings
                        .get(column)
                        .is_some_and(|mapping| listed(mapping, row))
                })
                .collect()
        })
        .collect();
    PresenceMatrix {
        rows,
        columns: columns.to_vec(),
        cells,
    }
}

/// Mapping lists are ordered sets; repeated codes collapse to the first.
fn dedup<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    unique
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UsageCount<C> {
    pub code: C,
    pub disciplines: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Catalog sizes, fill progress, and how often each code is used.
pub struct Statistics {
    pub disciplines: usize,
    pub competencies: usize,
    pub program_results: usize,
    pub filled: usize,
    pub unfilled: Vec<DisciplineCode>,
    pub competency_usage: Vec<UsageCount<CompetencyCode>>,
    pub program_result_usage: Vec<UsageCount<ProgramResultCode>>,
}

pub fn statistics(dataset: &Dataset) -> Statistics {
    let disciplines = dataset.merged_disciplines();
    let unfilled = dataset.unfilled_disciplines();

    let competency_usage = dataset
        .competencies
        .codes()
        .map(|code| UsageCount {
            code: code.clone(),
            disciplines: dataset
                .mappings
                .iter()
                .filter(|(_, mapping)| mapping.lists_competency(code))
                .count(),
        })
        .collect();
    let program_result_usage = dataset
        .program_results
        .codes()
        .map(|code| UsageCount {
            code: code.clone(),
            disciplines: dataset
                .mappings
                .iter()
                .filter(|(_, mapping)| mapping.lists_program_result(code))
                .count(),
        })
        .collect();

    Statistics {
        disciplines: disciplines.len(),
        competencies: dataset.competencies.len(),
        program_results: dataset.program_results.len(),
        filled: disciplines.len() - unfilled.len(),
        unfilled,
        competency_usage,
        program_result_usage,
    }
}
