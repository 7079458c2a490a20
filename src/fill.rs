//! Interactive mapping entry for unfilled disciplines.
//!
//! Catalog entries are listed with 1-based numbers and the user answers with
//! comma-separated numbers. Each answered discipline is stored and handed to
//! `on_save` right away, so quitting (`q`) or losing the terminal keeps
//! everything entered so far.

use crate::catalog::{Catalog, Dataset, DisciplineCode, MappingEntry};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FillReport {
    pub filled: Vec<DisciplineCode>,
    /// Unfilled disciplines that were not reached.
    pub remaining: usize,
    pub quit_early: bool,
}

enum Answer<T> {
    Value(T),
    Quit,
}

pub fn fill_unfilled<R, W, F>(
    dataset: &mut Dataset,
    input: &mut R,
    output: &mut W,
    mut on_save: F,
) -> Result<FillReport>
where
    R: BufRead,
    W: Write,
    F: FnMut(&Dataset) -> Result<()>,
{
    let unfilled = dataset.unfilled_disciplines();
    let mut report = FillReport::default();
    if unfilled.is_empty() {
        writeln!(output, "All disciplines are already filled.")?;
        return Ok(report);
    }
    writeln!(output, "{} unfilled disciplines", unfilled.len())?;

    let total = unfilled.len();
    for (position, code) in unfilled.iter().enumerate() {
        let name = dataset
            .discipline(code)
            .map(|discipline| discipline.name.clone())
            .unwrap_or_default();
        writeln!(output, "\n[{}/{total}] {code}: {name}", position + 1)?;

        writeln!(output, "\nCompetencies:")?;
        let competencies = match select(&dataset.competencies, "Competencies", input, output)? {
            Answer::Value(selected) => selected,
            Answer::Quit => {
                report.quit_early = true;
                break;
            }
        };
        writeln!(output, "\nProgram results:")?;
        let program_results =
            match select(&dataset.program_results, "Program results", input, output)? {
                Answer::Value(selected) => selected,
                Answer::Quit => {
                    report.quit_early = true;
                    break;
                }
            };

        dataset.mappings.insert(
            code.clone(),
            MappingEntry {
                competencies,
                program_results,
            },
        );
        on_save(dataset).with_context(|| format!("saving after {code}"))?;
        writeln!(output, "Saved {code}")?;
        report.filled.push(code.clone());

        if position + 1 < total {
            write!(output, "\nContinue? (Enter = yes, q = quit): ")?;
            output.flush()?;
            match read_answer(input)? {
                Some(answer) if answer.eq_ignore_ascii_case("q") => {
                    report.quit_early = true;
                    break;
                }
                None => {
                    report.quit_early = true;
                    break;
                }
                Some(_) => {}
            }
        }
    }

    report.remaining = total - report.filled.len();
    Ok(report)
}

/// Print a numbered catalog and read a selection from it.
fn select<K, R, W>(
    catalog: &Catalog<K, String>,
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<Answer<Vec<K>>>
where
    K: Ord + Clone + std::fmt::Display,
    R: BufRead,
    W: Write,
{
    let codes: Vec<&K> = catalog.codes().collect();
    for (number, (code, text)) in catalog.iter().enumerate() {
        writeln!(output, "{:2}. {code}: {}", number + 1, preview(text))?;
    }
    write!(output, "{prompt} (numbers separated by commas, Enter to skip): ")?;
    output.flush()?;

    let Some(answer) = read_answer(input)? else {
        return Ok(Answer::Quit);
    };
    if answer.eq_ignore_ascii_case("q") {
        return Ok(Answer::Quit);
    }
    match parse_selection(&answer, codes.len()) {
        Some(indices) => {
            let selected: Vec<K> = indices.into_iter().map(|i| codes[i].clone()).collect();
            if !selected.is_empty() {
                let listed: Vec<String> = selected.iter().map(ToString::to_string).collect();
                writeln!(output, "Selected: {}", listed.join(", "))?;
            }
            Ok(Answer::Value(selected))
        }
        None => {
            writeln!(output, "Invalid input, nothing selected")?;
            Ok(Answer::Value(Vec::new()))
        }
    }
}

/// `None` at end of input.
fn read_answer<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("reading answer")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// 1-based, comma-separated numbers to 0-based indices. Out-of-range numbers
/// are dropped; any non-numeric token rejects the whole answer.
fn parse_selection(answer: &str, len: usize) -> Option<Vec<usize>> {
    if answer.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut indices = Vec::new();
    for token in answer.split(',') {
        let number: usize = token.trim().parse().ok()?;
        if (1..=len).contains(&number) && !indices.contains(&(number - 1)) {
            indices.push(number - 1);
        }
    }
    Some(indices)
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CompetencyCode, Discipline, ProgramResultCode};
    use std::io::Cursor;

    fn dataset() -> Dataset {
        let mut dataset = Dataset::default();
        for (code, name) in [("ЗО 01", "Математика"), ("ЗО 02", "Фізика"), ("ЗО 03", "Хімія")] {
            dataset
                .disciplines
                .insert(DisciplineCode(code.into()), Discipline::named(name));
        }
        for code in ["ЗК 1", "ЗК 2", "ФК 1"] {
            dataset
                .competencies
                .insert(CompetencyCode(code.into()), format!("{code} description"));
        }
        dataset
            .program_results
            .insert(ProgramResultCode("ПРН 1".into()), "outcome".into());
        dataset
    }

    #[test]
    fn parses_selections() {
        assert_eq!(parse_selection("", 3), Some(vec![]));
        assert_eq!(parse_selection("1, 3", 3), Some(vec![0, 2]));
        assert_eq!(parse_selection("2,9,2", 3), Some(vec![1]));
        assert_eq!(parse_selection("1,x", 3), None);
    }

    #[test]
    fn fills_in_order_saves_each_and_stops_on_q() {
        let mut data = dataset();
        let mut input = Cursor::new("1,3\n1\n\n2\nabc\nq\n");
        let mut output = Vec::new();
        let mut saves = 0;

        let report = fill_unfilled(&mut data, &mut input, &mut output, |_| {
            saves += 1;
            Ok(())
        })
        .unwrap();

        assert_eq!(saves, 2);
        assert!(report.quit_early);
        assert_eq!(report.remaining, 1);
        assert_eq!(
            report.filled,
            vec![DisciplineCode("ЗО 01".into()), DisciplineCode("ЗО 02".into())]
        );

        let first = data.mappings.get(&DisciplineCode("ЗО 01".into())).unwrap();
        assert_eq!(
            first.competencies,
            vec![CompetencyCode("ЗК 1".into()), CompetencyCode("ФК 1".into())]
        );
        assert_eq!(first.program_results, vec![ProgramResultCode("ПРН 1".into())]);

        let second = data.mappings.get(&DisciplineCode("ЗО 02".into())).unwrap();
        assert_eq!(second.competencies, vec![CompetencyCode("ЗК 2".into())]);
        assert!(second.program_results.is_empty());
        assert!(!data.mappings.contains(&DisciplineCode("ЗО 03".into())));

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("[1/3] ЗО 01: Математика"));
        assert!(transcript.contains("Invalid input"));
    }

    #[test]
    fn nothing_to_fill() {
        let mut data = Dataset::default();
        let mut output = Vec::new();
        let report =
            fill_unfilled(&mut data, &mut Cursor::new(""), &mut output, |_| Ok(())).unwrap();
        assert!(report.filled.is_empty());
        assert!(String::from_utf8(output).unwrap().contains("already filled"));
    }
}
