//! Starter dataset written by `curriculum template`.

use crate::catalog::{
    CompetencyCode, Credits, Dataset, Discipline, DisciplineCode, MappingEntry, PageId,
    ProgramResultCode, SubDiscipline,
};

/// A small dataset that passes validation with one unfilled discipline left
/// to show the fill workflow.
pub fn dataset_template() -> Dataset {
    let mut dataset = Dataset::default();
    dataset.metadata.year = Some("2024".to_string());
    dataset.metadata.degree = Some("Бакалавр".to_string());
    dataset.metadata.page_id = Some(PageId(0));
    dataset.metadata.extra.insert(
        "program".to_string(),
        serde_yaml::Value::from("Прикладна фізика та наноматеріали"),
    );

    let disciplines = [
        ("ЗО 01", "Вища математика", 8, "Іспит"),
        ("ЗО 02", "Загальна фізика", 7, "Іспит"),
        ("ПО 01", "Програмування", 5, "Залік"),
    ];
    for (code, name, credits, control) in disciplines {
        dataset.disciplines.insert(
            DisciplineCode(code.to_string()),
            Discipline {
                credits: Some(Credits::Whole(credits)),
                control: Some(control.to_string()),
                ..Discipline::named(name)
            },
        );
    }

    let mut lab = Discipline::named("Фізичний практикум");
    lab.subdisciplines.insert(
        "Механіка".to_string(),
        SubDiscipline {
            credits: Some(Credits::Whole(3)),
            control: Some("Залік".to_string()),
            ..SubDiscipline::default()
        },
    );
    lab.subdisciplines.insert(
        "Оптика".to_string(),
        SubDiscipline {
            credits: Some(Credits::Whole(3)),
            control: Some("Іспит".to_string()),
            ..SubDiscipline::default()
        },
    );
    dataset
        .disciplines
        .insert(DisciplineCode("ПО 02".to_string()), lab);

    dataset.elective_disciplines.insert(
        DisciplineCode("ПВ 01".to_string()),
        Discipline {
            credits: Some(Credits::Whole(4)),
            control: Some("Залік".to_string()),
            ..Discipline::named("Вибіркова дисципліна")
        },
    );

    let competencies = [
        ("ЗК 1", "Здатність до абстрактного мислення, аналізу та синтезу."),
        ("ЗК 2", "Здатність застосовувати знання у практичних ситуаціях."),
        ("ФК 1", "Здатність використовувати математичні методи для розв'язання фізичних задач."),
        ("ФК 2", "Здатність розробляти програмне забезпечення для обробки експериментальних даних."),
    ];
    for (code, text) in competencies {
        dataset
            .competencies
            .insert(CompetencyCode(code.to_string()), text.to_string());
    }

    let program_results = [
        ("ПРН 1", "Знати і розуміти основні розділи вищої математики."),
        ("ПРН 2", "Застосовувати фізичні закони для аналізу явищ."),
        ("ПРН 3", "Створювати програми для моделювання фізичних процесів."),
    ];
    for (code, text) in program_results {
        dataset
            .program_results
            .insert(ProgramResultCode(code.to_string()), text.to_string());
    }

    let mappings = [
        ("ЗО 01", &["ЗК 1", "ФК 1"][..], &["ПРН 1"][..]),
        ("ЗО 02", &["ЗК 1", "ЗК 2"][..], &["ПРН 2"][..]),
        ("ПО 01", &["ФК 2"][..], &["ПРН 3"][..]),
        ("ПВ 01", &["ЗК 2"][..], &[][..]),
    ];
    for (code, competencies, results) in mappings {
        dataset.mappings.insert(
            DisciplineCode(code.to_string()),
            MappingEntry {
                competencies: competencies
                    .iter()
                    .map(|c| CompetencyCode(c.to_string()))
                    .collect(),
                program_results: results
                    .iter()
                    .map(|r| ProgramResultCode(r.to_string()))
                    .collect(),
            },
        );
    }

    dataset
}
