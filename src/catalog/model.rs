//! Deserializable representation of a curriculum dataset document.
//!
//! The types mirror the document sections (`metadata`, `disciplines`,
//! `elevative_disciplines`, `competencies`, `program_results`, `mappings`).
//! Unknown keys are carried in `extra` maps so a load/save cycle never drops
//! data this crate does not understand.

use crate::catalog::identity::{
    CompetencyCode, DatasetIdentity, DisciplineCode, PageId, ProgramResultCode,
};
use crate::catalog::index::Catalog;
use crate::error::MetadataError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::warn;

/// Free-form values preserved across a load/save cycle.
pub type Extra = BTreeMap<String, serde_yaml::Value>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// The whole dataset as stored on disk.
pub struct Dataset {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub disciplines: Catalog<DisciplineCode, Discipline>,
    /// Elective disciplines. The on-disk key keeps its historical spelling.
    #[serde(
        default,
        rename = "elevative_disciplines",
        skip_serializing_if = "Catalog::is_empty"
    )]
    pub elective_disciplines: Catalog<DisciplineCode, Discipline>,
    #[serde(default)]
    pub competencies: Catalog<CompetencyCode, String>,
    #[serde(default)]
    pub program_results: Catalog<ProgramResultCode, String>,
    #[serde(default)]
    pub mappings: Catalog<DisciplineCode, MappingEntry>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Dataset {
    /// Primary and elective disciplines as one catalog.
    ///
    /// Builds a new catalog; neither source is modified. Primary entries come
    /// first and win on code collisions.
    pub fn merged_disciplines(&self) -> Catalog<DisciplineCode, Discipline> {
        let mut merged = self.disciplines.clone();
        for (code, discipline) in self.elective_disciplines.iter() {
            if !merged.contains(code) {
                merged.insert(code.clone(), discipline.clone());
            }
        }
        merged
    }

    /// Resolve a discipline in the merged view without building it.
    pub fn discipline(&self, code: &DisciplineCode) -> Option<&Discipline> {
        self.disciplines
            .get(code)
            .or_else(|| self.elective_disciplines.get(code))
    }

    /// Disciplines (merged view, declaration order) with no mapping entry.
    pub fn unfilled_disciplines(&self) -> Vec<DisciplineCode> {
        self.merged_disciplines()
            .codes()
            .filter(|code| !self.mappings.contains(code))
            .cloned()
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Document attributes. Only `year`, `degree`, and the parent page id carry
/// protocol meaning; everything else rides along in `extra`.
pub struct Metadata {
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub degree: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_page_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_id: Option<PageId>,
    /// Deprecated alias of `page_id` kept readable for older datasets.
    #[serde(
        default,
        deserialize_with = "optional_page_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub site_parent_id: Option<PageId>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Metadata {
    /// The dataset identity; both fields must be present and non-empty.
    pub fn identity(&self) -> Result<DatasetIdentity, MetadataError> {
        let degree =
            non_empty(self.degree.as_deref()).ok_or(MetadataError::MissingField("degree"))?;
        let year = non_empty(self.year.as_deref()).ok_or(MetadataError::MissingField("year"))?;
        Ok(DatasetIdentity::new(degree, year))
    }

    /// The remote parent/page id.
    ///
    /// `page_id` is canonical. `site_parent_id` is accepted with a warning
    /// when it is the only one present, and rejected when it disagrees with
    /// `page_id`. Zero is the unset placeholder and counts as absent.
    pub fn parent_page_id(&self) -> Result<PageId, MetadataError> {
        let configured = |id: Option<PageId>| id.filter(|id| id.0 != 0);
        match (configured(self.page_id), configured(self.site_parent_id)) {
            (Some(page_id), Some(alias)) if page_id != alias => {
                Err(MetadataError::ConflictingParentIds {
                    page_id: page_id.0,
                    site_parent_id: alias.0,
                })
            }
            (Some(page_id), _) => Ok(page_id),
            (None, Some(alias)) => {
                warn!(
                    page_id = alias.0,
                    "metadata.site_parent_id is deprecated; rename it to metadata.page_id"
                );
                Ok(alias)
            }
            (None, None) => Err(MetadataError::MissingParentId),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Competencies and program results a discipline contributes to.
pub struct MappingEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub competencies: Vec<CompetencyCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub program_results: Vec<ProgramResultCode>,
}

impl MappingEntry {
    pub fn lists_competency(&self, code: &CompetencyCode) -> bool {
        self.competencies.contains(code)
    }

    pub fn lists_program_result(&self, code: &ProgramResultCode) -> bool {
        self.program_results.contains(code)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// One course unit.
///
/// On disk a discipline is either a bare display name or a map with the
/// fields below. A discipline that only has a name is written back as a bare
/// string.
pub struct Discipline {
    pub name: String,
    pub credits: Option<Credits>,
    pub control: Option<String>,
    pub subdisciplines: Catalog<String, SubDiscipline>,
    pub lecturer_id: Option<String>,
    pub syllabus_url: Option<String>,
    pub description: Option<String>,
    pub extra: Extra,
}

impl Discipline {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Credits summed over sub-disciplines, or the discipline's own credits
    /// when it has none.
    pub fn total_credits(&self) -> Option<f64> {
        if self.subdisciplines.is_empty() {
            return self.credits.map(Credits::as_f64);
        }
        Some(
            self.subdisciplines
                .iter()
                .filter_map(|(_, sub)| sub.credits.map(Credits::as_f64))
                .sum(),
        )
    }

    /// Control forms of all sub-disciplines, de-duplicated in first-seen
    /// order, or the discipline's own control form.
    pub fn all_controls(&self) -> Vec<String> {
        if self.subdisciplines.is_empty() {
            return self.control.iter().cloned().collect();
        }
        let mut controls: Vec<String> = Vec::new();
        for (_, sub) in self.subdisciplines.iter() {
            if let Some(control) = sub.control.as_ref().filter(|c| !c.trim().is_empty()) {
                if !controls.contains(control) {
                    controls.push(control.clone());
                }
            }
        }
        controls
    }

    fn is_name_only(&self) -> bool {
        self.credits.is_none()
            && self.control.is_none()
            && self.subdisciplines.is_empty()
            && self.lecturer_id.is_none()
            && self.syllabus_url.is_none()
            && self.description.is_none()
            && self.extra.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// A named part of a composite discipline.
pub struct SubDiscipline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<Credits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Credit count as written in the dataset; whole numbers stay whole on save.
pub enum Credits {
    Whole(u32),
    Fractional(f64),
}

impl Credits {
    pub fn as_f64(self) -> f64 {
        match self {
            Credits::Whole(value) => f64::from(value),
            Credits::Fractional(value) => value,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DisciplineFields {
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credits: Option<Credits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    control: Option<String>,
    #[serde(default, skip_serializing_if = "Catalog::is_empty")]
    subdisciplines: Catalog<String, SubDiscipline>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    lecturer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    syllabus_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(flatten)]
    extra: Extra,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DisciplineRepr {
    Name(String),
    Fields(DisciplineFields),
}

impl<'de> Deserialize<'de> for Discipline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match DisciplineRepr::deserialize(deserializer)? {
            DisciplineRepr::Name(name) => Discipline::named(name),
            DisciplineRepr::Fields(fields) => Discipline {
                name: fields.name,
                credits: fields.credits,
                control: fields.control,
                subdisciplines: fields.subdisciplines,
                lecturer_id: fields.lecturer_id,
                syllabus_url: fields.syllabus_url,
                description: fields.description,
                extra: fields.extra,
            },
        })
    }
}

impl Serialize for Discipline {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_name_only() {
            return serializer.serialize_str(&self.name);
        }
        DisciplineFields {
            name: self.name.clone(),
            credits: self.credits,
            control: self.control.clone(),
            subdisciplines: self.subdisciplines.clone(),
            lecturer_id: self.lecturer_id.clone(),
            syllabus_url: self.syllabus_url.clone(),
            description: self.description.clone(),
            extra: self.extra.clone(),
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

/// Accept strings and bare numbers (`year: 2024`) as text.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(value) => value.to_string(),
        Scalar::Float(value) => value.to_string(),
        Scalar::Flag(value) => value.to_string(),
    }))
}

fn optional_page_id<'de, D>(deserializer: D) -> Result<Option<PageId>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Integer(value)) => u64::try_from(value)
            .map(|id| Some(PageId(id)))
            .map_err(|_| D::Error::custom(format!("page id must be positive, got {value}"))),
        Some(Scalar::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Scalar::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map(|id| Some(PageId(id)))
            .map_err(|_| D::Error::custom(format!("page id must be numeric, got '{text}'"))),
        Some(_) => Err(D::Error::custom("page id must be a number")),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
