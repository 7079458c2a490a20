use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a discipline entry (e.g., `ЗО 01`, `ПО 12.1`).
///
/// Codes are free-form; the only normalization applied anywhere is the
/// `_` → space mapping used when a code is recovered from a file name.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisciplineCode(pub String);

/// Key of a competency entry (e.g., `ЗК 1`, `ФК 10`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetencyCode(pub String);

/// Key of a program result (learning outcome) entry (e.g., `ПРН 3`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramResultCode(pub String);

/// Numeric identifier of a page on the remote CMS.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

impl DisciplineCode {
    /// Recover a discipline code from a file stem such as `ЗО_01`.
    pub fn from_file_stem(stem: &str) -> Self {
        DisciplineCode(stem.replace('_', " ").trim().to_string())
    }

    /// File-system friendly form of the code (`ПО 01/02` → `ПО_01_02`).
    pub fn file_stem(&self) -> String {
        self.0.replace([' ', '/'], "_")
    }

    pub fn category(&self) -> DisciplineCategory {
        DisciplineCategory::from_code(&self.0)
    }
}

impl CompetencyCode {
    pub fn kind(&self) -> CompetencyKind {
        CompetencyKind::from_code(&self.0)
    }
}

impl fmt::Display for DisciplineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CompetencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProgramResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The (degree, year) pair that distinguishes one curriculum edition from
/// another.
///
/// The identity is the only key used to decide whether a link registry may
/// be applied to a generated index document.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct DatasetIdentity {
    pub degree: String,
    pub year: String,
}

impl DatasetIdentity {
    pub fn new(degree: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            degree: degree.into(),
            year: year.into(),
        }
    }
}

impl fmt::Display for DatasetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.degree, self.year)
    }
}

/// Discipline grouping derived from the code prefix.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DisciplineCategory {
    General,
    Professional,
    Elective,
    Other,
}

impl DisciplineCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisciplineCategory::General => "general",
            DisciplineCategory::Professional => "professional",
            DisciplineCategory::Elective => "elective",
            DisciplineCategory::Other => "other",
        }
    }

    fn from_code(code: &str) -> Self {
        let code = code.trim_start();
        if code.starts_with("ЗО") {
            DisciplineCategory::General
        } else if code.starts_with("ПО") {
            DisciplineCategory::Professional
        } else if code.starts_with("ПВ") {
            DisciplineCategory::Elective
        } else {
            DisciplineCategory::Other
        }
    }
}

/// Competency grouping derived from the code prefix: general (`ЗК`) or
/// specialized (`ФК`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CompetencyKind {
    General,
    Specialized,
    Other,
}

impl CompetencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetencyKind::General => "general",
            CompetencyKind::Specialized => "specialized",
            CompetencyKind::Other => "other",
        }
    }

    fn from_code(code: &str) -> Self {
        let code = code.trim_start();
        if code.starts_with("ЗК") {
            CompetencyKind::General
        } else if code.starts_with("ФК") {
            CompetencyKind::Specialized
        } else {
            CompetencyKind::Other
        }
    }
}

impl Serialize for DisciplineCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for CompetencyKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
