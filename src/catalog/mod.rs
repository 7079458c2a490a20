//! Curriculum dataset wiring.
//!
//! This module wraps the dataset document (YAML or JSON) so tools can load a
//! validated snapshot and address its entries by typed codes. Types here
//! mirror the document sections; `Catalog` gives ordered, typed lookups and
//! the repository functions handle disk I/O.

pub mod identity;
pub mod index;
pub mod model;
pub mod repository;

pub use identity::{
    CompetencyCode, CompetencyKind, DatasetIdentity, DisciplineCategory, DisciplineCode, PageId,
    ProgramResultCode,
};
pub use index::Catalog;
pub use model::{Credits, Dataset, Discipline, MappingEntry, Metadata, SubDiscipline};
pub use repository::{DatasetFormat, load_dataset, parse_dataset, save_dataset};
