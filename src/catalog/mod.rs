//! Branch template catalog
//!
//! Static, authored data: templates, their sockets and the species that
//! root plants in them. Read-only while plants grow.

pub mod catalog;
pub mod demo;
pub mod file;
pub mod species;
pub mod template;

pub use catalog::TemplateCatalog;
pub use file::CatalogFile;
pub use species::PlantSpecies;
pub use template::{
    BranchTemplate, MeshVariant, Socket, SocketOption, SocketSpec, TemplateId, MAX_SOCKETS,
};
