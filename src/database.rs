//! Merged symbol database
//!
//! Collects the owned indexes of every job, rejects a file reported twice, and
//! answers cross-file USR lookups over the result.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lsp_types::Range as LspRange;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::IndexError;
use crate::index::{FuncId, IndexFile, TypeId, VarId};
use crate::symbol::usr::xxhash64;
use crate::symbol::{EntityClass, FileLocation, Usr};

/// A record in one file's tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Type(TypeId),
    Func(FuncId),
    Var(VarId),
}

impl EntityRef {
    pub fn class(self) -> EntityClass {
        match self {
            EntityRef::Type(_) => EntityClass::Type,
            EntityRef::Func(_) => EntityClass::Func,
            EntityRef::Var(_) => EntityClass::Var,
        }
    }

    pub fn id(self) -> usize {
        match self {
            EntityRef::Type(TypeId(id)) | EntityRef::Func(FuncId(id)) | EntityRef::Var(VarId(id)) => id,
        }
    }
}

/// One file holding a record for a looked-up USR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsrHit<'a> {
    pub path: &'a Path,
    pub entity: EntityRef,
}

/// A record listed in a `UsrReport`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsrRecord {
    pub file: PathBuf,
    /// `types`, `funcs` or `vars`
    pub table: String,
    pub id: usize,
    pub detailed_name: String,
}

/// Everything the database knows about one USR
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsrReport {
    pub usr: Usr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Definition spelling in 0-based editor coordinates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_range: Option<LspRange>,
    pub records: Vec<UsrRecord>,
}

#[derive(Debug, Default)]
pub struct SymbolDatabase {
    files: BTreeMap<PathBuf, IndexFile>,
}

impl SymbolDatabase {
    /// Merge per-job outputs; each physical file may appear at most once
    pub fn merge(outputs: impl IntoIterator<Item = IndexFile>) -> Result<Self, IndexError> {
        let mut files = BTreeMap::new();
        for index in outputs {
            index.validate()?;
            if files.contains_key(&index.path) {
                return Err(IndexError::DuplicateOwnership { path: index.path });
            }
            debug!("Merging index for {}", index.path.display());
            files.insert(index.path.clone(), index);
        }
        info!("Merged {} file indexes", files.len());
        Ok(Self { files })
    }

    pub fn file(&self, path: &Path) -> Option<&IndexFile> {
        self.files.get(path)
    }

    /// Every index, ordered by path
    pub fn files(&self) -> impl Iterator<Item = &IndexFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Every file holding a record for `usr`
    pub fn find_by_usr(&self, usr: Usr) -> Vec<UsrHit<'_>> {
        let mut hits = Vec::new();
        for (path, index) in &self.files {
            let path = path.as_path();
            if let Some(ty) = index.find_type(usr) {
                hits.push(UsrHit { path, entity: EntityRef::Type(ty.id) });
            }
            if let Some(func) = index.find_func(usr) {
                hits.push(UsrHit { path, entity: EntityRef::Func(func.id) });
            }
            if let Some(var) = index.find_var(usr) {
                hits.push(UsrHit { path, entity: EntityRef::Var(var.id) });
            }
        }
        hits
    }

    /// Where `usr` is defined, if any file recorded a definition
    pub fn definition_of(&self, usr: Usr) -> Option<FileLocation> {
        self.find_by_usr(usr).into_iter().find_map(|hit| {
            let index = self.file(hit.path)?;
            let spelling = match hit.entity {
                EntityRef::Type(id) => index.types[id.0].definition_spelling,
                EntityRef::Func(id) => index.funcs[id.0].definition_spelling,
                EntityRef::Var(id) => index.vars[id.0].definition_spelling,
            }?;
            Some(FileLocation::new(hit.path, spelling))
        })
    }

    /// Every record for `usr` across files, plus where it is defined
    pub fn report(&self, usr: Usr) -> UsrReport {
        let records = self
            .find_by_usr(usr)
            .into_iter()
            .filter_map(|hit| {
                let index = self.file(hit.path)?;
                let detailed_name = match hit.entity {
                    EntityRef::Type(id) => &index.types[id.0].detailed_name,
                    EntityRef::Func(id) => &index.funcs[id.0].detailed_name,
                    EntityRef::Var(id) => &index.vars[id.0].detailed_name,
                };
                Some(UsrRecord {
                    file: hit.path.to_path_buf(),
                    table: hit.entity.class().to_string(),
                    id: hit.entity.id(),
                    detailed_name: detailed_name.clone(),
                })
            })
            .collect();
        let definition = self.definition_of(usr);
        UsrReport {
            usr,
            definition_range: definition.as_ref().map(|loc| LspRange::from(loc.range)),
            definition: definition.map(|loc| loc.to_compact_range()),
            records,
        }
    }

    /// Write one JSON document per file into `dir`
    ///
    /// Returns the written paths in file order.
    pub fn write_to(&self, dir: &Path, pretty: bool) -> Result<Vec<PathBuf>, IndexError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.files.len());
        for index in self.files() {
            let target = dir.join(output_file_name(&index.path));
            std::fs::write(&target, index.to_json_string(pretty)?)?;
            debug!("Wrote {} -> {}", index.path.display(), target.display());
            written.push(target);
        }
        info!("Wrote {} indexes to {}", written.len(), dir.display());
        Ok(written)
    }
}

/// `<file name>.<path hash>.json`, unique per physical path
pub fn output_file_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let hash = xxhash64(path.as_os_str().as_encoded_bytes(), 0);
    format!("{name}.{hash:016X}.json")
}
