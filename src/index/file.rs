//! Per-file index
//!
//! One `IndexFile` holds the entity tables for a single physical file as seen by
//! one indexing job, along with the file's includes and preprocessor-skipped ranges.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::entity::{IndexedFunc, IndexedType, IndexedVar};
use super::ids::{FuncId, FuncRef, TypeId, VarId, push_unique};
use crate::error::IndexError;
use crate::symbol::{EntityClass, Range, Usr};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFile {
    #[serde(skip)]
    pub path: PathBuf,
    /// Contents the index was built against, when they could be read
    #[serde(skip)]
    pub file_contents: Option<Arc<str>>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub skipped_by_preprocessor: Vec<Range>,
    #[serde(default)]
    pub types: Vec<IndexedType>,
    #[serde(default)]
    pub funcs: Vec<IndexedFunc>,
    #[serde(default)]
    pub vars: Vec<IndexedVar>,
    #[serde(skip)]
    usr_to_type: HashMap<Usr, TypeId>,
    #[serde(skip)]
    usr_to_func: HashMap<Usr, FuncId>,
    #[serde(skip)]
    usr_to_var: HashMap<Usr, VarId>,
    /// Membership for the lists that grow with every reference and call site
    #[serde(skip)]
    seen_uses: HashSet<(EntityClass, usize, Range)>,
    #[serde(skip)]
    seen_calls: HashSet<(FuncId, FuncId, Range)>,
}

impl IndexFile {
    pub fn new(path: impl Into<PathBuf>, file_contents: Option<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            file_contents,
            includes: Vec::new(),
            skipped_by_preprocessor: Vec::new(),
            types: Vec::new(),
            funcs: Vec::new(),
            vars: Vec::new(),
            usr_to_type: HashMap::new(),
            usr_to_func: HashMap::new(),
            usr_to_var: HashMap::new(),
            seen_uses: HashSet::new(),
            seen_calls: HashSet::new(),
        }
    }

    /// Get or create the type record for `usr`; new records get the next dense id
    pub fn to_type_id(&mut self, usr: Usr) -> TypeId {
        if let Some(id) = self.usr_to_type.get(&usr) {
            return *id;
        }
        let id = TypeId(self.types.len());
        trace!("{}: new type {} for usr {}", self.path.display(), id, usr);
        self.types.push(IndexedType::new(id, usr));
        self.usr_to_type.insert(usr, id);
        id
    }

    pub fn to_func_id(&mut self, usr: Usr) -> FuncId {
        if let Some(id) = self.usr_to_func.get(&usr) {
            return *id;
        }
        let id = FuncId(self.funcs.len());
        trace!("{}: new func {} for usr {}", self.path.display(), id, usr);
        self.funcs.push(IndexedFunc::new(id, usr));
        self.usr_to_func.insert(usr, id);
        id
    }

    pub fn to_var_id(&mut self, usr: Usr) -> VarId {
        if let Some(id) = self.usr_to_var.get(&usr) {
            return *id;
        }
        let id = VarId(self.vars.len());
        trace!("{}: new var {} for usr {}", self.path.display(), id, usr);
        self.vars.push(IndexedVar::new(id, usr));
        self.usr_to_var.insert(usr, id);
        id
    }

    pub fn find_type(&self, usr: Usr) -> Option<&IndexedType> {
        self.usr_to_type.get(&usr).map(|id| &self.types[id.0])
    }

    pub fn find_func(&self, usr: Usr) -> Option<&IndexedFunc> {
        self.usr_to_func.get(&usr).map(|id| &self.funcs[id.0])
    }

    pub fn find_var(&self, usr: Usr) -> Option<&IndexedVar> {
        self.usr_to_var.get(&usr).map(|id| &self.vars[id.0])
    }

    // Ids handed to the accessors below always come from this index's `to_*_id`.

    pub fn type_mut(&mut self, id: TypeId) -> &mut IndexedType {
        &mut self.types[id.0]
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut IndexedFunc {
        &mut self.funcs[id.0]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut IndexedVar {
        &mut self.vars[id.0]
    }

    /// Record a use of entity `id` in table `class`, once per range
    pub fn add_use(&mut self, class: EntityClass, id: usize, range: Range) -> bool {
        if !self.seen_uses.insert((class, id, range)) {
            return false;
        }
        match class {
            EntityClass::Type => self.types[id].uses.push(range),
            EntityClass::Func => self.funcs[id].uses.push(range),
            EntityClass::Var => self.vars[id].uses.push(range),
        }
        true
    }

    /// Record a call site on both ends of the edge, once per site
    pub fn add_call(&mut self, caller: FuncId, callee: FuncId, loc: Range) -> bool {
        if !self.seen_calls.insert((caller, callee, loc)) {
            return false;
        }
        self.funcs[caller.0].callees.push(FuncRef { id: callee, loc });
        self.funcs[callee.0].callers.push(FuncRef { id: caller, loc });
        self.add_use(EntityClass::Func, callee.0, loc);
        true
    }

    pub fn add_include(&mut self, path: &Path) {
        push_unique(&mut self.includes, path.to_string_lossy().into_owned());
    }

    pub fn add_skipped_range(&mut self, range: Range) {
        push_unique(&mut self.skipped_by_preprocessor, range);
    }

    /// Check local id density and that every relationship id resolves in this index
    pub fn validate(&self) -> Result<(), IndexError> {
        if !self.types.iter().enumerate().all(|(i, t)| t.id.0 == i) {
            return Err(self.non_dense(EntityClass::Type));
        }
        if !self.funcs.iter().enumerate().all(|(i, f)| f.id.0 == i) {
            return Err(self.non_dense(EntityClass::Func));
        }
        if !self.vars.iter().enumerate().all(|(i, v)| v.id.0 == i) {
            return Err(self.non_dense(EntityClass::Var));
        }

        for ty in &self.types {
            let from = (EntityClass::Type, ty.id.0);
            for id in ty.parents.iter().chain(&ty.derived).chain(&ty.types) {
                self.check(from, EntityClass::Type, id.0)?;
            }
            for id in &ty.funcs {
                self.check(from, EntityClass::Func, id.0)?;
            }
            for id in ty.vars.iter().chain(&ty.instances) {
                self.check(from, EntityClass::Var, id.0)?;
            }
        }

        for func in &self.funcs {
            let from = (EntityClass::Func, func.id.0);
            if let Some(id) = func.declaring_type {
                self.check(from, EntityClass::Type, id.0)?;
            }
            for id in func.base.iter().chain(&func.derived) {
                self.check(from, EntityClass::Func, id.0)?;
            }
            for call in func.callers.iter().chain(&func.callees) {
                self.check(from, EntityClass::Func, call.id.0)?;
            }
            for id in &func.locals {
                self.check(from, EntityClass::Var, id.0)?;
            }
        }

        for var in &self.vars {
            let from = (EntityClass::Var, var.id.0);
            for id in var.declaring_type.iter().chain(&var.variable_type) {
                self.check(from, EntityClass::Type, id.0)?;
            }
        }

        Ok(())
    }

    fn non_dense(&self, table: EntityClass) -> IndexError {
        IndexError::NonDenseIds {
            file: self.path.clone(),
            table,
        }
    }

    fn check(
        &self,
        (table, from): (EntityClass, usize),
        target: EntityClass,
        id: usize,
    ) -> Result<(), IndexError> {
        let len = match target {
            EntityClass::Type => self.types.len(),
            EntityClass::Func => self.funcs.len(),
            EntityClass::Var => self.vars.len(),
        };
        if id < len {
            Ok(())
        } else {
            Err(IndexError::UnresolvedReference {
                file: self.path.clone(),
                table,
                from,
                target,
                id,
            })
        }
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String, IndexError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Load a previously emitted index, rebuilding the USR lookup tables
    #[cfg(test)]
    pub fn from_json_str(path: impl Into<PathBuf>, json: &str) -> Result<Self, IndexError> {
        let mut file: IndexFile = serde_json::from_str(json)?;
        file.path = path.into();
        file.usr_to_type = file.types.iter().map(|t| (t.usr, t.id)).collect();
        file.usr_to_func = file.funcs.iter().map(|f| (f.usr, f.id)).collect();
        file.usr_to_var = file.vars.iter().map(|v| (v.usr, v.id)).collect();
        let type_uses = file.types.iter().flat_map(|t| t.uses.iter().map(|r| (EntityClass::Type, t.id.0, *r)));
        let var_uses = file.vars.iter().flat_map(|v| v.uses.iter().map(|r| (EntityClass::Var, v.id.0, *r)));
        file.seen_uses = type_uses.chain(var_uses).collect();
        file.seen_calls = file
            .funcs
            .iter()
            .flat_map(|f| f.callees.iter().map(|c| (f.id, c.id, c.loc)))
            .collect();
        file.validate()?;
        Ok(file)
    }
}
