//! Indexing job
//!
//! Applies one translation unit's front-end events to per-file entity tables.
//! Every event is recorded into the index of the file its location lives in;
//! files owned by another job are skipped. Relationship USRs are resolved in the
//! same index, creating declaration-only records on first mention.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consumer::FileConsumer;
use crate::error::IndexError;
use crate::frontend::{CallEvent, DeclEvent, IndexEvent, RefEvent, TranslationUnit};
use crate::index::{ANONYMOUS_NAME, IndexFile, TypeId, ids::push_unique};
use crate::io::FileSystemTrait;
use crate::symbol::{EntityClass, Usr};

/// Counters for one job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub events: usize,
    pub recorded: usize,
    /// Events in files another job owns
    pub skipped: usize,
}

/// Result of a finished job: the indexes it owns
#[derive(Debug)]
pub struct JobOutput {
    pub translation_unit: PathBuf,
    pub indexes: Vec<IndexFile>,
    pub stats: IndexStats,
}

/// Index `tu` and hand back the owned indexes
///
/// On failure every claim the job made is released before the error propagates.
pub fn run_job<F: FileSystemTrait>(
    tu: &TranslationUnit,
    mut consumer: FileConsumer<F>,
) -> Result<JobOutput, IndexError> {
    match index_translation_unit(tu, &mut consumer) {
        Ok(stats) => Ok(JobOutput {
            translation_unit: tu.path.clone(),
            indexes: consumer.take_owned_indexes(),
            stats,
        }),
        Err(e) => {
            consumer.release_claims();
            Err(e)
        }
    }
}

pub fn index_translation_unit<F: FileSystemTrait>(
    tu: &TranslationUnit,
    consumer: &mut FileConsumer<F>,
) -> Result<IndexStats, IndexError> {
    // The unit's own file always gets a table, owned or not.
    consumer.force_local(&tu.path)?;

    let mut stats = IndexStats::default();
    for event in &tu.events {
        stats.events += 1;
        let file = event_file(event);
        let Some(db) = consumer.resolve(file).into_index() else {
            debug!("Skipping event in {} (not indexed by this job)", file.display());
            stats.skipped += 1;
            continue;
        };
        match event {
            IndexEvent::Declaration(decl) => record_declaration(db, decl),
            IndexEvent::Reference(reference) => record_reference(db, reference),
            IndexEvent::Call(call) => record_call(db, call),
        }
        stats.recorded += 1;
    }

    for inclusion in &tu.includes {
        if let Some(db) = consumer.resolve(&inclusion.includer).into_index() {
            db.add_include(&inclusion.included);
        }
    }

    for skipped in &tu.skipped_by_preprocessor {
        if let Some(db) = consumer.resolve(&skipped.file_path).into_index() {
            db.add_skipped_range(skipped.range);
        }
    }

    debug!(
        "Indexed {}: {} events, {} recorded, {} skipped",
        tu.path.display(),
        stats.events,
        stats.recorded,
        stats.skipped
    );
    Ok(stats)
}

fn event_file(event: &IndexEvent) -> &Path {
    match event {
        IndexEvent::Declaration(decl) => &decl.spelling.file_path,
        IndexEvent::Reference(reference) => &reference.location.file_path,
        IndexEvent::Call(call) => &call.location.file_path,
    }
}

pub fn record_declaration(db: &mut IndexFile, decl: &DeclEvent) {
    match decl.kind.entity_class() {
        Some(EntityClass::Type) => record_type(db, decl),
        Some(EntityClass::Func) => record_func(db, decl),
        Some(EntityClass::Var) => record_var(db, decl),
        None => debug!("Ignoring declaration of {} with unknown kind", decl.usr),
    }
}

fn record_type(db: &mut IndexFile, decl: &DeclEvent) {
    let id = db.to_type_id(decl.usr());
    let parent = decl
        .declaring_type
        .as_deref()
        .map(|usr| db.to_type_id(Usr::from(usr)));

    let anonymous = decl.short_name.is_empty() && decl.kind.is_aggregate();
    let names = if anonymous {
        Some((ANONYMOUS_NAME.to_string(), anonymous_detailed_name(db, parent)))
    } else if decl.short_name.is_empty() {
        None
    } else {
        Some((decl.short_name.clone(), decl.detailed_name.clone()))
    };

    let spelling = decl.spelling.range;
    let ty = db.type_mut(id);
    ty.kind = decl.kind;
    if let Some((short_name, detailed_name)) = names {
        ty.short_name = short_name;
        ty.detailed_name = detailed_name;
    }
    if decl.is_definition {
        ty.definition_spelling = Some(spelling);
        ty.definition_extent = decl.extent;
    }
    db.add_use(EntityClass::Type, id.0, spelling);

    // Anonymous aggregates are transparent: their members stay reachable through
    // their own record, so they are not listed as nested types of the parent.
    if let (Some(parent), false) = (parent, anonymous) {
        push_unique(&mut db.type_mut(parent).types, id);
    }

    for base_usr in &decl.base_types {
        let base = db.to_type_id(Usr::from(base_usr.as_str()));
        push_unique(&mut db.type_mut(id).parents, base);
        push_unique(&mut db.type_mut(base).derived, id);
    }
}

fn anonymous_detailed_name(db: &IndexFile, parent: Option<TypeId>) -> String {
    match parent.map(|p| db.types[p.0].detailed_name.as_str()) {
        Some(parent_name) if !parent_name.is_empty() => format!("{parent_name}::{ANONYMOUS_NAME}"),
        _ => ANONYMOUS_NAME.to_string(),
    }
}

fn record_func(db: &mut IndexFile, decl: &DeclEvent) {
    let id = db.to_func_id(decl.usr());
    let spelling = decl.spelling.range;

    let func = db.func_mut(id);
    func.kind = decl.kind;
    func.is_operator |= decl.is_operator;
    if !decl.short_name.is_empty() {
        func.short_name = decl.short_name.clone();
        func.detailed_name = decl.detailed_name.clone();
    }
    if decl.is_definition {
        func.definition_spelling = Some(spelling);
        func.definition_extent = decl.extent;
    } else {
        push_unique(&mut func.declarations, spelling);
    }
    db.add_use(EntityClass::Func, id.0, spelling);

    if let Some(type_usr) = decl.declaring_type.as_deref() {
        let owner = db.to_type_id(Usr::from(type_usr));
        db.func_mut(id).declaring_type = Some(owner);
        push_unique(&mut db.type_mut(owner).funcs, id);
    }

    if let Some(base_usr) = decl.overridden_function.as_deref() {
        let base = db.to_func_id(Usr::from(base_usr));
        push_unique(&mut db.func_mut(id).base, base);
        push_unique(&mut db.func_mut(base).derived, id);
    }
}

fn record_var(db: &mut IndexFile, decl: &DeclEvent) {
    let id = db.to_var_id(decl.usr());
    let spelling = decl.spelling.range;

    let var = db.var_mut(id);
    var.kind = decl.kind;
    if !decl.short_name.is_empty() {
        var.short_name = decl.short_name.clone();
        var.detailed_name = decl.detailed_name.clone();
    }
    if decl.is_definition {
        var.definition_spelling = Some(spelling);
        var.definition_extent = decl.extent;
    }
    db.add_use(EntityClass::Var, id.0, spelling);

    if let Some(type_usr) = decl.declaring_type.as_deref() {
        let owner = db.to_type_id(Usr::from(type_usr));
        db.var_mut(id).declaring_type = Some(owner);
        push_unique(&mut db.type_mut(owner).vars, id);
    }

    // Pointer/reference parameters are reported as plain references by the
    // front end, so they never become instances here.
    if let Some(type_usr) = decl.type_of.as_deref() {
        let var_type = db.to_type_id(Usr::from(type_usr));
        db.var_mut(id).variable_type = Some(var_type);
        push_unique(&mut db.type_mut(var_type).instances, id);
    }

    if let Some(func_usr) = decl.semantic_parent_function.as_deref() {
        let func = db.to_func_id(Usr::from(func_usr));
        push_unique(&mut db.func_mut(func).locals, id);
    }
}

pub fn record_reference(db: &mut IndexFile, reference: &RefEvent) {
    let Some(class) = reference.kind.entity_class() else {
        debug!("Ignoring reference to {} with unknown kind", reference.usr);
        return;
    };
    let usr = reference.usr();
    let id = match class {
        EntityClass::Type => db.to_type_id(usr).0,
        EntityClass::Func => db.to_func_id(usr).0,
        EntityClass::Var => db.to_var_id(usr).0,
    };
    db.add_use(class, id, reference.location.range);
}

pub fn record_call(db: &mut IndexFile, call: &CallEvent) {
    let caller = db.to_func_id(Usr::from(call.caller_usr.as_str()));
    let callee = db.to_func_id(Usr::from(call.callee_usr.as_str()));
    db.add_call(caller, callee, call.location.range);
}
