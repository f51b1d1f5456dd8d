//! Department deletion policies.
//!
//! A department is never removed implicitly: callers pick either cascade
//! (the whole subtree and every employee in it goes) or reassign (direct
//! employees move to another department, everything below is cascaded).
//! Each call runs as a single unit of work.

use std::collections::HashSet;
use uuid::Uuid;

use crate::db::{StoreError, TreeStore, TreeTx};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionMode {
    Cascade,
    Reassign { to: Uuid },
}

impl DeletionMode {
    /// Builds a mode from the raw `mode` and `reassign_to_department_id` query values.
    pub fn from_params(mode: Option<&str>, reassign_to: Option<&str>) -> Result<Self, AppError> {
        match mode {
            Some("cascade") => Ok(DeletionMode::Cascade),
            Some("reassign") => {
                let raw = reassign_to.filter(|raw| !raw.is_empty()).ok_or_else(|| {
                    AppError::InvalidRequest(
                        "reassign_to_department_id required for reassign mode".to_string(),
                    )
                })?;
                let to = Uuid::parse_str(raw).map_err(|_| {
                    AppError::InvalidRequest(
                        "reassign_to_department_id must be a department id".to_string(),
                    )
                })?;
                Ok(DeletionMode::Reassign { to })
            }
            _ => Err(AppError::InvalidRequest(
                "specify mode 'cascade' or 'reassign'".to_string(),
            )),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub departments_deleted: usize,
    pub employees_deleted: u64,
    pub employees_reassigned: u64,
}

pub async fn delete_department(
    store: &dyn TreeStore,
    department_id: Uuid,
    mode: DeletionMode,
) -> Result<DeletionReport, AppError> {
    let mut tx = store.begin().await?;

    let locked = lock_in_order(tx.as_mut(), department_id, mode).await?;
    if !locked.contains(&department_id) {
        return Err(AppError::NotFound("Department not found".to_string()));
    }

    let report = match mode {
        DeletionMode::Cascade => cascade(tx.as_mut(), department_id).await?,
        DeletionMode::Reassign { to } => reassign(tx.as_mut(), department_id, to, &locked).await?,
    };

    tx.commit().await?;

    log::info!(
        "Deleted department {} ({:?}): {} departments removed, {} employees removed, {} employees reassigned",
        department_id,
        mode,
        report.departments_deleted,
        report.employees_deleted,
        report.employees_reassigned
    );
    Ok(report)
}

/// Row-locks every department the deletion touches, lowest id first.
/// Returns the ids that exist.
async fn lock_in_order(
    tx: &mut dyn TreeTx,
    department_id: Uuid,
    mode: DeletionMode,
) -> Result<HashSet<Uuid>, StoreError> {
    let mut ids = vec![department_id];
    if let DeletionMode::Reassign { to } = mode {
        ids.push(to);
    }
    ids.sort();
    ids.dedup();

    let mut locked = HashSet::new();
    for id in ids {
        if tx.lock_department(id).await?.is_some() {
            locked.insert(id);
        }
    }
    Ok(locked)
}

/// The department itself followed by every department below it, depth first.
pub async fn collect_subtree(tx: &mut dyn TreeTx, root: Uuid) -> Result<Vec<Uuid>, StoreError> {
    let mut ordered = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        ordered.push(id);
        let children = tx.children_of(id).await?;
        stack.extend(children.iter().rev().map(|child| child.id));
    }
    Ok(ordered)
}

async fn cascade(tx: &mut dyn TreeTx, root: Uuid) -> Result<DeletionReport, StoreError> {
    let subtree = collect_subtree(tx, root).await?;
    let employees_deleted = tx.delete_employees_of(&subtree).await?;

    // Pre-order reversed puts every department after all of its descendants.
    for id in subtree.iter().rev() {
        tx.delete_department(*id).await?;
    }

    Ok(DeletionReport {
        departments_deleted: subtree.len(),
        employees_deleted,
        employees_reassigned: 0,
    })
}

async fn reassign(
    tx: &mut dyn TreeTx,
    department_id: Uuid,
    to: Uuid,
    locked: &HashSet<Uuid>,
) -> Result<DeletionReport, AppError> {
    if to == department_id {
        return Err(AppError::InvalidRequest(
            "cannot reassign employees to the department being deleted".to_string(),
        ));
    }

    if !locked.contains(&to) {
        return Err(AppError::NotFound("Department to reassign employees to not found".to_string()));
    }

    if collect_subtree(tx, department_id).await?.contains(&to) {
        return Err(AppError::InvalidRequest(
            "cannot reassign employees to a department below the one being deleted".to_string(),
        ));
    }

    let mut report = DeletionReport {
        employees_reassigned: tx.reassign_employees(department_id, to).await?,
        ..DeletionReport::default()
    };

    for child in tx.children_of(department_id).await? {
        let removed = cascade(tx, child.id).await?;
        report.departments_deleted += removed.departments_deleted;
        report.employees_deleted += removed.employees_deleted;
    }

    tx.delete_department(department_id).await?;
    report.departments_deleted += 1;

    Ok(report)
}
