use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

use crate::db::TreeTx;
use crate::errors::{AppError, FieldErrors};
use crate::models::department::Department;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(AppError::from)
}

/// Checks a department about to be written against the rest of the tree.
///
/// `updating` is false for new records, which cannot reference themselves yet.
/// Field errors are attributed to `parent` (self or descendant parent, unknown
/// parent) and `name` (`(name, parent)` already taken by another department).
pub async fn check_department(
    tx: &mut dyn TreeTx,
    candidate: &Department,
    updating: bool,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    if let Some(parent_id) = candidate.parent {
        if updating && parent_id == candidate.id {
            errors
                .entry("parent".to_string())
                .or_default()
                .push("Department cannot be parent of itself".to_string());
        } else if tx.get_department(parent_id).await?.is_none() {
            errors
                .entry("parent".to_string())
                .or_default()
                .push(format!("Invalid pk \"{}\" - object does not exist", parent_id));
        } else if updating && is_ancestor(tx, candidate.id, parent_id).await? {
            errors
                .entry("parent".to_string())
                .or_default()
                .push("Department cannot be moved under its own descendant".to_string());
        }
    }

    let excluding = if updating { Some(candidate.id) } else { None };
    if tx.department_exists_with(&candidate.name, candidate.parent, excluding).await? {
        errors
            .entry("name".to_string())
            .or_default()
            .push("Department with this name already exists under the same parent".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Walks the ancestor chain starting at `start` looking for `id`.
async fn is_ancestor(tx: &mut dyn TreeTx, id: Uuid, start: Uuid) -> Result<bool, AppError> {
    let mut seen = HashSet::new();
    let mut current = Some(start);

    while let Some(cursor) = current {
        if cursor == id {
            return Ok(true);
        }
        if !seen.insert(cursor) {
            break;
        }
        current = tx.get_department(cursor).await?.and_then(|d| d.parent);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryTreeStore, TreeStore};

    async fn seeded() -> (MemoryTreeStore, Department, Department) {
        let store = MemoryTreeStore::new();
        let root = Department::new("Head office", None);
        let child = Department::new("Engineering", Some(root.id));
        let mut tx = store.begin().await.unwrap();
        tx.insert_department(&root).await.unwrap();
        tx.insert_department(&child).await.unwrap();
        tx.commit().await.unwrap();
        (store, root, child)
    }

    fn fields(err: AppError) -> FieldErrors {
        match err {
            AppError::Validation(fields) => fields,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_root_name_is_a_name_error() {
        let (store, _, _) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        let err = check_department(tx.as_mut(), &Department::new("Head office", None), false)
            .await
            .unwrap_err();
        assert!(fields(err).contains_key("name"));
    }

    #[tokio::test]
    async fn same_name_under_different_parent_is_fine() {
        let (store, root, child) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        check_department(tx.as_mut(), &Department::new("Engineering", Some(child.id)), false)
            .await
            .unwrap();
        check_department(tx.as_mut(), &Department::new("Engineering", None), false)
            .await
            .unwrap();
        assert_eq!(child.parent, Some(root.id));
    }

    #[tokio::test]
    async fn unchanged_record_does_not_conflict_with_itself() {
        let (store, _, child) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        check_department(tx.as_mut(), &child, true).await.unwrap();
    }

    #[tokio::test]
    async fn self_parent_is_a_parent_error() {
        let (store, _, child) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        let mut moved = child.clone();
        moved.parent = Some(child.id);
        let err = check_department(tx.as_mut(), &moved, true).await.unwrap_err();
        assert!(fields(err).contains_key("parent"));
    }

    #[tokio::test]
    async fn moving_under_descendant_is_a_parent_error() {
        let (store, root, child) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        let mut moved = root.clone();
        moved.parent = Some(child.id);
        let err = check_department(tx.as_mut(), &moved, true).await.unwrap_err();
        assert!(fields(err).contains_key("parent"));
    }

    #[tokio::test]
    async fn unknown_parent_is_a_parent_error() {
        let (store, _, _) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        let orphan = Department::new("Orphan", Some(Uuid::new_v4()));
        let err = check_department(tx.as_mut(), &orphan, false).await.unwrap_err();
        assert!(fields(err).contains_key("parent"));
    }
}
