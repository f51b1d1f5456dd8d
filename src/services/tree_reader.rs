//! Nested, depth-bounded views of the department tree.

use futures_util::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use crate::db::{StoreError, TreeStore, TreeTx};
use crate::errors::AppError;
use crate::models::department::Department;
use crate::models::tree::TreeNode;

pub const MIN_DEPTH: i64 = 1;
pub const MAX_DEPTH: i64 = 5;

pub fn validate_depth(depth: i64) -> Result<u8, AppError> {
    if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
        return Err(AppError::field(
            "depth",
            format!("Must be from {} to {}", MIN_DEPTH, MAX_DEPTH),
        ));
    }
    Ok(depth as u8)
}

/// Reads `department_id` and `depth - 1` levels of descendants below it.
///
/// With `include_employees` unset no employee rows are fetched at all and every
/// node carries an empty list.
pub async fn read_tree(
    store: &dyn TreeStore,
    department_id: Uuid,
    depth: i64,
    include_employees: bool,
) -> Result<TreeNode, AppError> {
    let depth = validate_depth(depth)?;

    let mut tx = store.begin().await?;
    let department = tx
        .get_department(department_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    let tree = build_node(tx.as_mut(), department, depth, include_employees).await?;
    Ok(tree)
}

fn build_node<'a>(
    tx: &'a mut dyn TreeTx,
    department: Department,
    depth: u8,
    include_employees: bool,
) -> BoxFuture<'a, Result<TreeNode, StoreError>> {
    async move {
        let employees = if include_employees {
            tx.employees_of(department.id).await?
        } else {
            Vec::new()
        };

        let mut children = Vec::new();
        if depth > 1 {
            for child in tx.children_of(department.id).await? {
                children.push(build_node(&mut *tx, child, depth - 1, include_employees).await?);
            }
        }

        Ok(TreeNode {
            department,
            employees,
            children,
        })
    }
    .boxed()
}
