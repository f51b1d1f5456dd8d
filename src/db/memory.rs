use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{StoreError, TreeStore, TreeTx};
use crate::models::department::{Department, DepartmentFilter};
use crate::models::employee::Employee;

#[derive(Debug, Default, Clone)]
struct Tables {
    departments: Vec<Department>,
    employees: Vec<Employee>,
}

/// Process-local store. A unit of work holds the table lock until it is
/// dropped, so units of work never interleave.
#[derive(Clone, Default)]
pub struct MemoryTreeStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a unit of work with its concrete type, for wrapping in tests.
    pub async fn begin_memory(&self) -> MemoryTreeTx {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        MemoryTreeTx { guard, working }
    }
}

#[async_trait]
impl TreeStore for MemoryTreeStore {
    async fn begin(&self) -> Result<Box<dyn TreeTx>, StoreError> {
        Ok(Box::new(self.begin_memory().await))
    }
}

pub struct MemoryTreeTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl MemoryTreeTx {
    fn find_department(&self, id: Uuid) -> Option<&Department> {
        self.working.departments.iter().find(|d| d.id == id)
    }

    fn subtree_of(&self, id: Uuid) -> HashSet<Uuid> {
        let mut found = HashSet::from([id]);
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            for child in self.working.departments.iter().filter(|d| d.parent == Some(current)) {
                if found.insert(child.id) {
                    pending.push(child.id);
                }
            }
        }
        found
    }

    fn check_unique(&self, department: &Department) -> Result<(), StoreError> {
        let clash = self.working.departments.iter().any(|d| {
            d.id != department.id && d.name == department.name && d.parent == department.parent
        });
        if clash {
            return Err(StoreError::UniqueViolation(format!(
                "department name {:?} already used under the same parent",
                department.name
            )));
        }
        Ok(())
    }

    fn check_department_ref(&self, id: Uuid) -> Result<(), StoreError> {
        if self.find_department(id).is_none() {
            return Err(StoreError::ForeignKeyViolation(format!("department {} does not exist", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl TreeTx for MemoryTreeTx {
    async fn get_department(&mut self, id: Uuid) -> Result<Option<Department>, StoreError> {
        Ok(self.find_department(id).cloned())
    }

    async fn lock_department(&mut self, id: Uuid) -> Result<Option<Department>, StoreError> {
        Ok(self.find_department(id).cloned())
    }

    async fn list_departments(&mut self, filter: &DepartmentFilter) -> Result<Vec<Department>, StoreError> {
        let needle = filter.name.as_ref().map(|n| n.to_lowercase());
        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l.max(0) as usize);

        Ok(self
            .working
            .departments
            .iter()
            .filter(|d| needle.as_ref().map_or(true, |n| d.name.to_lowercase().contains(n)))
            .filter(|d| filter.parent.map_or(true, |p| d.parent == Some(p)))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn children_of(&mut self, id: Uuid) -> Result<Vec<Department>, StoreError> {
        Ok(self
            .working
            .departments
            .iter()
            .filter(|d| d.parent == Some(id))
            .cloned()
            .collect())
    }

    async fn department_exists_with(
        &mut self,
        name: &str,
        parent: Option<Uuid>,
        excluding: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .working
            .departments
            .iter()
            .any(|d| d.name == name && d.parent == parent && Some(d.id) != excluding))
    }

    async fn insert_department(&mut self, department: &Department) -> Result<(), StoreError> {
        if let Some(parent) = department.parent {
            self.check_department_ref(parent)?;
        }
        self.check_unique(department)?;
        self.working.departments.push(department.clone());
        Ok(())
    }

    async fn update_department(&mut self, department: &Department) -> Result<(), StoreError> {
        if let Some(parent) = department.parent {
            self.check_department_ref(parent)?;
        }
        self.check_unique(department)?;
        if let Some(existing) = self.working.departments.iter_mut().find(|d| d.id == department.id) {
            existing.name = department.name.clone();
            existing.parent = department.parent;
        }
        Ok(())
    }

    async fn delete_department(&mut self, id: Uuid) -> Result<(), StoreError> {
        let doomed = self.subtree_of(id);
        if self.working.employees.iter().any(|e| doomed.contains(&e.department)) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "department {} still has employees attached",
                id
            )));
        }
        self.working.departments.retain(|d| !doomed.contains(&d.id));
        Ok(())
    }

    async fn get_employee(&mut self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        Ok(self.working.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn employees_of(&mut self, department_id: Uuid) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .working
            .employees
            .iter()
            .rev()
            .filter(|e| e.department == department_id)
            .cloned()
            .collect())
    }

    async fn insert_employee(&mut self, employee: &Employee) -> Result<(), StoreError> {
        self.check_department_ref(employee.department)?;
        self.working.employees.push(employee.clone());
        Ok(())
    }

    async fn update_employee(&mut self, employee: &Employee) -> Result<(), StoreError> {
        self.check_department_ref(employee.department)?;
        if let Some(existing) = self.working.employees.iter_mut().find(|e| e.id == employee.id) {
            existing.department = employee.department;
            existing.full_name = employee.full_name.clone();
            existing.position = employee.position.clone();
            existing.hired_at = employee.hired_at;
        }
        Ok(())
    }

    async fn delete_employee(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let before = self.working.employees.len();
        self.working.employees.retain(|e| e.id != id);
        Ok(self.working.employees.len() < before)
    }

    async fn reassign_employees(&mut self, from: Uuid, to: Uuid) -> Result<u64, StoreError> {
        self.check_department_ref(to)?;
        let mut moved = 0;
        for employee in self.working.employees.iter_mut().filter(|e| e.department == from) {
            employee.department = to;
            moved += 1;
        }
        Ok(moved)
    }

    async fn delete_employees_of(&mut self, department_ids: &[Uuid]) -> Result<u64, StoreError> {
        let before = self.working.employees.len();
        self.working.employees.retain(|e| !department_ids.contains(&e.department));
        Ok((before - self.working.employees.len()) as u64)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        *self.guard = self.working.clone();
        Ok(())
    }
}
