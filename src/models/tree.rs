use serde::Serialize;

use crate::models::department::Department;
use crate::models::employee::Employee;

/// A department with its direct employees and expanded children.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TreeNode {
    #[serde(flatten)]
    pub department: Department,
    pub employees: Vec<Employee>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of levels in this tree, counting the root as one.
    pub fn levels(&self) -> usize {
        1 + self.children.iter().map(TreeNode::levels).max().unwrap_or(0)
    }
}
