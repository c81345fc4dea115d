//! FILENAME: core/matrix-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// A `parent_id` chain loops back on itself. `cycle` lists the item ids
    /// in the loop, starting and ending with the same id.
    #[error("Cyclic hierarchy detected: {}", .cycle.join(" -> "))]
    CyclicHierarchy { cycle: Vec<String> },

    #[error("Duplicate item id: {0}")]
    DuplicateItemId(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),
}

pub type MatrixResult<T> = Result<T, MatrixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message() {
        let err = MatrixError::CyclicHierarchy {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "Cyclic hierarchy detected: a -> b -> a");
    }
}
