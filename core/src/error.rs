use crate::DocId;
use thiserror::Error;

/// Structural problems with a single query line. The search driver turns
/// these into an empty result instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query has no terms")]
    Empty,
    #[error("unbalanced '(' in query")]
    UnbalancedOpen,
    #[error("unbalanced ')' in query")]
    UnbalancedClose,
    #[error("operator at token {position} is missing an operand")]
    MissingOperand { position: usize },
    #[error("operand at token {position} follows another operand without an operator")]
    MissingOperator { position: usize },
    #[error("unterminated phrase quote")]
    UnterminatedPhrase,
    #[error("operand stack underflow while evaluating")]
    StackUnderflow,
    #[error("operator or parenthesis where a value was expected")]
    UnexpectedToken,
    #[error("{count} operands left after evaluation")]
    DanglingOperands { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("documents must arrive in ascending id order: {next} after {previous}")]
    OutOfOrder { previous: DocId, next: DocId },
    #[error("memory limit must be at least one entry")]
    ZeroMemoryLimit,
}
