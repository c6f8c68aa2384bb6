use super::todo::{Todo, TodoDraft, TodoId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid \"id\" field")]
    Id,
    #[error("Invalid \"todo\" field")]
    Todo,
    #[error("Invalid \"complete\" field")]
    Complete,
}

/// How the `id` of a candidate is checked.
#[derive(Debug, Clone, Copy)]
pub enum IdCheck<'a> {
    /// Not checked at all; the record has no id yet.
    Skip,
    /// Must be non-empty and match an entry of the given snapshot.
    Against(&'a [TodoDraft]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTodo {
    pub id: Option<TodoId>,
    pub todo: String,
    pub complete: bool,
}

impl ValidatedTodo {
    pub fn with_id(self, id: TodoId) -> Todo {
        Todo { id, todo: self.todo, complete: self.complete }
    }
}

/// Checks id, then todo, then complete, stopping at the first failure.
pub fn validate(candidate: &TodoDraft, id_check: IdCheck<'_>) -> Result<ValidatedTodo, ValidationError> {
    let id = match id_check {
        IdCheck::Skip => candidate.id.clone(),
        IdCheck::Against(snapshot) => Some(check_id(candidate, snapshot)?),
    };
    let (todo, complete) = check_fields(candidate)?;
    Ok(ValidatedTodo { id, todo, complete })
}

/// Same checks as `validate` with the id check on, yielding a storable record.
pub fn validate_existing(candidate: &TodoDraft, snapshot: &[TodoDraft]) -> Result<Todo, ValidationError> {
    let id = check_id(candidate, snapshot)?;
    let (todo, complete) = check_fields(candidate)?;
    Ok(Todo { id, todo, complete })
}

fn check_id(candidate: &TodoDraft, snapshot: &[TodoDraft]) -> Result<TodoId, ValidationError> {
    let id = candidate.id.as_ref().filter(|id| !id.is_empty()).ok_or(ValidationError::Id)?;
    if !snapshot.iter().any(|existing| existing.id.as_ref() == Some(id)) {
        return Err(ValidationError::Id);
    }
    Ok(id.clone())
}

fn check_fields(candidate: &TodoDraft) -> Result<(String, bool), ValidationError> {
    let todo = candidate.todo.as_ref().filter(|t| !t.is_empty()).ok_or(ValidationError::Todo)?;
    let complete = candidate.complete.ok_or(ValidationError::Complete)?;
    Ok((todo.clone(), complete))
}
