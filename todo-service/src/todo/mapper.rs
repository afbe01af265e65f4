use super::model::{TodoRequest, TodoResponse};
use crate::domain::Todo;
use crate::mapper::Mapper;

/// Maps todos to and from their wire shapes
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoMapper;

impl Mapper<Todo, TodoRequest, TodoResponse> for TodoMapper {
    fn to_entity(&self, request: TodoRequest) -> Todo {
        Todo::new(request.title, request.description)
    }

    fn to_response(&self, todo: &Todo) -> TodoResponse {
        TodoResponse {
            id: todo.id().cloned(),
            title: todo.title().to_string(),
            description: todo.description().map(str::to_string),
            completed: todo.completed(),
            created_at: todo.created_at(),
            updated_at: todo.updated_at(),
        }
    }
}
