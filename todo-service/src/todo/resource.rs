use super::mapper::TodoMapper;
use super::model::{TodoRequest, TodoResponse};
use crate::domain::Todo;
use crate::handlers::{BaseHandler, Resource};
use crate::ids::TodoId;
use crate::repository::Repository;
use crate::service::TodoService;

/// Collection path of the todo resource
pub const TODO_COLLECTION_PATH: &str = "/api/v1/sql/todo";

/// Generic handler bound to todos
pub type TodoHandler<R> = BaseHandler<TodoResource<R>>;

/// Binds [`Todo`] to the generic handler
#[derive(Debug)]
pub struct TodoResource<R> {
    service: TodoService<R>,
    mapper: TodoMapper,
}

impl<R> TodoResource<R>
where
    R: Repository<TodoId, Todo> + 'static,
{
    pub fn new(repository: R) -> Self {
        Self {
            service: TodoService::new(repository),
            mapper: TodoMapper,
        }
    }

    /// Generic handler over this resource
    pub fn into_handler(self) -> TodoHandler<R> {
        BaseHandler::new(self)
    }
}

impl<R> Resource for TodoResource<R>
where
    R: Repository<TodoId, Todo> + 'static,
{
    type Entity = Todo;
    type Id = TodoId;
    type Request = TodoRequest;
    type Response = TodoResponse;
    type Service = TodoService<R>;
    type Mapper = TodoMapper;

    const NAME: &'static str = "Todo";
    const COLLECTION_PATH: &'static str = TODO_COLLECTION_PATH;

    fn service(&self) -> &TodoService<R> {
        &self.service
    }

    fn mapper(&self) -> &TodoMapper {
        &self.mapper
    }

    fn entity_id(todo: &Todo) -> Option<TodoId> {
        todo.id().cloned()
    }
}
