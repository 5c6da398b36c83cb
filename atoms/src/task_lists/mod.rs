pub mod http;
pub mod model;
pub mod service;

pub use model::{
    CreateTaskListPayload, ReorderTaskListsPayload, TaskList, TaskListOrder, UpdateTaskListPayload,
};
pub use service::*;
