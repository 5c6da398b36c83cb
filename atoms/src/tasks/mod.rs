pub mod http;
pub mod model;
pub mod service;

pub use model::{
    CreateTaskPayload, MoveTaskPayload, Priority, ReorderTasksPayload, Task, TaskOrder,
    UpdateTaskPayload,
};
pub use service::*;
