pub mod attrs;
pub mod ordering;
pub mod task_lists;
pub mod tasks;
pub mod users;

/// GSI keyed by `USER#{user_id}`; serves "all lists for a user" and
/// "all tasks for a user".
pub const USER_INDEX: &str = "user-index";

/// GSI keyed by `LIST#{task_list_id}`; serves "all tasks in a list".
pub const LIST_INDEX: &str = "list-index";
