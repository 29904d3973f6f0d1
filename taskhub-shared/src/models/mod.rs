/// Database models for TaskHub
///
/// # Models
///
/// - `user`: User accounts
/// - `task`: Tasks, owned or anonymous
/// - `task_query`: Visibility-scoped list queries over tasks
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::task::Task;
/// use taskhub_shared::models::task_query::{TaskQuery, Visibility};
/// use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let tasks = Task::list(&pool, &TaskQuery::new(Visibility::Anonymous)).await?;
/// println!("{} anonymous tasks", tasks.len());
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod task_query;
pub mod user;
