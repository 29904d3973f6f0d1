/// Visibility-scoped task list queries
///
/// [`TaskQuery`] turns list parameters into a parameterized `SELECT` over
/// `tasks`. Clauses are appended in a fixed order:
///
/// 1. visibility scope (always present, cannot be overridden by parameters)
/// 2. status equality, when a status other than `all` was requested
/// 3. case-insensitive substring search over `title` and `description`
/// 4. `ORDER BY` from a closed set of columns and directions
///
/// Every user-supplied value is a bind parameter. The only text spliced into
/// the statement is the column and keyword of [`SortField`] / [`SortOrder`],
/// both of which come from `&'static str` tables rather than the request.
///
/// The search clause is `ILIKE '%term%'` on both text columns and cannot use
/// a B-tree index, so it scans every row that survives the other filters.
///
/// # Example
///
/// ```
/// use taskhub_shared::models::task_query::{TaskQuery, TaskSort, Visibility};
///
/// let query = TaskQuery::new(Visibility::Owner(7))
///     .search("milk")
///     .sort(TaskSort::from_params(Some("title"), Some("asc")));
///
/// let sql = query.to_query_builder().into_sql();
/// assert!(sql.contains("(user_id = $1 OR user_id IS NULL)"));
/// assert!(sql.ends_with("ORDER BY title ASC, id ASC"));
/// ```

use sqlx::{Postgres, QueryBuilder};

use super::task::{InvalidStatus, TaskStatus};

const SELECT_TASKS: &str =
    "SELECT id, user_id, title, description, status, created_at, updated_at FROM tasks WHERE ";

/// Which tasks a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Unauthenticated caller: anonymous tasks only
    Anonymous,

    /// Authenticated caller: own tasks plus anonymous tasks
    Owner(i64),
}

impl Visibility {
    pub fn from_user(user_id: Option<i64>) -> Self {
        user_id.map_or(Visibility::Anonymous, Visibility::Owner)
    }
}

/// Sortable task columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Status,
}

impl SortField {
    /// Parses a `sortBy` value; names must match exactly
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            "title" => Some(SortField::Title),
            "status" => Some(SortField::Status),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Status => "status",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses an `order` value, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Column and direction for `ORDER BY`
///
/// The default is `created_at DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl TaskSort {
    /// Builds a sort from raw `sortBy` / `order` parameters
    ///
    /// Missing parameters take their defaults (`created_at`, `DESC`). If
    /// either supplied value is not recognised the whole sort falls back to
    /// `created_at DESC`; this never fails.
    pub fn from_params(sort_by: Option<&str>, order: Option<&str>) -> Self {
        let field = sort_by.map_or(Some(SortField::default()), SortField::parse);
        let order = order.map_or(Some(SortOrder::default()), SortOrder::parse);

        match (field, order) {
            (Some(field), Some(order)) => Self { field, order },
            _ => Self::default(),
        }
    }
}

/// Parses a `status` list filter
///
/// Absent, empty and `all` mean "no filter".
pub fn parse_status_filter(value: Option<&str>) -> Result<Option<TaskStatus>, InvalidStatus> {
    match value {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Escapes LIKE metacharacters so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A task list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub visibility: Visibility,
    pub status: Option<TaskStatus>,
    pub search: Option<String>,
    pub sort: TaskSort,
}

impl TaskQuery {
    /// Unfiltered query for the given caller, newest first
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            status: None,
            search: None,
            sort: TaskSort::default(),
        }
    }

    pub fn status(mut self, status: Option<TaskStatus>) -> Self {
        self.status = status;
        self
    }

    /// Sets the search term; an empty term disables search
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.is_empty() { None } else { Some(term) };
        self
    }

    pub fn sort(mut self, sort: TaskSort) -> Self {
        self.sort = sort;
        self
    }

    /// Builds the parameterized statement
    pub fn to_query_builder(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(SELECT_TASKS);

        match self.visibility {
            Visibility::Owner(user_id) => {
                builder.push("(user_id = ");
                builder.push_bind(user_id);
                builder.push(" OR user_id IS NULL)");
            }
            Visibility::Anonymous => {
                builder.push("user_id IS NULL");
            }
        }

        if let Some(status) = self.status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }

        if let Some(term) = &self.search {
            let pattern = format!("%{}%", escape_like(term));
            builder.push(" AND (title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        let order = self.sort.order.keyword();
        builder.push(" ORDER BY ");
        builder.push(self.sort.field.column());
        builder.push(" ");
        builder.push(order);
        builder.push(", id ");
        builder.push(order);

        builder
    }
}
