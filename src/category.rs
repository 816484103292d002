//! Categories group transactions, budgets and bills, e.g. "Groceries" or "Rent".

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, UserId, app_state::lock_connection, database_id::CategoryId};

/// A user defined category for transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserId,
    /// The display name, unique per user.
    pub name: String,
}

/// Create the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Create a category for `user_id`.
///
/// # Errors
/// Returns an [Error::EmptyName] if `name` is blank, an
/// [Error::DuplicateName] if the user already has a category called `name`,
/// or an [Error::SqlError] for any other SQL error.
pub fn create_category(
    user_id: UserId,
    name: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    connection
        .prepare(
            "INSERT INTO category (user_id, name) VALUES (?1, ?2)
             RETURNING id, user_id, name",
        )?
        .query_row((user_id.as_i64(), name), map_category_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateName(name.to_owned()),
            error => error.into(),
        })
}

/// Retrieve a category owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    user_id: UserId,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, user_id, name FROM category WHERE id = ?1 AND user_id = ?2")?
        .query_row((category_id, user_id.as_i64()), map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's categories ordered by name.
pub fn get_categories_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, user_id, name FROM category WHERE user_id = ?1 ORDER BY name ASC")?
        .query_map((user_id.as_i64(),), map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
    })
}

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewCategoryData {
    pub name: String,
}

/// A route handler for listing the current user's categories.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_categories_for_user(user_id, &connection).map(Json)
}

/// A route handler for creating a category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserId>,
    Json(data): Json<NewCategoryData>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(user_id, &data.name, &connection)?;
    tracing::info!("User {user_id} created category {}", category.id);

    Ok((StatusCode::CREATED, Json(category)))
}

#[cfg(test)]
mod category_tests {
    use rusqlite::Connection;

    use crate::{
        Error, UserId,
        category::{create_category, get_categories_for_user, get_category},
        db::initialize,
        user::create_user,
    };

    fn get_test_connection() -> (Connection, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("Test", &connection).unwrap();

        (connection, user.id)
    }

    #[test]
    fn create_category_succeeds() {
        let (connection, user_id) = get_test_connection();

        let category = create_category(user_id, " Groceries ", &connection).unwrap();

        assert!(category.id > 0);
        assert_eq!(category.name, "Groceries");
        assert_eq!(category.user_id, user_id);
    }

    #[test]
    fn create_category_rejects_duplicate_name() {
        let (connection, user_id) = get_test_connection();
        create_category(user_id, "Rent", &connection).unwrap();

        let result = create_category(user_id, "Rent", &connection);

        assert_eq!(result, Err(Error::DuplicateName("Rent".to_owned())));
    }

    #[test]
    fn create_category_rejects_empty_name() {
        let (connection, user_id) = get_test_connection();

        assert_eq!(
            create_category(user_id, "", &connection),
            Err(Error::EmptyName)
        );
    }

    #[test]
    fn get_category_is_scoped_to_user() {
        let (connection, user_id) = get_test_connection();
        let other_user = create_user("Other", &connection).unwrap();
        let category = create_category(user_id, "Rent", &connection).unwrap();

        assert_eq!(
            get_category(user_id, category.id, &connection),
            Ok(category.clone())
        );
        assert_eq!(
            get_category(other_user.id, category.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_categories_for_user_sorts_by_name() {
        let (connection, user_id) = get_test_connection();
        create_category(user_id, "Utilities", &connection).unwrap();
        create_category(user_id, "Food", &connection).unwrap();

        let names: Vec<String> = get_categories_for_user(user_id, &connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect();

        assert_eq!(names, vec!["Food", "Utilities"]);
    }
}
