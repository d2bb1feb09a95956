/*!
 Defines the interface for table representations and the connection plumbing
 they share.
*/

use std::path::Path;

use rusqlite::{Connection, Error, OpenFlags, Result, Row, Statement};

use crate::error::table::TableError;

/// The name of the table that stores message rows
pub const MESSAGE: &str = "message";

/// Defines behavior for a struct that represents a row in a `SQLite` table
pub trait Table {
    /// Deserialize a single row into the implementing type
    fn from_row(row: &Row) -> Result<Self>
    where
        Self: Sized;

    /// Build the prepared statement that selects this table's rows
    fn get(db: &Connection) -> Result<Statement, TableError>;

    /// Flatten the nested results produced by `query_map` into a single error domain
    fn extract(item: Result<Result<Self, Error>, Error>) -> Result<Self, TableError>
    where
        Self: Sized;
}

/// Open a read-only connection to a database.
///
/// # Example:
///
/// ```
/// use typedstream::util::dirs::default_db_path;
/// use typedstream::tables::table::get_connection;
///
/// let connection = get_connection(&default_db_path());
/// ```
pub fn get_connection(path: &Path) -> Result<Connection, TableError> {
    if !path.exists() {
        return Err(TableError::CannotConnect(format!(
            "Database not found at {}",
            path.display()
        )));
    }

    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|why| TableError::CannotConnect(why.to_string()))
}
