/*!
 Read-only clients for the `SQLite` tables that store `typedstream` blobs.
*/

pub mod messages;
pub mod table;
