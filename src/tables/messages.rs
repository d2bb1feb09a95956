/*!
 This module represents the `message` table, the home of `attributedBody` blobs.
*/

use rusqlite::{Connection, Error, Result, Row, Statement};

use crate::{
    error::{table::TableError, typedstream::TypedStreamError},
    tables::table::{Table, MESSAGE},
    util::typedstream::{decoder::TypedStreamDecoder, models::Archivable},
};

/// Represents a single row in the `message` table.
///
/// Only the columns involved in recovering message text are mirrored here; the
/// `attributedBody` blob holds the `typedstream` archive of the attributed
/// string and `text` holds the plain column Apple also writes for most rows.
#[derive(Debug)]
pub struct Message {
    pub rowid: i32,
    pub guid: String,
    /// The plain-text body, when the database stored one
    pub text: Option<String>,
    pub service: Option<String>,
    pub handle_id: Option<i32>,
    pub date: i64,
    pub is_from_me: bool,
    /// The `typedstream`-archived attributed string for this message
    pub attributed_body: Option<Vec<u8>>,
}

impl Table for Message {
    fn from_row(row: &Row) -> Result<Message> {
        Ok(Message {
            rowid: row.get("rowid")?,
            guid: row.get("guid")?,
            text: row.get("text")?,
            service: row.get("service")?,
            handle_id: row.get("handle_id")?,
            date: row.get("date")?,
            is_from_me: row.get("is_from_me")?,
            attributed_body: row.get("attributedBody")?,
        })
    }

    fn get(db: &Connection) -> Result<Statement, TableError> {
        db.prepare(&format!(
            "SELECT rowid, guid, text, service, handle_id, date, is_from_me, attributedBody FROM {MESSAGE} ORDER BY date"
        ))
        .map_err(TableError::Messages)
    }

    fn extract(message: Result<Result<Self, Error>, Error>) -> Result<Self, TableError> {
        match message {
            Ok(Ok(message)) => Ok(message),
            Err(why) | Ok(Err(why)) => Err(TableError::Messages(why)),
        }
    }
}

impl Message {
    /// Decode this message's `attributedBody` archive.
    ///
    /// `None` means the column was `NULL`; a present-but-malformed blob
    /// surfaces the decoder's error so callers can tell the cases apart.
    pub fn decoded_body(&self) -> Option<Result<Vec<Archivable>, TypedStreamError>> {
        self.attributed_body
            .as_deref()
            .map(|body| TypedStreamDecoder::new(body).decode())
    }

    /// The user-visible text of the attributed string, when there is any.
    ///
    /// In an attributed-string archive the first string object is the message
    /// text; later string objects are attribute keys, which
    /// [`Archivable::string_value`] filters out.
    pub fn extracted_text(&self) -> Option<String> {
        let archive = self.decoded_body()?.ok()?;
        archive
            .iter()
            .find_map(|record| record.string_value())
            .map(String::from)
    }
}
