/*!
 Locates the iMessage database on disk.
*/

use std::{env, path::PathBuf};

/// The conventional location of `chat.db` on macOS, resolved from `$HOME`
pub fn default_db_path() -> PathBuf {
    let mut path = PathBuf::from(env::var("HOME").unwrap_or_default());
    path.push("Library/Messages/chat.db");
    path
}
