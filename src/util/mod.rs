/*!
 This module defines common utilities used across table queries.
*/

pub mod dirs;
pub mod typedstream;
