// Bibliography input: BibTeX parsing, entry model, classification and sorting,
// plus the HTTP handlers that accept uploads.

pub mod classify;
pub mod entry;
pub mod handlers;
pub mod parser;
