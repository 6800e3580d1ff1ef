// Resume lifecycle: upload → storage → AI extraction → status, plus owner-scoped reads and deletes.

pub mod access;
pub mod handlers;
pub mod ingest;
pub mod store;
