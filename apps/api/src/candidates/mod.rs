// Candidate records: in-memory store, filtering, pagination, wire coercion and HTTP handlers.
// Handlers only talk to the store through transform types; the store never sees wire shapes.

pub mod filter;
pub mod handlers;
pub mod pagination;
pub mod store;
pub mod transform;
