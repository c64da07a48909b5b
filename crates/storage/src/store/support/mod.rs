#![forbid(unsafe_code)]

mod commits_tx;
mod refs_tx;
mod schema;
mod sources_clause;
mod time;

pub(super) use commits_tx::*;
pub(super) use refs_tx::*;
pub(super) use schema::{install_schema, preflight_gate};
pub(super) use time::now_ms;
