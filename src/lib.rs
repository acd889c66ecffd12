//! difflens
//!
//! Terminal viewer for the history of large repositories: a commit list,
//! the streamed diff of the selected commit and its file list, with
//! incremental find.
//!
//! Pure core / impure shell: [`state`] holds every transition as plain
//! functions over [`state::AppState`]; [`view`] owns the terminal and only
//! forwards events and paints. Version-control output reaches the core as
//! bytes through [`source::CommandRunner`], so everything below the shell
//! runs without a repository in tests.

pub mod config;
pub mod encoding;
pub mod log_loader;
pub mod logging;
pub mod model;
pub mod parser;
pub mod search;
pub mod source;
pub mod state;
pub mod view;
pub mod view_state;

#[cfg(test)]
mod test_harness;
