// Library root
// -----------
// Everything the `codewars` binary does lives here so it can be tested
// without a terminal or network.
//
// Module responsibilities:
// - `config`: credentials and endpoint roots from the environment.
// - `api`: the `Remote` HTTP capability and its reqwest implementation.
// - `session`: the `kata.json` record and the challenge directory files.
// - `extract`: pattern searches over scraped HTML.
// - `practice`, `train`, `runner`, `submit`: one module per command.
// - `outcome` / `render`: the grader's result tree and its display.
// - `ui`: spinners, printing and the description pager.
pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod outcome;
pub mod practice;
pub mod render;
pub mod runner;
pub mod session;
pub mod submit;
pub mod train;
pub mod ui;

pub use error::{CliError, Result};
