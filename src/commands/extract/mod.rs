mod db_store;
mod export_csv;
mod export_json;
mod run;
mod selection;
#[cfg(test)]
mod tests;

pub use db_store::DB_FILENAME;
pub use run::run;

use db_store::*;
use export_csv::*;
use export_json::*;
use selection::*;
