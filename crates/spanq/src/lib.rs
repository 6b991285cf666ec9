//! spanq: a proximity query language toolkit.
//!
//! The `spanq` binary shows how queries are tokenized and parsed under the configuration found
//! in `.spanq.toml` files, which makes it the quickest way to debug a query that matches more or
//! less than expected.

#![warn(missing_docs)]

pub mod cli;
