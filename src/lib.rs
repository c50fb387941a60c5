//! # head-require
//!
//! Generate a pinned `requirements.txt` from the packages a Python project
//! actually imports.
//!
//! ## Pipeline
//!
//! 1. Walk the project, skipping hidden, `_`-prefixed and environment directories
//! 2. Extract `import` / `from ... import` statements from `.py` and `.ipynb` files
//! 3. Reduce them to top-level module names
//! 4. Match those names against installed packages, directly and through each
//!    distribution's `top_level.txt`
//! 5. Write `name==version` lines sorted by name

pub mod config;
pub mod core;
pub mod formatters;
pub mod parsers;
