//! Runtime context for command execution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use dough_core::config::{load_config, DoughConfig};
use dough_core::file_io::{load_book_or_default, save_book, FileLock};
use dough_core::library::RecipeBook;

use crate::cli::GlobalArgs;

/// State shared by every command handler, built once in `main`.
#[derive(Debug)]
pub struct RuntimeContext {
    pub config: DoughConfig,
    /// Resolved formula book path (`--book` wins over the config)
    pub book_path: PathBuf,
    pub verbose: bool,
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let config = load_config(&global.config)
            .with_context(|| format!("failed to load config {}", global.config.display()))?;
        let book_path = global.book.clone().unwrap_or_else(|| config.book_path.clone());

        Ok(Self {
            config,
            book_path,
            verbose: global.verbose,
        })
    }

    /// Env-filter directive for logging, if logging is enabled at all.
    pub fn log_filter(&self) -> Option<String> {
        if self.verbose {
            Some("dough_core=debug,dough=debug".to_string())
        } else {
            self.config.log_filter.clone()
        }
    }

    /// Read the book without locking it.
    pub fn read_book(&self) -> Result<RecipeBook> {
        load_book_or_default(&self.book_path)
            .with_context(|| format!("failed to read formula book {}", self.book_path.display()))
    }

    /// Lock the book, apply `edit`, and save it back.
    pub fn edit_book<T>(&self, edit: impl FnOnce(&mut RecipeBook) -> Result<T>) -> Result<T> {
        let _lock = FileLock::acquire(&self.book_path, self.config.user.clone())
            .with_context(|| format!("failed to lock formula book {}", self.book_path.display()))?;

        let mut book = self.read_book()?;
        let out = edit(&mut book)?;
        save_book(&book, &self.book_path)
            .with_context(|| format!("failed to save formula book {}", self.book_path.display()))?;
        Ok(out)
    }
}
