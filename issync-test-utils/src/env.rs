//! Environment variable management for testing
//!
//! This module provides a guard that clears a set of environment variables for
//! the duration of a test and restores their original values afterwards.

use std::env;
use std::sync::{Mutex, MutexGuard};

/// Serializes tests that touch the process environment
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Clears the given variables on creation and restores them on drop
pub struct EnvVarGuard {
  /// Original values, captured before clearing
  original: Vec<(String, Option<String>)>,
  _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
  /// Take the environment lock and clear every variable in `names`
  pub fn new(names: &[&str]) -> Self {
    let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let original = names
      .iter()
      .map(|name| (name.to_string(), env::var(name).ok()))
      .collect();

    for name in names {
      unsafe {
        env::remove_var(name);
      }
    }

    Self { original, _lock: lock }
  }

  /// Set a variable for the rest of the test
  pub fn set(&self, name: &str, value: &str) {
    unsafe {
      env::set_var(name, value);
    }
  }

  /// Unset a variable for the rest of the test
  pub fn remove(&self, name: &str) {
    unsafe {
      env::remove_var(name);
    }
  }
}

impl Drop for EnvVarGuard {
  fn drop(&mut self) {
    // Restore original environment variables
    for (name, value) in &self.original {
      match value {
        Some(val) => unsafe {
          env::set_var(name, val);
        },
        None => unsafe {
          env::remove_var(name);
        },
      }
    }
  }
}
