//! Lifecycle hooks.
//!
//! A schema carries one [`Hooks`] implementation shared by every record of
//! that resource. All methods are provided, so an implementation overrides
//! only what it needs — the same shape as an entity trait with default
//! lifecycle methods.

use crate::record::Record;

/// Validation and save hooks for one resource class.
///
/// `before_validate` and `before_save` both funnel through
/// [`Hooks::before_save_or_validate`] by default, so logic placed there runs
/// on either path without the implementation having to remember both.
pub trait Hooks: Send + Sync {
    /// Shared hook behind both `before_validate` and `before_save`.
    fn before_save_or_validate(&self, _record: &mut Record) {}

    fn before_validate(&self, record: &mut Record) {
        self.before_save_or_validate(record);
    }

    fn before_save(&self, record: &mut Record) {
        self.before_save_or_validate(record);
    }

    /// The validation pass. Add failures to `record.errors_mut()`.
    ///
    /// The default runs `before_validate` and nothing else. An override
    /// replaces the whole chain: it must call `before_validate` itself if it
    /// still wants the shared pre-hook — the base does not enforce this.
    fn validate(&self, record: &mut Record) {
        self.before_validate(record);
    }

    fn after_save(&self, _record: &mut Record) {}
}

/// The default hook set: every method a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl Hooks for NoHooks {}
