//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet. Every flag is further gated by `cfg(debug_assertions)`.

/// Emit index changes and per-pane timeframe fallbacks during navigation.
pub const PRINT_NAVIGATION: bool = true;

/// Emit measurement clicks and completed measurement values.
pub const PRINT_MEASUREMENTS: bool = false;

/// Emit per-pane capture sizes and written paths during export.
pub const PRINT_EXPORT: bool = false;

/// Emit detailed dataset/cache serialization logs.
pub const PRINT_SERDE: bool = false;

/// Emit details of user config serialization/deserialization.
pub const PRINT_CONFIG_SERDE: bool = false;
