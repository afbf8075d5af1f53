// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every upstream data source.

/// The base trait for all tokentally sources.
///
/// Every source (pricing table, generation stats, execution logs) exposes a
/// stable name used in log fields and error messages.
pub trait SourceAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this source.
    fn name(&self) -> &str;
}
