//! Unit conversion engine.
//!
//! Conversions are resolved against two sources: the container's own
//! [`ConversionTable`] overrides and the process-wide [`UnitTable`]. The global
//! table is installed at most once; until then [`global`] serves the built-in
//! definitions.
//!
//! ## Resolution order
//!
//! ```text
//! target ─► NATIVE? ─► IMPERIAL/METRIC? ─► counterpart symbol
//!                                              │
//!   same unit ◄── case-insensitive match ──────┤
//!   °C <-> °F formulas                         │
//!   local forward ─► global forward ─► local reverse ─► global reverse
//!   compound a/b ─► convert a and b independently, divide
//!   otherwise ─► value returned unconverted
//! ```
//!
//! A leading `~` marks an approximate unit. It is ignored for matching and
//! carried, exactly once, onto the result if either side had it.

mod convert;
mod local;
mod table;

pub use convert::{Conversion, convert, convert_scalar, resolve};
pub use local::ConversionTable;
pub use table::{UnitDefinition, UnitTable};

use once_cell::sync::OnceCell;
use tracing::info;

use crate::{PathError, Result};

static GLOBAL_UNITS: OnceCell<UnitTable> = OnceCell::new();

/// Installs the process-wide unit table. Fails if one is already in place,
/// including the built-in table implicitly installed by a prior [`global`] call.
pub fn install(table: UnitTable) -> Result<()> {
    let units = table.len();
    GLOBAL_UNITS.set(table).map_err(|_| PathError::UnitTableInstalled)?;
    info!(units, "Installed global unit table");
    Ok(())
}

/// The process-wide unit table, read-only once initialized.
pub fn global() -> &'static UnitTable {
    GLOBAL_UNITS.get_or_init(UnitTable::builtin)
}

pub fn is_approximate(symbol: &str) -> bool {
    symbol.trim_start().starts_with('~')
}

/// The symbol without its `~` marker(s).
pub fn strip_approximate(symbol: &str) -> &str {
    symbol.trim_start().trim_start_matches('~')
}
