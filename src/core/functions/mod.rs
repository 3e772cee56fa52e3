//! Spreadsheet function library
//!
//! An immutable name → function table shared by every evaluation. Functions
//! are plain variadic callables: arguments arrive already evaluated.

mod dates;
mod math;

use crate::core::datetime::{Clock, Zone};
use crate::error::{CalcError, CalcResult};
use crate::types::Value;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Signature shared by all library functions.
pub type Builtin = for<'a, 'c> fn(Vec<Value<'a>>, &FnContext<'c>) -> CalcResult<Value<'a>>;

/// Ambient inputs a function may need besides its arguments.
#[derive(Debug, Clone, Copy)]
pub struct FnContext<'c> {
    pub clock: &'c dyn Clock,
    /// Zone used when a date function is given none.
    pub zone: Zone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCategory {
    Arithmetic,
    Logical,
    Statistical,
    Date,
}

impl fmt::Display for FunctionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FunctionCategory::Arithmetic => "arithmetic",
            FunctionCategory::Logical => "logical",
            FunctionCategory::Statistical => "statistical",
            FunctionCategory::Date => "date",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Copy)]
pub struct FunctionEntry {
    pub name: &'static str,
    pub category: FunctionCategory,
    pub signature: &'static str,
    pub summary: &'static str,
    call: Builtin,
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

pub struct FunctionLibrary {
    entries: BTreeMap<&'static str, FunctionEntry>,
}

static STANDARD: Lazy<FunctionLibrary> = Lazy::new(|| {
    let mut library = FunctionLibrary {
        entries: BTreeMap::new(),
    };
    math::register(&mut library);
    dates::register(&mut library);
    library
});

impl FunctionLibrary {
    /// The built-in library: arithmetic, logical, statistical and date
    /// functions.
    pub fn standard() -> &'static FunctionLibrary {
        &STANDARD
    }

    fn register(
        &mut self,
        name: &'static str,
        category: FunctionCategory,
        signature: &'static str,
        summary: &'static str,
        call: Builtin,
    ) {
        self.entries.insert(
            name,
            FunctionEntry {
                name,
                category,
                signature,
                summary,
                call,
            },
        );
    }

    /// Exact-name lookup; the static name is returned for value-position use.
    pub fn get(&self, name: &str) -> Option<(&'static str, Builtin)> {
        self.entries.get(name).map(|entry| (entry.name, entry.call))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for FunctionLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Require exact number of arguments
fn require_args(func: &str, args: &[Value<'_>], count: usize) -> CalcResult<()> {
    if args.len() != count {
        Err(CalcError::Eval(format!(
            "{} requires {} argument(s), got {}",
            func,
            count,
            args.len()
        )))
    } else {
        Ok(())
    }
}

/// Require arguments in range
fn require_args_range(func: &str, args: &[Value<'_>], min: usize, max: usize) -> CalcResult<()> {
    if args.len() < min || args.len() > max {
        Err(CalcError::Eval(format!(
            "{} requires {}-{} arguments, got {}",
            func,
            min,
            max,
            args.len()
        )))
    } else {
        Ok(())
    }
}
