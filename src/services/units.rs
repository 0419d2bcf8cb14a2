//! Physical unit conversions (`42cm-in.unit`). A bare `dig unit`
//! returns the list of supported units.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::ServiceError;
use crate::service::Service;

static RE_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9.]+)([a-z]{1,6})-([a-z]{1,6})").unwrap());

#[derive(Clone, Copy)]
struct Unit {
    symbol: &'static str,
    name: &'static str,
    // How many of this unit make up one base unit of its group.
    per_base: f64,
}

struct Group {
    name: &'static str,
    units: &'static [Unit],
}

const GROUPS: &[Group] = &[
    Group {
        name: "data",
        units: &[
            Unit { symbol: "b", name: "byte", per_base: 1.0 },
            Unit { symbol: "kb", name: "kilobyte", per_base: 1.0 / 1024.0 },
            Unit { symbol: "mb", name: "megabyte", per_base: 1.0 / (1024.0 * 1024.0) },
            Unit { symbol: "gb", name: "gigabyte", per_base: 1.0 / (1024.0 * 1024.0 * 1024.0) },
            Unit { symbol: "tb", name: "terabyte", per_base: 1.0 / (1024.0 * 1024.0 * 1024.0 * 1024.0) },
        ],
    },
    Group {
        name: "length",
        units: &[
            Unit { symbol: "mm", name: "millimeter", per_base: 1000.0 },
            Unit { symbol: "cm", name: "centimeter", per_base: 100.0 },
            Unit { symbol: "m", name: "meter", per_base: 1.0 },
            Unit { symbol: "km", name: "kilometer", per_base: 0.001 },
            Unit { symbol: "in", name: "inch", per_base: 39.3701 },
            Unit { symbol: "ft", name: "foot", per_base: 3.28084 },
            Unit { symbol: "yd", name: "yard", per_base: 1.09361 },
            Unit { symbol: "mi", name: "mile", per_base: 0.000621371 },
        ],
    },
    Group {
        name: "mass",
        units: &[
            Unit { symbol: "mg", name: "milligram", per_base: 1000.0 },
            Unit { symbol: "g", name: "gram", per_base: 1.0 },
            Unit { symbol: "kg", name: "kilogram", per_base: 0.001 },
            Unit { symbol: "oz", name: "ounce", per_base: 0.035274 },
            Unit { symbol: "lb", name: "pound", per_base: 0.00220462 },
            Unit { symbol: "ton", name: "metric ton", per_base: 0.000001 },
        ],
    },
    Group {
        name: "time",
        units: &[
            Unit { symbol: "ms", name: "millisecond", per_base: 1000.0 },
            Unit { symbol: "s", name: "second", per_base: 1.0 },
            Unit { symbol: "min", name: "minute", per_base: 1.0 / 60.0 },
            Unit { symbol: "h", name: "hour", per_base: 1.0 / 3600.0 },
            Unit { symbol: "d", name: "day", per_base: 1.0 / 86400.0 },
            Unit { symbol: "wk", name: "week", per_base: 1.0 / 604800.0 },
        ],
    },
];

/// The `unit` service.
pub struct Units {
    // symbol -> (group index, unit).
    symbols: HashMap<&'static str, (usize, Unit)>,

    // Precomputed unit listing answers.
    help: Vec<String>,
}

impl Units {
    /// Create the service from the built-in unit table.
    pub fn new() -> Self {
        let mut symbols = HashMap::new();
        let mut help = Vec::new();

        for (i, group) in GROUPS.iter().enumerate() {
            for unit in group.units {
                symbols.insert(unit.symbol, (i, *unit));
                help.push(format!(
                    "unit. 1 TXT \"{}\" \"{} ({})\"",
                    group.name, unit.symbol, unit.name
                ));
            }
        }

        Self { symbols, help }
    }

    fn lookup(&self, symbol: &str) -> Result<(usize, Unit), ServiceError> {
        self.symbols.get(symbol).copied().ok_or_else(|| {
            ServiceError::new(format!(
                "unknown unit: {}. 'dig unit' to see list of units.",
                symbol
            ))
        })
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for Units {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        if q == "unit." {
            return Ok(self.help.clone());
        }

        let caps = RE_QUERY
            .captures(q)
            .ok_or_else(|| ServiceError::from("invalid unit query."))?;

        let val: f64 = caps
            .get(1)
            .map_or("", |m| m.as_str())
            .parse()
            .map_err(|_| ServiceError::from("invalid number."))?;

        let (from_group, from) = self.lookup(caps.get(2).map_or("", |m| m.as_str()))?;
        let (to_group, to) = self.lookup(caps.get(3).map_or("", |m| m.as_str()))?;

        if from_group != to_group {
            return Err(ServiceError::new(format!(
                "cannot convert {} ({}) to {} ({}).",
                from.symbol, from.name, to.symbol, to.name
            )));
        }

        let conv = val / from.per_base * to.per_base;

        Ok(vec![format!(
            "{} 1 TXT \"{:.2} {} ({}) = {:.2} {} ({})\"",
            q, val, from.name, from.symbol, conv, to.name, to.symbol
        )])
    }
}
