//! Per-unit scaling rules for case tables.
//!
//! MATPOWER stores power in MW/MVAr, angles in degrees and the dual prices in
//! money per MW (or per degree). A per-unit case divides power by `baseMVA`,
//! multiplies prices by it, and moves angles to radians. Each affected column
//! is tagged with a [`Quantity`] that knows both directions.
//!
//! ```
//! use caseframes_core::units::Quantity;
//!
//! let base = 100.0;
//! assert_eq!(Quantity::Power.to_per_unit(250.0, base), 2.5);
//! assert_eq!(Quantity::Price.to_per_unit(0.5, base), 50.0);
//! let rad = Quantity::Angle.to_per_unit(180.0, base);
//! assert!((rad - std::f64::consts::PI).abs() < 1e-12);
//! ```

use crate::columns::{CostModel, COST_FIXED};
use crate::table::Table;
use crate::value::Value;

/// How a column's values scale into per-unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// MW, MVAr, MVA: divided by baseMVA.
    Power,
    /// u/MW, u/MVAr, u/MVA multipliers: multiplied by baseMVA.
    Price,
    /// Degrees to radians.
    Angle,
    /// u/degree multipliers to u/radian.
    AnglePrice,
}

impl Quantity {
    pub fn to_per_unit(self, x: f64, base_mva: f64) -> f64 {
        match self {
            Quantity::Power => x / base_mva,
            Quantity::Price => x * base_mva,
            Quantity::Angle => x.to_radians(),
            Quantity::AnglePrice => x.to_degrees(),
        }
    }

    pub fn from_per_unit(self, x: f64, base_mva: f64) -> f64 {
        match self {
            Quantity::Power => x * base_mva,
            Quantity::Price => x / base_mva,
            Quantity::Angle => x.to_degrees(),
            Quantity::AnglePrice => x.to_radians(),
        }
    }
}

use Quantity::{Angle, AnglePrice, Power, Price};

const BUS_UNITS: &[(&str, Quantity)] = &[
    ("PD", Power),
    ("QD", Power),
    ("GS", Power),
    ("BS", Power),
    ("VA", Angle),
    ("LAM_P", Price),
    ("LAM_Q", Price),
];

const GEN_UNITS: &[(&str, Quantity)] = &[
    ("PG", Power),
    ("QG", Power),
    ("QMAX", Power),
    ("QMIN", Power),
    ("PMAX", Power),
    ("PMIN", Power),
    ("PC1", Power),
    ("PC2", Power),
    ("QC1MIN", Power),
    ("QC1MAX", Power),
    ("QC2MIN", Power),
    ("QC2MAX", Power),
    ("RAMP_AGC", Power),
    ("RAMP_10", Power),
    ("RAMP_30", Power),
    ("RAMP_Q", Power),
    ("MU_PMAX", Price),
    ("MU_PMIN", Price),
    ("MU_QMAX", Price),
    ("MU_QMIN", Price),
];

const BRANCH_UNITS: &[(&str, Quantity)] = &[
    ("RATE_A", Power),
    ("RATE_B", Power),
    ("RATE_C", Power),
    ("SHIFT", Angle),
    ("ANGMIN", Angle),
    ("ANGMAX", Angle),
    ("PF", Power),
    ("QF", Power),
    ("PT", Power),
    ("QT", Power),
    ("MU_SF", Price),
    ("MU_ST", Price),
    ("MU_ANGMIN", AnglePrice),
    ("MU_ANGMAX", AnglePrice),
];

const DCLINE_UNITS: &[(&str, Quantity)] = &[
    ("PF", Power),
    ("PT", Power),
    ("QF", Power),
    ("QT", Power),
    ("PMIN", Power),
    ("PMAX", Power),
    ("QMINF", Power),
    ("QMAXF", Power),
    ("QMINT", Power),
    ("QMAXT", Power),
    ("LOSS0", Power),
    ("MU_PMIN", Price),
    ("MU_PMAX", Price),
    ("MU_QMINF", Price),
    ("MU_QMAXF", Price),
    ("MU_QMINT", Price),
    ("MU_QMAXT", Price),
];

const RESERVES_UNITS: &[(&str, Quantity)] =
    &[("PREQ", Power), ("PQTY", Power), ("C1", Price)];

/// Scaled columns of a standard table. Unknown tables have none.
pub fn column_units(table: &str) -> &'static [(&'static str, Quantity)] {
    match table {
        "bus" => BUS_UNITS,
        "gen" => GEN_UNITS,
        "branch" => BRANCH_UNITS,
        "dcline" => DCLINE_UNITS,
        "reserves.req" | "reserves.cost" | "reserves.qty" => RESERVES_UNITS,
        _ => &[],
    }
}

/// Direction of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    ToPerUnit,
    FromPerUnit,
}

/// Rescale every unit-bearing column present in `table`.
pub(crate) fn scale_table(table: &mut Table, units_key: &str, base_mva: f64, dir: Direction) {
    for (column, quantity) in column_units(units_key) {
        table.map_column(column, |x| match dir {
            Direction::ToPerUnit => quantity.to_per_unit(x, base_mva),
            Direction::FromPerUnit => quantity.from_per_unit(x, base_mva),
        });
    }
}

/// Rescale cost rows, each according to its own MODEL and NCOST cells.
///
/// A polynomial coefficient of order k is in money/MW^k, so it is multiplied
/// by `baseMVA^k`. Piecewise-linear breakpoints divide their MW coordinate.
pub(crate) fn scale_cost_table(table: &mut Table, base_mva: f64, dir: Direction) {
    let factor = |x: f64, power: i32| match dir {
        Direction::ToPerUnit => x * base_mva.powi(power),
        Direction::FromPerUnit => x / base_mva.powi(power),
    };
    for row in table.rows_mut() {
        if row.len() <= COST_FIXED {
            continue;
        }
        let model = CostModel::from_cell(&row[0]);
        let tail = row.len() - COST_FIXED;
        let ncost = row[3]
            .as_i64()
            .map(|n| n.max(0) as usize)
            .unwrap_or(tail);
        match model {
            CostModel::Polynomial => {
                let n = ncost.min(tail);
                for j in 0..n {
                    let cell = &mut row[COST_FIXED + j];
                    if let Some(x) = cell.as_f64() {
                        *cell = Value::Float(factor(x, (n - 1 - j) as i32));
                    }
                }
            }
            CostModel::PiecewiseLinear => {
                let n = (2 * ncost).min(tail);
                for j in (0..n).step_by(2) {
                    let cell = &mut row[COST_FIXED + j];
                    if let Some(x) = cell.as_f64() {
                        *cell = Value::Float(factor(x, -1));
                    }
                }
            }
        }
    }
}
