use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Corner taxonomy – closed variants parsed from result file names
// ---------------------------------------------------------------------------

/// Reasons a file name is not part of the corner naming scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CornerParseError {
    #[error("unknown process corner '{0}'")]
    Process(String),
    #[error("unknown voltage offset code '{0}'")]
    VoltageOffset(String),
    #[error("unknown temperature '{0}'")]
    Temperature(String),
    #[error("'{0}' is not of the form process_offset_temperature[_Iin]")]
    Shape(String),
}

/// Fabrication process corner.
///
/// Declaration order is the report order (slow first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Process {
    SS,
    TT,
    FF,
}

impl Process {
    pub fn token(self) -> &'static str {
        match self {
            Process::SS => "ss",
            Process::TT => "tt",
            Process::FF => "ff",
        }
    }
}

impl FromStr for Process {
    type Err = CornerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ss" => Ok(Process::SS),
            "tt" => Ok(Process::TT),
            "ff" => Ok(Process::FF),
            other => Err(CornerParseError::Process(other.to_string())),
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token().to_ascii_uppercase())
    }
}

/// Supply voltage offset from nominal.
///
/// Declaration order follows the supply voltage (0.9 V, 1.0 V, 1.1 V).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VoltageOffset {
    /// `01` – supply 10% below nominal.
    Minus10,
    /// `0` – nominal supply.
    Nominal,
    /// `10` – supply 10% above nominal.
    Plus10,
}

impl VoltageOffset {
    pub fn token(self) -> &'static str {
        match self {
            VoltageOffset::Minus10 => "01",
            VoltageOffset::Nominal => "0",
            VoltageOffset::Plus10 => "10",
        }
    }

    /// Offset as shown in plot titles.
    pub fn percent_label(self) -> &'static str {
        match self {
            VoltageOffset::Minus10 => "-10%",
            VoltageOffset::Nominal => "0%",
            VoltageOffset::Plus10 => "+10%",
        }
    }

    /// Supply voltage in volts.
    pub fn vdd(self) -> f64 {
        match self {
            VoltageOffset::Minus10 => 0.9,
            VoltageOffset::Nominal => 1.0,
            VoltageOffset::Plus10 => 1.1,
        }
    }

    /// Supply voltage as shown in the metrics table.
    pub fn vdd_label(self) -> String {
        format!("{:.1}V", self.vdd())
    }
}

impl FromStr for VoltageOffset {
    type Err = CornerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "01" => Ok(VoltageOffset::Minus10),
            "0" => Ok(VoltageOffset::Nominal),
            "10" => Ok(VoltageOffset::Plus10),
            other => Err(CornerParseError::VoltageOffset(other.to_string())),
        }
    }
}

/// Simulation temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Temperature {
    Cold,
    Room,
    Hot,
}

impl Temperature {
    pub fn celsius(self) -> u32 {
        match self {
            Temperature::Cold => 0,
            Temperature::Room => 27,
            Temperature::Hot => 50,
        }
    }
}

impl FromStr for Temperature {
    type Err = CornerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Temperature::Cold),
            "27" => Ok(Temperature::Room),
            "50" => Ok(Temperature::Hot),
            other => Err(CornerParseError::Temperature(other.to_string())),
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C", self.celsius())
    }
}

/// Which variable a result file sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepKind {
    /// Output voltage sweep, three experiments per file.
    Voltage,
    /// Input current sweep (`_Iin` suffix).
    InputCurrent,
}

/// A process / voltage / temperature corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Corner {
    pub process: Process,
    pub voltage: VoltageOffset,
    pub temperature: Temperature,
}

pub const IIN_SUFFIX: &str = "_Iin";

impl Corner {
    /// Parse a result file name such as `tt_0_27` or `ff_10_50_Iin`.
    ///
    /// The whole name must match; extensions are not stripped.
    pub fn parse_file_name(name: &str) -> Result<(Corner, SweepKind), CornerParseError> {
        let (stem, kind) = match name.strip_suffix(IIN_SUFFIX) {
            Some(stem) => (stem, SweepKind::InputCurrent),
            None => (name, SweepKind::Voltage),
        };

        let parts: Vec<&str> = stem.split('_').collect();
        let [process, voltage, temperature] = parts.as_slice() else {
            return Err(CornerParseError::Shape(name.to_string()));
        };

        let corner = Corner {
            process: process.parse()?,
            voltage: voltage.parse()?,
            temperature: temperature.parse()?,
        };
        Ok((corner, kind))
    }

    /// File name stem, e.g. `tt_0_27`.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{}",
            self.process.token(),
            self.voltage.token(),
            self.temperature.celsius()
        )
    }

    /// Title fragment shared by all per-corner plots.
    pub fn title(&self) -> String {
        format!(
            "Process: {}, Voltage: {}, Temperature: {}",
            self.process,
            self.voltage.percent_label(),
            self.temperature
        )
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.process,
            self.voltage.percent_label(),
            self.temperature
        )
    }
}

// ---------------------------------------------------------------------------
// Sweep tables
// ---------------------------------------------------------------------------

/// Raw two-column view of a result file: sweep variable and drain current.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepTable {
    /// Column 0: swept voltage or input current.
    pub sweep: Vec<f64>,
    /// Column 2: measured drain current.
    pub current: Vec<f64>,
}

impl SweepTable {
    pub fn len(&self) -> usize {
        self.sweep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sweep.is_empty()
    }
}

/// Three experiments sharing one sweep axis, all of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitExperiments {
    pub sweep: Vec<f64>,
    pub currents: [Vec<f64>; 3],
}

impl SplitExperiments {
    pub fn len(&self) -> usize {
        self.sweep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sweep.is_empty()
    }
}
