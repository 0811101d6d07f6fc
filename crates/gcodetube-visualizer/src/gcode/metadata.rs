//! Feed rate and temperature range scan
//!
//! A cheap pass over the whole stream that finds the value ranges the
//! ramp colorizers are calibrated against.

use tracing::debug;

use super::command::{GcodeLine, Operand};

/// Observed feed rate and hot-end temperature ranges
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MinMaxValues {
    /// Lowest F on a G0/G1 line, if any line carried one
    pub min_speed: Option<f64>,
    pub max_speed: f64,
    /// Lowest M104/M109 temperature, if the stream sets one
    pub min_temp: Option<f64>,
    pub max_temp: f64,
}

impl MinMaxValues {
    /// Scan `text` for feed rates and temperatures
    ///
    /// An M104/M109 without a usable `S` counts as 0.
    pub fn scan(text: &str) -> Self {
        let mut values = Self::default();

        for line in text.lines() {
            let Some(line) = GcodeLine::parse(line) else {
                continue;
            };

            if line.code.is_motion() {
                if let Operand::Value(speed) = line.operand('F') {
                    values.record_speed(speed);
                }
            } else if line.code.is_temperature() {
                values.record_temp(line.value_or('S', 0.0));
            }
        }

        debug!(
            "Metadata scan: speed {:?}..{}, temperature {:?}..{}",
            values.min_speed, values.max_speed, values.min_temp, values.max_temp
        );
        values
    }

    fn record_speed(&mut self, speed: f64) {
        self.min_speed = Some(self.min_speed.map_or(speed, |min| min.min(speed)));
        self.max_speed = self.max_speed.max(speed);
    }

    fn record_temp(&mut self, temp: f64) {
        self.min_temp = Some(self.min_temp.map_or(temp, |min| min.min(temp)));
        self.max_temp = self.max_temp.max(temp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_collects_ranges() {
        let gcode = "M104 S200\nG1 X1 F1800\nG0 X2 F9000\nM109 S215 ; wait\nG1 X3 E1\n";
        let values = MinMaxValues::scan(gcode);

        assert_eq!(values.min_speed, Some(1800.0));
        assert_eq!(values.max_speed, 9000.0);
        assert_eq!(values.min_temp, Some(200.0));
        assert_eq!(values.max_temp, 215.0);
    }

    #[test]
    fn test_scan_without_values() {
        let values = MinMaxValues::scan("G28\n; nothing else\n");
        assert_eq!(values, MinMaxValues::default());
    }

    #[test]
    fn test_temperature_without_s_counts_as_zero() {
        let values = MinMaxValues::scan("M104\nM104 S205\n");
        assert_eq!(values.min_temp, Some(0.0));
        assert_eq!(values.max_temp, 205.0);
    }
}
