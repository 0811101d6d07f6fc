//! G-Code line tokenising
//!
//! Splits a raw line into a command code and its operands, and recognises the
//! `;LAYER:<n>` markers slicers put between layers.

use regex::Regex;
use std::sync::OnceLock;

/// Commands the interpreter acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCode {
    /// G0 rapid move
    Rapid,
    /// G1 linear move
    Linear,
    /// G20 switch to inches
    Inches,
    /// G21 switch to millimetres
    Millimeters,
    /// G90 absolute positioning for all axes
    Absolute,
    /// G91 relative positioning for all axes
    Relative,
    /// G92 set position
    SetPosition,
    /// M82 absolute extrusion
    ExtruderAbsolute,
    /// M83 relative extrusion
    ExtruderRelative,
    /// M104 set hot-end temperature
    SetTemperature,
    /// M109 set hot-end temperature and wait
    WaitTemperature,
    /// Anything else; ignored
    Other,
}

impl CommandCode {
    /// Classify a command token such as `G1`, `g01` or `M104`
    pub fn parse(token: &str) -> Self {
        let mut chars = token.chars();
        let letter = match chars.next() {
            Some(c) => c.to_ascii_uppercase(),
            None => return Self::Other,
        };
        let number = match chars.as_str().parse::<u32>() {
            Ok(n) => n,
            Err(_) => return Self::Other,
        };

        match (letter, number) {
            ('G', 0) => Self::Rapid,
            ('G', 1) => Self::Linear,
            ('G', 20) => Self::Inches,
            ('G', 21) => Self::Millimeters,
            ('G', 90) => Self::Absolute,
            ('G', 91) => Self::Relative,
            ('G', 92) => Self::SetPosition,
            ('M', 82) => Self::ExtruderAbsolute,
            ('M', 83) => Self::ExtruderRelative,
            ('M', 104) => Self::SetTemperature,
            ('M', 109) => Self::WaitTemperature,
            _ => Self::Other,
        }
    }

    /// G0 or G1
    pub fn is_motion(self) -> bool {
        matches!(self, Self::Rapid | Self::Linear)
    }

    /// M104 or M109
    pub fn is_temperature(self) -> bool {
        matches!(self, Self::SetTemperature | Self::WaitTemperature)
    }
}

/// Result of reading one operand from a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// The letter does not appear on the line
    Absent,
    /// The letter appears with a numeric payload
    Value(f64),
    /// The letter appears but its payload is not a number
    Malformed,
}

/// A tokenised, comment-free G-Code line
#[derive(Debug, Clone, PartialEq)]
pub struct GcodeLine<'a> {
    /// Command classification of the first token
    pub code: CommandCode,
    tokens: Vec<&'a str>,
}

impl<'a> GcodeLine<'a> {
    /// Tokenise a line; returns `None` when nothing but whitespace or comments remains
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut tokens = strip_comment(line).split_whitespace();
        let code = CommandCode::parse(tokens.next()?);
        Some(Self {
            code,
            tokens: tokens.collect(),
        })
    }

    /// Look up the operand for `letter` (case-insensitive)
    pub fn operand(&self, letter: char) -> Operand {
        let letter = letter.to_ascii_uppercase();
        let token = self.tokens.iter().find(|token| {
            token
                .chars()
                .next()
                .is_some_and(|c| c.to_ascii_uppercase() == letter)
        });

        match token {
            None => Operand::Absent,
            Some(token) => match token[1..].parse::<f64>() {
                Ok(value) if value.is_finite() => Operand::Value(value),
                _ => Operand::Malformed,
            },
        }
    }

    /// Operand value, falling back to `default` when absent or malformed
    pub fn value_or(&self, letter: char, default: f64) -> f64 {
        match self.operand(letter) {
            Operand::Value(value) => value,
            Operand::Absent | Operand::Malformed => default,
        }
    }
}

/// Strip everything from a comment marker to the end of the line
pub fn strip_comment(line: &str) -> &str {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(]").expect("invalid regex pattern"));
    match regex.find(line) {
        Some(found) => &line[..found.start()],
        None => line,
    }
}

/// Layer index carried by a `;LAYER:<n>` marker, if the line has one
pub fn layer_marker(line: &str) -> Option<i64> {
    static LAYER_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LAYER_REGEX
        .get_or_init(|| Regex::new(r";LAYER:\s*(-?\d+)").expect("invalid regex pattern"));
    regex
        .captures(line)
        .and_then(|captures| captures.get(1))
        .and_then(|index| index.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_code_parse() {
        assert_eq!(CommandCode::parse("G0"), CommandCode::Rapid);
        assert_eq!(CommandCode::parse("G01"), CommandCode::Linear);
        assert_eq!(CommandCode::parse("g1"), CommandCode::Linear);
        assert_eq!(CommandCode::parse("M109"), CommandCode::WaitTemperature);
        assert_eq!(CommandCode::parse("G28"), CommandCode::Other);
        assert_eq!(CommandCode::parse("T0"), CommandCode::Other);
        assert_eq!(CommandCode::parse("G1.5"), CommandCode::Other);
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("G1 X1 ; move"), "G1 X1 ");
        assert_eq!(strip_comment("G1 X1 (move) Y2"), "G1 X1 ");
        assert_eq!(strip_comment("; only a comment"), "");
        assert_eq!(strip_comment("M82"), "M82");
    }

    #[test]
    fn test_layer_marker() {
        assert_eq!(layer_marker(";LAYER:3"), Some(3));
        assert_eq!(layer_marker(";LAYER: 12\r"), Some(12));
        assert_eq!(layer_marker(";LAYER_COUNT:40"), None);
        assert_eq!(layer_marker("G1 X1"), None);
    }

    #[test]
    fn test_operands() {
        let line = GcodeLine::parse("G1 X10.5 y-2 E F ; comment").unwrap();
        assert_eq!(line.code, CommandCode::Linear);
        assert_eq!(line.operand('X'), Operand::Value(10.5));
        assert_eq!(line.operand('Y'), Operand::Value(-2.0));
        assert_eq!(line.operand('E'), Operand::Malformed);
        assert_eq!(line.operand('Z'), Operand::Absent);
        assert_eq!(line.value_or('F', 1200.0), 1200.0);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert!(GcodeLine::parse("").is_none());
        assert!(GcodeLine::parse("   ").is_none());
        assert!(GcodeLine::parse("; comment").is_none());
    }
}
