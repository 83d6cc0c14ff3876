//! Command and parameter integers of the vector tile geometry encoding.
//! <https://github.com/mapbox/vector-tile-spec/tree/master/2.1#43-geometry-encoding>

#[derive(Debug, Clone, Copy)]
pub enum Command {
    MoveTo = 1,
    LineTo = 2,
    ClosePath = 7,
}

/// Command id in the low 3 bits, repeat count above them.
pub fn command_integer(command: Command, count: u32) -> u32 {
    (command as u32 & 0x7) | (count << 3)
}

/// Zigzag-encoded coordinate delta.
pub fn parameter_integer(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}
