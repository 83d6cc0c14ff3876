use std::slice;

use geojson::Value;
use geozero::mvt::tile::GeomType;

use super::commands::{Command, command_integer, parameter_integer};

/// Encodes a geometry given in tile units into MVT geometry commands.
///
/// Points become a single `MoveTo` carrying every point. Each line becomes `MoveTo` + `LineTo`.
/// Polygon rings drop their closing vertex, end with `ClosePath` and are rewound so that outer
/// rings are clockwise in tile space. The cursor carries over from one part to the next.
///
/// Returns `None` for geometry collections and for geometries without any vertex.
pub fn encode_geometry(value: &Value) -> Option<(GeomType, Vec<u32>)> {
    let mut encoder = GeometryEncoder::default();
    let geom_type = match value {
        Value::Point(point) => {
            encoder.move_to(&tile_points(slice::from_ref(point)));
            GeomType::Point
        }
        Value::MultiPoint(points) => {
            encoder.move_to(&tile_points(points));
            GeomType::Point
        }
        Value::LineString(line) => {
            encoder.line(&tile_points(line));
            GeomType::Linestring
        }
        Value::MultiLineString(lines) => {
            for line in lines {
                encoder.line(&tile_points(line));
            }
            GeomType::Linestring
        }
        Value::Polygon(rings) => {
            encoder.polygon(rings);
            GeomType::Polygon
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                encoder.polygon(rings);
            }
            GeomType::Polygon
        }
        Value::GeometryCollection(_) => return None,
    };
    (!encoder.encoded.is_empty()).then_some((geom_type, encoder.encoded))
}

/// Tile coordinates are already rounded; positions without two coordinates are skipped.
fn tile_points(positions: &[Vec<f64>]) -> Vec<[i32; 2]> {
    positions
        .iter()
        .filter_map(|position| match position[..] {
            [x, y, ..] => Some([x as i32, y as i32]),
            _ => None,
        })
        .collect()
}

/// Reverses `ring` unless its winding matches `clockwise` (y pointing down).
fn rewind(ring: &mut [[i32; 2]], clockwise: bool) {
    let mut area = 0_i64;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let ([xi, yi], [xj, yj]) = (ring[i], ring[j]);
        area += (i64::from(xi) - i64::from(xj)) * (i64::from(yi) + i64::from(yj));
        j = i;
    }
    if (area > 0) == clockwise {
        ring.reverse();
    }
}

#[derive(Default)]
struct GeometryEncoder {
    encoded: Vec<u32>,
    cx: i32,
    cy: i32,
}

impl GeometryEncoder {
    fn line(&mut self, points: &[[i32; 2]]) {
        if let Some((first, rest)) = points.split_first() {
            self.move_to(slice::from_ref(first));
            self.line_to(rest);
        }
    }

    fn polygon(&mut self, rings: &[Vec<Vec<f64>>]) {
        for (idx, ring) in rings.iter().enumerate() {
            let mut ring = tile_points(ring);
            // the closing vertex is implied by ClosePath
            if ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }
            rewind(&mut ring, idx == 0);
            if !ring.is_empty() {
                self.line(&ring);
                self.encoded.push(command_integer(Command::ClosePath, 1));
            }
        }
    }

    fn move_to(&mut self, points: &[[i32; 2]]) {
        self.command(Command::MoveTo, points);
    }

    fn line_to(&mut self, points: &[[i32; 2]]) {
        self.command(Command::LineTo, points);
    }

    fn command(&mut self, command: Command, points: &[[i32; 2]]) {
        if points.is_empty() {
            return;
        }
        self.encoded
            .push(command_integer(command, points.len() as u32));
        for &[x, y] in points {
            self.encoded.push(parameter_integer(x - self.cx));
            self.encoded.push(parameter_integer(y - self.cy));
            self.cx = x;
            self.cy = y;
        }
    }
}
