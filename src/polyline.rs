//! Encoded-polyline codec for route geometries.
//!
//! Implements the standard signed-delta polyline format with precision 1e5.
//! Routes arrive from storage in this form and are decoded once at the
//! boundary; everything inside the engine works on [`Coordinate`] slices.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::{Result, RouteError};

/// Fixed-point scale of the encoding (five decimal places).
const PRECISION: f64 = 1e5;

const CHUNK_OFFSET: u8 = 63;
const CONTINUATION_BIT: u64 = 0x20;
const CHUNK_MASK: u64 = 0x1f;

/// Shift of the last chunk a u64 can hold; only its low four bits fit.
const MAX_SHIFT: u32 = 60;
const FINAL_CHUNK_MASK: u64 = 0x0f;

/// A route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline string.
    pub fn decode(encoded: &str) -> Result<Self> {
        decode(encoded).map(Self::new)
    }

    pub fn encode(&self) -> String {
        encode(&self.points)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }
}

/// Byte cursor over an encoded polyline.
struct PolylineCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> PolylineCursor<'a> {
    fn new(encoded: &'a str) -> Self {
        Self {
            bytes: encoded.as_bytes(),
            position: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.position >= self.bytes.len()
    }

    /// Reads one zig-zag varint and returns the signed delta.
    fn next_delta(&mut self) -> Result<i64> {
        let mut accumulator: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let Some(&byte) = self.bytes.get(self.position) else {
                return Err(self.malformed("input ends inside a value"));
            };
            if !(CHUNK_OFFSET..=126).contains(&byte) {
                return Err(self.malformed("byte outside the encoding range"));
            }
            let chunk = u64::from(byte - CHUNK_OFFSET);
            if shift >= MAX_SHIFT && chunk & !FINAL_CHUNK_MASK != 0 {
                return Err(self.malformed("value does not fit in 64 bits"));
            }
            self.position += 1;

            accumulator |= (chunk & CHUNK_MASK) << shift;
            shift += 5;

            if chunk & CONTINUATION_BIT == 0 {
                break;
            }
        }

        let magnitude = (accumulator >> 1) as i64;
        Ok(if accumulator & 1 == 1 { !magnitude } else { magnitude })
    }

    fn malformed(&self, reason: &'static str) -> RouteError {
        RouteError::MalformedPolyline {
            position: self.position,
            reason,
        }
    }
}

/// Decodes an encoded polyline into coordinates in encoding order.
///
/// An empty string decodes to an empty route. Truncated input, bytes outside
/// `63..=126` and a dangling latitude without longitude are all rejected
/// with [`RouteError::MalformedPolyline`].
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>> {
    let mut cursor = PolylineCursor::new(encoded);
    let mut points = Vec::new();
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while !cursor.is_empty() {
        lat = lat.wrapping_add(cursor.next_delta()?);
        if cursor.is_empty() {
            return Err(cursor.malformed("latitude without longitude"));
        }
        lng = lng.wrapping_add(cursor.next_delta()?);

        points.push(Coordinate::new(lat as f64 / PRECISION, lng as f64 / PRECISION)?);
    }

    Ok(points)
}

/// Decodes an optional polyline; `None` behaves like the empty string.
pub fn decode_optional(encoded: Option<&str>) -> Result<Vec<Coordinate>> {
    encoded.map_or_else(|| Ok(Vec::new()), decode)
}

/// Encodes coordinates with the standard algorithm.
pub fn encode(points: &[Coordinate]) -> String {
    let mut output = String::with_capacity(points.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for point in points {
        let lat = (point.latitude() * PRECISION).round() as i64;
        let lng = (point.longitude() * PRECISION).round() as i64;

        encode_value(lat - prev_lat, &mut output);
        encode_value(lng - prev_lng, &mut output);

        prev_lat = lat;
        prev_lng = lng;
    }

    output
}

fn encode_value(value: i64, output: &mut String) {
    let mut zigzag = (if value < 0 { !(value << 1) } else { value << 1 }) as u64;

    while zigzag >= CONTINUATION_BIT {
        output.push(char::from(((zigzag & CHUNK_MASK) | CONTINUATION_BIT) as u8 + CHUNK_OFFSET));
        zigzag >>= 5;
    }
    output.push(char::from(zigzag as u8 + CHUNK_OFFSET));
}
