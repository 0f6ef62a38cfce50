use crate::core::{
    constants::{COORDINATE_PRECISION, ZOOM_PRECISION},
    geo::LatLng,
};
use std::fmt;

/// Camera state mirrored from the engine's last report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    center: LatLng,
    zoom: f64,
}

impl CameraState {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self { center, zoom }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Longitude with four decimal places
    pub fn longitude(&self) -> String {
        to_fixed(self.center.lng, COORDINATE_PRECISION)
    }

    /// Latitude with four decimal places
    pub fn latitude(&self) -> String {
        to_fixed(self.center.lat, COORDINATE_PRECISION)
    }

    /// Zoom with two decimal places
    pub fn zoom_text(&self) -> String {
        to_fixed(self.zoom, ZOOM_PRECISION)
    }
}

/// Formats `value` with `digits` decimals, breaking exact ties away from zero
/// (`9.125` gives `9.13`). `-0` prints without a sign.
///
/// Values at or above `1e21` are printed in fixed notation rather than
/// switching to exponent form.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    let mut text = format!("{:.*}", digits, magnitude);
    // `{:.N}` breaks exact ties towards the even digit
    if is_exact_tie(magnitude, digits) && !rounded_up(&text, magnitude) {
        text = increment_last_digit(&text);
    }

    if value < 0.0 {
        format!("-{}", text)
    } else {
        text
    }
}

/// True when `magnitude * 10^digits` lies exactly halfway between two integers
fn is_exact_tie(magnitude: f64, digits: usize) -> bool {
    let bits = magnitude.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, exponent) = if exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), exponent - 1075)
    };
    if mantissa == 0 {
        return false;
    }

    // magnitude * 10^digits * 2 = mantissa * 5^digits * 2^(digits + 1 + exponent),
    // which is an odd integer exactly when the power of two cancels the
    // mantissa's trailing zeros
    let shift = digits as i64 + 1 + exponent;
    shift <= 0 && mantissa.trailing_zeros() as i64 == -shift
}

/// Whether `text` already holds the larger neighbour of `magnitude`
fn rounded_up(text: &str, magnitude: f64) -> bool {
    text.parse::<f64>()
        .map(|rounded| rounded > magnitude)
        .unwrap_or(false)
}

fn increment_last_digit(text: &str) -> String {
    let mut digits: Vec<u8> = text.bytes().collect();
    let mut carry = true;
    for byte in digits.iter_mut().rev() {
        if !carry {
            break;
        }
        match *byte {
            b'.' => continue,
            b'9' => *byte = b'0',
            _ => {
                *byte += 1;
                carry = false;
            }
        }
    }

    let mut result = String::with_capacity(digits.len() + 1);
    if carry {
        result.push('1');
    }
    result.extend(digits.into_iter().map(char::from));
    result
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Longitude: {} | Latitude: {} | Zoom: {}",
            self.longitude(),
            self.latitude(),
            self.zoom_text()
        )
    }
}
