use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Channels scaled into `0.0..=1.0`.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }

    /// Parses `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let digits = hex.trim_start_matches('#');
        let invalid = || ConfigError::InvalidColor(hex.to_string());
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

// Neon set
pub const NEON: [Rgb; 8] = [
    Rgb(0xFF, 0x00, 0x55),
    Rgb(0x00, 0xFF, 0x88),
    Rgb(0x00, 0xD9, 0xFF),
    Rgb(0xFF, 0xCC, 0x00),
    Rgb(0xFF, 0x00, 0xFF),
    Rgb(0xFF, 0x66, 0x00),
    Rgb(0x00, 0xFF, 0xCC),
    Rgb(0xFF, 0x00, 0x99),
];

pub fn pick(rng: &mut fastrand::Rng) -> Rgb {
    NEON[rng.usize(0..NEON.len())]
}
