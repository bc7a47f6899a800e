use serde::Serialize;

pub const LANE_COUNT: usize = 5;

pub const LANE_WIDTH: f32 = 1.1;
pub const LANE_SPACING: f32 = 0.2;

/// One of the five tracks, named after the key that plays it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum Lane {
    A = 0,
    S = 1,
    J = 2,
    K = 3,
    L = 4,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::A, Lane::S, Lane::J, Lane::K, Lane::L];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn key(self) -> char {
        match self {
            Lane::A => 'A',
            Lane::S => 'S',
            Lane::J => 'J',
            Lane::K => 'K',
            Lane::L => 'L',
        }
    }

    /// Case-insensitive; anything outside the five lane keys is `None`.
    pub fn from_char(c: char) -> Option<Lane> {
        match c.to_ascii_uppercase() {
            'A' => Some(Lane::A),
            'S' => Some(Lane::S),
            'J' => Some(Lane::J),
            'K' => Some(Lane::K),
            'L' => Some(Lane::L),
            _ => None,
        }
    }

    /// 0xRRGGBB, used for the lane's notes and hit effects.
    pub const fn color(self) -> u32 {
        match self {
            Lane::A => 0x00ff00,
            Lane::S => 0xff0000,
            Lane::J => 0xffff00,
            Lane::K => 0x0000ff,
            Lane::L => 0xffa500,
        }
    }

    /// Lateral center of the lane, with the middle lane at 0.
    pub fn offset(self) -> f32 {
        (self.index() as f32 - 2.0) * (LANE_WIDTH + LANE_SPACING)
    }
}
