use rand::Rng;

use crate::color::Rgb;

// ============================================================================
// Templates
// ============================================================================

const X: bool = true;
const O: bool = false;

/// Unrotated occupancy pattern of one piece kind. Rows may differ in length;
/// a missing cell at the end of a row is empty.
#[derive(Debug, PartialEq, Eq)]
pub struct Template {
    pub color: Rgb,
    pub rows: &'static [&'static [bool]],
}

static TEMPLATES: [Template; 7] = [
    Template { color: Rgb::new(0x5c, 0xe5, 0xff), rows: &[&[X, X, X, X]] },
    Template { color: Rgb::new(0x36, 0x14, 0xdb), rows: &[&[X], &[X, X, X]] },
    Template { color: Rgb::new(0xfe, 0xc0, 0x39), rows: &[&[X, X, X], &[X]] },
    Template { color: Rgb::new(0xfe, 0xf5, 0x39), rows: &[&[X, X], &[X, X]] },
    Template { color: Rgb::new(0x62, 0xfe, 0x39), rows: &[&[O, X, X], &[X, X]] },
    Template { color: Rgb::new(0xf5, 0x00, 0xc5), rows: &[&[O, X], &[X, X, X]] },
    Template { color: Rgb::new(0xf5, 0x00, 0x0b), rows: &[&[X, X], &[O, X, X]] },
];

// ============================================================================
// Kinds
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ShapeKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::O,
        ShapeKind::S,
        ShapeKind::T,
        ShapeKind::Z,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn template(self) -> &'static Template {
        &TEMPLATES[self.index()]
    }

    pub fn color(self) -> Rgb {
        self.template().color
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}
