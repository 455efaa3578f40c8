//! Dense 4x4 homogeneous-transform kernel.
//!
//! Transforms are plain row-major `[[f64; 4]; 4]` values: rotation in the
//! upper-left 3x3 block, translation in column 3, bottom row `[0, 0, 0, 1]`.
//! Everything here is a pure function over copies; nothing is shared.

use crate::errors::KinematicsError;

/// Row-major 4x4 homogeneous transform.
pub type Matrix4 = [[f64; 4]; 4];

/// Row-major 3x3 rotation block.
pub type Rotation3 = [[f64; 3]; 3];

pub const IDENTITY: Matrix4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Multiply two 4x4 matrices (`a · b`).
pub fn multiply(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Compose a chain of transforms left to right: `t[0] · t[1] · ... · t[n-1]`.
pub fn compose(chain: &[Matrix4]) -> Matrix4 {
    chain
        .iter()
        .fold(IDENTITY, |acc, t| multiply(&acc, t))
}

// Pairwise 2x2 minors of the top two rows (s*) and bottom two rows (c*).
// Every cofactor of a 4x4 matrix is a signed combination of these twelve,
// which is what keeps the expansion below closed-form.
struct Minors {
    s: [f64; 6],
    c: [f64; 6],
}

impl Minors {
    fn of(m: &Matrix4) -> Self {
        let [a0, a1, _, _] = m;
        let [_, _, b0, b1] = m;
        Self {
            s: [
                a0[0] * a1[1] - a1[0] * a0[1],
                a0[0] * a1[2] - a1[0] * a0[2],
                a0[0] * a1[3] - a1[0] * a0[3],
                a0[1] * a1[2] - a1[1] * a0[2],
                a0[1] * a1[3] - a1[1] * a0[3],
                a0[2] * a1[3] - a1[2] * a0[3],
            ],
            c: [
                b0[0] * b1[1] - b1[0] * b0[1],
                b0[0] * b1[2] - b1[0] * b0[2],
                b0[0] * b1[3] - b1[0] * b0[3],
                b0[1] * b1[2] - b1[1] * b0[2],
                b0[1] * b1[3] - b1[1] * b0[3],
                b0[2] * b1[3] - b1[2] * b0[3],
            ],
        }
    }

    fn determinant(&self) -> f64 {
        let Minors { s, c } = self;
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }
}

/// Determinant of a 4x4 matrix by Laplace expansion over its 2x2 minors.
pub fn determinant(m: &Matrix4) -> f64 {
    Minors::of(m).determinant()
}

/// Invert a general 4x4 matrix through its adjugate.
///
/// Returns [`KinematicsError::SingularMatrix`] when `|det| <= epsilon`
/// (or the determinant is NaN) instead of dividing by it.
///
/// # Arguments
/// * `m` - Matrix to invert
/// * `epsilon` - Smallest determinant magnitude accepted as invertible
pub fn invert(m: &Matrix4, epsilon: f64) -> Result<Matrix4, KinematicsError> {
    let minors = Minors::of(m);
    let det = minors.determinant();

    if !(det.abs() > epsilon) {
        tracing::warn!(determinant = det, epsilon, "refusing to invert singular matrix");
        return Err(KinematicsError::SingularMatrix { determinant: det });
    }

    let Minors { s, c } = minors;
    let inv_det = 1.0 / det;

    // Adjugate (transposed cofactor matrix)
    let adj = [
        [
            m[1][1] * c[5] - m[1][2] * c[4] + m[1][3] * c[3],
            -m[0][1] * c[5] + m[0][2] * c[4] - m[0][3] * c[3],
            m[3][1] * s[5] - m[3][2] * s[4] + m[3][3] * s[3],
            -m[2][1] * s[5] + m[2][2] * s[4] - m[2][3] * s[3],
        ],
        [
            -m[1][0] * c[5] + m[1][2] * c[2] - m[1][3] * c[1],
            m[0][0] * c[5] - m[0][2] * c[2] + m[0][3] * c[1],
            -m[3][0] * s[5] + m[3][2] * s[2] - m[3][3] * s[1],
            m[2][0] * s[5] - m[2][2] * s[2] + m[2][3] * s[1],
        ],
        [
            m[1][0] * c[4] - m[1][1] * c[2] + m[1][3] * c[0],
            -m[0][0] * c[4] + m[0][1] * c[2] - m[0][3] * c[0],
            m[3][0] * s[4] - m[3][1] * s[2] + m[3][3] * s[0],
            -m[2][0] * s[4] + m[2][1] * s[2] - m[2][3] * s[0],
        ],
        [
            -m[1][0] * c[3] + m[1][1] * c[1] - m[1][2] * c[0],
            m[0][0] * c[3] - m[0][1] * c[1] + m[0][2] * c[0],
            -m[3][0] * s[3] + m[3][1] * s[1] - m[3][2] * s[0],
            m[2][0] * s[3] - m[2][1] * s[1] + m[2][2] * s[0],
        ],
    ];

    let mut inv = [[0.0; 4]; 4];
    for (row, adj_row) in inv.iter_mut().zip(adj.iter()) {
        for (value, cofactor) in row.iter_mut().zip(adj_row.iter()) {
            *value = cofactor * inv_det;
        }
    }
    Ok(inv)
}

/// Assemble a homogeneous transform from a rotation block and a translation.
pub fn from_rotation_translation(r: &Rotation3, p: &[f64; 3]) -> Matrix4 {
    [
        [r[0][0], r[0][1], r[0][2], p[0]],
        [r[1][0], r[1][1], r[1][2], p[1]],
        [r[2][0], r[2][1], r[2][2], p[2]],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Extract 3x3 rotation matrix from 4x4 homogeneous transformation
pub fn rotation(t: &Matrix4) -> Rotation3 {
    [
        [t[0][0], t[0][1], t[0][2]],
        [t[1][0], t[1][1], t[1][2]],
        [t[2][0], t[2][1], t[2][2]],
    ]
}

pub fn translation(t: &Matrix4) -> [f64; 3] {
    [t[0][3], t[1][3], t[2][3]]
}

/// Check the rigid-transform invariant: orthonormal rotation block with
/// determinant +1 and a `[0, 0, 0, 1]` bottom row, all within `tolerance`.
pub fn is_rigid(t: &Matrix4, tolerance: f64) -> bool {
    let r = rotation(t);

    // R · Rᵀ must be the identity
    for i in 0..3 {
        for j in 0..3 {
            let dot: f64 = (0..3).map(|k| r[i][k] * r[j][k]).sum();
            let expected = if i == j { 1.0 } else { 0.0 };
            if (dot - expected).abs() > tolerance {
                return false;
            }
        }
    }

    let det3 = r[0][0] * (r[1][1] * r[2][2] - r[1][2] * r[2][1])
        - r[0][1] * (r[1][0] * r[2][2] - r[1][2] * r[2][0])
        + r[0][2] * (r[1][0] * r[2][1] - r[1][1] * r[2][0]);

    (det3 - 1.0).abs() <= tolerance
        && t[3][0].abs() <= tolerance
        && t[3][1].abs() <= tolerance
        && t[3][2].abs() <= tolerance
        && (t[3][3] - 1.0).abs() <= tolerance
}
