//! Maps a labeled chessboard lattice onto the row-major control-point order.
//!
//! The board detector reports integer lattice coordinates `(i, j)` whose
//! axes and signs depend on the board's appearance. [`row_major`] fixes
//! them: the lattice axis with `columns` corners becomes the column axis
//! (for square boards, the axis closer to image +x), and the axis signs are
//! chosen so that index 0 is the corner nearest the image top-left. Between
//! equally near candidates, columns advancing along +x win.

use distortion_core::{Pt2, Real, Vec2};

/// One detected corner with its lattice coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeCorner {
    pub i: i32,
    pub j: i32,
    pub pixel: Pt2,
}

/// Row-major `columns × rows` corners, or `None` unless the lattice is
/// complete and has exactly that shape (in either orientation).
pub fn row_major(corners: &[LatticeCorner], columns: usize, rows: usize) -> Option<Vec<Pt2>> {
    if corners.len() != columns * rows || corners.is_empty() {
        return None;
    }
    let (min_i, max_i, min_j, max_j) = corners.iter().fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |acc, c| (acc.0.min(c.i), acc.1.max(c.i), acc.2.min(c.j), acc.3.max(c.j)),
    );
    let ni = (max_i - min_i + 1) as usize;
    let nj = (max_j - min_j + 1) as usize;
    if ni * nj != corners.len() {
        return None;
    }

    let mut slots: Vec<Option<Pt2>> = vec![None; ni * nj];
    for c in corners {
        let k = (c.j - min_j) as usize * ni + (c.i - min_i) as usize;
        if slots[k].replace(c.pixel).is_some() {
            return None;
        }
    }
    let pts: Vec<Pt2> = slots.into_iter().collect::<Option<_>>()?;
    let lattice = Lattice { pts, ni, nj };

    let oriented = if (ni, nj) == (columns, rows) && (nj, ni) == (columns, rows) {
        if lattice.mean_step_i().x.abs() >= lattice.mean_step_j().x.abs() {
            lattice
        } else {
            lattice.transposed()
        }
    } else if (ni, nj) == (columns, rows) {
        lattice
    } else if (nj, ni) == (columns, rows) {
        lattice.transposed()
    } else {
        return None;
    };
    Some(oriented.anchored_top_left())
}

/// Lattice stored row-major along `i`.
struct Lattice {
    pts: Vec<Pt2>,
    ni: usize,
    nj: usize,
}

impl Lattice {
    fn at(&self, i: usize, j: usize) -> Pt2 {
        self.pts[j * self.ni + i]
    }

    fn mean_step_i(&self) -> Vec2 {
        if self.ni < 2 {
            return Vec2::zeros();
        }
        (0..self.nj)
            .map(|j| self.at(self.ni - 1, j) - self.at(0, j))
            .sum::<Vec2>()
            / (self.nj * (self.ni - 1)) as Real
    }

    fn mean_step_j(&self) -> Vec2 {
        if self.nj < 2 {
            return Vec2::zeros();
        }
        (0..self.ni)
            .map(|i| self.at(i, self.nj - 1) - self.at(i, 0))
            .sum::<Vec2>()
            / (self.ni * (self.nj - 1)) as Real
    }

    fn transposed(&self) -> Self {
        let pts = (0..self.ni)
            .flat_map(|i| (0..self.nj).map(move |j| (i, j)))
            .map(|(i, j)| self.at(i, j))
            .collect();
        Self {
            pts,
            ni: self.nj,
            nj: self.ni,
        }
    }

    /// Flip the axes so that index 0 is the corner nearest the image origin.
    fn anchored_top_left(self) -> Vec<Pt2> {
        let (ni, nj) = (self.ni, self.nj);
        let step_i = self.mean_step_i();
        let flips = [(false, false), (true, false), (false, true), (true, true)];
        let score = |&(fi, fj): &(bool, bool)| {
            let i = if fi { ni - 1 } else { 0 };
            let j = if fj { nj - 1 } else { 0 };
            let dist = self.at(i, j).coords.norm();
            let along_x = if fi { -step_i.x } else { step_i.x };
            (dist, -along_x)
        };
        let (fi, fj) = flips
            .iter()
            .copied()
            .min_by(|a, b| {
                let (da, xa) = score(a);
                let (db, xb) = score(b);
                if (da - db).abs() > 1e-6 * da.max(db).max(1.0) {
                    da.total_cmp(&db)
                } else {
                    xa.total_cmp(&xb)
                }
            })
            .unwrap_or((false, false));

        (0..nj)
            .flat_map(|j| (0..ni).map(move |i| (i, j)))
            .map(|(i, j)| {
                let si = if fi { ni - 1 - i } else { i };
                let sj = if fj { nj - 1 - j } else { j };
                self.at(si, sj)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Labeled lattice `origin + a·i + b·j`, listed in a scrambled order.
    fn labeled(ni: i32, nj: i32, origin: Pt2, a: Vec2, b: Vec2) -> Vec<LatticeCorner> {
        let mut out: Vec<LatticeCorner> = (0..nj)
            .flat_map(|j| (0..ni).map(move |i| (i, j)))
            .map(|(i, j)| LatticeCorner {
                i: i + 3,
                j: j - 2,
                pixel: origin + a * i as Real + b * j as Real,
            })
            .collect();
        out.reverse();
        out.swap(1, 7);
        out
    }

    #[test]
    fn frontal_board_starts_top_left_with_columns_along_x() {
        let (a, b) = (Vec2::new(40.0, 0.0), Vec2::new(0.0, 40.0));
        let corners = labeled(9, 6, Pt2::new(160.0, 140.0), a, b);
        let pts = row_major(&corners, 9, 6).unwrap();
        assert_eq!(pts[0], Pt2::new(160.0, 140.0));
        assert_eq!(pts[1], Pt2::new(200.0, 140.0));
        assert_eq!(pts[9], Pt2::new(160.0, 180.0));
        assert_eq!(pts[53], Pt2::new(480.0, 340.0));
    }

    #[test]
    fn mirrored_and_transposed_labels_are_normalized() {
        // i runs bottom-to-top, j right-to-left.
        let (a, b) = (Vec2::new(0.0, -40.0), Vec2::new(-40.0, 0.0));
        let corners = labeled(6, 9, Pt2::new(480.0, 340.0), a, b);
        let pts = row_major(&corners, 9, 6).unwrap();
        assert_eq!(pts[0], Pt2::new(160.0, 140.0));
        assert_eq!(pts[1], Pt2::new(200.0, 140.0));
        assert_eq!(pts[9], Pt2::new(160.0, 180.0));
    }

    #[test]
    fn vertical_board_keeps_index_zero_top_left() {
        // 7 columns laid out along +y, 5 rows along x.
        let (a, b) = (Vec2::new(-40.0, 0.0), Vec2::new(0.0, 40.0));
        let corners = labeled(5, 7, Pt2::new(260.0, 100.0), a, b);
        let pts = row_major(&corners, 7, 5).unwrap();
        assert_eq!(pts[0], Pt2::new(100.0, 100.0));
        assert_eq!(pts[1], Pt2::new(100.0, 140.0));
        assert_eq!(pts[7], Pt2::new(140.0, 100.0));
        let nearest = pts
            .iter()
            .map(|p| p.coords.norm())
            .fold(Real::INFINITY, Real::min);
        assert_eq!(pts[0].coords.norm(), nearest);
    }

    #[test]
    fn square_board_picks_the_horizontal_axis_for_columns() {
        let (a, b) = (Vec2::new(0.0, 30.0), Vec2::new(30.0, 0.0));
        let corners = labeled(4, 4, Pt2::new(100.0, 50.0), a, b);
        let pts = row_major(&corners, 4, 4).unwrap();
        assert_eq!(pts[0], Pt2::new(100.0, 50.0));
        assert_eq!(pts[1], Pt2::new(130.0, 50.0));
        assert_eq!(pts[4], Pt2::new(100.0, 80.0));
    }

    #[test]
    fn incomplete_or_wrong_shape_is_rejected() {
        let o = Pt2::new(10.0, 10.0);
        let (a, b) = (Vec2::new(20.0, 0.0), Vec2::new(0.0, 20.0));
        let mut partial = labeled(9, 6, o, a, b);
        partial.pop();
        assert!(row_major(&partial, 9, 6).is_none());
        assert!(row_major(&labeled(9, 6, o, a, b), 10, 7).is_none());
        assert!(row_major(&labeled(6, 9, o, a, b), 9, 6).is_some());
        assert!(row_major(&labeled(8, 7, o, a, b), 9, 6).is_none());

        let mut duplicated = labeled(3, 3, o, a, b);
        duplicated[0].i = duplicated[1].i;
        duplicated[0].j = duplicated[1].j;
        assert!(row_major(&duplicated, 3, 3).is_none());
    }
}
