//! Contour line (isoline) extraction using marching squares.
//!
//! Contours are computed in grid index space: `x` runs along columns and
//! `y` along rows of the input array, with integer coordinates at cell
//! centres. Mapping to screen pixels is left to the caller.

use std::collections::VecDeque;

use ndarray::ArrayView2;

/// Tolerance for joining segment endpoints.
const JOIN_EPSILON: f64 = 1e-6;

/// A point in grid index space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn close_to(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < JOIN_EPSILON && (self.y - other.y).abs() < JOIN_EPSILON
    }
}

/// A line segment between two points
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// A complete contour line (polyline)
#[derive(Debug, Clone)]
pub struct Contour {
    pub level: f64,
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Upper bound on the number of levels [`generate_levels`] returns.
pub const MAX_LEVELS: usize = 10_000;

/// Levels at every multiple of `interval` inside `[min_value, max_value]`.
///
/// Returns no levels when the range would need more than [`MAX_LEVELS`].
pub fn generate_levels(min_value: f64, max_value: f64, interval: f64) -> Vec<f64> {
    if !(interval > 0.0) || !(max_value >= min_value) {
        return vec![];
    }

    let first = (min_value / interval).ceil();
    let last = (max_value / interval + 1e-9).floor();
    if !first.is_finite() || !last.is_finite() || last - first >= MAX_LEVELS as f64 {
        tracing::debug!(min_value, max_value, interval, "Too many contour levels, skipping");
        return vec![];
    }
    let (first, last) = (first as i64, last as i64);

    // Multiply rather than accumulate so levels stay on exact multiples
    (first..=last).map(|k| k as f64 * interval).collect()
}

/// Marching squares over `data` for a single `level`.
///
/// Cells with a NaN corner are skipped. Grids smaller than 2x2 produce no
/// segments.
pub fn march_squares(data: ArrayView2<'_, f64>, level: f64) -> Vec<Segment> {
    let (rows, cols) = data.dim();
    if rows < 2 || cols < 2 {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..rows - 1 {
        for x in 0..cols - 1 {
            let tl = data[[y, x]];
            let tr = data[[y, x + 1]];
            let bl = data[[y + 1, x]];
            let br = data[[y + 1, x + 1]];

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut case = 0u8;
            if tl >= level {
                case |= 1;
            }
            if tr >= level {
                case |= 2;
            }
            if br >= level {
                case |= 4;
            }
            if bl >= level {
                case |= 8;
            }

            let corners = Corners { tl, tr, br, bl };
            cell_segments(case, x as f64, y as f64, &corners, level, &mut segments);
        }
    }

    segments
}

struct Corners {
    tl: f64,
    tr: f64,
    br: f64,
    bl: f64,
}

/// Push the segments for one marching squares cell.
fn cell_segments(
    case: u8,
    x: f64,
    y: f64,
    c: &Corners,
    level: f64,
    out: &mut Vec<Segment>,
) {
    let top = || crossing(x, y, x + 1.0, y, c.tl, c.tr, level);
    let right = || crossing(x + 1.0, y, x + 1.0, y + 1.0, c.tr, c.br, level);
    let bottom = || crossing(x, y + 1.0, x + 1.0, y + 1.0, c.bl, c.br, level);
    let left = || crossing(x, y, x, y + 1.0, c.tl, c.bl, level);

    let mut push = |start: Point, end: Point| out.push(Segment { start, end });

    match case {
        1 | 14 => push(left(), top()),
        2 | 13 => push(top(), right()),
        3 | 12 => push(left(), right()),
        4 | 11 => push(right(), bottom()),
        6 | 9 => push(top(), bottom()),
        7 | 8 => push(left(), bottom()),
        5 | 10 => {
            // Saddle: resolve with the cell centre average
            let centre = (c.tl + c.tr + c.br + c.bl) / 4.0;
            let centre_high = centre >= level;
            if (case == 5) == centre_high {
                push(left(), bottom());
                push(top(), right());
            } else {
                push(left(), top());
                push(right(), bottom());
            }
        }
        _ => {}
    }
}

/// Point along an edge where the data crosses `level`.
fn crossing(x1: f64, y1: f64, x2: f64, y2: f64, v1: f64, v2: f64, level: f64) -> Point {
    let dv = v2 - v1;
    if dv.abs() < f64::EPSILON {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - v1) / dv).clamp(0.0, 1.0);
    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

/// Join unordered segments into polylines.
///
/// Chains grow from both ends; a chain whose ends meet is marked closed and
/// stored without a repeated end point.
pub fn connect_segments(segments: Vec<Segment>, level: f64) -> Vec<Contour> {
    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;

        let seed = &segments[start_idx];
        let mut chain: VecDeque<Point> = VecDeque::from([seed.start, seed.end]);

        loop {
            let (head, tail) = match (chain.front(), chain.back()) {
                (Some(h), Some(t)) => (*h, *t),
                _ => break,
            };
            if chain.len() > 2 && head.close_to(&tail) {
                break;
            }

            let next = segments.iter().enumerate().find_map(|(i, seg)| {
                if used[i] {
                    return None;
                }
                if seg.start.close_to(&tail) {
                    Some((i, seg.end, true))
                } else if seg.end.close_to(&tail) {
                    Some((i, seg.start, true))
                } else if seg.end.close_to(&head) {
                    Some((i, seg.start, false))
                } else if seg.start.close_to(&head) {
                    Some((i, seg.end, false))
                } else {
                    None
                }
            });

            match next {
                Some((i, point, at_tail)) => {
                    used[i] = true;
                    if at_tail {
                        chain.push_back(point);
                    } else {
                        chain.push_front(point);
                    }
                }
                None => break,
            }
        }

        let mut points: Vec<Point> = chain.into_iter().collect();
        let closed = points.len() > 3
            && match (points.first(), points.last()) {
                (Some(first), Some(last)) => first.close_to(last),
                _ => false,
            };
        if closed {
            points.pop();
        }

        contours.push(Contour {
            level,
            points,
            closed,
        });
    }

    contours
}

/// Apply Chaikin's corner cutting algorithm for smoothing
pub fn smooth_contour(contour: &Contour, iterations: u32) -> Contour {
    if iterations == 0 || contour.points.len() < 3 {
        return contour.clone();
    }

    let mut points = contour.points.clone();

    for _ in 0..iterations {
        let n = points.len();
        let edges = if contour.closed { n } else { n - 1 };
        let mut cut = Vec::with_capacity(edges * 2 + 2);

        if !contour.closed {
            cut.push(points[0]);
        }
        for i in 0..edges {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            cut.push(Point::new(0.75 * p1.x + 0.25 * p2.x, 0.75 * p1.y + 0.25 * p2.y));
            cut.push(Point::new(0.25 * p1.x + 0.75 * p2.x, 0.25 * p1.y + 0.75 * p2.y));
        }
        if !contour.closed {
            cut.push(points[n - 1]);
        }

        points = cut;
    }

    Contour {
        level: contour.level,
        points,
        closed: contour.closed,
    }
}

/// Extract, join and optionally smooth contours for every level.
pub fn generate_contours(
    data: ArrayView2<'_, f64>,
    levels: &[f64],
    smoothing_passes: u32,
) -> Vec<Contour> {
    let mut all = Vec::new();

    for &level in levels {
        let segments = march_squares(data, level);
        let contours = connect_segments(segments, level);

        all.extend(
            contours
                .iter()
                .map(|contour| smooth_contour(contour, smoothing_passes)),
        );
    }

    tracing::debug!(
        num_levels = levels.len(),
        num_contours = all.len(),
        total_points = all.iter().map(|c| c.points.len()).sum::<usize>(),
        "Generated contours"
    );

    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_crossing_midpoint() {
        let p = crossing(0.0, 0.0, 1.0, 0.0, 0.0, 10.0, 5.0);
        assert!((p.x - 0.5).abs() < 1e-12);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn test_crossing_flat_edge() {
        let p = crossing(0.0, 0.0, 0.0, 1.0, 3.0, 3.0, 3.0);
        assert_eq!(p, Point::new(0.0, 0.5));
    }

    #[test]
    fn test_saddle_emits_two_segments() {
        let data = array![[10.0, 0.0], [0.0, 10.0]];
        let segments = march_squares(data.view(), 5.0);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_open_chain_grows_from_both_ends() {
        let segments = vec![
            Segment { start: Point::new(1.0, 0.0), end: Point::new(2.0, 0.0) },
            Segment { start: Point::new(0.0, 0.0), end: Point::new(1.0, 0.0) },
            Segment { start: Point::new(2.0, 0.0), end: Point::new(3.0, 0.0) },
        ];
        let contours = connect_segments(segments, 1.0);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 4);
        assert!(!contours[0].closed);
        assert_eq!(contours[0].points[0], Point::new(0.0, 0.0));
    }
}
