//! Tiling algorithms for arranging clients within a workspace.
//!
//! A [Layout] is a pure partitioner: given a client count and a screen area
//! it produces one [Rect] per client, in client list order (index 0 is the
//! master position). Layouts never talk to the X server; gaps and borders
//! are applied by the caller.
use crate::pure::Rect;

/// Step applied to a layout ratio by [Message::Shrink] / [Message::Expand].
const RATIO_STEP: f64 = 0.03;

/// Runtime adjustments that can be sent to the active [Layout].
///
/// Variants that a given layout has no parameter for are silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Reduce the size of the master area
    Shrink,
    /// Grow the size of the master area
    Expand,
    /// Move one more client into the master area
    IncMaster,
    /// Move one client out of the master area (at least one remains)
    DecMaster,
}

/// One of the available tiling arrangements.
///
/// Each variant carries its own mutable parameters so that per-workspace
/// adjustments (master ratio, master count) survive layout switching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layout {
    /// Master column on the left, remaining clients stacked on the right
    Tall { master_count: u16, ratio: f64 },
    /// Every client gets the full area; only the focused one is visible
    Full,
    /// Equally sized cells in a near-square grid, placed row-major
    Grid,
    /// Each client takes a slice of the remaining area, cycling the split
    /// direction clockwise
    Spiral { ratio: f64 },
    /// Master column centred, remaining clients on the side columns
    ThreeColumn { master_count: u16, ratio: f64 },
    /// Centred master with the stack alternating between left and right
    CenteredMaster { master_count: u16, ratio: f64 },
}

impl Default for Layout {
    fn default() -> Self {
        Self::tall()
    }
}

impl Layout {
    pub fn tall() -> Self {
        Self::Tall {
            master_count: 1,
            ratio: 0.5,
        }
    }

    pub fn full() -> Self {
        Self::Full
    }

    pub fn grid() -> Self {
        Self::Grid
    }

    pub fn spiral() -> Self {
        Self::Spiral { ratio: 0.5 }
    }

    pub fn three_column() -> Self {
        Self::ThreeColumn {
            master_count: 1,
            ratio: 0.5,
        }
    }

    pub fn centered_master() -> Self {
        Self::CenteredMaster {
            master_count: 1,
            ratio: 0.6,
        }
    }

    /// The rotation list offered by default: every known layout.
    pub fn all() -> Vec<Layout> {
        vec![
            Self::tall(),
            Self::full(),
            Self::grid(),
            Self::spiral(),
            Self::three_column(),
            Self::centered_master(),
        ]
    }

    /// Stable name used for rotation, IPC queries and notifications.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tall { .. } => "tall",
            Self::Full => "full",
            Self::Grid => "grid",
            Self::Spiral { .. } => "spiral",
            Self::ThreeColumn { .. } => "threecol",
            Self::CenteredMaster { .. } => "centered",
        }
    }

    /// Whether only the focused client is expected to be visible.
    ///
    /// Callers use this to skip configure requests for fully obscured
    /// windows; the windows themselves stay mapped.
    pub fn is_monocle(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// Produce one rect per client for `n` clients inside `area`.
    ///
    /// Every returned rect is contained in `area` and the result length is
    /// always `n`.
    pub fn arrange(&self, n: usize, area: Rect) -> Vec<Rect> {
        if n == 0 {
            return Vec::new();
        }

        match *self {
            Self::Full => vec![area; n],
            _ if n == 1 => vec![area],
            Self::Tall {
                master_count,
                ratio,
            } => tall(n, area, master_count, ratio),
            Self::Grid => grid(n, area),
            Self::Spiral { ratio } => spiral(n, area, ratio),
            Self::ThreeColumn {
                master_count,
                ratio,
            } => three_column(n, area, master_count, ratio),
            Self::CenteredMaster {
                master_count,
                ratio,
            } => centered_master(n, area, master_count, ratio),
        }
    }

    /// Apply a runtime adjustment to this layout's parameters.
    pub fn handle_message(&mut self, m: Message) {
        match self {
            Self::Tall {
                master_count,
                ratio,
            } => match m {
                Message::Shrink if *ratio > 0.1 => *ratio -= RATIO_STEP,
                Message::Expand if *ratio < 0.9 => *ratio += RATIO_STEP,
                Message::IncMaster => *master_count += 1,
                Message::DecMaster if *master_count > 1 => *master_count -= 1,
                _ => (),
            },

            Self::Spiral { ratio } => match m {
                Message::Shrink if *ratio > 0.2 => *ratio -= RATIO_STEP,
                Message::Expand if *ratio < 0.8 => *ratio += RATIO_STEP,
                _ => (),
            },

            Self::ThreeColumn {
                master_count,
                ratio,
            } => match m {
                Message::Shrink if *ratio > 0.2 => *ratio -= RATIO_STEP,
                Message::Expand if *ratio < 0.8 => *ratio += RATIO_STEP,
                Message::IncMaster => *master_count += 1,
                Message::DecMaster if *master_count > 1 => *master_count -= 1,
                _ => (),
            },

            Self::CenteredMaster {
                master_count,
                ratio,
            } => match m {
                Message::Shrink if *ratio > 0.3 => *ratio -= RATIO_STEP,
                Message::Expand if *ratio < 0.85 => *ratio += RATIO_STEP,
                Message::IncMaster => *master_count += 1,
                Message::DecMaster if *master_count > 1 => *master_count -= 1,
                _ => (),
            },

            // no parameters to adjust
            Self::Full | Self::Grid => (),
        }
    }
}

fn effective_master(master_count: u16, n: usize) -> usize {
    (master_count as usize).clamp(1, n)
}

fn tall(n: usize, area: Rect, master_count: u16, ratio: f64) -> Vec<Rect> {
    let m = effective_master(master_count, n);
    let s = n - m;

    if s == 0 {
        return area.as_rows(m as u16);
    }

    let master_w = (area.w as f64 * ratio) as u16;
    match area.split_at_width(master_w) {
        Some((master, stack)) => {
            let mut rects = master.as_rows(m as u16);
            rects.extend(stack.as_rows(s as u16));
            rects
        }
        // degenerate ratio: fall back to a single column
        None => area.as_rows(n as u16),
    }
}

fn grid(n: usize, area: Rect) -> Vec<Rect> {
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = (n + cols - 1) / cols;

    let cell_w = area.w / cols as u16;
    let cell_h = area.h / rows as u16;

    (0..n)
        .map(|i| {
            let row = i / cols;
            let col = i % cols;
            Rect::new(
                area.x + (col as u16 * cell_w) as i16,
                area.y + (row as u16 * cell_h) as i16,
                cell_w,
                cell_h,
            )
        })
        .collect()
}

fn spiral(n: usize, area: Rect, ratio: f64) -> Vec<Rect> {
    let mut rects = Vec::with_capacity(n);
    let mut remaining = area;

    for i in 0..n {
        if i == n - 1 {
            rects.push(remaining);
            break;
        }

        // clockwise: left, top, right, bottom
        match i % 4 {
            0 => {
                let w = (remaining.w as f64 * ratio) as u16;
                rects.push(Rect { w, ..remaining });
                remaining.x += w as i16;
                remaining.w -= w;
            }
            1 => {
                let h = (remaining.h as f64 * ratio) as u16;
                rects.push(Rect { h, ..remaining });
                remaining.y += h as i16;
                remaining.h -= h;
            }
            2 => {
                let w = (remaining.w as f64 * ratio) as u16;
                rects.push(Rect {
                    x: remaining.x + (remaining.w - w) as i16,
                    w,
                    ..remaining
                });
                remaining.w -= w;
            }
            _ => {
                let h = (remaining.h as f64 * ratio) as u16;
                rects.push(Rect {
                    y: remaining.y + (remaining.h - h) as i16,
                    h,
                    ..remaining
                });
                remaining.h -= h;
            }
        }
    }

    rects
}

fn three_column(n: usize, area: Rect, master_count: u16, ratio: f64) -> Vec<Rect> {
    let master_w = (area.w as f64 * ratio) as u16;
    let side_w = (area.w - master_w) / 2;

    // two clients: master centred, second on the right only
    if n == 2 {
        return vec![
            Rect::new(area.x + side_w as i16, area.y, master_w, area.h),
            Rect::new(area.x + (side_w + master_w) as i16, area.y, side_w, area.h),
        ];
    }

    let m = effective_master(master_count, n);
    centered_columns(n, area, m, master_w, side_w)
}

fn centered_master(n: usize, area: Rect, master_count: u16, ratio: f64) -> Vec<Rect> {
    let m = effective_master(master_count, n);
    let master_w = (area.w as f64 * ratio) as u16;
    let side_w = (area.w - master_w) / 2;

    centered_columns(n, area, m, master_w, side_w)
}

// Master bands in a centred column with the remaining clients alternating,
// left column first, between the two side columns.
fn centered_columns(n: usize, area: Rect, m: usize, master_w: u16, side_w: u16) -> Vec<Rect> {
    let s = n - m;

    let master_col = Rect::new(area.x + side_w as i16, area.y, master_w, area.h);
    if s == 0 {
        return master_col.as_rows(m as u16);
    }

    let mut rects = vec![Rect::default(); n];
    for (i, r) in master_col.as_rows(m as u16).into_iter().enumerate() {
        rects[i] = r;
    }

    let left: Vec<usize> = (m..n).filter(|i| (i - m) % 2 == 0).collect();
    let right: Vec<usize> = (m..n).filter(|i| (i - m) % 2 == 1).collect();

    let left_col = Rect::new(area.x, area.y, side_w, area.h);
    for (band, &i) in left_col.as_rows(left.len() as u16).iter().zip(&left) {
        rects[i] = *band;
    }

    let right_col = Rect::new(area.x + (side_w + master_w) as i16, area.y, side_w, area.h);
    for (band, &i) in right_col.as_rows(right.len() as u16).iter().zip(&right) {
        rects[i] = *band;
    }

    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use simple_test_case::test_case;

    const AREA: Rect = Rect::new(0, 0, 1000, 800);

    #[test]
    fn tall_two_clients_splits_at_ratio() {
        let l = Layout::tall();
        let rects = l.arrange(2, AREA);

        assert_eq!(
            rects,
            vec![Rect::new(0, 0, 500, 800), Rect::new(500, 0, 500, 800)]
        );
    }

    #[test]
    fn tall_stacks_remaining_clients() {
        let l = Layout::Tall {
            master_count: 1,
            ratio: 0.6,
        };
        let rects = l.arrange(3, AREA);

        assert_eq!(
            rects,
            vec![
                Rect::new(0, 0, 600, 800),
                Rect::new(600, 0, 400, 400),
                Rect::new(600, 400, 400, 400),
            ]
        );
    }

    #[test]
    fn tall_all_master_uses_full_width() {
        let l = Layout::Tall {
            master_count: 3,
            ratio: 0.5,
        };
        let rects = l.arrange(2, AREA);

        assert!(rects.iter().all(|r| r.w == AREA.w));
    }

    #[test]
    fn full_gives_every_client_the_whole_area() {
        let rects = Layout::full().arrange(4, AREA);

        assert_eq!(rects, vec![AREA; 4]);
    }

    #[test_case(2, 2, 1; "two in one row")]
    #[test_case(4, 2, 2; "two by two")]
    #[test_case(5, 3, 2; "five in three columns")]
    #[test_case(9, 3, 3; "three by three")]
    #[test]
    fn grid_dimensions(n: usize, cols: u16, rows: u16) {
        let rects = Layout::grid().arrange(n, AREA);

        assert_eq!(rects.len(), n);
        assert!(rects.iter().all(|r| r.w == AREA.w / cols));
        assert!(rects.iter().all(|r| r.h == AREA.h / rows));
    }

    #[test]
    fn spiral_last_client_takes_remainder() {
        let rects = Layout::spiral().arrange(3, AREA);

        assert_eq!(
            rects,
            vec![
                Rect::new(0, 0, 500, 800),
                Rect::new(500, 0, 500, 400),
                Rect::new(500, 400, 500, 400),
            ]
        );
    }

    #[test]
    fn three_column_two_clients_uses_right_side() {
        let rects = Layout::three_column().arrange(2, AREA);

        assert_eq!(
            rects,
            vec![Rect::new(250, 0, 500, 800), Rect::new(750, 0, 250, 800)]
        );
    }

    #[test]
    fn three_column_stack_alternates_left_first() {
        let rects = Layout::three_column().arrange(4, AREA);

        // master centred, first stack client left, second right, third left
        assert_eq!(rects[0], Rect::new(250, 0, 500, 800));
        assert_eq!(rects[1].x, 0);
        assert_eq!(rects[2].x, 750);
        assert_eq!(rects[3].x, 0);
    }

    #[test]
    fn centered_master_alternates_sides() {
        let l = Layout::centered_master();
        let rects = l.arrange(3, AREA);

        assert_eq!(rects[0], Rect::new(200, 0, 600, 800));
        assert_eq!(rects[1], Rect::new(0, 0, 200, 800));
        assert_eq!(rects[2], Rect::new(800, 0, 200, 800));
    }

    #[test]
    fn shrink_then_expand_is_identity_within_bounds() {
        let mut l = Layout::tall();
        l.handle_message(Message::Shrink);
        l.handle_message(Message::Expand);

        match l {
            Layout::Tall { ratio, .. } => assert!((ratio - 0.5).abs() < 1e-9),
            _ => unreachable!(),
        }
    }

    #[test]
    fn dec_master_stops_at_one() {
        let mut l = Layout::tall();
        l.handle_message(Message::DecMaster);
        l.handle_message(Message::DecMaster);

        assert_eq!(
            l,
            Layout::Tall {
                master_count: 1,
                ratio: 0.5
            }
        );
    }

    #[test]
    fn messages_are_ignored_by_parameterless_layouts() {
        for mut l in [Layout::full(), Layout::grid()] {
            let before = l;
            for m in [
                Message::Shrink,
                Message::Expand,
                Message::IncMaster,
                Message::DecMaster,
            ] {
                l.handle_message(m);
            }
            assert_eq!(l, before);
        }
    }

    // quickcheck plumbing: layouts with arbitrary (in-bounds) parameters

    impl Arbitrary for Layout {
        fn arbitrary(g: &mut Gen) -> Self {
            let master_count = u16::arbitrary(g) % 4 + 1;
            let ratio = 0.2 + (u8::arbitrary(g) as f64 / 255.0) * 0.6;

            match u8::arbitrary(g) % 6 {
                0 => Layout::Tall {
                    master_count,
                    ratio,
                },
                1 => Layout::Full,
                2 => Layout::Grid,
                3 => Layout::Spiral { ratio },
                4 => Layout::ThreeColumn {
                    master_count,
                    ratio,
                },
                _ => Layout::CenteredMaster {
                    master_count,
                    ratio,
                },
            }
        }
    }

    #[quickcheck]
    fn arrange_returns_one_rect_per_client(l: Layout, n: usize) -> bool {
        let n = n % 20;

        l.arrange(n, AREA).len() == n
    }

    #[quickcheck]
    fn arranged_rects_are_contained_in_the_area(l: Layout, n: usize) -> bool {
        let n = n % 20;

        l.arrange(n, AREA).iter().all(|r| AREA.contains(r))
    }

    #[quickcheck]
    fn single_client_takes_the_full_area(l: Layout) -> bool {
        l.arrange(1, AREA) == vec![AREA]
    }
}
