//! Overlay of detected lines on a copy of the frame.

use crate::AnnotateParams;
use sheet_count_core::{HorizontalLine, LineSegment, RgbFrame};

/// Copy `frame` and draw every line 1 px wide in the highlight color.
pub fn draw_lines(frame: &RgbFrame, lines: &[HorizontalLine], params: &AnnotateParams) -> RgbFrame {
    let mut out = frame.clone();
    for line in lines {
        draw_segment(&mut out, line.segment(), params.color);
    }
    out
}

/// Bresenham rasterization; pixels outside the frame are skipped.
pub fn draw_segment(frame: &mut RgbFrame, seg: &LineSegment, color: [u8; 3]) {
    let (mut x, mut y) = (seg.x1 as i64, seg.y1 as i64);
    let (x2, y2) = (seg.x2 as i64, seg.y2 as i64);
    let dx = (x2 - x).abs();
    let dy = -(y2 - y).abs();
    let sx = if x < x2 { 1 } else { -1 };
    let sy = if y < y2 { 1 } else { -1 };
    let mut err = dx + dy;

    let (w, h) = (frame.width() as i64, frame.height() as i64);
    loop {
        if (0..w).contains(&x) && (0..h).contains(&y) {
            frame.put_pixel(x as usize, y as usize, color);
        }
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
