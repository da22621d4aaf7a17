use crate::canvas::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (x0, y0);

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
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

/// Draw a line `width` pixels thick by stacking parallel offsets
pub fn draw_wide_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32, width: i32) {
    draw_line(canvas, x0, y0, x1, y1);
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    for i in 1..width.max(1) {
        // Alternate sides so the stroke stays centered
        let o = if i % 2 == 1 { (i + 1) / 2 } else { -(i / 2) };
        if steep {
            draw_line(canvas, x0 + o, y0, x1 + o, y1);
        } else {
            draw_line(canvas, x0, y0 + o, x1, y1 + o);
        }
    }
}

/// Draw a filled circle (city dots)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}
