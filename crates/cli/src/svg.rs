use std::io::Write;

use smileforge::{Outline, PhotoSize};

/// Writes `outline` as an svg polyline over a frame the size of the photo, so the file
/// can be laid directly over the photo.
pub fn write_outline<W: Write>(f: &mut W, outline: &Outline, photo: PhotoSize) -> std::io::Result<()> {
    writeln!(
        f,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        photo.width, photo.height, photo.width, photo.height
    )?;
    writeln!(f, "  <rect width=\"100%\" height=\"100%\" fill=\"none\" stroke=\"#ccc\"/>")?;
    let (x0, x1) = outline.limits_x();
    let (y0, y1) = outline.limits_y();
    writeln!(f, "  <!-- {} points, x {}..{}, y {}..{} -->", outline.points().len(), x0, x1, y0, y1)?;
    write!(f, "  <polyline fill=\"none\" stroke=\"#000\" stroke-width=\"2\" points=\"")?;
    for (i, p) in outline.points().iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{},{}", p.x, p.y)?;
    }
    writeln!(f, "\"/>")?;
    writeln!(f, "</svg>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector2;

    #[test]
    fn polyline_lists_points() {
        let outline = Outline::from_points(vec![Vector2::new(1.0, 2.0), Vector2::new(3.5, 4.0)]);
        let mut out = Vec::new();
        write_outline(&mut out, &outline, PhotoSize::new(40.0, 30.0)).unwrap();
        let svg = String::from_utf8(out).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("points=\"1,2 3.5,4\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
