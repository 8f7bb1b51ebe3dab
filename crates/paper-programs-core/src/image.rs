use nalgebra::Point2;

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Interleaved 8-bit RGB frame.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h*3
}

#[derive(Clone, Debug)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbImage {
    /// Solid-color image.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let data = rgb.iter().copied().cycle().take(width * height * 3).collect();
        Self {
            width,
            height,
            data,
        }
    }

    pub fn view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Paint a filled disk; pixels whose centers lie within `radius` of
    /// `center` are overwritten.
    pub fn fill_disk(&mut self, center: Point2<f64>, radius: f64, rgb: [u8; 3]) {
        let x0 = (center.x - radius).floor().max(0.0) as usize;
        let y0 = (center.y - radius).floor().max(0.0) as usize;
        let x1 = ((center.x + radius).ceil() as usize).min(self.width.saturating_sub(1));
        let y1 = ((center.y + radius).ceil() as usize).min(self.height.saturating_sub(1));
        let r2 = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= r2 {
                    let idx = (y * self.width + x) * 3;
                    self.data[idx..idx + 3].copy_from_slice(&rgb);
                }
            }
        }
    }
}

impl<'a> RgbImageView<'a> {
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width + x) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Luma conversion (ITU-R BT.601 weights).
    pub fn to_gray(&self) -> GrayImage {
        let data = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let y = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                y.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

#[inline]
fn get_gray(src: &GrayImageView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_gray(src, x0, y0) as f32;
    let p10 = get_gray(src, x0 + 1, y0) as f32;
    let p01 = get_gray(src, x0, y0 + 1) as f32;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayImageView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).clamp(0.0, 255.0) as u8
}

/// Shrink by `factor` (>= 1) with bilinear sampling at target pixel centers.
pub fn downscale_gray(src: &GrayImageView<'_>, factor: f32) -> GrayImage {
    if factor <= 1.0 {
        return GrayImage {
            width: src.width,
            height: src.height,
            data: src.data.to_vec(),
        };
    }
    let out_w = ((src.width as f32 / factor) as usize).max(1);
    let out_h = ((src.height as f32 / factor) as usize).max(1);
    let mut data = Vec::with_capacity(out_w * out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let sx = (x as f32 + 0.5) * factor - 0.5;
            let sy = (y as f32 + 0.5) * factor - 0.5;
            data.push(sample_bilinear_u8(src, sx, sy));
        }
    }
    GrayImage {
        width: out_w,
        height: out_h,
        data,
    }
}

/// Mean RGB inside the disk of diameter `size` centered at `center`.
///
/// The sampled radius is `size / 2 - 1` so the dark rim of a printed dot does
/// not bleed into the mean. Returns `None` when no pixel falls inside.
pub fn mean_color_in_disk(
    src: &RgbImageView<'_>,
    center: Point2<f64>,
    size: f64,
) -> Option<[f64; 3]> {
    let radius = (size / 2.0 - 1.0).max(0.5);
    let x0 = (center.x - radius).floor().max(0.0) as usize;
    let y0 = (center.y - radius).floor().max(0.0) as usize;
    let x1 = (center.x + radius).ceil().min(src.width as f64 - 1.0);
    let y1 = (center.y + radius).ceil().min(src.height as f64 - 1.0);
    if x1 < 0.0 || y1 < 0.0 {
        return None;
    }
    let (x1, y1) = (x1 as usize, y1 as usize);

    let r2 = radius * radius;
    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 - center.x;
            let dy = y as f64 - center.y;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let px = src.pixel(x, y);
            for (acc, v) in sum.iter_mut().zip(px) {
                *acc += v as f64;
            }
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    Some([sum[0] / n, sum[1] / n, sum[2] / n])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_mean_reads_painted_color() {
        let mut img = RgbImage::filled(40, 40, [255, 255, 255]);
        img.fill_disk(Point2::new(20.0, 20.0), 6.0, [120, 40, 20]);
        let mean = mean_color_in_disk(&img.view(), Point2::new(20.0, 20.0), 12.0).unwrap();
        assert_eq!(mean.map(|v| v.round() as u8), [120, 40, 20]);
    }

    #[test]
    fn disk_outside_frame_has_no_mean() {
        let img = RgbImage::filled(8, 8, [0, 0, 0]);
        assert!(mean_color_in_disk(&img.view(), Point2::new(-50.0, -50.0), 4.0).is_none());
    }

    #[test]
    fn gray_conversion_and_downscale_keep_flat_values() {
        let img = RgbImage::filled(16, 8, [100, 100, 100]);
        let gray = img.view().to_gray();
        assert!(gray.data.iter().all(|&v| v == 100));

        let small = downscale_gray(&gray.view(), 4.0);
        assert_eq!((small.width, small.height), (4, 2));
        assert!(small.data.iter().all(|&v| v == 100));
    }
}
