use crate::extractor::frame::GrayFrame;

/// Divide-by-zero guard on the bounding-box height.
pub const RATIO_EPSILON: f64 = 1e-6;

/// Tuning constants for the lip-region heuristic. The threshold and area
/// gate are empirically tuned values carried over from the trained data
/// this tool was calibrated against.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Intensities at or below this value count as lip-candidate pixels.
    pub intensity_threshold: u8,
    /// A region must cover strictly more pixels than this to qualify.
    pub min_region_area: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            intensity_threshold: 60,
            min_region_area: 100,
        }
    }
}

/// Largest dark region found in a face ROI, in ROI coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub area: u32,
}

impl Region {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / (self.height as f64 + RATIO_EPSILON)
    }
}

pub struct LipSegmenter {
    config: SegmenterConfig,
}

impl LipSegmenter {
    pub fn new() -> Self {
        Self::with_config(SegmenterConfig::default())
    }

    pub fn with_config(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Mouth aspect ratio of the ROI: binarize, denoise, take the widest
    /// qualifying dark region. `None` when nothing qualifies.
    pub fn lip_ratio(&self, roi: &GrayFrame) -> Option<f64> {
        if roi.is_empty() {
            return None;
        }

        let mut mask = binarize_inverted(roi, self.config.intensity_threshold);
        close3x3(&mut mask, roi.width, roi.height);
        open3x3(&mut mask, roi.width, roi.height);

        let region = largest_region(&mask, roi.width, roi.height)?;
        if region.area > self.config.min_region_area {
            Some(region.aspect_ratio())
        } else {
            None
        }
    }
}

impl Default for LipSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Inverted fixed-threshold segmentation: dark pixels become foreground.
fn binarize_inverted(frame: &GrayFrame, threshold: u8) -> Vec<u8> {
    frame
        .data
        .iter()
        .map(|&v| if v <= threshold { 255 } else { 0 })
        .collect()
}

/// 3x3 closing: dilate then erode. Fills pinholes inside the lip blob.
fn close3x3(mask: &mut Vec<u8>, width: u32, height: u32) {
    let dilated = dilate3x3(mask, width, height);
    *mask = erode3x3(&dilated, width, height);
}

/// 3x3 opening: erode then dilate. Drops speckle noise.
fn open3x3(mask: &mut Vec<u8>, width: u32, height: u32) {
    let eroded = erode3x3(mask, width, height);
    *mask = dilate3x3(&eroded, width, height);
}

fn dilate3x3(mask: &[u8], width: u32, height: u32) -> Vec<u8> {
    let w = width as i64;
    let h = height as i64;
    let mut out = vec![0u8; mask.len()];

    for y in 0..h {
        for x in 0..w {
            'probe: for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    let ny = y + dy;
                    let nx = x + dx;
                    if ny < 0 || ny >= h || nx < 0 || nx >= w {
                        continue;
                    }
                    if mask[(ny * w + nx) as usize] != 0 {
                        out[(y * w + x) as usize] = 255;
                        break 'probe;
                    }
                }
            }
        }
    }

    out
}

fn erode3x3(mask: &[u8], width: u32, height: u32) -> Vec<u8> {
    let w = width as i64;
    let h = height as i64;
    let mut out = vec![0u8; mask.len()];

    for y in 0..h {
        for x in 0..w {
            let mut keep = true;
            // neighbors outside the image never veto a border pixel
            'probe: for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    let ny = y + dy;
                    let nx = x + dx;
                    if ny < 0 || ny >= h || nx < 0 || nx >= w {
                        continue;
                    }
                    if mask[(ny * w + nx) as usize] == 0 {
                        keep = false;
                        break 'probe;
                    }
                }
            }
            if keep {
                out[(y * w + x) as usize] = mask[(y * w + x) as usize];
            }
        }
    }

    out
}

/// Largest 8-connected foreground component with its bounding box.
fn largest_region(mask: &[u8], width: u32, height: u32) -> Option<Region> {
    let w = width as usize;
    let h = height as usize;
    let mut visited = vec![false; mask.len()];
    let mut best: Option<Region> = None;
    let mut queue: Vec<(usize, usize)> = Vec::new();

    for start_y in 0..h {
        for start_x in 0..w {
            let start_idx = start_y * w + start_x;
            if mask[start_idx] == 0 || visited[start_idx] {
                continue;
            }

            visited[start_idx] = true;
            queue.clear();
            queue.push((start_x, start_y));

            let mut area = 0u32;
            let (mut min_x, mut max_x) = (start_x, start_x);
            let (mut min_y, mut max_y) = (start_y, start_y);

            while let Some((x, y)) = queue.pop() {
                area += 1;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);

                for dy in -1..=1i64 {
                    for dx in -1..=1i64 {
                        let ny = y as i64 + dy;
                        let nx = x as i64 + dx;
                        if ny < 0 || ny >= h as i64 || nx < 0 || nx >= w as i64 {
                            continue;
                        }
                        let nidx = ny as usize * w + nx as usize;
                        if mask[nidx] != 0 && !visited[nidx] {
                            visited[nidx] = true;
                            queue.push((nx as usize, ny as usize));
                        }
                    }
                }
            }

            let region = Region {
                x: min_x as u32,
                y: min_y as u32,
                width: (max_x - min_x + 1) as u32,
                height: (max_y - min_y + 1) as u32,
                area,
            };
            if best.map_or(true, |b| region.area > b.area) {
                best = Some(region);
            }
        }
    }

    best
}
