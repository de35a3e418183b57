// Color ramp used to turn the grayscale (alpha-only) heatmap into a colored one.
// A `Gradient` is the continuous ramp; a `GradientTable` is that ramp sampled
// at 256 positions so colorizing is a single index per pixel.

use crate::color::parse_color;
use crate::error::{Error, Result};
use crate::types::Rgba;

/// blue → cyan → lime → yellow → red
pub const DEFAULT_GRADIENT: [(f32, &str); 5] = [
    (0.4, "blue"),
    (0.6, "cyan"),
    (0.7, "lime"),
    (0.8, "yellow"),
    (1.0, "red"),
];

const DEFAULT_STOPS: [GradientStop; 5] = [
    GradientStop { position: 0.4, color: Rgba::opaque(0, 0, 255) },
    GradientStop { position: 0.6, color: Rgba::opaque(0, 255, 255) },
    GradientStop { position: 0.7, color: Rgba::opaque(0, 255, 0) },
    GradientStop { position: 0.8, color: Rgba::opaque(255, 255, 0) },
    GradientStop { position: 1.0, color: Rgba::opaque(255, 0, 0) },
];

pub const TABLE_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub position: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(position: f32, color: Rgba) -> Self {
        Self { position, color }
    }
}

/// Sorted, de-duplicated color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Build a ramp from stops in any order.
    /// When two stops share a position the later one wins.
    pub fn new(stops: impl IntoIterator<Item = GradientStop>) -> Result<Self> {
        let mut input: Vec<GradientStop> = stops.into_iter().collect();
        if input.is_empty() {
            return Err(Error::InvalidConfig("gradient needs at least one stop".into()));
        }
        if let Some(bad) = input
            .iter()
            .find(|s| !s.position.is_finite() || !(0.0..=1.0).contains(&s.position))
        {
            return Err(Error::InvalidConfig(format!(
                "gradient stop position {} is outside [0, 1]",
                bad.position
            )));
        }

        // Stable sort keeps input order among equal positions.
        input.sort_by(|a, b| a.position.total_cmp(&b.position));

        let mut stops: Vec<GradientStop> = Vec::with_capacity(input.len());
        for s in input {
            match stops.last_mut() {
                Some(last) if last.position == s.position => *last = s,
                _ => stops.push(s),
            }
        }
        Ok(Self { stops })
    }

    /// Build a ramp from `(position, css color)` pairs.
    pub fn from_css<'a>(stops: impl IntoIterator<Item = (f32, &'a str)>) -> Result<Self> {
        let parsed = stops
            .into_iter()
            .map(|(pos, c)| parse_color(c).map(|color| GradientStop::new(pos, color)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(parsed)
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Color at `t`, clamped to the first/last stop outside their range.
    pub fn sample(&self, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t <= first.position {
            return first.color; // flat before the first stop
        }
        if t >= last.position {
            return last.color;  // and after the last
        }

        // First stop strictly beyond t; the one before it starts the segment.
        let hi = self.stops.partition_point(|s| s.position <= t);
        let (a, b) = (self.stops[hi - 1], self.stops[hi]);
        let f = (t - a.position) / (b.position - a.position);
        let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * f).round().clamp(0.0, 255.0) as u8;
        Rgba::new(
            lerp(a.color.r, b.color.r),
            lerp(a.color.g, b.color.g),
            lerp(a.color.b, b.color.b),
            lerp(a.color.a, b.color.a),
        )
    }

    pub fn to_table(&self) -> GradientTable {
        GradientTable::from_gradient(self)
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self { stops: DEFAULT_STOPS.to_vec() }
    }
}

/// 256 colors, indexed by an 8-bit opacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientTable {
    colors: [Rgba; TABLE_SIZE],
}

impl GradientTable {
    pub fn from_gradient(gradient: &Gradient) -> Self {
        let mut colors = [Rgba::TRANSPARENT; TABLE_SIZE];
        for (i, c) in colors.iter_mut().enumerate() {
            *c = gradient.sample(i as f32 / (TABLE_SIZE - 1) as f32);
        }
        tracing::debug!(stops = gradient.stops().len(), "built gradient table");
        Self { colors }
    }

    #[inline]
    pub fn lookup(&self, alpha: u8) -> Rgba {
        self.colors[alpha as usize]
    }

    pub fn colors(&self) -> &[Rgba; TABLE_SIZE] {
        &self.colors
    }
}

impl Default for GradientTable {
    fn default() -> Self {
        Self::from_gradient(&Gradient::default())
    }
}
