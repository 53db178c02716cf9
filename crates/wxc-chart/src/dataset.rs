use wxc_weather::Variable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Colour with a fractional alpha, as in CSS `rgba()`.
    pub fn with_alpha(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self::new(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    pub fn to_paint(self) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(self.r, self.g, self.b, self.a);
        paint.anti_alias = true;
        paint
    }

    /// CSS hex notation, e.g. `#ff9100`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Value axes sharing the time axis. Ranges are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Temperature and wind speed, 0..40, left
    Primary,
    /// Humidity, cloud cover and rain probability, 0..100, right
    Secondary,
    /// Rainfall, 0..4, right
    Tertiary,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Primary, Axis::Secondary, Axis::Tertiary];

    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Primary => (0.0, 40.0),
            Self::Secondary => (0.0, 100.0),
            Self::Tertiary => (0.0, 4.0),
        }
    }

    pub fn tick_step(self) -> f64 {
        match self {
            Self::Primary => 5.0,
            Self::Secondary => 20.0,
            Self::Tertiary => 1.0,
        }
    }

    /// Tick values from min to max inclusive
    pub fn ticks(self) -> Vec<f64> {
        let (min, max) = self.range();
        let step = self.tick_step();
        let count = ((max - min) / step).round() as usize;
        (0..=count).map(|i| min + i as f64 * step).collect()
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Primary => "Temperature (°C) / Wind (km/h)",
            Self::Secondary => "Relative humidity (%) / Cloud cover (%) / Rain probability (%)",
            Self::Tertiary => "Rainfall (mm/h)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DatasetKind {
    Line { width: f32 },
    /// Line filled down to the axis origin
    Area,
    /// `bar_fraction` of each time bucket is filled, centred
    Bar { bar_fraction: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: &'static str,
    pub variable: Variable,
    pub kind: DatasetKind,
    pub axis: Axis,
    pub color: Rgba,
}

/// The six plotted series in declaration order.
///
/// Wind direction is not plotted as a series; it drives the arrow overlay.
pub fn standard_datasets() -> Vec<Dataset> {
    vec![
        Dataset {
            label: "Temperature (°C)",
            variable: Variable::Temperature,
            kind: DatasetKind::Line { width: 2.0 },
            axis: Axis::Primary,
            color: Rgba::rgb(255, 145, 0),
        },
        Dataset {
            label: "Relative humidity (%)",
            variable: Variable::RelativeHumidity,
            kind: DatasetKind::Line { width: 2.0 },
            axis: Axis::Secondary,
            color: Rgba::rgb(35, 186, 0),
        },
        Dataset {
            label: "Wind speed (km/h)",
            variable: Variable::WindSpeed,
            kind: DatasetKind::Line { width: 2.0 },
            axis: Axis::Primary,
            color: Rgba::with_alpha(255, 255, 255, 0.5),
        },
        Dataset {
            label: "Cloud cover (%)",
            variable: Variable::CloudCover,
            kind: DatasetKind::Area,
            axis: Axis::Secondary,
            color: Rgba::with_alpha(120, 120, 120, 0.3),
        },
        Dataset {
            label: "Rain probability (%)",
            variable: Variable::PrecipitationProbability,
            kind: DatasetKind::Area,
            axis: Axis::Secondary,
            color: Rgba::with_alpha(0, 111, 255, 0.45),
        },
        Dataset {
            label: "Rainfall (mm/h)",
            variable: Variable::Precipitation,
            kind: DatasetKind::Bar { bar_fraction: 0.75 },
            axis: Axis::Tertiary,
            // deepskyblue
            color: Rgba::rgb(0, 191, 255),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_ranges() {
        assert_eq!(Axis::Primary.range(), (0.0, 40.0));
        assert_eq!(Axis::Secondary.range(), (0.0, 100.0));
        assert_eq!(Axis::Tertiary.range(), (0.0, 4.0));
    }

    #[test]
    fn test_primary_ticks_every_five() {
        let ticks = Axis::Primary.ticks();
        assert_eq!(ticks.len(), 9);
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks.last(), Some(&40.0));
    }

    #[test]
    fn test_series_share_axes() {
        let datasets = standard_datasets();
        let axis_of = |v: Variable| datasets.iter().find(|d| d.variable == v).map(|d| d.axis);

        assert_eq!(axis_of(Variable::Temperature), Some(Axis::Primary));
        assert_eq!(axis_of(Variable::WindSpeed), Some(Axis::Primary));
        assert_eq!(axis_of(Variable::RelativeHumidity), Some(Axis::Secondary));
        assert_eq!(axis_of(Variable::CloudCover), Some(Axis::Secondary));
        assert_eq!(axis_of(Variable::PrecipitationProbability), Some(Axis::Secondary));
        assert_eq!(axis_of(Variable::Precipitation), Some(Axis::Tertiary));
        assert_eq!(axis_of(Variable::WindDirection), None);
    }

    #[test]
    fn test_rgba_alpha() {
        assert_eq!(Rgba::with_alpha(255, 255, 255, 0.5).a, 128);
        assert_eq!(Rgba::rgb(255, 145, 0).to_hex(), "#ff9100");
    }
}
