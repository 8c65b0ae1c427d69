//! Linear maps of sequence features, used by digestion reports to show where
//! each band comes from in the digested record.

use super::RenderOptions;
use super::scene::{HAnchor, Line, Rect, Scene, Text, VAnchor};
use crate::core::io::record::Strand;
use crate::core::models::style::{Color, FontSpec, FontWeight};

const TRACK_MARGIN: f64 = 20.0;
const TITLE_HEIGHT: f64 = 36.0;
const LEVEL_HEIGHT: f64 = 30.0;
const FEATURE_HEIGHT: f64 = 12.0;
const RULER_HEIGHT: f64 = 24.0;
const AXIS_COLOR: Color = Color::rgb(0x00, 0x00, 0x00);
const GUIDE_COLOR: Color = Color::rgb(0x00, 0x00, 0x00);
/// Space between a lane plot and the tracks on a report page.
const PAGE_GUTTER: f64 = 40.0;
const TRACK_WIDTH: f64 = 900.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackFeature {
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub label: Option<String>,
    pub color: Color,
}

/// Features of one record drawn along a horizontal sequence axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTrack {
    pub title: Option<String>,
    pub title_size: f64,
    pub sequence_length: usize,
    pub features: Vec<TrackFeature>,
    /// Positions marked by dotted vertical lines.
    pub guides: Vec<i64>,
    pub show_ruler: bool,
}

impl FeatureTrack {
    pub fn new(sequence_length: usize) -> Self {
        Self {
            title: None,
            title_size: 14.0,
            sequence_length,
            features: Vec::new(),
            guides: Vec::new(),
            show_ruler: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>, size: f64) -> Self {
        self.title = Some(title.into());
        self.title_size = size;
        self
    }

    pub fn with_features(mut self, features: Vec<TrackFeature>) -> Self {
        self.features = features;
        self
    }

    pub fn with_guides(mut self, guides: Vec<i64>) -> Self {
        self.guides = guides;
        self
    }

    pub fn with_ruler(mut self, show: bool) -> Self {
        self.show_ruler = show;
        self
    }

    /// Replaces every feature crossing the origin (negative `start`) by its
    /// two pieces on either side of the origin.
    pub fn split_wrapping_features(&mut self) {
        let length = self.sequence_length as i64;
        let features = std::mem::take(&mut self.features);
        for feature in features {
            if feature.start < 0 {
                self.features.push(TrackFeature {
                    start: length + feature.start,
                    end: length,
                    ..feature.clone()
                });
                self.features.push(TrackFeature {
                    start: 0,
                    ..feature
                });
            } else {
                self.features.push(feature);
            }
        }
    }
}

/// Assigns each feature the lowest level where it overlaps nothing already
/// placed, in order of start position. Returns the level of every feature in
/// input order, and the number of levels used.
fn assign_levels(features: &[TrackFeature]) -> (Vec<usize>, usize) {
    let mut order: Vec<usize> = (0..features.len()).collect();
    order.sort_by_key(|&i| (features[i].start, features[i].end));
    let mut level_ends: Vec<i64> = Vec::new();
    let mut levels = vec![0; features.len()];
    for i in order {
        let feature = &features[i];
        let level = match level_ends.iter().position(|&end| end <= feature.start) {
            Some(level) => level,
            None => {
                level_ends.push(i64::MIN);
                level_ends.len() - 1
            }
        };
        level_ends[level] = feature.end;
        levels[i] = level;
    }
    (levels, level_ends.len())
}

fn ruler_step(length: usize) -> i64 {
    let raw = (length as f64 / 8.0).max(1.0);
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);
    step as i64
}

/// Draws a track `width` pixels wide. Features with a negative start must be
/// split beforehand or are drawn from the origin.
pub fn feature_track(track: &FeatureTrack, width: f64, options: &RenderOptions) -> Scene {
    let (levels, level_count) = assign_levels(&track.features);
    let title_height = if track.title.is_some() { TITLE_HEIGHT } else { 0.0 };
    let ruler_height = if track.show_ruler { RULER_HEIGHT } else { 0.0 };
    let body_height = level_count.max(1) as f64 * LEVEL_HEIGHT;
    let mut scene = Scene::new(
        width + 2.0 * TRACK_MARGIN,
        title_height + body_height + ruler_height + TRACK_MARGIN,
    );

    let length = track.sequence_length.max(1) as f64;
    let x = |position: i64| TRACK_MARGIN + position as f64 / length * width;
    let body_top = title_height;
    let axis_y = body_top + body_height;
    let font = |size: f64| FontSpec {
        size: size * options.font_scale,
        ..FontSpec::default()
    };

    for &guide in &track.guides {
        scene.push(Line::new((x(guide), body_top), (x(guide), axis_y), GUIDE_COLOR, 0.5).dashed());
    }

    scene.push(Line::new((x(0), axis_y), (x(track.sequence_length as i64), axis_y), AXIS_COLOR, 1.0));

    for (feature, level) in track.features.iter().zip(levels) {
        let start = feature.start.max(0);
        let y = axis_y - (level as f64 + 0.5) * LEVEL_HEIGHT;
        scene.push(
            Rect::new(x(start), y - FEATURE_HEIGHT / 2.0, x(feature.end) - x(start), FEATURE_HEIGHT, feature.color)
                .with_corner_radius(2.0),
        );
        if let Some(label) = &feature.label {
            scene.push(
                Text::new((x(start) + x(feature.end)) / 2.0, y, label, font(9.0))
                    .anchored(HAnchor::Middle, VAnchor::Middle),
            );
        }
    }

    if track.show_ruler {
        let step = ruler_step(track.sequence_length);
        let mut position = 0;
        while position <= track.sequence_length as i64 {
            scene.push(Line::new((x(position), axis_y), (x(position), axis_y + 4.0), AXIS_COLOR, 1.0));
            scene.push(
                Text::new(x(position), axis_y + 6.0, position.to_string(), font(8.0))
                    .anchored(HAnchor::Middle, VAnchor::Top),
            );
            position += step;
        }
    }

    if let Some(title) = &track.title {
        let title_font = FontSpec {
            weight: FontWeight::Bold,
            ..font(track.title_size)
        };
        scene.push(
            Text::new(TRACK_MARGIN + width / 2.0, TITLE_HEIGHT - 8.0, title, title_font)
                .anchored(HAnchor::Middle, VAnchor::Bottom),
        );
    }
    scene
}

/// A report page: the lane plot on the left, the record map above the band
/// map on the right.
pub fn record_page(
    lane: &Scene,
    record_track: &FeatureTrack,
    band_track: &FeatureTrack,
    options: &RenderOptions,
) -> Scene {
    let record = feature_track(record_track, TRACK_WIDTH, options);
    let bands = feature_track(band_track, TRACK_WIDTH, options);
    let tracks_height = record.height + bands.height;
    let mut page = Scene::new(
        lane.width + PAGE_GUTTER + record.width.max(bands.width),
        lane.height.max(tracks_height),
    );
    page.push(Rect::new(0.0, 0.0, page.width, page.height, Color::WHITE));
    page.place(lane, 0.0, 0.0);
    let left = lane.width + PAGE_GUTTER;
    page.place(&record, left, 0.0);
    page.place(&bands, left, record.height);
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(start: i64, end: i64) -> TrackFeature {
        TrackFeature {
            start,
            end,
            strand: Strand::Forward,
            label: None,
            color: Color::BLACK,
        }
    }

    #[test]
    fn overlapping_features_stack_on_new_levels() {
        let features = vec![feature(0, 100), feature(50, 150), feature(100, 200), feature(120, 130)];
        let (levels, count) = assign_levels(&features);
        assert_eq!(levels, vec![0, 1, 0, 2]);
        assert_eq!(count, 3);
    }

    #[test]
    fn wrapping_features_split_at_origin() {
        let mut track = FeatureTrack::new(1000).with_features(vec![feature(-100, 50), feature(200, 300)]);
        track.split_wrapping_features();
        let spans: Vec<_> = track.features.iter().map(|f| (f.start, f.end)).collect();
        assert_eq!(spans, vec![(900, 1000), (0, 50), (200, 300)]);
    }

    #[test]
    fn ruler_steps_are_round_numbers() {
        assert_eq!(ruler_step(1000), 200);
        assert_eq!(ruler_step(2686), 500);
        assert_eq!(ruler_step(5), 1);
    }

    #[test]
    fn track_draws_guides_features_and_title() {
        let track = FeatureTrack::new(1000)
            .with_title("pUC19 (circular)", 22.0)
            .with_features(vec![feature(0, 500)])
            .with_guides(vec![0, 500])
            .with_ruler(false);
        let scene = feature_track(&track, 500.0, &RenderOptions::default());
        assert_eq!(scene.lines().filter(|l| l.dashed).count(), 2);
        let rect = scene.rects().next().unwrap();
        assert!((rect.width - 250.0).abs() < 1e-9);
        assert!(scene.texts().any(|t| t.content == "pUC19 (circular)"));
    }

    #[test]
    fn page_places_tracks_right_of_the_lane() {
        let lane = Scene::new(200.0, 600.0);
        let track = FeatureTrack::new(100).with_features(vec![feature(0, 10)]);
        let page = record_page(&lane, &track, &track, &RenderOptions::default());
        assert_eq!(page.height, 600.0);
        assert!(page.rects().skip(1).all(|r| r.x >= 240.0));
    }
}
