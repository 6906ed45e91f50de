use bevy::prelude::*;
use constants::timeline::{FVC_SPAN, LABEL_OFFSET_Y, WEEK_SPAN};

use super::prediction::PredictionPoint;

/// Curve-local positions of a prediction sequence. The curve root applies
/// the display anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    /// One vertex per prediction, in input order.
    pub points: Vec<Vec3>,
    /// Label placeholder positions, each above its marker.
    pub labels: Vec<Vec3>,
}

/// Normalise weeks onto `[-5, 5]` and FVC onto `[-2.5, 2.5]` against their
/// maxima, floored at 1 so degenerate inputs stay finite.
pub fn layout_predictions(predictions: &[PredictionPoint]) -> TimelineLayout {
    let max_week = predictions
        .iter()
        .map(|p| p.week as f32)
        .fold(1.0, f32::max);
    let max_fvc = predictions
        .iter()
        .map(|p| p.fvc_predicted)
        .fold(1.0, f32::max);

    let points: Vec<Vec3> = predictions
        .iter()
        .map(|p| {
            Vec3::new(
                p.week as f32 / max_week * WEEK_SPAN - WEEK_SPAN / 2.0,
                p.fvc_predicted / max_fvc * FVC_SPAN - FVC_SPAN / 2.0,
                0.0,
            )
        })
        .collect();
    let labels = points
        .iter()
        .map(|point| *point + Vec3::Y * LABEL_OFFSET_Y)
        .collect();

    TimelineLayout { points, labels }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(week: u32, fvc: f32) -> PredictionPoint {
        PredictionPoint {
            week,
            fvc_predicted: fvc,
            confidence: 95.0,
        }
    }

    #[test]
    fn first_and_last_weeks_span_the_axis() {
        let layout = layout_predictions(&[point(0, 2800.0), point(52, 2400.0)]);

        assert_eq!(layout.points.len(), 2);
        assert_eq!(layout.points[0].x, -5.0);
        assert_eq!(layout.points[1].x, 5.0);
        assert_eq!(layout.points[0].y, 2.5);
        let expected = 2400.0 / 2800.0 * 5.0 - 2.5;
        assert!((layout.points[1].y - expected).abs() < 1e-5);
        assert!(layout.points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn degenerate_inputs_stay_finite() {
        let zeros = layout_predictions(&[point(0, 0.0), point(0, 0.0), point(0, 0.0)]);
        for p in &zeros.points {
            assert!(p.is_finite());
            assert_eq!(*p, Vec3::new(-5.0, -2.5, 0.0));
        }

        let equal = layout_predictions(&[point(8, 3000.0), point(8, 3000.0)]);
        for p in &equal.points {
            assert_eq!(*p, Vec3::new(5.0, 2.5, 0.0));
        }
    }

    #[test]
    fn points_follow_input_order_within_display_bounds() {
        let input = [point(40, 2100.0), point(4, 2900.0), point(20, 2500.0)];
        let layout = layout_predictions(&input);

        for (p, x) in layout.points.iter().zip([5.0, -4.0, 0.0]) {
            assert!((p.x - x).abs() < 1e-5);
        }
        for p in &layout.points {
            assert!((-5.0..=5.0).contains(&p.x));
            assert!((-2.5..=2.5).contains(&p.y));
        }
    }

    #[test]
    fn labels_sit_above_their_markers() {
        let layout = layout_predictions(&[point(0, 1.0), point(10, 2.0)]);
        for (label, marker) in layout.labels.iter().zip(&layout.points) {
            assert_eq!(*label - *marker, Vec3::Y * LABEL_OFFSET_Y);
        }
    }

    #[test]
    fn empty_input_has_no_geometry() {
        let layout = layout_predictions(&[]);
        assert!(layout.points.is_empty());
        assert!(layout.labels.is_empty());
    }
}
