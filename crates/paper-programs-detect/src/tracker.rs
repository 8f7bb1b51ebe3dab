//! Cross-frame corner aggregation.
//!
//! Every decoded chain pins one corner of one program for the current frame.
//! Whenever two corners of a program are seen together, the vector between
//! them is stored relative to the chain direction of the first corner. These
//! relations survive across frames and let the tracker place corners that are
//! hidden in later frames, assuming the paper is a rigid rectangle.

use std::collections::BTreeMap;

use nalgebra::{Point2, Vector2};
#[cfg(feature = "tracing")]
use tracing::instrument;

use paper_programs_core::polar_angle;
use paper_programs_dotcode::PaperCorner;

/// Learned offset from one corner to another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerRelation {
    /// Angle of the offset relative to the source corner's chain direction.
    pub angle: f64,
    pub magnitude: f64,
    /// Inferred from the diagonally opposite pair instead of measured.
    pub mirrored: bool,
}

/// One corner seen in the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerObservation {
    pub program: u32,
    pub corner: PaperCorner,
    /// Anchor dot of the chain, camera pixels.
    pub position: Point2<f64>,
    /// From the anchor dot towards the tail dot.
    pub direction: Vector2<f64>,
}

/// A program with all four corners placed this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedQuad {
    pub program: u32,
    /// TL, TR, BR, BL in camera pixels.
    pub points: [Point2<f64>; 4],
    pub predicted: [bool; 4],
}

type Relations = [[Option<CornerRelation>; 4]; 4];

#[derive(Clone, Debug, Default)]
struct ProgramState {
    relations: Relations,
    last_seen: u64,
}

/// Per-session corner aggregator.
///
/// One instance per camera stream; it is not meant to be shared between
/// concurrent streams.
#[derive(Clone, Debug, Default)]
pub struct CornerTracker {
    programs: BTreeMap<u32, ProgramState>,
    frame: u64,
}

impl CornerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of programs with learned state.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Frames processed so far.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    pub fn relation(&self, program: u32, from: PaperCorner, to: PaperCorner) -> Option<CornerRelation> {
        self.programs.get(&program)?.relations[from.index()][to.index()]
    }

    /// Drop everything learned about `program`.
    pub fn forget(&mut self, program: u32) -> bool {
        self.programs.remove(&program).is_some()
    }

    /// Drop programs not observed during the last `max_age` frames.
    pub fn prune_unseen(&mut self, max_age: u64) -> usize {
        let before = self.programs.len();
        let frame = self.frame;
        self.programs
            .retain(|_, state| frame.saturating_sub(state.last_seen) <= max_age);
        before - self.programs.len()
    }

    /// Fold in one frame of observations and return every program whose four
    /// corners are known or predictable, ordered by program id.
    ///
    /// A corner observed twice in one frame keeps the last observation.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, observations), fields(observations = observations.len()))
    )]
    pub fn update(&mut self, observations: &[CornerObservation]) -> Vec<TrackedQuad> {
        self.frame += 1;

        let mut seen: BTreeMap<u32, [Option<(Point2<f64>, Vector2<f64>)>; 4]> = BTreeMap::new();
        for obs in observations {
            seen.entry(obs.program).or_default()[obs.corner.index()] =
                Some((obs.position, obs.direction));
        }

        let mut quads = Vec::new();
        for (&program, corners) in &seen {
            let state = self.programs.entry(program).or_default();
            state.last_seen = self.frame;
            learn_real_relations(&mut state.relations, corners);
            mirror_fill(&mut state.relations);
            if let Some(quad) = complete_quad(program, &state.relations, corners) {
                quads.push(quad);
            }
        }
        quads
    }
}

fn learn_real_relations(relations: &mut Relations, corners: &[Option<(Point2<f64>, Vector2<f64>)>; 4]) {
    for (i, from) in corners.iter().enumerate() {
        let Some((p_i, dir_i)) = from else { continue };
        for (j, to) in corners.iter().enumerate() {
            let Some((p_j, _)) = to else { continue };
            if i == j {
                continue;
            }
            let diff = p_j - p_i;
            relations[i][j] = Some(CornerRelation {
                angle: polar_angle(&diff) - polar_angle(dir_i),
                magnitude: diff.norm(),
                mirrored: false,
            });
        }
    }
}

/// Copy each measured relation `i -> j` onto `i+2 -> j+2` unless that pair
/// has a measured relation of its own.
fn mirror_fill(relations: &mut Relations) {
    for from in PaperCorner::ALL {
        for to in PaperCorner::ALL {
            let Some(rel) = relations[from.index()][to.index()] else {
                continue;
            };
            if rel.mirrored {
                continue;
            }
            let target = &mut relations[from.opposite().index()][to.opposite().index()];
            if target.map_or(true, |t| t.mirrored) {
                *target = Some(CornerRelation {
                    mirrored: true,
                    ..rel
                });
            }
        }
    }
}

fn complete_quad(
    program: u32,
    relations: &Relations,
    corners: &[Option<(Point2<f64>, Vector2<f64>)>; 4],
) -> Option<TrackedQuad> {
    let mut points = [Point2::origin(); 4];
    let mut predicted = [false; 4];
    for j in 0..4 {
        if let Some((p, _)) = corners[j] {
            points[j] = p;
            continue;
        }
        let mut sum = Vector2::zeros();
        let mut count = 0usize;
        for (i, known) in corners.iter().enumerate() {
            let (Some((p_i, dir_i)), Some(rel)) = (known, relations[i][j]) else {
                continue;
            };
            let angle = rel.angle + polar_angle(dir_i);
            sum += p_i.coords + Vector2::new(angle.cos(), angle.sin()) * rel.magnitude;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        points[j] = Point2::from(sum / count as f64);
        predicted[j] = true;
    }
    Some(TrackedQuad {
        program,
        points,
        predicted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use PaperCorner::*;

    /// Corner anchors of an axis-aligned 400x300 paper at (100, 100), with
    /// chain directions running clockwise along the edges.
    fn observation(program: u32, corner: PaperCorner, offset: Vector2<f64>) -> CornerObservation {
        let (position, direction) = match corner {
            TopLeft => (Point2::new(100.0, 100.0), Vector2::new(1.0, 0.0)),
            TopRight => (Point2::new(500.0, 100.0), Vector2::new(0.0, 1.0)),
            BottomRight => (Point2::new(500.0, 400.0), Vector2::new(-1.0, 0.0)),
            BottomLeft => (Point2::new(100.0, 400.0), Vector2::new(0.0, -1.0)),
        };
        CornerObservation {
            program,
            corner,
            position: position + offset,
            direction: direction * 45.0,
        }
    }

    fn observe(program: u32, corners: &[PaperCorner]) -> Vec<CornerObservation> {
        corners
            .iter()
            .map(|&c| observation(program, c, Vector2::zeros()))
            .collect()
    }

    #[test]
    fn fully_observed_program_is_passed_through() {
        let mut tracker = CornerTracker::new();
        let obs = observe(7, &PaperCorner::ALL);
        let quads = tracker.update(&obs);
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].program, 7);
        assert_eq!(quads[0].predicted, [false; 4]);
        for (p, o) in quads[0].points.iter().zip(&obs) {
            assert_eq!(*p, o.position);
        }
    }

    #[test]
    fn mirror_fill_copies_top_edge_onto_bottom_edge() {
        let mut tracker = CornerTracker::new();
        assert!(tracker.update(&observe(3, &[TopLeft, TopRight])).is_empty());
        assert!(tracker.update(&observe(3, &[TopLeft, TopRight])).is_empty());

        let real = tracker.relation(3, TopLeft, TopRight).unwrap();
        let mirrored = tracker.relation(3, BottomRight, BottomLeft).unwrap();
        assert!(!real.mirrored);
        assert!(mirrored.mirrored);
        assert_eq!(mirrored.angle, real.angle);
        assert_eq!(mirrored.magnitude, real.magnitude);
    }

    #[test]
    fn measured_relation_replaces_mirrored_one() {
        let mut tracker = CornerTracker::new();
        tracker.update(&observe(1, &[TopLeft, TopRight]));
        assert!(tracker.relation(1, BottomRight, BottomLeft).unwrap().mirrored);

        tracker.update(&observe(1, &[BottomRight, BottomLeft]));
        assert!(!tracker.relation(1, BottomRight, BottomLeft).unwrap().mirrored);
        // The real top-edge relation survives the mirror pass of the bottom edge.
        assert!(!tracker.relation(1, TopLeft, TopRight).unwrap().mirrored);
    }

    #[test]
    fn hidden_corner_is_predicted_from_mirrored_relations() {
        let mut tracker = CornerTracker::new();
        let quads = tracker.update(&observe(9, &[TopLeft, TopRight, BottomRight]));
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].predicted, [false, false, false, true]);
        assert_abs_diff_eq!(quads[0].points[3].x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(quads[0].points[3].y, 400.0, epsilon = 1e-9);

        // Next frame the top-right corner is gone too.
        let quads = tracker.update(&observe(9, &[TopLeft, BottomRight]));
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].predicted, [false, true, false, true]);
        assert_abs_diff_eq!(quads[0].points[1].x, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(quads[0].points[1].y, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn predictions_follow_a_moved_paper() {
        let mut tracker = CornerTracker::new();
        tracker.update(&observe(2, &PaperCorner::ALL));

        let shift = Vector2::new(30.0, -20.0);
        let obs = vec![observation(2, TopLeft, shift)];
        let quads = tracker.update(&obs);
        assert_eq!(quads.len(), 1);
        let expected = observe(2, &PaperCorner::ALL);
        for (p, o) in quads[0].points.iter().zip(&expected) {
            assert_abs_diff_eq!(p.x, o.position.x + shift.x, epsilon = 1e-9);
            assert_abs_diff_eq!(p.y, o.position.y + shift.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn single_new_corner_emits_nothing() {
        let mut tracker = CornerTracker::new();
        assert!(tracker.update(&observe(5, &[BottomLeft])).is_empty());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn programs_are_emitted_in_id_order() {
        let mut tracker = CornerTracker::new();
        let mut obs = observe(40, &PaperCorner::ALL);
        obs.extend(observe(4, &PaperCorner::ALL));
        let ids: Vec<u32> = tracker.update(&obs).iter().map(|q| q.program).collect();
        assert_eq!(ids, vec![4, 40]);
    }

    #[test]
    fn unseen_programs_age_out() {
        let mut tracker = CornerTracker::new();
        tracker.update(&observe(1, &[TopLeft]));
        tracker.update(&observe(2, &[TopLeft]));
        tracker.update(&observe(2, &[TopLeft]));
        assert_eq!(tracker.prune_unseen(1), 1);
        assert!(tracker.relation(1, TopLeft, TopRight).is_none());
        assert_eq!(tracker.len(), 1);
        assert!(tracker.forget(2));
        assert!(tracker.is_empty());
    }
}
