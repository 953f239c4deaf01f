use crate::geometry::{LaneId, ObstacleId};

/// Outcome of one pixel-count measurement.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PixelCount {
    /// Samples that passed every per-fragment test.
    Counted(u64),
    /// The query was invalid, incomplete, or timed out at readback.
    Unavailable,
}

impl PixelCount {
    /// Pixel area, treating an unavailable count as zero.
    #[inline]
    pub fn pixels(self) -> u64 {
        match self {
            PixelCount::Counted(n) => n,
            PixelCount::Unavailable => 0,
        }
    }

    #[inline]
    pub fn is_available(self) -> bool {
        matches!(self, PixelCount::Counted(_))
    }
}

/// Overlap of one obstacle with one lane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Assignment {
    pub lane_id: LaneId,
    pub intersection_pixel_area: u64,
    /// `intersection / total`, or `None` when the obstacle rasterized to zero
    /// pixels and the ratio is undefined.
    pub ratio: Option<f32>,
}

/// Lane overlap summary for one obstacle.
///
/// Ratios of different lanes come from independent masked passes and do not
/// necessarily sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneAssignmentResult {
    pub obstacle_id: ObstacleId,
    pub total_pixel_area: u64,
    /// Lanes with non-zero overlap, in lane processing order.
    pub assignments: Vec<Assignment>,
    /// At least one measurement for this obstacle was unavailable and counted
    /// as zero.
    pub degraded: bool,
}

impl LaneAssignmentResult {
    pub(crate) fn new(obstacle_id: ObstacleId, total: PixelCount) -> Self {
        Self {
            obstacle_id,
            total_pixel_area: total.pixels(),
            assignments: Vec::new(),
            degraded: !total.is_available(),
        }
    }

    /// Records a masked measurement. Zero overlap is not recorded.
    pub(crate) fn record(&mut self, lane_id: LaneId, count: PixelCount) {
        if !count.is_available() {
            self.degraded = true;
        }
        let area = count.pixels();
        if area == 0 {
            return;
        }
        self.assignments.push(Assignment {
            lane_id,
            intersection_pixel_area: area,
            ratio: None,
        });
    }

    /// Fills in ratios once the total area is known.
    pub(crate) fn finalize_ratios(&mut self) {
        let total = self.total_pixel_area;
        for a in &mut self.assignments {
            a.ratio = intersection_ratio(a.intersection_pixel_area, total);
        }
        if total == 0 && !self.assignments.is_empty() {
            log::debug!(
                "obstacle {}: total pixel area is zero, {} ratio(s) undefined",
                self.obstacle_id,
                self.assignments.len()
            );
        }
    }

    pub fn lane_ids(&self) -> impl Iterator<Item = LaneId> + '_ {
        self.assignments.iter().map(|a| a.lane_id)
    }

    pub fn assignment(&self, lane_id: LaneId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.lane_id == lane_id)
    }

    /// Lane with the largest overlap. Ties keep the earlier lane.
    pub fn primary(&self) -> Option<&Assignment> {
        self.assignments.iter().fold(None, |best: Option<&Assignment>, a| match best {
            Some(b) if b.intersection_pixel_area >= a.intersection_pixel_area => Some(b),
            _ => Some(a),
        })
    }

    /// `true` if the obstacle's footprint touches no lane at all.
    pub fn is_unassigned(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// `intersection / total`, undefined for an empty total.
pub fn intersection_ratio(intersection: u64, total: u64) -> Option<f32> {
    if total == 0 {
        None
    } else {
        Some((intersection as f64 / total as f64) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_gives_undefined_ratio() {
        assert_eq!(intersection_ratio(0, 0), None);
        assert_eq!(intersection_ratio(5, 0), None);
        assert_eq!(intersection_ratio(5, 10), Some(0.5));
    }

    #[test]
    fn zero_overlap_is_not_recorded() {
        let mut r = LaneAssignmentResult::new(1, PixelCount::Counted(100));
        r.record(10, PixelCount::Counted(0));
        r.record(11, PixelCount::Counted(40));
        r.finalize_ratios();
        assert_eq!(r.lane_ids().collect::<Vec<_>>(), vec![11]);
        assert_eq!(r.assignment(11).and_then(|a| a.ratio), Some(0.4));
        assert!(!r.degraded);
    }

    #[test]
    fn unavailable_count_degrades_without_assignment() {
        let mut r = LaneAssignmentResult::new(1, PixelCount::Counted(100));
        r.record(10, PixelCount::Unavailable);
        r.finalize_ratios();
        assert!(r.is_unassigned());
        assert!(r.degraded);
    }

    #[test]
    fn unavailable_total_leaves_ratios_undefined() {
        let mut r = LaneAssignmentResult::new(2, PixelCount::Unavailable);
        r.record(10, PixelCount::Counted(30));
        r.finalize_ratios();
        assert_eq!(r.total_pixel_area, 0);
        assert_eq!(r.assignment(10).map(|a| a.ratio), Some(None));
        assert!(r.degraded);
    }

    #[test]
    fn primary_prefers_largest_then_earliest() {
        let mut r = LaneAssignmentResult::new(1, PixelCount::Counted(100));
        r.record(1, PixelCount::Counted(30));
        r.record(2, PixelCount::Counted(70));
        r.record(3, PixelCount::Counted(70));
        assert_eq!(r.primary().map(|a| a.lane_id), Some(2));
    }
}
