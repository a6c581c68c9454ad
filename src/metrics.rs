use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        calculate_distance(self.x, self.y, other.x, other.y)
    }
}

/// One persisted row. Field order is the CSV column order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityRecord {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Local>,
    pub x_position: i32,
    pub y_position: i32,
    pub distance_moved: f64,
    pub idle_time: f64,
}

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

fn serialize_timestamp<S>(ts: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// Position and distance gathered between two flushes.
#[derive(Debug, Default)]
pub struct Accumulator {
    position: Option<Position>,
    distance: f64,
    last_flush: Option<DateTime<Local>>,
}

impl Accumulator {
    pub fn record_move(&mut self, x: i32, y: i32) {
        let next = Position::new(x, y);
        if let Some(prev) = self.position {
            self.distance += prev.distance_to(&next);
        }
        self.position = Some(next);
    }

    /// Builds the row for `now` without consuming the interval. Before any move
    /// the position reads as the origin.
    pub fn record(&self, now: DateTime<Local>) -> ActivityRecord {
        let idle_time = self
            .last_flush
            .and_then(|last| (now - last).to_std().ok())
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0);
        let position = self.position.unwrap_or_default();

        ActivityRecord {
            timestamp: now,
            x_position: position.x,
            y_position: position.y,
            distance_moved: self.distance,
            idle_time,
        }
    }

    /// Starts a new interval at `now`. The position carries over.
    pub fn reset(&mut self, now: DateTime<Local>) {
        self.distance = 0.0;
        self.last_flush = Some(now);
    }

    #[cfg(test)]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[cfg(test)]
    pub fn position(&self) -> Option<Position> {
        self.position
    }
}

pub fn calculate_distance(x1: i32, y1: i32, x2: i32, y2: i32) -> f64 {
    let dx = (x2 - x1) as f64;
    let dy = (y2 - y1) as f64;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn flush(acc: &mut Accumulator, now: DateTime<Local>) -> ActivityRecord {
        let record = acc.record(now);
        acc.reset(now);
        record
    }

    #[test]
    fn first_move_adds_no_distance() {
        let mut acc = Accumulator::default();
        acc.record_move(100, 200);
        assert_eq!(acc.distance(), 0.0);
        assert_eq!(acc.position(), Some(Position::new(100, 200)));
    }

    #[test]
    fn distance_is_sum_of_euclidean_steps() {
        let mut acc = Accumulator::default();
        for (x, y) in [(0, 0), (3, 4), (3, 4), (6, 8), (6, 0)] {
            acc.record_move(x, y);
        }
        assert!((acc.distance() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn flush_without_moves_reports_origin_and_zero_distance() {
        let mut acc = Accumulator::default();
        let record = flush(&mut acc, Local::now());
        assert_eq!((record.x_position, record.y_position), (0, 0));
        assert_eq!(record.distance_moved, 0.0);
    }

    #[test]
    fn reset_clears_distance_but_keeps_position() {
        let mut acc = Accumulator::default();
        acc.record_move(0, 0);
        acc.record_move(30, 40);
        let record = flush(&mut acc, Local::now());
        assert_eq!(record.distance_moved, 50.0);
        assert_eq!(acc.distance(), 0.0);
        assert_eq!(acc.position(), Some(Position::new(30, 40)));

        // the next interval measures from the last known position
        acc.record_move(30, 43);
        assert_eq!(acc.distance(), 3.0);
    }

    #[test]
    fn idle_time_is_elapsed_time_since_previous_flush() {
        let mut acc = Accumulator::default();
        let t0 = Local::now();
        let first = flush(&mut acc, t0);
        assert_eq!(first.idle_time, 0.0);

        let second = flush(&mut acc, t0 + Duration::milliseconds(5_250));
        assert!((second.idle_time - 5.25).abs() < 1e-9);

        // a movement does not touch the idle clock
        acc.record_move(1, 1);
        let third = flush(&mut acc, t0 + Duration::milliseconds(10_250));
        assert!((third.idle_time - 5.0).abs() < 1e-9);
    }

    #[test]
    fn record_leaves_interval_untouched() {
        let mut acc = Accumulator::default();
        let t0 = Local::now();
        flush(&mut acc, t0);
        acc.record_move(0, 0);
        acc.record_move(6, 8);

        let peek = acc.record(t0 + Duration::seconds(5));
        assert_eq!(peek.distance_moved, 10.0);
        assert_eq!(acc.distance(), 10.0);

        let later = acc.record(t0 + Duration::seconds(7));
        assert!((later.idle_time - 7.0).abs() < 1e-9);
    }

    #[test]
    fn clock_going_backwards_clamps_idle_time() {
        let mut acc = Accumulator::default();
        let t0 = Local::now();
        flush(&mut acc, t0);
        let record = flush(&mut acc, t0 - Duration::seconds(2));
        assert_eq!(record.idle_time, 0.0);
    }
}
