/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{CarStatus, Direction, RequestOrigin};

/***************************************/
/*       Public data structures        */
/***************************************/

/**
 * One pending stop in a car's queue.
 *
 * # Fields
 * - `floor`:       Target floor.
 * - `internal`:    Whether a boarded occupant asked for this floor.
 * - `hall_calls`:  Number of outstanding hall calls waiting at this floor.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedStop {
    pub floor: i32,
    pub internal: bool,
    pub hall_calls: u32,
}

impl QueuedStop {
    fn new(floor: i32, origin: RequestOrigin) -> QueuedStop {
        let mut stop = QueuedStop {
            floor,
            internal: false,
            hall_calls: 0,
        };
        stop.record(origin);
        stop
    }

    fn record(&mut self, origin: RequestOrigin) {
        match origin {
            RequestOrigin::Internal => self.internal = true,
            RequestOrigin::External => self.hall_calls += 1,
        }
    }
}

/// Ordered set of distinct floor stops for a single car.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQueue {
    stops: Vec<QueuedStop>,
}

/***************************************/
/*             Public API              */
/***************************************/
impl RequestQueue {
    pub fn new() -> RequestQueue {
        RequestQueue { stops: Vec::new() }
    }

    /// Appends `floor` unless it is already queued. Returns true if a new stop was added.
    pub fn push(&mut self, floor: i32, origin: RequestOrigin) -> bool {
        if let Some(stop) = self.stops.iter_mut().find(|s| s.floor == floor) {
            stop.record(origin);
            return false;
        }
        self.stops.push(QueuedStop::new(floor, origin));
        true
    }

    pub fn remove(&mut self, floor: i32) -> bool {
        let before = self.stops.len();
        self.stops.retain(|s| s.floor != floor);
        self.stops.len() != before
    }

    /// Drops one hall call from `floor`, returning the number still outstanding.
    pub fn release_hall_call(&mut self, floor: i32) -> Option<u32> {
        let stop = self.stops.iter_mut().find(|s| s.floor == floor)?;
        stop.hall_calls = stop.hall_calls.saturating_sub(1);
        Some(stop.hall_calls)
    }

    /// Moves every stop of `other` into this queue, merging stops both queues share.
    pub fn absorb(&mut self, other: &mut RequestQueue) {
        for stop in other.stops.drain(..) {
            match self.stops.iter_mut().find(|s| s.floor == stop.floor) {
                Some(existing) => {
                    existing.internal |= stop.internal;
                    existing.hall_calls += stop.hall_calls;
                }
                None => self.stops.push(stop),
            }
        }
    }

    pub fn contains(&self, floor: i32) -> bool {
        self.stops.iter().any(|s| s.floor == floor)
    }

    pub fn stop(&self, floor: i32) -> Option<&QueuedStop> {
        self.stops.iter().find(|s| s.floor == floor)
    }

    pub fn head(&self) -> Option<i32> {
        self.stops.first().map(|s| s.floor)
    }

    pub fn floors(&self) -> Vec<i32> {
        self.stops.iter().map(|s| s.floor).collect()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /**
     * Rewrites the queue into SCAN service order.
     *
     * Destinations of boarded occupants are merged in as internal stops first, except
     * the current floor: those occupants were already signaled when the doors opened here.
     */
    pub fn reorder(&mut self, current_floor: i32, status: CarStatus, boarded_destinations: &[i32]) {
        for &floor in boarded_destinations {
            if floor != current_floor {
                self.push(floor, RequestOrigin::Internal);
            }
        }

        let pending = self.floors();
        let direction = effective_direction(current_floor, status, &pending, boarded_destinations);
        let order = scan_order(current_floor, direction, &pending);

        let mut reordered = Vec::with_capacity(self.stops.len());
        for floor in order {
            if let Some(index) = self.stops.iter().position(|s| s.floor == floor) {
                reordered.push(self.stops.swap_remove(index));
            }
        }
        self.stops = reordered;
    }
}

/// Direction the car should sweep in next.
///
/// A moving car keeps its heading. A stationary car follows its boarded occupants when
/// they agree, otherwise the closest pending stop, with upward winning exact ties.
pub fn effective_direction(
    current_floor: i32,
    status: CarStatus,
    pending: &[i32],
    boarded_destinations: &[i32],
) -> Direction {
    match status {
        CarStatus::MovingUp => return Direction::Up,
        CarStatus::MovingDown => return Direction::Down,
        _ => {}
    }

    let occupants_up = boarded_destinations.iter().any(|&f| f > current_floor);
    let occupants_down = boarded_destinations.iter().any(|&f| f < current_floor);
    match (occupants_up, occupants_down) {
        (true, false) => return Direction::Up,
        (false, true) => return Direction::Down,
        _ => {}
    }

    let nearest_above = pending
        .iter()
        .filter(|&&f| f > current_floor)
        .map(|&f| f - current_floor)
        .min();
    let nearest_below = pending
        .iter()
        .filter(|&&f| f < current_floor)
        .map(|&f| current_floor - f)
        .min();

    match (nearest_above, nearest_below) {
        (Some(above), Some(below)) if below < above => Direction::Down,
        (None, Some(_)) => Direction::Down,
        _ => Direction::Up,
    }
}

/// Primary stops (in `direction`, including the current floor) sorted along the sweep,
/// followed by the remaining stops sorted nearest-first for the return sweep.
pub fn scan_order(current_floor: i32, direction: Direction, pending: &[i32]) -> Vec<i32> {
    let going_down = direction == Direction::Down;

    let (mut primary, mut secondary): (Vec<i32>, Vec<i32>) = pending.iter().partition(|&&f| {
        if going_down {
            f <= current_floor
        } else {
            f >= current_floor
        }
    });

    if going_down {
        primary.sort_unstable_by(|a, b| b.cmp(a));
        secondary.sort_unstable();
    } else {
        primary.sort_unstable();
        secondary.sort_unstable_by(|a, b| b.cmp(a));
    }

    let mut order: Vec<i32> = Vec::with_capacity(primary.len() + secondary.len());
    for floor in primary.into_iter().chain(secondary) {
        if !order.contains(&floor) {
            order.push(floor);
        }
    }
    order
}
