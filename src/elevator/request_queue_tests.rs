/*
 * Unit tests for the request queue
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 * - test_push_is_idempotent
 * - test_scan_moving_up_serves_upper_stops_first
 * - test_scan_moving_down_serves_lower_stops_first
 * - test_scan_keeps_queued_current_floor_first
 * - test_idle_direction_follows_occupants
 * - test_idle_direction_tie_prefers_up
 * - test_reorder_merges_boarded_destinations
 * - test_release_hall_call_counts_down
 * - test_absorb_merges_shared_stops
 *
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod request_queue_tests {
    use crate::elevator::request_queue::{effective_direction, scan_order, RequestQueue};
    use crate::shared::CarStatus::{Idle, Loading, MovingDown, MovingUp};
    use crate::shared::Direction::{Down, Up};
    use crate::shared::RequestOrigin::{External, Internal};

    #[test]
    fn test_push_is_idempotent() {
        // Arrange
        let mut queue = RequestQueue::new();

        // Act
        let first = queue.push(4, External);
        let second = queue.push(4, Internal);

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(queue.floors(), vec![4]);
        let stop = queue.stop(4).unwrap();
        assert!(stop.internal);
        assert_eq!(stop.hall_calls, 1);
    }

    #[test]
    fn test_scan_moving_up_serves_upper_stops_first() {
        // Purpose: Upper stops ascending, then lower stops descending
        let mut queue = RequestQueue::new();
        for floor in [2, 5, 1, 7] {
            queue.push(floor, External);
        }

        queue.reorder(3, MovingUp, &[]);

        assert_eq!(queue.floors(), vec![5, 7, 2, 1]);
    }

    #[test]
    fn test_scan_moving_down_serves_lower_stops_first() {
        let mut queue = RequestQueue::new();
        for floor in [2, 5, 1, 7] {
            queue.push(floor, External);
        }

        queue.reorder(3, MovingDown, &[]);

        assert_eq!(queue.floors(), vec![2, 1, 5, 7]);
    }

    #[test]
    fn test_scan_keeps_queued_current_floor_first() {
        assert_eq!(scan_order(3, Up, &[6, 3, 1]), vec![3, 6, 1]);
        assert_eq!(scan_order(3, Down, &[6, 3, 1]), vec![3, 1, 6]);
    }

    #[test]
    fn test_idle_direction_follows_occupants() {
        // Purpose: Boarded occupants outrank a nearer hall call in the other direction

        // Arrange
        let pending = [4, 9];
        let boarded = [9];

        // Act
        let direction = effective_direction(5, Loading, &pending, &boarded);

        // Assert
        assert_eq!(direction, Up);
    }

    #[test]
    fn test_idle_direction_tie_prefers_up() {
        assert_eq!(effective_direction(5, Idle, &[3, 7], &[]), Up);
        assert_eq!(effective_direction(5, Idle, &[4, 8], &[]), Down);
        assert_eq!(effective_direction(5, Idle, &[1], &[]), Down);
        // Occupants disagree, so the closest stop decides
        assert_eq!(effective_direction(5, Idle, &[4, 8], &[2, 8]), Down);
    }

    #[test]
    fn test_reorder_merges_boarded_destinations() {
        let mut queue = RequestQueue::new();
        queue.push(1, External);

        queue.reorder(3, Idle, &[6, 3]);

        assert_eq!(queue.floors(), vec![6, 1]);
        assert!(queue.stop(6).unwrap().internal);
        assert!(!queue.contains(3));
    }

    #[test]
    fn test_release_hall_call_counts_down() {
        let mut queue = RequestQueue::new();
        queue.push(2, External);
        queue.push(2, External);

        assert_eq!(queue.release_hall_call(2), Some(1));
        assert_eq!(queue.release_hall_call(2), Some(0));
        assert_eq!(queue.release_hall_call(2), Some(0));
        assert_eq!(queue.release_hall_call(8), None);
    }

    #[test]
    fn test_absorb_merges_shared_stops() {
        // Arrange
        let mut queue = RequestQueue::new();
        queue.push(5, External);
        let mut held = RequestQueue::new();
        held.push(5, Internal);
        held.push(0, External);

        // Act
        queue.absorb(&mut held);

        // Assert
        assert!(held.is_empty());
        assert_eq!(queue.floors(), vec![5, 0]);
        let merged = queue.stop(5).unwrap();
        assert!(merged.internal);
        assert_eq!(merged.hall_calls, 1);
    }
}
