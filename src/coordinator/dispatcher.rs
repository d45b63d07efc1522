/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::DispatchConfig;
use crate::elevator::Car;
use crate::shared::{CarId, CarStatus};

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Picks the car that should answer a hall call.
 *
 * The controller keeps only the roster handed to it at construction. Cars are borrowed per
 * call and only read while scoring; the chosen car is mutated through `Car::call_to_floor`.
 * Scores are recomputed on every call, so nothing is reserved between a decision and the
 * occupant actually boarding.
 *
 * # Fields
 * - `roster`:  Car ids in tie-break order.
 * - `weights`: Scoring constants.
 */
pub struct DispatchController {
    roster: Vec<CarId>,
    weights: DispatchConfig,
}

impl DispatchController {
    pub fn new(roster: Vec<CarId>, weights: &DispatchConfig) -> DispatchController {
        DispatchController {
            roster,
            weights: weights.clone(),
        }
    }

    /// Heuristic cost of sending `car` to `call_floor`. Lower is better.
    pub fn score(&self, car: &Car, call_floor: i32) -> f64 {
        let current_floor = car.current_floor();
        let mut score = (current_floor - call_floor).abs() as f64;

        match car.status() {
            CarStatus::MovingUp => {
                if call_floor > current_floor {
                    score -= self.weights.moving_toward_bonus;
                } else if call_floor < current_floor {
                    score += self.weights.wrong_direction_penalty;
                }
            }
            CarStatus::MovingDown => {
                if call_floor < current_floor {
                    score -= self.weights.moving_toward_bonus;
                } else if call_floor > current_floor {
                    score += self.weights.wrong_direction_penalty;
                }
            }
            CarStatus::Idle => score -= self.weights.idle_bonus,
            _ => {}
        }

        score += self.weights.queue_length_weight * car.requested_floors_count() as f64;

        if car.current_weight() >= self.weights.heavy_load_ratio * car.max_weight() {
            score += self.weights.heavy_load_penalty;
        }

        score
    }

    pub fn find_best_elevator_for_request(
        &self,
        cars: &[Car],
        call_floor: i32,
        destination_floor: i32,
    ) -> Option<CarId> {
        self.find_best_elevator_excluding(cars, call_floor, destination_floor, &[])
    }

    /// Like `find_best_elevator_for_request`, skipping the cars in `excluded`.
    pub fn find_best_elevator_excluding(
        &self,
        cars: &[Car],
        call_floor: i32,
        destination_floor: i32,
        excluded: &[CarId],
    ) -> Option<CarId> {
        let candidates: Vec<&Car> = self
            .roster
            .iter()
            .filter(|id| !excluded.contains(id))
            .filter_map(|id| cars.iter().find(|car| car.id() == *id))
            .filter(|car| car.status().is_in_service())
            .collect();

        let mut best: Option<(CarId, f64)> = None;
        for car in &candidates {
            let score = self.score(car, call_floor);
            debug!("{} scored {:.2} for call at floor {}", car.id(), score, call_floor);
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ if score.is_nan() => {}
                _ => best = Some((car.id(), score)),
            }
        }

        let chosen = best
            .map(|(id, _)| id)
            .or_else(|| candidates.first().map(|car| car.id()));

        match chosen {
            Some(id) => info!(
                "Assigned call {} -> {} to {}",
                call_floor, destination_floor, id
            ),
            None => warn!(
                "No car in service for call {} -> {}",
                call_floor, destination_floor
            ),
        }
        chosen
    }

    /// Chooses a car outside `excluded` for the hall call and registers the call with it.
    pub fn dispatch_hall_call(
        &self,
        cars: &mut [Car],
        call_floor: i32,
        destination_floor: i32,
        excluded: &[CarId],
    ) -> Option<CarId> {
        let id =
            self.find_best_elevator_excluding(cars, call_floor, destination_floor, excluded)?;
        let car = cars.iter_mut().find(|car| car.id() == id)?;
        car.call_to_floor(call_floor).ok()?;
        Some(id)
    }
}
