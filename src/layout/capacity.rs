//! Capacity ledger: pure functions over floors and lot registrations.
//!
//! The editor queries these before every area or spot mutation. None of them
//! mutate their arguments.

use std::collections::BTreeSet;

use crate::models::{Floor, LotCapacity, Rect, VehicleType};

use super::SpotGrid;

/// Vehicle types the lot has at least one registered capacity entry for.
///
/// A lot with no registrations at all allows every type.
pub fn allowed_vehicle_types(registrations: &[LotCapacity]) -> BTreeSet<VehicleType> {
    if registrations.is_empty() {
        return VehicleType::ALL.into_iter().collect();
    }
    registrations.iter().map(|c| c.vehicle_type).collect()
}

/// Sum of every registered capacity.
pub fn total_registered_capacity(registrations: &[LotCapacity]) -> u32 {
    registrations
        .iter()
        .fold(0u32, |acc, c| acc.saturating_add(c.capacity))
}

/// Sum of the effective occupied-spot count of every committed area.
///
/// The in-progress preview rectangle is never part of a floor (it lives in
/// the editor's gesture state), so it is excluded by construction.
pub fn total_drawn_spots<'a>(floors: impl IntoIterator<Item = &'a Floor>) -> u32 {
    floors
        .into_iter()
        .fold(0u32, |acc, f| acc.saturating_add(f.occupied_spots()))
}

pub fn can_place_more_spots<'a>(
    floors: impl IntoIterator<Item = &'a Floor>,
    registrations: &[LotCapacity],
) -> bool {
    total_drawn_spots(floors) < total_registered_capacity(registrations)
}

/// How many more spots may be drawn before the registered total is reached.
pub fn remaining_capacity<'a>(
    floors: impl IntoIterator<Item = &'a Floor>,
    registrations: &[LotCapacity],
) -> u32 {
    total_registered_capacity(registrations).saturating_sub(total_drawn_spots(floors))
}

/// Number of grid cells of `grid` that fit in `rect`.
///
/// Used for the live preview label and as the hard upper bound on the
/// capacity of a non-car area.
pub fn max_spots_for_rect(rect: &Rect, grid: &SpotGrid) -> u32 {
    let cols = (rect.width / grid.pitch_x()).floor().max(0.0);
    let rows = (rect.height / grid.pitch_y()).floor().max(0.0);
    (cols * rows).min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Area, AreaType};

    fn floor_with(areas: Vec<Area>) -> Floor {
        let mut floor = Floor::new(1, VehicleType::ALL.into_iter().collect());
        floor.areas = areas;
        floor
    }

    #[test]
    fn no_registrations_allows_every_type() {
        assert_eq!(allowed_vehicle_types(&[]).len(), 4);
    }

    #[test]
    fn registrations_restrict_allowed_types() {
        let regs = vec![
            LotCapacity::new(VehicleType::CarUpTo9Seats, 10),
            LotCapacity::new(VehicleType::Bike, 0),
        ];
        let allowed = allowed_vehicle_types(&regs);
        assert_eq!(
            allowed,
            BTreeSet::from([VehicleType::CarUpTo9Seats, VehicleType::Bike])
        );
    }

    #[test]
    fn registered_capacity_sums_entries() {
        let regs = vec![
            LotCapacity::new(VehicleType::CarUpTo9Seats, 10),
            LotCapacity::new(VehicleType::Motorbike, 25),
            LotCapacity::new(VehicleType::Motorbike, 5),
        ];
        assert_eq!(total_registered_capacity(&regs), 40);
    }

    #[test]
    fn drawn_spots_mix_spot_lists_and_totals() {
        let mut car = Area::new(
            "C",
            Rect::new(0.0, 0.0, 200.0, 200.0),
            VehicleType::CarUpTo9Seats,
            AreaType::WalkInOnly,
            99,
        );
        car.spots_mut()
            .expect("spots")
            .push(crate::models::Spot::new("S1", Rect::new(5.0, 5.0, 40.0, 60.0)));
        let moto = Area::new(
            "M",
            Rect::new(300.0, 0.0, 200.0, 200.0),
            VehicleType::Motorbike,
            AreaType::WalkInOnly,
            6,
        );
        let floors = [floor_with(vec![car]), floor_with(vec![moto])];
        assert_eq!(total_drawn_spots(&floors), 7);
    }

    #[test]
    fn can_place_is_strictly_less_than() {
        let regs = vec![LotCapacity::new(VehicleType::Motorbike, 6)];
        let moto = Area::new(
            "M",
            Rect::new(0.0, 0.0, 200.0, 200.0),
            VehicleType::Motorbike,
            AreaType::WalkInOnly,
            6,
        );
        let floors = [floor_with(vec![moto])];
        assert!(!can_place_more_spots(&floors, &regs));
        assert_eq!(remaining_capacity(&floors, &regs), 0);
    }

    #[test]
    fn max_spots_for_200_square_is_eight() {
        let rect = Rect::new(0.0, 0.0, 200.0, 200.0);
        assert_eq!(max_spots_for_rect(&rect, &SpotGrid::default()), 8);
    }

    #[test]
    fn max_spots_for_tiny_rect_is_zero() {
        let rect = Rect::new(0.0, 0.0, 49.0, 500.0);
        assert_eq!(max_spots_for_rect(&rect, &SpotGrid::default()), 0);
    }
}
