use chrono::NaiveTime;

use tavola_core::reservation::Reservation;
use tavola_core::resource::ResourceConfig;
use tavola_core::slot::{slot_starts, SlotAvailability};

/// Compute the open slots for one resource on one date.
///
/// Pure function of its inputs: walks the slot grid, subtracts the party
/// sizes of non-cancelled reservations per slot, and keeps only slots with
/// seats left, ordered by start time.
pub fn compute_availability(
    config: &ResourceConfig,
    reservations: &[Reservation],
) -> Vec<SlotAvailability> {
    slot_starts(config)
        .into_iter()
        .filter_map(|start| {
            let remaining = remaining_for_slot(config, reservations, start);
            if remaining > 0 {
                Some(SlotAvailability { start, remaining })
            } else {
                None
            }
        })
        .collect()
}

/// Seats left in a single slot, saturating at zero.
pub fn remaining_for_slot(
    config: &ResourceConfig,
    reservations: &[Reservation],
    slot_start: NaiveTime,
) -> u32 {
    let booked: u32 = reservations
        .iter()
        .filter(|r| r.counts_against_capacity() && r.slot_start == slot_start)
        .map(|r| r.party_size)
        .sum();

    config.capacity.saturating_sub(booked)
}
