//! Property tests for grid geometry and neighbourhood enumeration.

use abm_space::{Cell, Dimensions, Neighbourhood, neighbour_cells};
use proptest::prelude::*;

fn mode() -> impl Strategy<Value = Neighbourhood> {
    prop_oneof![Just(Neighbourhood::Moore), Just(Neighbourhood::Neumann)]
}

fn dims() -> impl Strategy<Value = Dimensions> {
    (0..6usize, 0..6usize, 0..4usize).prop_map(|(w, h, d)| Dimensions::new(w, h, d))
}

/// Every offset in the cube of side `2r + 1`, kept when the shape reaches it,
/// then wrapped or clipped and ordered by cell id.
fn reference(
    dims: &Dimensions,
    centre: Cell,
    radius: u32,
    mode: Neighbourhood,
    wrap: bool,
    include_centre: bool,
) -> Vec<Cell> {
    let r = i64::from(radius);
    let span = |extent: i64| if extent == 1 { 0..=0 } else { -r..=r };
    let [w, h, d] = dims.extents();
    let mut cells = Vec::new();
    for dz in span(d) {
        for dy in span(h) {
            for dx in span(w) {
                let offset = Cell::new(dx, dy, dz);
                if !mode.reaches(offset, r) {
                    continue;
                }
                let raw = Cell::new(centre.x + dx, centre.y + dy, centre.z + dz);
                let cell = if wrap {
                    dims.wrap(raw)
                } else if dims.contains(raw) {
                    raw
                } else {
                    continue;
                };
                if cell == centre && !include_centre {
                    continue;
                }
                cells.push(cell);
            }
        }
    }
    cells.sort_by_key(|cell| dims.cell_id(*cell).unwrap());
    cells.dedup();
    cells
}

proptest! {
    #[test]
    fn prop_cell_ids_round_trip(dims in dims(), seed in any::<usize>()) {
        let id = seed % dims.cell_count();
        let cell = dims.cell_at(id).unwrap();
        prop_assert!(dims.contains(cell));
        prop_assert_eq!(dims.cell_id(cell).unwrap(), id);
    }

    #[test]
    fn prop_neighbours_are_ordered_and_in_bounds(
        dims in dims(),
        seed in any::<usize>(),
        radius in 0..8u32,
        mode in mode(),
        wrap in any::<bool>(),
        include_centre in any::<bool>(),
    ) {
        let centre = dims.cell_at(seed % dims.cell_count()).unwrap();
        let cells = neighbour_cells(&dims, centre, radius, mode, wrap, include_centre);
        let ids: Vec<usize> = cells.iter().map(|cell| dims.cell_id(*cell).unwrap()).collect();
        prop_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(cells.iter().all(|cell| dims.contains(*cell)));
        prop_assert_eq!(cells.contains(&centre), include_centre);
    }

    #[test]
    fn prop_neighbours_match_offset_enumeration(
        dims in dims(),
        seed in any::<usize>(),
        radius in 0..5u32,
        mode in mode(),
        wrap in any::<bool>(),
        include_centre in any::<bool>(),
    ) {
        let centre = dims.cell_at(seed % dims.cell_count()).unwrap();
        prop_assert_eq!(
            neighbour_cells(&dims, centre, radius, mode, wrap, include_centre),
            reference(&dims, centre, radius, mode, wrap, include_centre)
        );
    }

    #[test]
    fn prop_radius_past_the_world_covers_it(
        dims in dims(),
        seed in any::<usize>(),
        extra in 0..100_000u32,
        wrap in any::<bool>(),
    ) {
        let centre = dims.cell_at(seed % dims.cell_count()).unwrap();
        let [w, h, d] = dims.extents();
        let radius = (w + h + d) as u32 + extra;
        let cells = neighbour_cells(&dims, centre, radius, Neighbourhood::Neumann, wrap, true);
        prop_assert_eq!(cells, dims.cells().collect::<Vec<_>>());
    }
}
