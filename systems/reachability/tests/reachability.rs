use isle_agent_core::{Capabilities, Coordinate, Tile, TileMapView};
use isle_agent_system_reachability::{can_reach, reachable_region};

const ISLANDS: [&str; 7] = [
    "   ~~   T  ",
    " * ~~ k T  ",
    "   -~   T  ",
    "****~~~~***",
    "  a ~  $   ",
    "    ~ ***  ",
    "  T -      ",
];

fn islands() -> TileMapView<'static> {
    TileMapView::from_ascii(6, Coordinate::new(-5, 3), &ISLANDS).expect("valid rows")
}

fn capability_sets() -> [Capabilities; 4] {
    [
        Capabilities::NONE,
        Capabilities::NONE.with_key(),
        Capabilities::NONE.with_axe(),
        Capabilities::ALL,
    ]
}

fn known_cells(view: &TileMapView<'_>) -> Vec<Coordinate> {
    (0..view.len())
        .filter_map(|index| view.coordinate(index))
        .filter(|cell| view.tile(*cell) != Tile::Unknown)
        .collect()
}

#[test]
fn reachability_is_symmetric() {
    let view = islands();
    let cells = known_cells(&view);

    for capabilities in capability_sets() {
        for &a in &cells {
            for &b in &cells {
                assert_eq!(
                    can_reach(&view, a, b, capabilities),
                    can_reach(&view, b, a, capabilities),
                    "asymmetric answer between {a:?} and {b:?} with {capabilities:?}",
                );
            }
        }
    }
}

#[test]
fn can_reach_agrees_with_region_membership() {
    let view = islands();
    let start = Coordinate::new(-5, 3);

    for capabilities in capability_sets() {
        let region = reachable_region(&view, start, capabilities);
        for cell in known_cells(&view) {
            assert_eq!(
                region.contains(cell),
                can_reach(&view, start, cell, capabilities),
                "region and point query disagree at {cell:?}",
            );
        }
    }
}

#[test]
fn capabilities_only_ever_grow_the_region() {
    let view = islands();
    let start = Coordinate::new(-5, 3);

    let bare = reachable_region(&view, start, Capabilities::NONE);
    let equipped = reachable_region(&view, start, Capabilities::ALL);

    assert!(bare.len() < equipped.len());
    for cell in known_cells(&view) {
        if bare.contains(cell) {
            assert!(equipped.contains(cell));
        }
    }
}
